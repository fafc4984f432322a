/// Convenience result type used across Pictor.
pub type PictorResult<T> = Result<T, PictorError>;

/// Top-level error taxonomy used by store and protocol APIs.
///
/// Variants that travel across the scripting boundary keep their historical
/// message wording; everything else reads like the rest of the crate.
#[derive(thiserror::Error, Debug)]
pub enum PictorError {
    /// Source path did not resolve to a file.
    #[error("File not found.")]
    FileNotFound,

    /// The codec produced an empty or invalid decode result.
    #[error("decode error: {0}")]
    Decode(String),

    /// The codec failed to encode. The message is fixed by the scripting
    /// contract.
    #[error("Unknown error.")]
    Encode,

    /// Bitmap dimensions outside the accepted range.
    #[error("both width and height must be at least 1.")]
    InvalidDimensions,

    /// Pixel coordinates outside the bitmap.
    #[error("Invalid coordinates.")]
    OutOfBounds,

    /// No live store entry for the given handle.
    #[error("no such handle: {0}")]
    HandleNotFound(i32),

    /// The bitmap is already borrowed by a running traversal.
    #[error("handle {0} is busy in a running traversal")]
    TraversalInProgress(i32),

    /// Native library failed to load or resolve its entry points.
    #[error("module load failed: {0}")]
    ModuleLoad(String),

    /// Provider client initialization returned null.
    #[error("client initialization failed")]
    ClientInit,

    /// Provider refused to open the path.
    #[error("open failed: {0}")]
    OpenFailed(String),

    /// No protocol module is registered for the scheme.
    #[error("unknown protocol scheme '{0}'")]
    UnknownScheme(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PictorError {
    /// Build a [`PictorError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`PictorError::ModuleLoad`] value.
    pub fn module_load(msg: impl Into<String>) -> Self {
        Self::ModuleLoad(msg.into())
    }

    /// Build a [`PictorError::OpenFailed`] value.
    pub fn open_failed(msg: impl Into<String>) -> Self {
        Self::OpenFailed(msg.into())
    }

    /// Build a [`PictorError::UnknownScheme`] value.
    pub fn unknown_scheme(msg: impl Into<String>) -> Self {
        Self::UnknownScheme(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
