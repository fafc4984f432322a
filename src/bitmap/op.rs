use crate::bitmap::store::Handle;
use crate::foundation::error::{PictorError, PictorResult};

/// Number of numeric slots in an [`OpResult`].
pub const OP_RESULT_SLOTS: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Success/failure shape handed across the scripting boundary.
///
/// Fallible store operations flatten into this shape so internal failures
/// never escape the boundary as panics: a success flag, a message present
/// on failure, and a fixed-size array carrying handle, dimension or
/// channel outputs.
pub struct OpResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Failure description; `None` on success.
    pub message: Option<String>,
    /// Numeric outputs (handle, dimensions or channel values), zero-padded.
    pub results: [i32; OP_RESULT_SLOTS],
}

impl OpResult {
    /// Successful result with no numeric outputs.
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            results: [0; OP_RESULT_SLOTS],
        }
    }

    /// Successful result carrying up to [`OP_RESULT_SLOTS`] numeric
    /// outputs.
    pub fn ok_with(values: &[i32]) -> Self {
        let mut results = [0; OP_RESULT_SLOTS];
        for (slot, value) in results.iter_mut().zip(values) {
            *slot = *value;
        }
        Self {
            success: true,
            message: None,
            results,
        }
    }

    /// Failure result carrying a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            results: [0; OP_RESULT_SLOTS],
        }
    }

    /// Flatten a fallible operation into the boundary shape.
    pub fn from_result<T: OpEncode>(result: PictorResult<T>) -> Self {
        match result {
            Ok(value) => Self::ok_with(&value.encode_op()),
            Err(err) => Self::from(err),
        }
    }
}

impl From<PictorError> for OpResult {
    fn from(err: PictorError) -> Self {
        Self::failure(err.to_string())
    }
}

/// Conversion of operation outputs into [`OpResult`] numeric slots.
pub trait OpEncode {
    /// Encode into the fixed numeric output array.
    fn encode_op(&self) -> [i32; OP_RESULT_SLOTS];
}

impl OpEncode for () {
    fn encode_op(&self) -> [i32; OP_RESULT_SLOTS] {
        [0; OP_RESULT_SLOTS]
    }
}

impl OpEncode for Handle {
    fn encode_op(&self) -> [i32; OP_RESULT_SLOTS] {
        [self.as_i32(), 0, 0, 0]
    }
}

impl OpEncode for (u32, u32) {
    fn encode_op(&self) -> [i32; OP_RESULT_SLOTS] {
        [self.0 as i32, self.1 as i32, 0, 0]
    }
}

impl OpEncode for [u8; 4] {
    fn encode_op(&self) -> [i32; OP_RESULT_SLOTS] {
        [
            i32::from(self[0]),
            i32::from(self[1]),
            i32::from(self[2]),
            i32::from(self[3]),
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/op.rs"]
mod tests;
