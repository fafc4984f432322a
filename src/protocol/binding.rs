use std::path::Path;

use widestring::{U16CStr, U16CString};

use crate::foundation::error::PictorError;
use crate::protocol::abi::{
    CloseFileFn, CreateFileEnumeratorFn, DestroyFileEnumeratorFn, FileEnumeratorNextFn,
    GetProtocolFn, InitializeClientFn, OpenFileFn, RawClient, RawEnumerator, RawFile, ReadFileFn,
    TerminateClientFn,
};

#[derive(Clone, Copy, Debug)]
/// Opaque provider client handle, owned by the module that initialized it.
pub struct ClientHandle(*mut RawClient);

impl ClientHandle {
    /// Wrap a raw provider pointer.
    pub fn from_raw(raw: *mut RawClient) -> Self {
        Self(raw)
    }

    /// Raw provider pointer.
    pub fn as_raw(self) -> *mut RawClient {
        self.0
    }
}

#[derive(Clone, Copy, Debug)]
/// Opaque provider file handle, owned by a stream adapter.
pub struct FileHandle(*mut RawFile);

impl FileHandle {
    /// Wrap a raw provider pointer.
    pub fn from_raw(raw: *mut RawFile) -> Self {
        Self(raw)
    }

    /// Raw provider pointer.
    pub fn as_raw(self) -> *mut RawFile {
        self.0
    }
}

#[derive(Clone, Copy, Debug)]
/// Opaque provider directory enumerator handle.
pub struct EnumeratorHandle(*mut RawEnumerator);

impl EnumeratorHandle {
    /// Wrap a raw provider pointer.
    pub fn from_raw(raw: *mut RawEnumerator) -> Self {
        Self(raw)
    }

    /// Raw provider pointer.
    pub fn as_raw(self) -> *mut RawEnumerator {
        self.0
    }
}

/// Resolved provider capability set.
///
/// Produced by the deferred-binding loader ([`DylibBinding::load`]) for
/// native libraries, or supplied directly for in-process providers
/// (embedders, tests). All calls are synchronous and run on the calling
/// thread.
pub trait ProviderBinding {
    /// Scheme name the provider services; `None` when the provider reports
    /// none.
    fn protocol(&self) -> Option<String>;

    /// Initialize the provider client; `None` signals failure.
    fn initialize_client(&self, config_dir: &str, plugins_dir: &str) -> Option<ClientHandle>;

    /// Tear the client down. Called at most once, only after successful
    /// initialization.
    fn terminate_client(&self, client: ClientHandle);

    /// Open a provider file; `None` signals not-found/denied.
    fn open_file(&self, client: ClientHandle, path: &str) -> Option<FileHandle>;

    /// Close a provider file.
    fn close_file(&self, file: FileHandle);

    /// Read up to `buf.len()` bytes into `buf`; 0 is end-of-data.
    fn read_file(&self, file: FileHandle, buf: &mut [u8]) -> usize;

    /// Create a directory enumerator; `None` signals not-found/denied.
    fn create_file_enumerator(&self, client: ClientHandle, path: &str) -> Option<EnumeratorHandle>;

    /// Next name in the sequence, or `None` at its end.
    fn file_enumerator_next(&self, enumerator: EnumeratorHandle) -> Option<String>;

    /// Destroy an enumerator. Called exactly once per enumerator.
    fn destroy_file_enumerator(&self, enumerator: EnumeratorHandle);
}

#[derive(Debug, thiserror::Error)]
/// Why a library never became a usable provider binding.
pub enum LoadFailure {
    /// The dynamic library itself did not load.
    #[error("failed to load '{path}': {reason}")]
    Library {
        /// Library path as given to the loader.
        path: String,
        /// Loader error text.
        reason: String,
    },

    /// A required entry point was absent.
    #[error("missing entry point '{symbol}'")]
    MissingSymbol {
        /// The exact symbol name that failed to resolve.
        symbol: &'static str,
    },

    /// The provider reported no usable protocol name.
    #[error("provider reported no protocol name")]
    NoProtocolName,

    /// `initialize_client` returned null.
    #[error("client initialization failed")]
    ClientInit,
}

impl LoadFailure {
    pub(crate) fn to_error(&self) -> PictorError {
        match self {
            LoadFailure::ClientInit => PictorError::ClientInit,
            other => PictorError::module_load(other.to_string()),
        }
    }
}

/// Outcome of deferred symbol binding: either every entry point resolved,
/// or the first failure with its reason. No half-bound state exists.
pub enum LoadResult {
    /// Library loaded and every required entry point resolved.
    Ready(DylibBinding),
    /// Library or symbol resolution failed.
    Failed(LoadFailure),
}

/// Provider binding backed by a native dynamic library.
///
/// Holds the resolved entry points together with the library handle that
/// keeps them mapped; the pointers never outlive `_lib`.
pub struct DylibBinding {
    get_protocol: GetProtocolFn,
    initialize_client: InitializeClientFn,
    terminate_client: TerminateClientFn,
    open_file: OpenFileFn,
    close_file: CloseFileFn,
    read_file: ReadFileFn,
    create_file_enumerator: CreateFileEnumeratorFn,
    file_enumerator_next: FileEnumeratorNextFn,
    destroy_file_enumerator: DestroyFileEnumeratorFn,
    _lib: libloading::Library,
}

impl DylibBinding {
    /// Load `path` and resolve every required entry point by exact name.
    pub fn load(path: &Path) -> LoadResult {
        // SAFETY: loading a provider library runs its initializers. The
        // deployment contract is that plugin libraries are trusted code.
        let lib = match unsafe { libloading::Library::new(path) } {
            Ok(lib) => lib,
            Err(err) => {
                return LoadResult::Failed(LoadFailure::Library {
                    path: path.display().to_string(),
                    reason: err.to_string(),
                });
            }
        };

        // SAFETY: each expansion copies a symbol out at its exported ABI
        // type; the library handle moves into the binding, so the pointers
        // stay mapped for the binding's lifetime.
        macro_rules! resolve {
            ($sym:literal) => {
                match unsafe { lib.get(concat!($sym, "\0").as_bytes()) } {
                    Ok(symbol) => *symbol,
                    Err(_) => {
                        return LoadResult::Failed(LoadFailure::MissingSymbol { symbol: $sym });
                    }
                }
            };
        }

        LoadResult::Ready(Self {
            get_protocol: resolve!("get_protocol"),
            initialize_client: resolve!("initialize_client"),
            terminate_client: resolve!("terminate_client"),
            open_file: resolve!("open_file"),
            close_file: resolve!("close_file"),
            read_file: resolve!("read_file"),
            create_file_enumerator: resolve!("create_file_enumerator"),
            file_enumerator_next: resolve!("file_enumerator_next"),
            destroy_file_enumerator: resolve!("destroy_file_enumerator"),
            _lib: lib,
        })
    }
}

impl ProviderBinding for DylibBinding {
    fn protocol(&self) -> Option<String> {
        // SAFETY: entry point resolved at load time.
        let raw = unsafe { (self.get_protocol)() };
        if raw.is_null() {
            return None;
        }
        // SAFETY: non-null NUL-terminated narrow string per the ABI.
        let name = unsafe { std::ffi::CStr::from_ptr(raw) };
        let name = name.to_string_lossy().into_owned();
        (!name.is_empty()).then_some(name)
    }

    fn initialize_client(&self, config_dir: &str, plugins_dir: &str) -> Option<ClientHandle> {
        let config = encode_wide(config_dir)?;
        let plugins = encode_wide(plugins_dir)?;
        // SAFETY: both arguments are NUL-terminated UTF-16 buffers that
        // outlive the call.
        let raw = unsafe { (self.initialize_client)(config.as_ptr(), plugins.as_ptr()) };
        (!raw.is_null()).then(|| ClientHandle(raw))
    }

    fn terminate_client(&self, client: ClientHandle) {
        // SAFETY: `client` came from this binding's `initialize_client`.
        unsafe { (self.terminate_client)(client.0) }
    }

    fn open_file(&self, client: ClientHandle, path: &str) -> Option<FileHandle> {
        let path = encode_wide(path)?;
        // SAFETY: valid client and NUL-terminated UTF-16 path.
        let raw = unsafe { (self.open_file)(client.0, path.as_ptr()) };
        (!raw.is_null()).then(|| FileHandle(raw))
    }

    fn close_file(&self, file: FileHandle) {
        // SAFETY: `file` came from this binding's `open_file` and is closed
        // exactly once.
        unsafe { (self.close_file)(file.0) }
    }

    fn read_file(&self, file: FileHandle, buf: &mut [u8]) -> usize {
        // SAFETY: the provider writes at most `buf.len()` bytes into `buf`.
        let read = unsafe { (self.read_file)(file.0, buf.as_mut_ptr().cast(), buf.len() as u64) };
        read.min(buf.len() as u64) as usize
    }

    fn create_file_enumerator(&self, client: ClientHandle, path: &str) -> Option<EnumeratorHandle> {
        let path = encode_wide(path)?;
        // SAFETY: valid client and NUL-terminated UTF-16 path.
        let raw = unsafe { (self.create_file_enumerator)(client.0, path.as_ptr()) };
        (!raw.is_null()).then(|| EnumeratorHandle(raw))
    }

    fn file_enumerator_next(&self, enumerator: EnumeratorHandle) -> Option<String> {
        // SAFETY: valid enumerator from `create_file_enumerator`.
        let raw = unsafe { (self.file_enumerator_next)(enumerator.0) };
        if raw.is_null() {
            return None;
        }
        // SAFETY: non-null NUL-terminated UTF-16 string per the ABI, valid
        // until the next call on this enumerator.
        let name = unsafe { U16CStr::from_ptr_str(raw) };
        Some(name.to_string_lossy())
    }

    fn destroy_file_enumerator(&self, enumerator: EnumeratorHandle) {
        // SAFETY: valid enumerator, destroyed exactly once.
        unsafe { (self.destroy_file_enumerator)(enumerator.0) }
    }
}

fn encode_wide(s: &str) -> Option<U16CString> {
    U16CString::from_str(s).ok()
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/binding.rs"]
mod tests;
