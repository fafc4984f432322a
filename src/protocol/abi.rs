//! Entry-point ABI a protocol provider library must export.
//!
//! Every symbol is resolved by exact name at load time; a library missing
//! any of them never becomes routable. Wide strings are NUL-terminated
//! UTF-16, narrow strings NUL-terminated bytes. All calls are synchronous;
//! a hung provider blocks the calling thread.

use std::os::raw::{c_char, c_void};

#[repr(C)]
/// Opaque provider client instance.
pub struct RawClient {
    _opaque: [u8; 0],
}

#[repr(C)]
/// Opaque provider file handle.
pub struct RawFile {
    _opaque: [u8; 0],
}

#[repr(C)]
/// Opaque provider directory enumerator.
pub struct RawEnumerator {
    _opaque: [u8; 0],
}

/// `get_protocol`: scheme name as a NUL-terminated narrow string. Called
/// once after load.
pub type GetProtocolFn = unsafe extern "C" fn() -> *const c_char;

/// `initialize_client(config_dir, plugins_dir)`: null signals failure.
pub type InitializeClientFn = unsafe extern "C" fn(*const u16, *const u16) -> *mut RawClient;

/// `terminate_client`: called at most once, only after successful init.
pub type TerminateClientFn = unsafe extern "C" fn(*mut RawClient);

/// `open_file(client, path)`: null signals not-found/denied.
pub type OpenFileFn = unsafe extern "C" fn(*mut RawClient, *const u16) -> *mut RawFile;

/// `close_file`.
pub type CloseFileFn = unsafe extern "C" fn(*mut RawFile);

/// `read_file(file, buffer, max_len)`: bytes read; 0 is end-of-data.
pub type ReadFileFn = unsafe extern "C" fn(*mut RawFile, *mut c_void, u64) -> u64;

/// `create_file_enumerator(client, path)`: null signals not-found/denied.
pub type CreateFileEnumeratorFn =
    unsafe extern "C" fn(*mut RawClient, *const u16) -> *mut RawEnumerator;

/// `file_enumerator_next`: next name as a NUL-terminated UTF-16 string, or
/// null at the end of the sequence.
pub type FileEnumeratorNextFn = unsafe extern "C" fn(*mut RawEnumerator) -> *const u16;

/// `destroy_file_enumerator`.
pub type DestroyFileEnumeratorFn = unsafe extern "C" fn(*mut RawEnumerator);
