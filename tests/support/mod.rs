//! In-memory protocol provider used by integration tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use pictor::{
    ClientHandle, EnumeratorHandle, FileHandle, ProviderBinding, RawEnumerator, RawFile,
};

/// Shared observable state behind a [`MemProvider`].
#[derive(Default)]
pub struct MemState {
    pub files: HashMap<String, Vec<u8>>,
    pub dirs: HashMap<String, Vec<String>>,
    pub open_files: HashMap<usize, (String, usize)>,
    pub enumerators: HashMap<usize, (String, usize)>,
    pub closed_files: usize,
    pub destroyed_enumerators: usize,
    pub terminated: usize,
    pub next_token: usize,
}

impl MemState {
    fn token(&mut self) -> usize {
        self.next_token += 1;
        self.next_token
    }
}

/// Provider over an in-memory file tree; handles are small integer tokens
/// smuggled through the opaque pointer types.
pub struct MemProvider {
    pub scheme: &'static str,
    pub accept_client: bool,
    pub state: Rc<RefCell<MemState>>,
}

impl MemProvider {
    pub fn new(scheme: &'static str, state: Rc<RefCell<MemState>>) -> Self {
        Self {
            scheme,
            accept_client: true,
            state,
        }
    }
}

impl ProviderBinding for MemProvider {
    fn protocol(&self) -> Option<String> {
        Some(self.scheme.to_string())
    }

    fn initialize_client(&self, _config_dir: &str, _plugins_dir: &str) -> Option<ClientHandle> {
        self.accept_client
            .then(|| ClientHandle::from_raw(std::ptr::null_mut()))
    }

    fn terminate_client(&self, _client: ClientHandle) {
        self.state.borrow_mut().terminated += 1;
    }

    fn open_file(&self, _client: ClientHandle, path: &str) -> Option<FileHandle> {
        let mut state = self.state.borrow_mut();
        if !state.files.contains_key(path) {
            return None;
        }
        let token = state.token();
        state.open_files.insert(token, (path.to_string(), 0));
        Some(FileHandle::from_raw(token as *mut RawFile))
    }

    fn close_file(&self, file: FileHandle) {
        let mut state = self.state.borrow_mut();
        state.open_files.remove(&(file.as_raw() as usize));
        state.closed_files += 1;
    }

    fn read_file(&self, file: FileHandle, buf: &mut [u8]) -> usize {
        let mut state = self.state.borrow_mut();
        let token = file.as_raw() as usize;
        let Some((path, pos)) = state.open_files.get(&token).cloned() else {
            return 0;
        };
        let content = state.files.get(&path).cloned().unwrap_or_default();
        if pos >= content.len() {
            return 0;
        }
        let n = (content.len() - pos).min(buf.len());
        buf[..n].copy_from_slice(&content[pos..pos + n]);
        if let Some(entry) = state.open_files.get_mut(&token) {
            entry.1 = pos + n;
        }
        n
    }

    fn create_file_enumerator(&self, _client: ClientHandle, path: &str) -> Option<EnumeratorHandle> {
        let mut state = self.state.borrow_mut();
        if !state.dirs.contains_key(path) {
            return None;
        }
        let token = state.token();
        state.enumerators.insert(token, (path.to_string(), 0));
        Some(EnumeratorHandle::from_raw(token as *mut RawEnumerator))
    }

    fn file_enumerator_next(&self, enumerator: EnumeratorHandle) -> Option<String> {
        let mut state = self.state.borrow_mut();
        let token = enumerator.as_raw() as usize;
        let (path, index) = state.enumerators.get(&token).cloned()?;
        let name = state.dirs.get(&path)?.get(index).cloned()?;
        if let Some(entry) = state.enumerators.get_mut(&token) {
            entry.1 = index + 1;
        }
        Some(name)
    }

    fn destroy_file_enumerator(&self, enumerator: EnumeratorHandle) {
        let mut state = self.state.borrow_mut();
        state.enumerators.remove(&(enumerator.as_raw() as usize));
        state.destroyed_enumerators += 1;
    }
}
