use super::*;

use std::cell::RefCell;
use std::rc::Rc;

use crate::protocol::binding::{EnumeratorHandle, FileHandle};

#[derive(Clone, Default)]
struct CallLog(Rc<RefCell<Vec<&'static str>>>);

impl CallLog {
    fn push(&self, call: &'static str) {
        self.0.borrow_mut().push(call);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.0.borrow().clone()
    }
}

struct ScriptedProvider {
    scheme: Option<&'static str>,
    accept_client: bool,
    names: Vec<&'static str>,
    cursor: RefCell<usize>,
    log: CallLog,
}

impl ScriptedProvider {
    fn new(scheme: Option<&'static str>, accept_client: bool, log: CallLog) -> Self {
        Self {
            scheme,
            accept_client,
            names: Vec::new(),
            cursor: RefCell::new(0),
            log,
        }
    }
}

impl ProviderBinding for ScriptedProvider {
    fn protocol(&self) -> Option<String> {
        self.log.push("get_protocol");
        self.scheme.map(str::to_string)
    }

    fn initialize_client(&self, _config_dir: &str, _plugins_dir: &str) -> Option<ClientHandle> {
        self.log.push("initialize_client");
        self.accept_client
            .then(|| ClientHandle::from_raw(std::ptr::null_mut()))
    }

    fn terminate_client(&self, _client: ClientHandle) {
        self.log.push("terminate_client");
    }

    fn open_file(&self, _client: ClientHandle, path: &str) -> Option<FileHandle> {
        self.log.push("open_file");
        (path != "missing").then(|| FileHandle::from_raw(std::ptr::null_mut()))
    }

    fn close_file(&self, _file: FileHandle) {
        self.log.push("close_file");
    }

    fn read_file(&self, _file: FileHandle, _buf: &mut [u8]) -> usize {
        self.log.push("read_file");
        0
    }

    fn create_file_enumerator(
        &self,
        _client: ClientHandle,
        path: &str,
    ) -> Option<EnumeratorHandle> {
        self.log.push("create_file_enumerator");
        (path != "missing").then(|| EnumeratorHandle::from_raw(std::ptr::null_mut()))
    }

    fn file_enumerator_next(&self, _enumerator: EnumeratorHandle) -> Option<String> {
        self.log.push("file_enumerator_next");
        let mut cursor = self.cursor.borrow_mut();
        let name = self.names.get(*cursor).map(|name| name.to_string());
        if name.is_some() {
            *cursor += 1;
        }
        name
    }

    fn destroy_file_enumerator(&self, _enumerator: EnumeratorHandle) {
        self.log.push("destroy_file_enumerator");
    }
}

fn test_config() -> ProtocolConfig {
    ProtocolConfig {
        config_dir: PathBuf::from("/tmp/pictor-config"),
        plugins_dir: PathBuf::from("/tmp/pictor-config/protocols"),
    }
}

#[test]
fn ready_module_runs_the_full_provider_lifecycle() {
    let log = CallLog::default();
    let mut provider = ScriptedProvider::new(Some("mem"), true, log.clone());
    provider.names = vec!["a.png", "b.png"];

    let module = ProtocolModule::with_binding(Box::new(provider), &test_config());
    assert!(module.ok());
    assert_eq!(module.scheme(), Some("mem"));
    assert!(module.failure().is_none());

    let names = module.enumerate_directory("dir").unwrap();
    assert_eq!(names, ["a.png", "b.png"]);

    let stream = module.open("a.png").unwrap();
    drop(stream);
    drop(module);

    assert_eq!(
        log.calls(),
        [
            "get_protocol",
            "initialize_client",
            "create_file_enumerator",
            "file_enumerator_next",
            "file_enumerator_next",
            "file_enumerator_next",
            "destroy_file_enumerator",
            "open_file",
            "close_file",
            "terminate_client",
        ]
    );
}

#[test]
fn provider_refusals_map_to_open_failed() {
    let module = ProtocolModule::with_binding(
        Box::new(ScriptedProvider::new(Some("mem"), true, CallLog::default())),
        &test_config(),
    );
    assert!(matches!(
        module.open("missing"),
        Err(PictorError::OpenFailed(_))
    ));
    assert!(matches!(
        module.enumerate_directory("missing"),
        Err(PictorError::OpenFailed(_))
    ));
}

#[test]
fn client_init_failure_keeps_the_scheme_and_fails_every_operation() {
    let log = CallLog::default();
    let module = ProtocolModule::with_binding(
        Box::new(ScriptedProvider::new(Some("dead"), false, log.clone())),
        &test_config(),
    );
    assert!(!module.ok());
    assert_eq!(module.scheme(), Some("dead"));
    assert!(matches!(module.failure(), Some(LoadFailure::ClientInit)));
    assert!(matches!(module.open("a"), Err(PictorError::ClientInit)));
    assert!(matches!(
        module.enumerate_directory("a"),
        Err(PictorError::ClientInit)
    ));

    drop(module);
    // Only the load-time probes ran; nothing ever touched the dead client.
    assert_eq!(log.calls(), ["get_protocol", "initialize_client"]);
}

#[test]
fn missing_protocol_name_fails_without_a_scheme() {
    let module = ProtocolModule::with_binding(
        Box::new(ScriptedProvider::new(None, true, CallLog::default())),
        &test_config(),
    );
    assert!(!module.ok());
    assert_eq!(module.scheme(), None);
    assert!(matches!(
        module.failure(),
        Some(LoadFailure::NoProtocolName)
    ));
}

#[test]
fn load_of_a_missing_library_is_an_inert_module() {
    let module = ProtocolModule::load(Path::new("/nonexistent/libnoproto.so"), &test_config());
    assert!(!module.ok());
    assert_eq!(module.scheme(), None);
    assert!(matches!(module.failure(), Some(LoadFailure::Library { .. })));
    assert!(matches!(module.open("x"), Err(PictorError::ModuleLoad(_))));
}
