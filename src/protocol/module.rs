use std::path::{Path, PathBuf};

use crate::foundation::error::{PictorError, PictorResult};
use crate::protocol::binding::{
    ClientHandle, DylibBinding, LoadFailure, LoadResult, ProviderBinding,
};
use crate::protocol::stream::ProtocolStream;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Directory layout handed to every provider's `initialize_client`.
pub struct ProtocolConfig {
    /// Host configuration directory.
    pub config_dir: PathBuf,
    /// Directory scanned for provider libraries.
    pub plugins_dir: PathBuf,
}

/// One loaded protocol provider: scheme name, bound entry points and the
/// provider client instance.
///
/// Construction drives the provider through `Loading` synchronously and
/// ends `Ready` or permanently `Failed`; a failed module is inert and
/// reports its recorded failure from every operation. There is no retry
/// transition.
pub struct ProtocolModule {
    state: ModuleState,
}

enum ModuleState {
    Ready(ReadyModule),
    Failed {
        // Known when the provider got far enough to report it.
        scheme: Option<String>,
        failure: LoadFailure,
    },
}

struct ReadyModule {
    scheme: String,
    binding: Box<dyn ProviderBinding>,
    client: ClientHandle,
}

impl ProtocolModule {
    /// Load a provider library and drive it to `Ready` or `Failed`.
    ///
    /// Never panics and never errors out of construction: a library that
    /// fails to load, resolve its entry points or initialize its client
    /// produces an inert module carrying the failure.
    #[tracing::instrument(skip(config))]
    pub fn load(library_path: &Path, config: &ProtocolConfig) -> Self {
        match DylibBinding::load(library_path) {
            LoadResult::Ready(binding) => Self::with_binding(Box::new(binding), config),
            LoadResult::Failed(failure) => {
                tracing::warn!(path = %library_path.display(), %failure, "protocol module failed to load");
                Self {
                    state: ModuleState::Failed {
                        scheme: None,
                        failure,
                    },
                }
            }
        }
    }

    /// Drive an already-bound provider to `Ready` or `Failed`.
    ///
    /// This is the seam for in-process providers (embedders, tests); native
    /// libraries go through [`ProtocolModule::load`].
    pub fn with_binding(binding: Box<dyn ProviderBinding>, config: &ProtocolConfig) -> Self {
        let Some(scheme) = binding.protocol() else {
            return Self {
                state: ModuleState::Failed {
                    scheme: None,
                    failure: LoadFailure::NoProtocolName,
                },
            };
        };
        let config_dir = config.config_dir.to_string_lossy();
        let plugins_dir = config.plugins_dir.to_string_lossy();
        let Some(client) = binding.initialize_client(&config_dir, &plugins_dir) else {
            tracing::warn!(%scheme, "provider client initialization failed");
            return Self {
                state: ModuleState::Failed {
                    scheme: Some(scheme),
                    failure: LoadFailure::ClientInit,
                },
            };
        };
        tracing::debug!(%scheme, "protocol module ready");
        Self {
            state: ModuleState::Ready(ReadyModule {
                scheme,
                binding,
                client,
            }),
        }
    }

    /// True only if the library loaded, every entry point resolved and the
    /// client initialized.
    pub fn ok(&self) -> bool {
        matches!(self.state, ModuleState::Ready(_))
    }

    /// Scheme this module services, when it got far enough to learn it.
    pub fn scheme(&self) -> Option<&str> {
        match &self.state {
            ModuleState::Ready(ready) => Some(&ready.scheme),
            ModuleState::Failed { scheme, .. } => scheme.as_deref(),
        }
    }

    /// The recorded failure, if the module is inert.
    pub fn failure(&self) -> Option<&LoadFailure> {
        match &self.state {
            ModuleState::Ready(_) => None,
            ModuleState::Failed { failure, .. } => Some(failure),
        }
    }

    fn ready(&self) -> PictorResult<&ReadyModule> {
        match &self.state {
            ModuleState::Ready(ready) => Ok(ready),
            ModuleState::Failed { failure, .. } => Err(failure.to_error()),
        }
    }

    /// Open `path` through the provider and wrap the returned file handle
    /// as a byte stream.
    ///
    /// The stream borrows this module, so it must be dropped before the
    /// module is; the borrow checker enforces the teardown order.
    pub fn open(&self, path: &str) -> PictorResult<ProtocolStream<'_>> {
        let ready = self.ready()?;
        let file = ready
            .binding
            .open_file(ready.client, path)
            .ok_or_else(|| PictorError::open_failed(path))?;
        Ok(ProtocolStream::new(&*ready.binding, file))
    }

    /// Eagerly collect the names in the provider directory at `path`.
    ///
    /// The provider-side enumerator is destroyed before returning, on
    /// every path out.
    pub fn enumerate_directory(&self, path: &str) -> PictorResult<Vec<String>> {
        let ready = self.ready()?;
        let enumerator = ready
            .binding
            .create_file_enumerator(ready.client, path)
            .ok_or_else(|| PictorError::open_failed(path))?;
        let mut names = Vec::new();
        while let Some(name) = ready.binding.file_enumerator_next(enumerator) {
            names.push(name);
        }
        ready.binding.destroy_file_enumerator(enumerator);
        Ok(names)
    }
}

impl Drop for ProtocolModule {
    fn drop(&mut self) {
        if let ModuleState::Ready(ready) = &self.state {
            // Terminate the client while the library is still mapped; the
            // binding (and with it the library handle) drops afterwards.
            ready.binding.terminate_client(ready.client);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/module.rs"]
mod tests;
