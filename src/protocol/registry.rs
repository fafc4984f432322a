use std::collections::HashMap;
use std::path::Path;

use crate::foundation::error::{PictorError, PictorResult};
use crate::protocol::module::{ProtocolConfig, ProtocolModule};
use crate::protocol::stream::ProtocolStream;

/// Routes scheme-qualified paths to their protocol modules.
///
/// Modules are keyed by lowercased scheme, at most one per scheme. Failed
/// modules stay registered (inert) so routing reports their recorded
/// failure instead of pretending the scheme is unknown.
pub struct ProtocolRegistry {
    modules: HashMap<String, ProtocolModule>,
    // Failed before a scheme could be learned; kept for diagnostics.
    unrouted: Vec<ProtocolModule>,
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
            unrouted: Vec::new(),
        }
    }

    /// Construct one module per provider library found in
    /// `config.plugins_dir`.
    ///
    /// Libraries are loaded in path order. Modules that fail to load are
    /// retained rather than dropped; a missing or unreadable plugin
    /// directory yields an empty registry.
    #[tracing::instrument(skip(config), fields(plugins_dir = %config.plugins_dir.display()))]
    pub fn discover(config: &ProtocolConfig) -> Self {
        let mut registry = Self::new();
        let Ok(entries) = std::fs::read_dir(&config.plugins_dir) else {
            tracing::debug!("no protocol plugin directory");
            return registry;
        };
        let mut paths: Vec<_> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| is_plugin_library(path))
            .collect();
        paths.sort();
        for path in paths {
            registry.register(ProtocolModule::load(&path, config));
        }
        registry
    }

    /// Add `module` to the routing table.
    ///
    /// The first module for a scheme wins; a later module for the same
    /// scheme is dropped. A module whose scheme never became known is kept
    /// off the routing table but retained.
    pub fn register(&mut self, module: ProtocolModule) {
        match module.scheme() {
            Some(scheme) => {
                let key = scheme.to_ascii_lowercase();
                if self.modules.contains_key(&key) {
                    tracing::warn!(scheme = %key, "duplicate protocol module dropped");
                    return;
                }
                self.modules.insert(key, module);
            }
            None => self.unrouted.push(module),
        }
    }

    /// True if `candidate` starts with a `scheme://` prefix whose scheme
    /// matches a registered module (case-insensitive).
    pub fn is_url(&self, candidate: &str) -> bool {
        match split_url(candidate) {
            Some((scheme, _)) => self.modules.contains_key(&scheme.to_ascii_lowercase()),
            None => false,
        }
    }

    /// Module registered for `scheme`, if any.
    pub fn module(&self, scheme: &str) -> Option<&ProtocolModule> {
        self.modules.get(&scheme.to_ascii_lowercase())
    }

    /// Modules that failed before their scheme could be learned.
    pub fn unrouted(&self) -> &[ProtocolModule] {
        &self.unrouted
    }

    /// Open a scheme-qualified URL as a byte stream.
    ///
    /// The remainder of the path after `scheme://` is passed to the
    /// provider verbatim.
    pub fn open(&self, url: &str) -> PictorResult<ProtocolStream<'_>> {
        let (module, rest) = self.route(url)?;
        module.open(rest)
    }

    /// List the provider directory behind a scheme-qualified URL.
    pub fn enumerate(&self, url: &str) -> PictorResult<Vec<String>> {
        let (module, rest) = self.route(url)?;
        module.enumerate_directory(rest)
    }

    fn route<'a, 'u>(&'a self, url: &'u str) -> PictorResult<(&'a ProtocolModule, &'u str)> {
        let Some((scheme, rest)) = split_url(url) else {
            return Err(PictorError::unknown_scheme(url));
        };
        match self.modules.get(&scheme.to_ascii_lowercase()) {
            Some(module) => Ok((module, rest)),
            None => Err(PictorError::unknown_scheme(scheme)),
        }
    }
}

/// Split `scheme://rest` when the scheme is non-empty ASCII alphanumerics.
///
/// The rest of the path is not inspected. Returns `None` for anything that
/// is not a scheme-qualified URL.
pub fn split_url(candidate: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = candidate.split_once("://")?;
    if scheme.is_empty() || !scheme.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    Some((scheme, rest))
}

fn is_plugin_library(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    matches!(ext.to_ascii_lowercase().as_str(), "so" | "dll" | "dylib")
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/registry.rs"]
mod tests;
