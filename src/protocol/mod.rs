//! Native protocol plugins: custom virtual filesystems behind `scheme://`
//! URLs.

/// Entry-point ABI a provider library must export.
pub mod abi;
/// Deferred symbol binding and the provider capability trait.
pub mod binding;
/// One loaded provider: scheme, bound entry points, client instance.
pub mod module;
/// Scheme-to-module routing.
pub mod registry;
/// Byte-stream adapter over a provider file handle.
pub mod stream;
