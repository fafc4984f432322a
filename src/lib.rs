//! Pictor is the scripting-facing backend of an image viewer.
//!
//! It has two halves:
//!
//! 1. **Bitmap store**: [`BitmapStore`] maps opaque integer [`Handle`]s to
//!    in-memory [`Bitmap`]s and drives callback-based row-major pixel
//!    traversal ([`BitmapStore::traverse`]) for script-side read/modify of
//!    pixel data.
//! 2. **Protocol host**: [`ProtocolRegistry`] routes `scheme://` URLs to
//!    [`ProtocolModule`]s (native plugin libraries implementing a custom
//!    virtual filesystem) and exposes their files as generic byte streams
//!    ([`ProtocolStream`]).
//!
//! The key design constraints:
//!
//! - **Synchronous by contract**: every operation runs inline on the calling
//!   thread. The store is `!Sync` and needs external locking for any
//!   cross-thread use; there is no internal background execution.
//! - **No half-loaded plugins**: a provider library either resolves every
//!   entry point and initializes its client, or its module is permanently
//!   inert and reports the recorded failure from every call.
//! - **Codec delegation**: pixel codecs are the `image` crate's job. This
//!   crate owns buffers, handles, traversal and the plugin ABI.
//!
//! Surrounding functionality (GUI widgets, animation playback, background
//! pixmap conversion) lives in the host application and talks to this crate
//! through [`BitmapStore`] and [`ProtocolRegistry`].
#![deny(missing_docs)]

mod bitmap;
mod foundation;
mod protocol;

pub use bitmap::op::{OP_RESULT_SLOTS, OpEncode, OpResult};
pub use bitmap::raster::{Bitmap, PixelLayout, PixelSlot, SaveOptions};
pub use bitmap::store::{BitmapStore, Handle};
pub use foundation::error::{PictorError, PictorResult};
pub use protocol::abi::{
    CloseFileFn, CreateFileEnumeratorFn, DestroyFileEnumeratorFn, FileEnumeratorNextFn,
    GetProtocolFn, InitializeClientFn, OpenFileFn, RawClient, RawEnumerator, RawFile, ReadFileFn,
    TerminateClientFn,
};
pub use protocol::binding::{
    ClientHandle, DylibBinding, EnumeratorHandle, FileHandle, LoadFailure, LoadResult,
    ProviderBinding,
};
pub use protocol::module::{ProtocolConfig, ProtocolModule};
pub use protocol::registry::{ProtocolRegistry, split_url};
pub use protocol::stream::ProtocolStream;
