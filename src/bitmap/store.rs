use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    path::Path,
    rc::Rc,
};

use crate::bitmap::raster::{Bitmap, PixelSlot, SaveOptions};
use crate::foundation::error::{PictorError, PictorResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Opaque integer identifying one store entry.
///
/// Stable until explicit unload and never reissued afterwards, so a stale
/// handle can never alias a newer bitmap.
pub struct Handle(i32);

impl Handle {
    /// Construct a [`Handle`] from its raw scripting-side integer.
    pub fn from_i32(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw scripting-side integer.
    pub fn as_i32(self) -> i32 {
        self.0
    }
}

/// Registry mapping handles to bitmaps; owns their lifecycle.
///
/// Interior mutability lets a running traversal callback re-enter the same
/// store: query other handles, load or unload entries, or start a nested
/// traversal of a different handle. The store has no internal
/// synchronization and is `!Sync`; cross-thread use requires external
/// locking.
#[derive(Debug)]
pub struct BitmapStore {
    entries: RefCell<HashMap<Handle, Rc<RefCell<Bitmap>>>>,
    next_handle: Cell<i32>,
}

impl Default for BitmapStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BitmapStore {
    /// Create an empty store. The first issued handle is 1.
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            next_handle: Cell::new(1),
        }
    }

    fn insert(&self, bitmap: Bitmap) -> Handle {
        let handle = Handle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        self.entries
            .borrow_mut()
            .insert(handle, Rc::new(RefCell::new(bitmap)));
        handle
    }

    fn entry(&self, handle: Handle) -> PictorResult<Rc<RefCell<Bitmap>>> {
        self.entries
            .borrow()
            .get(&handle)
            .cloned()
            .ok_or(PictorError::HandleNotFound(handle.0))
    }

    /// Decode the image at `path` and store it under a fresh handle.
    pub fn load(&self, path: impl AsRef<Path>) -> PictorResult<Handle> {
        Ok(self.insert(Bitmap::load(path)?))
    }

    /// Store a blank bitmap under a fresh handle.
    ///
    /// Dimensions are validated before any construction happens.
    pub fn allocate(&self, width: u32, height: u32) -> PictorResult<Handle> {
        Ok(self.insert(Bitmap::allocate(width, height)?))
    }

    /// Wrap an already-decoded image without re-decoding it.
    pub fn adopt(&self, decoded: image::DynamicImage) -> Handle {
        self.insert(Bitmap::from_decoded(decoded))
    }

    /// Remove and destroy the bitmap behind `handle`.
    ///
    /// The handle value is never reissued. A traversal running on the
    /// entry keeps the pixel buffer alive until it returns.
    pub fn unload(&self, handle: Handle) -> PictorResult<()> {
        match self.entries.borrow_mut().remove(&handle) {
            Some(_) => Ok(()),
            None => Err(PictorError::HandleNotFound(handle.0)),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// True when no entries are live.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Channel values of the pixel at `(x, y)` in the bitmap behind
    /// `handle`.
    pub fn get_pixel(&self, handle: Handle, x: u32, y: u32) -> PictorResult<[u8; 4]> {
        let entry = self.entry(handle)?;
        let mut bitmap = entry
            .try_borrow_mut()
            .map_err(|_| PictorError::TraversalInProgress(handle.0))?;
        bitmap.get_pixel(x, y)
    }

    /// Width and height of the bitmap behind `handle`.
    pub fn dimensions(&self, handle: Handle) -> PictorResult<(u32, u32)> {
        let entry = self.entry(handle)?;
        let bitmap = entry
            .try_borrow()
            .map_err(|_| PictorError::TraversalInProgress(handle.0))?;
        Ok(bitmap.dimensions())
    }

    /// Encode the bitmap behind `handle` to `path`.
    pub fn save(
        &self,
        handle: Handle,
        path: impl AsRef<Path>,
        options: &SaveOptions,
    ) -> PictorResult<()> {
        let entry = self.entry(handle)?;
        let mut bitmap = entry
            .try_borrow_mut()
            .map_err(|_| PictorError::TraversalInProgress(handle.0))?;
        bitmap.save(path, options)
    }

    /// Row-major pixel traversal of the bitmap behind `handle`.
    ///
    /// The callback receives a mutable [`PixelSlot`] for the exposed pixel
    /// followed by its channel values and coordinates, and may re-enter
    /// this store, including nested traversals of other handles. A nested
    /// traversal of the same handle fails with
    /// [`PictorError::TraversalInProgress`] instead of aliasing the buffer
    /// under the outer pass.
    pub fn traverse<F>(&self, handle: Handle, cb: F) -> PictorResult<()>
    where
        F: FnMut(&mut PixelSlot<'_>, u8, u8, u8, u8, u32, u32),
    {
        let entry = self.entry(handle)?;
        let mut bitmap = entry
            .try_borrow_mut()
            .map_err(|_| PictorError::TraversalInProgress(handle.0))?;
        bitmap.traverse(cb);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/store.rs"]
mod tests;
