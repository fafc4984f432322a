use std::fmt;
use std::io;

use crate::protocol::binding::{FileHandle, ProviderBinding};

/// Sequential read-only byte stream over one provider file handle.
///
/// Borrows the module that produced it, so the stream cannot outlive the
/// module. Dropping the stream closes the provider file.
pub struct ProtocolStream<'m> {
    binding: &'m dyn ProviderBinding,
    file: FileHandle,
}

impl<'m> ProtocolStream<'m> {
    pub(crate) fn new(binding: &'m dyn ProviderBinding, file: FileHandle) -> Self {
        Self { binding, file }
    }
}

impl fmt::Debug for ProtocolStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolStream")
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

impl io::Read for ProtocolStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.binding.read_file(self.file, buf))
    }
}

// Providers are read-only; writes report zero bytes written instead of
// erroring.
impl io::Write for ProtocolStream<'_> {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Ok(0)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ProtocolStream<'_> {
    fn drop(&mut self) {
        self.binding.close_file(self.file);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/stream.rs"]
mod tests;
