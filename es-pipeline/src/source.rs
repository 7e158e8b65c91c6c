use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{PlaybackError, Result};

/// Position-tracked view over the input.
///
/// The committed position only moves through [`ByteSource::commit`]; lookahead reads seek
/// the underlying reader freely and leave the committed position alone.
pub struct ByteSource<R> {
    inner: R,
    position: u64,
    aligned: bool,
}

impl ByteSource<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PlaybackError::FileNotFound(path.to_path_buf()),
            _ => PlaybackError::Io(e),
        })?;
        log::debug!("opened input {}", path.display());
        Ok(Self::new(file))
    }
}

impl<R: Read + Seek> ByteSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            position: 0,
            aligned: false,
        }
    }

    /// Committed cursor.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// True once the cursor has been committed to a start code.
    pub fn is_aligned(&self) -> bool {
        self.aligned
    }

    pub(crate) fn commit(&mut self, position: u64) {
        self.position = position;
        self.aligned = true;
    }

    /// Reads up to `max` bytes at `offset` into `buf`, replacing its contents.
    /// Returns fewer than `max` bytes only at end of input.
    pub fn peek_at(&mut self, offset: u64, max: usize, buf: &mut Vec<u8>) -> Result<usize> {
        buf.clear();
        buf.try_reserve_exact(max)
            .map_err(|_| PlaybackError::AllocationFailure { size: max })?;
        self.inner.seek(SeekFrom::Start(offset))?;
        let read = self.inner.by_ref().take(max as u64).read_to_end(buf)?;
        Ok(read)
    }

    /// Fills `buf` from `offset`. Short input is an I/O error.
    pub fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        self.inner.read_exact(buf)?;
        Ok(())
    }
}
