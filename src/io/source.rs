use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
    sync::Arc,
};

use memmap2::{Mmap, MmapOptions};
use parking_lot::Mutex;
use tracing::trace;

use crate::Result;

/// The read-only file shared by every group and data set opened from it.
///
/// The handle is locked only while seeking and reading; mapped windows are
/// independent of the lock once created.
#[derive(Debug)]
pub(crate) struct Source {
    file: Mutex<File>,
    path: PathBuf,
    len: u64,
}

impl Source {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Arc<Self>> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let len = file.metadata()?.len();
        Ok(Arc::new(Self {
            file: Mutex::new(file),
            path,
            len,
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    /// Runs `f` with a buffered reader positioned at `pos`.
    pub fn with_reader<T>(
        &self,
        pos: u64,
        f: impl FnOnce(&mut BufReader<&File>) -> Result<T>,
    ) -> Result<T> {
        let guard = self.file.lock();
        let mut reader = BufReader::new(&*guard);
        reader.seek(SeekFrom::Start(pos))?;
        f(&mut reader)
    }

    /// Copies `len` bytes starting at `pos` into a new buffer.
    pub fn read_range(&self, pos: u64, len: usize) -> Result<Vec<u8>> {
        let mut guard = self.file.lock();
        guard.seek(SeekFrom::Start(pos))?;
        let mut buf = vec![0u8; len];
        guard.read_exact(&mut buf)?;
        trace!(pos, len, "buffered read");
        Ok(buf)
    }

    /// Maps `len` bytes starting at `offset`.
    pub fn map(&self, offset: u64, len: usize) -> std::io::Result<Mmap> {
        let guard = self.file.lock();
        // Safety: the file is opened read-only and treated as immutable for the session.
        unsafe { MmapOptions::new().offset(offset).len(len).map(&*guard) }
    }
}
