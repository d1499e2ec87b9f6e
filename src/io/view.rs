//! Byte views over a Data Set payload.
//!
//! Offsets passed to [`ByteView::read_at`] are relative to the first payload
//! byte. Callers bounds-check rows and columns before reading, so a request
//! past the payload end is reported as an I/O error.

use std::{io, sync::Arc};

use memmap2::Mmap;
use tracing::{debug, trace, warn};

use super::source::Source;
use crate::{GenDataError, Result};

pub(crate) trait ByteView: Send {
    /// Returns `len` bytes starting `offset` bytes into the payload.
    fn read_at(&mut self, offset: u64, len: usize) -> Result<&[u8]>;

    /// Payload size in bytes.
    fn len(&self) -> u64;
}

fn check_span(offset: u64, len: usize, size: u64) -> Result<()> {
    match offset.checked_add(len as u64) {
        Some(end) if end <= size => Ok(()),
        _ => Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("read of {len} bytes at {offset} exceeds payload of {size} bytes"),
        )
        .into()),
    }
}

/// A window of the file mapped on demand and slid when a read falls outside it.
pub(crate) struct MappedView {
    source: Arc<Source>,
    data_start: u64,
    size: u64,
    max_window: usize,
    map: Option<Mmap>,
    map_start: u64,
}

impl MappedView {
    /// Fails with `UnexpectedEof` when the payload runs past the end of the file.
    pub fn new(source: Arc<Source>, data_start: u64, size: u64, max_window: usize) -> Result<Self> {
        match data_start.checked_add(size) {
            Some(end) if end <= source.len() => {}
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "payload of {size} bytes at {data_start} exceeds file of {} bytes",
                        source.len()
                    ),
                )
                .into())
            }
        }
        let mut view = Self {
            source,
            data_start,
            size,
            max_window,
            map: None,
            map_start: 0,
        };
        if size > 0 {
            let len = view.window_len(0, 1);
            view.remap(0, len)?;
        }
        Ok(view)
    }

    /// Length of a window starting at `offset` that covers at least `needed` bytes.
    fn window_len(&self, offset: u64, needed: usize) -> usize {
        let remaining = usize::try_from(self.size - offset).unwrap_or(usize::MAX);
        needed.max(remaining.min(self.max_window))
    }

    /// Replaces the current window. The old window stays in place if mapping fails.
    fn remap(&mut self, offset: u64, len: usize) -> Result<()> {
        let map = self
            .source
            .map(self.data_start + offset, len)
            .map_err(|source| {
                warn!(offset = self.data_start + offset, len, %source, "failed to map payload window");
                GenDataError::RemapFailure {
                    offset: self.data_start + offset,
                    len,
                    source,
                }
            })?;
        if self.map.is_some() {
            debug!(
                offset = self.data_start + offset,
                len, "remapped payload window"
            );
        } else {
            trace!(offset = self.data_start + offset, len, "mapped payload window");
        }
        self.map = Some(map);
        self.map_start = offset;
        Ok(())
    }

    fn covers(&self, offset: u64, len: usize) -> bool {
        match &self.map {
            Some(map) => {
                offset >= self.map_start && offset + len as u64 <= self.map_start + map.len() as u64
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn window(&self) -> (u64, usize) {
        (self.map_start, self.map.as_ref().map_or(0, |m| m.len()))
    }
}

impl ByteView for MappedView {
    fn read_at(&mut self, offset: u64, len: usize) -> Result<&[u8]> {
        check_span(offset, len, self.size)?;
        if len == 0 {
            return Ok(&[]);
        }
        if !self.covers(offset, len) {
            let window = self.window_len(offset, len);
            self.remap(offset, window)?;
        }
        match &self.map {
            Some(map) => {
                let start = (offset - self.map_start) as usize;
                Ok(&map[start..start + len])
            }
            None => Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
        }
    }

    fn len(&self) -> u64 {
        self.size
    }
}

/// The whole payload copied into memory.
pub(crate) struct BufferedView {
    buffer: Vec<u8>,
}

impl BufferedView {
    pub fn new(source: &Source, data_start: u64, size: u64) -> Result<Self> {
        let len = usize::try_from(size).map_err(|_| {
            io::Error::new(io::ErrorKind::OutOfMemory, "payload does not fit in memory")
        })?;
        let buffer = source.read_range(data_start, len)?;
        debug!(data_start, len, "loaded payload into buffer");
        Ok(Self { buffer })
    }
}

impl ByteView for BufferedView {
    fn read_at(&mut self, offset: u64, len: usize) -> Result<&[u8]> {
        check_span(offset, len, self.buffer.len() as u64)?;
        let start = offset as usize;
        Ok(&self.buffer[start..start + len])
    }

    fn len(&self) -> u64 {
        self.buffer.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source_with(bytes: &[u8]) -> (NamedTempFile, Arc<Source>) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        let source = Source::open(file.path()).unwrap();
        (file, source)
    }

    #[test]
    fn test_mapped_view_reads_within_window() {
        let bytes: Vec<u8> = (0..=255).collect();
        let (_file, source) = source_with(&bytes);

        let mut view = MappedView::new(source, 16, 64, usize::MAX).unwrap();
        assert_eq!(view.len(), 64);
        assert_eq!(view.window(), (0, 64));
        assert_eq!(view.read_at(0, 4).unwrap(), &[16, 17, 18, 19]);
        assert_eq!(view.read_at(60, 4).unwrap(), &[76, 77, 78, 79]);
    }

    #[test]
    fn test_mapped_view_slides_window() {
        let bytes: Vec<u8> = (0..=255).collect();
        let (_file, source) = source_with(&bytes);

        let mut view = MappedView::new(source, 0, 256, 8).unwrap();
        assert_eq!(view.window(), (0, 8));

        assert_eq!(view.read_at(100, 2).unwrap(), &[100, 101]);
        assert_eq!(view.window(), (100, 8));

        // request larger than the window limit still gets a covering window
        let span = view.read_at(200, 20).unwrap().to_vec();
        assert_eq!(span, (200..220).map(|b| b as u8).collect::<Vec<_>>());
        assert_eq!(view.window(), (200, 20));

        // window is clamped to the end of the payload
        assert_eq!(view.read_at(252, 4).unwrap(), &[252, 253, 254, 255]);
        assert_eq!(view.window(), (252, 4));
    }

    #[test]
    fn test_read_past_payload_fails() {
        let bytes = [0u8; 32];
        let (_file, source) = source_with(&bytes);

        let mut mapped = MappedView::new(source.clone(), 0, 16, usize::MAX).unwrap();
        assert!(matches!(mapped.read_at(14, 4), Err(GenDataError::Io(_))));

        let mut buffered = BufferedView::new(&source, 0, 16).unwrap();
        assert!(matches!(buffered.read_at(14, 4), Err(GenDataError::Io(_))));
        assert_eq!(buffered.read_at(12, 4).unwrap().len(), 4);
    }

    #[test]
    fn test_empty_payload_has_no_window() {
        let (_file, source) = source_with(&[1, 2, 3]);
        let mut view = MappedView::new(source, 3, 0, usize::MAX).unwrap();
        assert_eq!(view.window(), (0, 0));
        assert!(view.read_at(0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_payload_past_end_of_file_fails() {
        let (_file, source) = source_with(&[7u8; 20]);

        let err = MappedView::new(source.clone(), 16, 8, usize::MAX).err().unwrap();
        assert!(matches!(&err, GenDataError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof));
        let err = BufferedView::new(&source, 16, 8).err().unwrap();
        assert!(matches!(&err, GenDataError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof));

        // a payload ending exactly at the end of the file is fine
        let mut view = MappedView::new(source, 12, 8, usize::MAX).unwrap();
        assert_eq!(view.read_at(4, 4).unwrap(), &[7, 7, 7, 7]);
    }
}
