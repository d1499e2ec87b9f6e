//! In-place updates of an existing generic data file.
//!
//! A parameter value is rewritten over its own blob, so the file layout and
//! every recorded offset stay valid. The new value must have the same type
//! and fit the bytes already on disk; text parameters written with a
//! reservation (see [`Parameter::text_reserved`]) leave room to grow.

use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::Path,
};

use tracing::debug;

use super::codec::ReadExt;
use crate::{FilePreamble, GenDataError, Parameter, Result, PREAMBLE_SIZE};

/// Where a parameter value blob sits in the file.
struct BlobSlot {
    pos: u64,
    len: usize,
    mime_type: String,
}

/// Rewrites parameters of the file-level generic header in place.
///
/// ```
/// # use gendata::{GenericData, GenericDataHeader, GenericFileUpdater, GenericFileWriter, Parameter};
/// # fn main() -> gendata::Result<()> {
/// # let file = tempfile::NamedTempFile::new()?;
/// let mut header = GenericDataHeader::new("affymetrix-calvin-intensity");
/// header.add_parameter(Parameter::text_reserved("affymetrix-array-type", "unknown", 32));
/// GenericFileWriter::from_path(file.path(), &header)?.finish()?;
///
/// let mut updater = GenericFileUpdater::open(file.path())?;
/// updater.update_parameter(&Parameter::text_reserved("affymetrix-array-type", "HG-U133A", 0))?;
///
/// let data = GenericData::open(file.path())?;
/// let params = &data.header().generic().parameters;
/// assert_eq!(params.get_text("affymetrix-array-type")?.as_deref(), Some("HG-U133A"));
/// # Ok(())
/// # }
/// ```
pub struct GenericFileUpdater<F: Read + Write + Seek> {
    inner: F,
}

impl GenericFileUpdater<File> {
    /// Opens an existing file for reading and writing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self::new(file))
    }
}

impl<F: Read + Write + Seek> GenericFileUpdater<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> F {
        self.inner
    }

    /// Overwrites the value of the first parameter named `param.name()`.
    ///
    /// The reservation of `param` is ignored; the value is padded to the
    /// length of the blob on disk instead.
    pub fn update_parameter(&mut self, param: &Parameter) -> Result<()> {
        let slot = self.locate(param.name())?;
        if slot.mime_type != param.mime_type() {
            return Err(GenDataError::ParameterMismatch {
                name: param.name().to_string(),
                requested: param.value().type_name(),
                actual: slot.mime_type,
            });
        }
        let mut blob = param.value().encode(0);
        if blob.len() > slot.len {
            return Err(GenDataError::ParameterExceedsReservation {
                name: param.name().to_string(),
                len: blob.len(),
                reserve: slot.len,
            });
        }
        blob.resize(slot.len, 0);

        self.inner.seek(SeekFrom::Start(slot.pos))?;
        self.inner.write_all(&blob)?;
        self.inner.flush()?;
        debug!(name = param.name(), pos = slot.pos, len = slot.len, "updated parameter");
        Ok(())
    }

    /// Walks the generic header up to the parameter named `name`.
    fn locate(&mut self, name: &str) -> Result<BlobSlot> {
        let reader = &mut self.inner;
        reader.seek(SeekFrom::Start(0))?;
        let mut buf = [0u8; PREAMBLE_SIZE];
        reader.read_exact(&mut buf)?;
        FilePreamble::from_bytes(&buf).validate()?;

        reader.read_string8()?;
        reader.read_string8()?;
        reader.read_string16()?;
        reader.read_string16()?;
        let count = reader.read_len()?;
        for _ in 0..count {
            let param_name = reader.read_string16()?;
            let len = reader.read_len()?;
            let pos = reader.stream_position()?;
            reader.seek(SeekFrom::Current(len as i64))?;
            let mime_type = reader.read_string16()?;
            if param_name == name {
                return Ok(BlobSlot {
                    pos,
                    len,
                    mime_type,
                });
            }
        }
        Err(GenDataError::ParameterNotFound(name.to_string()))
    }
}
