//! Two-pass writers for generic data files.
//!
//! Header fields that depend on bytes not yet written (the first group, a
//! group's first Data Set, each Data Set's payload start, every "next" offset
//! and the counts) are written as zeroed [`Placeholder`]s and patched once the
//! value is known. Patching seeks to the placeholder, rewrites its four bytes
//! and seeks back to the main cursor, so appending always resumes where it
//! left off.
//!
//! The writers borrow each other: a [`DataGroupWriter`] borrows the
//! [`GenericFileWriter`] and a [`DataSetWriter`] borrows its group, so only one
//! group and one Data Set can be in progress at a time. A child that is
//! dropped without `finish` leaves its placeholders unpatched, so the parent
//! refuses to begin another child or finish itself
//! ([`GenDataError::UnfinishedWriter`]).

use std::{
    fs::File,
    io::{self, BufWriter, Read, Seek, SeekFrom, Write},
    path::Path,
};

use byteorder::{BigEndian, WriteBytesExt};
use tracing::{debug, trace};

use super::{
    codec::{encode_utf16_be, WriteExt},
    data_set::CellValue,
};
use crate::{
    ColumnType, DataSetHeader, FilePreamble, GenDataError, GenericDataHeader, Result,
};

/// A 4-byte field written as zero and patched later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    pos: u64,
}

impl Placeholder {
    /// Absolute file position of the field.
    pub fn position(&self) -> u64 {
        self.pos
    }
}

/// The main append cursor over the output stream.
pub(crate) struct Emitter<W: Write + Seek> {
    inner: W,
    pos: u64,
}

impl<W: Write + Seek> Emitter<W> {
    fn new(mut inner: W) -> Result<Self> {
        let pos = inner.stream_position()?;
        Ok(Self { inner, pos })
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    /// The main cursor as a 32-bit file offset.
    pub fn offset(&self) -> Result<u32> {
        to_offset(self.pos)
    }

    pub fn reserve(&mut self) -> Result<Placeholder> {
        let slot = Placeholder { pos: self.pos };
        self.write_u32::<BigEndian>(0)?;
        Ok(slot)
    }

    pub fn patch(&mut self, slot: Placeholder, value: u32) -> Result<()> {
        trace!(pos = slot.pos, value, "patching placeholder");
        self.overwrite(slot.pos, &value.to_be_bytes())
    }

    /// Writes `bytes` at an earlier position and returns to the main cursor.
    pub fn overwrite(&mut self, pos: u64, bytes: &[u8]) -> Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        self.inner.write_all(bytes)?;
        self.inner.seek(SeekFrom::Start(self.pos))?;
        Ok(())
    }

    pub fn write_zeros(&mut self, len: u64) -> Result<()> {
        io::copy(&mut io::repeat(0).take(len), self)?;
        Ok(())
    }
}

impl<W: Write + Seek> Write for Emitter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

pub(crate) fn to_offset(pos: u64) -> Result<u32> {
    u32::try_from(pos).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("file position {pos} exceeds the 32-bit offset range"),
        )
        .into()
    })
}

fn write_generic_header<W: Write>(out: &mut W, header: &GenericDataHeader) -> Result<()> {
    out.write_string8(&header.file_type_id)?;
    out.write_string8(&header.file_id)?;
    out.write_string16(&header.creation_time)?;
    out.write_string16(&header.locale)?;
    out.write_parameters(&header.parameters)?;
    out.write_len(header.parents.len())?;
    header
        .parents
        .iter()
        .try_for_each(|parent| write_generic_header(out, parent))
}

/// Writes the file preamble and generic header, then Data Groups one at a time.
///
/// # Examples
///
/// ```rust
/// use gendata::{ColumnDescriptor, DataSetHeader, GenericDataHeader, GenericFileWriter};
/// use std::io::Cursor;
///
/// # fn main() -> gendata::Result<()> {
/// let header = GenericDataHeader::new("affymetrix-calvin-intensity");
/// let mut writer = GenericFileWriter::new(Cursor::new(Vec::new()), &header)?;
///
/// let mut group = writer.begin_group("Default Group")?;
/// let set_header = DataSetHeader::new("Intensity", 2).with_column(ColumnDescriptor::float("Mean"));
/// let mut set = group.begin_data_set(&set_header)?;
/// set.write_f32(101.5)?;
/// set.write_f32(98.25)?;
/// set.finish()?;
/// group.finish()?;
///
/// let bytes = writer.finish()?.into_inner();
/// assert_eq!(bytes[0], 59);
/// # Ok(())
/// # }
/// ```
pub struct GenericFileWriter<W: Write + Seek> {
    pub(crate) out: Emitter<W>,
    group_count_slot: Placeholder,
    first_group_slot: Placeholder,
    groups_begun: u32,
    open_group: Option<String>,
}

impl GenericFileWriter<BufWriter<File>> {
    /// Creates (or truncates) the file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P, header: &GenericDataHeader) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), header)
    }
}

impl<W: Write + Seek> GenericFileWriter<W> {
    pub fn new(inner: W, header: &GenericDataHeader) -> Result<Self> {
        let mut out = Emitter::new(inner)?;
        let start = out.position();
        out.write_all(FilePreamble::new(0, 0).as_bytes())?;
        let group_count_slot = Placeholder { pos: start + 2 };
        let first_group_slot = Placeholder { pos: start + 6 };
        write_generic_header(&mut out, header)?;
        debug!(
            file_type = %header.file_type_id,
            header_end = out.position(),
            "wrote generic header"
        );
        Ok(Self {
            out,
            group_count_slot,
            first_group_slot,
            groups_begun: 0,
            open_group: None,
        })
    }

    /// Current position of the main append cursor.
    pub fn position(&self) -> u64 {
        self.out.position()
    }

    pub fn groups_written(&self) -> u32 {
        self.groups_begun
    }

    /// Fails if a previously begun group was never finished.
    pub(crate) fn ensure_idle(&self) -> Result<()> {
        match &self.open_group {
            Some(name) => Err(GenDataError::UnfinishedWriter(name.clone())),
            None => Ok(()),
        }
    }

    /// Starts a new Data Group at the main cursor.
    ///
    /// The returned writer must be finished before the next group begins.
    pub fn begin_group(&mut self, name: &str) -> Result<DataGroupWriter<'_, W>> {
        self.ensure_idle()?;
        if self.groups_begun == 0 {
            let pos = self.out.offset()?;
            self.out.patch(self.first_group_slot, pos)?;
        }
        self.groups_begun += 1;
        DataGroupWriter::begin(self, name)
    }

    /// Patches the group count, flushes and returns the underlying stream.
    pub fn finish(mut self) -> Result<W> {
        self.ensure_idle()?;
        if self.groups_begun == 0 {
            let pos = self.out.offset()?;
            self.out.patch(self.first_group_slot, pos)?;
        }
        self.out.patch(self.group_count_slot, self.groups_begun)?;
        self.out.flush()?;
        debug!(
            groups = self.groups_begun,
            bytes = self.out.position(),
            "finished generic data file"
        );
        Ok(self.out.inner)
    }
}

/// Writes one Data Group header followed by its Data Sets.
pub struct DataGroupWriter<'a, W: Write + Seek> {
    file: &'a mut GenericFileWriter<W>,
    name: String,
    next_group_slot: Placeholder,
    first_set_slot: Placeholder,
    set_count_slot: Placeholder,
    sets_begun: u32,
    open_set: Option<String>,
}

impl<'a, W: Write + Seek> DataGroupWriter<'a, W> {
    fn begin(file: &'a mut GenericFileWriter<W>, name: &str) -> Result<Self> {
        let out = &mut file.out;
        let next_group_slot = out.reserve()?;
        let first_set_slot = out.reserve()?;
        let set_count_slot = out.reserve()?;
        out.write_string16(name)?;
        file.open_group = Some(name.to_string());
        Ok(Self {
            file,
            name: name.to_string(),
            next_group_slot,
            first_set_slot,
            set_count_slot,
            sets_begun: 0,
            open_set: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn ensure_idle(&self) -> Result<()> {
        match &self.open_set {
            Some(name) => Err(GenDataError::UnfinishedWriter(format!("{}/{}", self.name, name))),
            None => Ok(()),
        }
    }

    /// Starts a Data Set described by `header` at the main cursor.
    ///
    /// The previous Data Set must have been finished.
    pub fn begin_data_set(&mut self, header: &DataSetHeader) -> Result<DataSetWriter<'_, 'a, W>> {
        self.ensure_idle()?;
        if self.sets_begun == 0 {
            let pos = self.file.out.offset()?;
            self.file.out.patch(self.first_set_slot, pos)?;
        }
        self.sets_begun += 1;
        DataSetWriter::begin(self, header)
    }

    /// Patches the Data Set count and the next-group offset.
    pub fn finish(self) -> Result<()> {
        self.ensure_idle()?;
        let out = &mut self.file.out;
        let end = out.offset()?;
        if self.sets_begun == 0 {
            out.patch(self.first_set_slot, end)?;
        }
        out.patch(self.set_count_slot, self.sets_begun)?;
        out.patch(self.next_group_slot, end)?;
        trace!(name = %self.name, sets = self.sets_begun, end, "finished data group");
        self.file.open_group = None;
        Ok(())
    }
}

/// Writes one Data Set header and its payload, cell by cell in row-major order.
///
/// Each typed writer checks the value against the declared type of the next
/// column. Text values must fit the column reservation and are zero padded.
pub struct DataSetWriter<'g, 'a, W: Write + Seek> {
    group: &'g mut DataGroupWriter<'a, W>,
    header: DataSetHeader,
    next_set_slot: Placeholder,
    col: usize,
    rows_written: u32,
}

impl<'g, 'a, W: Write + Seek> DataSetWriter<'g, 'a, W> {
    fn begin(group: &'g mut DataGroupWriter<'a, W>, header: &DataSetHeader) -> Result<Self> {
        let out = &mut group.file.out;
        let data_start_slot = out.reserve()?;
        let next_set_slot = out.reserve()?;
        out.write_string16(header.name())?;
        out.write_parameters(header.parameters())?;
        out.write_u32::<BigEndian>(header.column_count() as u32)?;
        for column in header.columns() {
            out.write_string16(column.name())?;
            out.write_u8(column.column_type().tag())?;
            out.write_i32::<BigEndian>(column.width() as i32)?;
        }
        out.write_i32::<BigEndian>(header.row_count() as i32)?;
        let data_start = out.offset()?;
        out.patch(data_start_slot, data_start)?;
        group.open_set = Some(header.name().to_string());
        Ok(Self {
            group,
            header: header.clone(),
            next_set_slot,
            col: 0,
            rows_written: 0,
        })
    }

    fn out(&mut self) -> &mut Emitter<W> {
        &mut self.group.file.out
    }

    pub fn header(&self) -> &DataSetHeader {
        &self.header
    }

    /// Number of complete rows written so far.
    pub fn rows_written(&self) -> u32 {
        self.rows_written
    }

    /// Checks the next cell against `requested` and returns its text reservation.
    fn expect(&self, requested: ColumnType) -> Result<u32> {
        if self.rows_written >= self.header.row_count() {
            return Err(GenDataError::RowIndexOutOfBounds {
                row: self.rows_written as usize,
                max: self.header.row_count() as usize,
            });
        }
        let column = self
            .header
            .column(self.col)
            .ok_or(GenDataError::ColumnIndexOutOfBounds {
                col: self.col,
                max: self.header.column_count(),
            })?;
        if column.column_type() != requested {
            return Err(GenDataError::UnexpectedColumnType {
                col: self.col,
                requested,
                declared: column.column_type(),
            });
        }
        Ok(column.reserve())
    }

    fn advance(&mut self) {
        self.col += 1;
        if self.col == self.header.column_count() {
            self.col = 0;
            self.rows_written += 1;
        }
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.expect(ColumnType::Int8)?;
        self.out().write_i8(value)?;
        self.advance();
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.expect(ColumnType::UInt8)?;
        self.out().write_u8(value)?;
        self.advance();
        Ok(())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.expect(ColumnType::Int16)?;
        self.out().write_i16::<BigEndian>(value)?;
        self.advance();
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.expect(ColumnType::UInt16)?;
        self.out().write_u16::<BigEndian>(value)?;
        self.advance();
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.expect(ColumnType::Int32)?;
        self.out().write_i32::<BigEndian>(value)?;
        self.advance();
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.expect(ColumnType::UInt32)?;
        self.out().write_u32::<BigEndian>(value)?;
        self.advance();
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.expect(ColumnType::Float)?;
        self.out().write_f32::<BigEndian>(value)?;
        self.advance();
        Ok(())
    }

    pub fn write_ascii(&mut self, value: &str) -> Result<()> {
        let reserve = self.expect(ColumnType::Ascii)?;
        let bytes = value.as_bytes();
        self.write_text_cell(bytes, bytes.len(), reserve as usize)
    }

    pub fn write_text(&mut self, value: &str) -> Result<()> {
        let reserve = self.expect(ColumnType::Text)?;
        let bytes = encode_utf16_be(value);
        let len = bytes.len() / 2;
        self.write_text_cell(&bytes, len, 2 * reserve as usize)
    }

    /// Writes `[len][bytes][padding]` filling `room` bytes after the prefix.
    fn write_text_cell(&mut self, bytes: &[u8], len: usize, room: usize) -> Result<()> {
        if bytes.len() > room {
            let reserve = self.header.column(self.col).map_or(0, |c| c.reserve());
            return Err(GenDataError::ValueExceedsReservation {
                col: self.col,
                len,
                reserve,
            });
        }
        let out = self.out();
        out.write_u32::<BigEndian>(len as u32)?;
        out.write_all(bytes)?;
        out.write_zeros((room - bytes.len()) as u64)?;
        self.advance();
        Ok(())
    }

    /// Writes one cell of any type.
    pub fn write_cell(&mut self, value: &CellValue) -> Result<()> {
        match value {
            CellValue::Int8(v) => self.write_i8(*v),
            CellValue::UInt8(v) => self.write_u8(*v),
            CellValue::Int16(v) => self.write_i16(*v),
            CellValue::UInt16(v) => self.write_u16(*v),
            CellValue::Int32(v) => self.write_i32(*v),
            CellValue::UInt32(v) => self.write_u32(*v),
            CellValue::Float(v) => self.write_f32(*v),
            CellValue::Ascii(v) => self.write_ascii(v),
            CellValue::Text(v) => self.write_text(v),
        }
    }

    /// Writes the given cells in order, continuing from the current column.
    pub fn write_row(&mut self, cells: &[CellValue]) -> Result<()> {
        cells.iter().try_for_each(|cell| self.write_cell(cell))
    }

    /// Fills `rows` complete rows with zeros and returns the position of the first.
    pub(crate) fn write_zeroed_rows(&mut self, rows: u32) -> Result<u64> {
        let start = self.out().position();
        let len = self.header.row_size() * rows as u64;
        self.out().write_zeros(len)?;
        self.rows_written += rows;
        Ok(start)
    }

    /// Checks that every declared row was written and patches the next-set offset.
    pub fn finish(mut self) -> Result<()> {
        let complete = self.header.column_count() == 0
            || (self.col == 0 && self.rows_written == self.header.row_count());
        if !complete {
            return Err(GenDataError::RowCountMismatch {
                name: self.header.name().to_string(),
                expected: self.header.row_count(),
                actual: self.rows_written,
            });
        }
        let next_set_slot = self.next_set_slot;
        let out = self.out();
        let end = out.offset()?;
        out.patch(next_set_slot, end)?;
        trace!(name = self.header.name(), rows = self.rows_written, end, "finished data set");
        self.group.open_set = None;
        Ok(())
    }
}
