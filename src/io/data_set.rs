//! Typed, bounds-checked access to one Data Set payload.

use std::sync::Arc;

use byteorder::{BigEndian, ByteOrder};
use tracing::trace;

use super::{
    codec::decode_utf16_be,
    source::Source,
    view::{BufferedView, ByteView, MappedView},
};
use crate::{Backing, ColumnType, DataSetHeader, GenDataError, Result, TEXT_LEN_PREFIX};

/// A fixed-width numeric type that can be read from a column.
///
/// Implemented for `i8`, `u8`, `i16`, `u16`, `i32`, `u32` and `f32`, matching
/// the numeric [`ColumnType`] variants one to one.
pub trait ColumnValue: Copy + Send + 'static {
    /// Column type this value is stored as.
    const COLUMN_TYPE: ColumnType;

    /// Decodes a big-endian cell.
    fn from_be_bytes(bytes: &[u8]) -> Self;
}

macro_rules! column_value {
    ($ty:ty, $variant:ident, $read:expr) => {
        impl ColumnValue for $ty {
            const COLUMN_TYPE: ColumnType = ColumnType::$variant;

            fn from_be_bytes(bytes: &[u8]) -> Self {
                $read(bytes)
            }
        }
    };
}

column_value!(i8, Int8, |b: &[u8]| b[0] as i8);
column_value!(u8, UInt8, |b: &[u8]| b[0]);
column_value!(i16, Int16, BigEndian::read_i16);
column_value!(u16, UInt16, BigEndian::read_u16);
column_value!(i32, Int32, BigEndian::read_i32);
column_value!(u32, UInt32, BigEndian::read_u32);
column_value!(f32, Float, BigEndian::read_f32);

/// A cell value of any column type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Float(f32),
    Ascii(String),
    Text(String),
}

impl CellValue {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Int8(_) => ColumnType::Int8,
            Self::UInt8(_) => ColumnType::UInt8,
            Self::Int16(_) => ColumnType::Int16,
            Self::UInt16(_) => ColumnType::UInt16,
            Self::Int32(_) => ColumnType::Int32,
            Self::UInt32(_) => ColumnType::UInt32,
            Self::Float(_) => ColumnType::Float,
            Self::Ascii(_) => ColumnType::Ascii,
            Self::Text(_) => ColumnType::Text,
        }
    }
}

/// How a closed Data Set reopens its view.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ViewSettings {
    pub backing: Backing,
    pub max_window: usize,
}

/// An open (or closed) Data Set.
///
/// Every getter checks, in order, that the Data Set is open, that the column
/// exists, that the row exists and that the column has the requested type.
/// Reads take `&mut self` because a mapped view may slide its window; use
/// [`DataSet::fork`] to read the same payload from another thread.
///
/// # Examples
///
/// ```rust,no_run
/// use gendata::GenericData;
///
/// # fn main() -> gendata::Result<()> {
/// let data = GenericData::open("sample.cel")?;
/// let mut intensities = data.data_set_by_name("Default Group", "Intensity")?;
/// let first: f32 = intensities.get_f32(0, 0)?;
/// let column = intensities.get_f32_range(0, 0, intensities.rows())?;
/// assert_eq!(column[0], first);
/// # Ok(())
/// # }
/// ```
pub struct DataSet {
    source: Arc<Source>,
    header: DataSetHeader,
    settings: ViewSettings,
    column_offsets: Vec<u64>,
    row_size: u64,
    view: Option<Box<dyn ByteView>>,
}

impl DataSet {
    pub(crate) fn new(source: Arc<Source>, header: DataSetHeader, settings: ViewSettings) -> Self {
        let column_offsets = header.column_offsets();
        let row_size = header.row_size();
        Self {
            source,
            header,
            settings,
            column_offsets,
            row_size,
            view: None,
        }
    }

    /// Opens the payload view. Opening an open Data Set does nothing.
    pub fn open(&mut self) -> Result<()> {
        if self.view.is_some() {
            return Ok(());
        }
        let data_start = self.header.data_start() as u64;
        let size = self.header.data_size();
        let view: Box<dyn ByteView> = match self.settings.backing {
            Backing::Mapped => Box::new(MappedView::new(
                self.source.clone(),
                data_start,
                size,
                self.settings.max_window,
            )?),
            Backing::Buffered => Box::new(BufferedView::new(&self.source, data_start, size)?),
        };
        trace!(name = self.header.name(), data_start, size, "opened data set");
        self.view = Some(view);
        Ok(())
    }

    /// Releases the payload view.
    pub fn close(&mut self) {
        self.view = None;
    }

    pub fn is_open(&self) -> bool {
        self.view.is_some()
    }

    /// An independently opened view over the same payload. Fails on a closed
    /// Data Set.
    pub fn fork(&self) -> Result<Self> {
        if self.view.is_none() {
            return Err(GenDataError::DataSetNotOpen(self.header.name().to_string()));
        }
        let mut forked = Self::new(self.source.clone(), self.header.clone(), self.settings);
        forked.open()?;
        Ok(forked)
    }

    pub fn header(&self) -> &DataSetHeader {
        &self.header
    }

    pub fn name(&self) -> &str {
        self.header.name()
    }

    pub fn rows(&self) -> usize {
        self.header.row_count() as usize
    }

    pub fn cols(&self) -> usize {
        self.header.column_count()
    }

    /// Validates a cell access and returns the column's declared type and the
    /// payload offset of the cell.
    fn locate(&self, row: usize, col: usize) -> Result<(ColumnType, u64)> {
        if self.view.is_none() {
            return Err(GenDataError::DataSetNotOpen(self.header.name().to_string()));
        }
        let column = self
            .header
            .column(col)
            .ok_or(GenDataError::ColumnIndexOutOfBounds {
                col,
                max: self.cols(),
            })?;
        if row >= self.rows() {
            return Err(GenDataError::RowIndexOutOfBounds {
                row,
                max: self.rows(),
            });
        }
        Ok((
            column.column_type(),
            row as u64 * self.row_size + self.column_offsets[col],
        ))
    }

    /// Like [`locate`](Self::locate) but also requires the declared type.
    fn locate_typed(&self, row: usize, col: usize, requested: ColumnType) -> Result<u64> {
        let (declared, offset) = self.locate(row, col)?;
        if declared != requested {
            return Err(GenDataError::UnexpectedColumnType {
                col,
                requested,
                declared,
            });
        }
        Ok(offset)
    }

    /// Validates a range access and returns the offset of its first cell.
    ///
    /// An empty range may start at `rows()`; a non-empty one must end at or
    /// before it.
    fn locate_range(
        &self,
        col: usize,
        start: usize,
        count: usize,
        requested: ColumnType,
    ) -> Result<u64> {
        if self.view.is_none() {
            return Err(GenDataError::DataSetNotOpen(self.header.name().to_string()));
        }
        let column = self
            .header
            .column(col)
            .ok_or(GenDataError::ColumnIndexOutOfBounds {
                col,
                max: self.cols(),
            })?;
        let rows = self.rows();
        match start.checked_add(count) {
            Some(end) if end <= rows => {}
            end => {
                let row = match end {
                    Some(end) if start < rows => end - 1,
                    _ => start,
                };
                return Err(GenDataError::RowIndexOutOfBounds { row, max: rows });
            }
        }
        if column.column_type() != requested {
            return Err(GenDataError::UnexpectedColumnType {
                col,
                requested,
                declared: column.column_type(),
            });
        }
        Ok(start as u64 * self.row_size + self.column_offsets[col])
    }

    fn view(&mut self) -> Result<&mut Box<dyn ByteView>> {
        let name = self.header.name();
        match self.view.as_mut() {
            Some(view) => Ok(view),
            None => Err(GenDataError::DataSetNotOpen(name.to_string())),
        }
    }

    fn width(&self, col: usize) -> usize {
        self.header.column(col).map_or(0, |c| c.width() as usize)
    }

    fn read_cell(&mut self, offset: u64, col: usize) -> Result<&[u8]> {
        let width = self.width(col);
        self.view()?.read_at(offset, width)
    }

    /// Reads a numeric cell.
    pub fn get<T: ColumnValue>(&mut self, row: usize, col: usize) -> Result<T> {
        let offset = self.locate_typed(row, col, T::COLUMN_TYPE)?;
        let bytes = self.read_cell(offset, col)?;
        Ok(T::from_be_bytes(bytes))
    }

    /// Reads `count` numeric cells of one column starting at row `start`.
    ///
    /// The whole range must lie inside the Data Set; nothing is clamped.
    pub fn get_range<T: ColumnValue>(
        &mut self,
        col: usize,
        start: usize,
        count: usize,
    ) -> Result<Vec<T>> {
        let offset = self.locate_range(col, start, count, T::COLUMN_TYPE)?;
        self.collect_range(offset, col, count, |bytes, _| Ok(T::from_be_bytes(bytes)))
    }

    /// Reads one cell per row, contiguously when the Data Set has a single column.
    ///
    /// `decode` receives each cell and its payload offset.
    fn collect_range<T>(
        &mut self,
        offset: u64,
        col: usize,
        count: usize,
        mut decode: impl FnMut(&[u8], u64) -> Result<T>,
    ) -> Result<Vec<T>> {
        let width = self.width(col);
        let row_size = self.row_size;
        let single_column = self.cols() == 1;
        let view = self.view()?;

        let mut values = Vec::with_capacity(count);
        if single_column {
            let span = view.read_at(offset, width * count)?;
            for (i, cell) in span.chunks_exact(width).enumerate() {
                values.push(decode(cell, offset + (i * width) as u64)?);
            }
        } else {
            for i in 0..count as u64 {
                let cell_offset = offset + i * row_size;
                let cell = view.read_at(cell_offset, width)?;
                values.push(decode(cell, cell_offset)?);
            }
        }
        Ok(values)
    }

    pub fn get_i8(&mut self, row: usize, col: usize) -> Result<i8> {
        self.get(row, col)
    }

    pub fn get_u8(&mut self, row: usize, col: usize) -> Result<u8> {
        self.get(row, col)
    }

    pub fn get_i16(&mut self, row: usize, col: usize) -> Result<i16> {
        self.get(row, col)
    }

    pub fn get_u16(&mut self, row: usize, col: usize) -> Result<u16> {
        self.get(row, col)
    }

    pub fn get_i32(&mut self, row: usize, col: usize) -> Result<i32> {
        self.get(row, col)
    }

    pub fn get_u32(&mut self, row: usize, col: usize) -> Result<u32> {
        self.get(row, col)
    }

    pub fn get_f32(&mut self, row: usize, col: usize) -> Result<f32> {
        self.get(row, col)
    }

    pub fn get_i8_range(&mut self, col: usize, start: usize, count: usize) -> Result<Vec<i8>> {
        self.get_range(col, start, count)
    }

    pub fn get_u8_range(&mut self, col: usize, start: usize, count: usize) -> Result<Vec<u8>> {
        self.get_range(col, start, count)
    }

    pub fn get_i16_range(&mut self, col: usize, start: usize, count: usize) -> Result<Vec<i16>> {
        self.get_range(col, start, count)
    }

    pub fn get_u16_range(&mut self, col: usize, start: usize, count: usize) -> Result<Vec<u16>> {
        self.get_range(col, start, count)
    }

    pub fn get_i32_range(&mut self, col: usize, start: usize, count: usize) -> Result<Vec<i32>> {
        self.get_range(col, start, count)
    }

    pub fn get_u32_range(&mut self, col: usize, start: usize, count: usize) -> Result<Vec<u32>> {
        self.get_range(col, start, count)
    }

    pub fn get_f32_range(&mut self, col: usize, start: usize, count: usize) -> Result<Vec<f32>> {
        self.get_range(col, start, count)
    }

    /// Reads a single-byte text cell.
    pub fn get_ascii(&mut self, row: usize, col: usize) -> Result<String> {
        let offset = self.locate_typed(row, col, ColumnType::Ascii)?;
        let reserve = self.reserve(col);
        let pos = self.header.data_start() as u64 + offset;
        let cell = self.read_cell(offset, col)?;
        decode_ascii(cell, reserve, pos)
    }

    /// Reads a UTF-16 text cell.
    pub fn get_text(&mut self, row: usize, col: usize) -> Result<String> {
        let offset = self.locate_typed(row, col, ColumnType::Text)?;
        let reserve = self.reserve(col);
        let pos = self.header.data_start() as u64 + offset;
        let cell = self.read_cell(offset, col)?;
        decode_text(cell, reserve, pos)
    }

    pub fn get_ascii_range(&mut self, col: usize, start: usize, count: usize) -> Result<Vec<String>> {
        let offset = self.locate_range(col, start, count, ColumnType::Ascii)?;
        let reserve = self.reserve(col);
        let data_start = self.header.data_start() as u64;
        self.collect_range(offset, col, count, |cell, offset| {
            decode_ascii(cell, reserve, data_start + offset)
        })
    }

    pub fn get_text_range(&mut self, col: usize, start: usize, count: usize) -> Result<Vec<String>> {
        let offset = self.locate_range(col, start, count, ColumnType::Text)?;
        let reserve = self.reserve(col);
        let data_start = self.header.data_start() as u64;
        self.collect_range(offset, col, count, |cell, offset| {
            decode_text(cell, reserve, data_start + offset)
        })
    }

    /// Reads a cell of any type.
    pub fn get_cell(&mut self, row: usize, col: usize) -> Result<CellValue> {
        let (declared, _) = self.locate(row, col)?;
        Ok(match declared {
            ColumnType::Int8 => CellValue::Int8(self.get(row, col)?),
            ColumnType::UInt8 => CellValue::UInt8(self.get(row, col)?),
            ColumnType::Int16 => CellValue::Int16(self.get(row, col)?),
            ColumnType::UInt16 => CellValue::UInt16(self.get(row, col)?),
            ColumnType::Int32 => CellValue::Int32(self.get(row, col)?),
            ColumnType::UInt32 => CellValue::UInt32(self.get(row, col)?),
            ColumnType::Float => CellValue::Float(self.get(row, col)?),
            ColumnType::Ascii => CellValue::Ascii(self.get_ascii(row, col)?),
            ColumnType::Text => CellValue::Text(self.get_text(row, col)?),
        })
    }

    /// Reads every cell of a row.
    pub fn get_row(&mut self, row: usize) -> Result<Vec<CellValue>> {
        (0..self.cols()).map(|col| self.get_cell(row, col)).collect()
    }

    fn reserve(&self, col: usize) -> u32 {
        self.header.column(col).map_or(0, |c| c.reserve())
    }
}

fn text_len(cell: &[u8], reserve: u32) -> Result<usize> {
    let len = BigEndian::read_u32(&cell[..TEXT_LEN_PREFIX as usize]);
    if len > reserve {
        return Err(GenDataError::InvalidStringLength { len, reserve });
    }
    Ok(len as usize)
}

fn decode_ascii(cell: &[u8], reserve: u32, pos: u64) -> Result<String> {
    let len = text_len(cell, reserve)?;
    let body = &cell[TEXT_LEN_PREFIX as usize..TEXT_LEN_PREFIX as usize + len];
    String::from_utf8(body.to_vec()).map_err(|e| GenDataError::InvalidString {
        pos,
        reason: e.to_string(),
    })
}

fn decode_text(cell: &[u8], reserve: u32, pos: u64) -> Result<String> {
    let len = text_len(cell, reserve)?;
    let body = &cell[TEXT_LEN_PREFIX as usize..TEXT_LEN_PREFIX as usize + 2 * len];
    decode_utf16_be(body).map_err(|reason| GenDataError::InvalidString { pos, reason })
}
