//! Table-of-contents random access over files with one Data Group per record.
//!
//! The first Data Group of such a file holds a single Data Set with one row
//! per record: the record name (UTF-16, [`TOC_NAME_RESERVE`] characters) and
//! the absolute file position of the record's Data Group. Record `i` is the
//! Data Group at index `i + 1`.
//!
//! A [`TocReader`] is created in one of three access modes and keeps it for
//! its lifetime:
//!
//! - [`TocAccessMode::Sequential`] follows each group's next-group offset and
//!   only serves the record at its cursor.
//! - [`TocAccessMode::ByIndex`] reads the table row of the requested record.
//! - [`TocAccessMode::ByName`] scans the whole table once on first use and
//!   resolves names through the resulting map.
//!
//! Operations the mode does not support fail with
//! [`GenDataError::AccessModeViolation`] instead of falling back.

use std::{
    collections::HashMap,
    fmt,
    io::{Seek, Write},
    path::Path,
};

use byteorder::{BigEndian, WriteBytesExt};
use tracing::{debug, trace};

use crate::{
    io::{encode_utf16_be, to_offset},
    labels::TOC_NAME_RESERVE,
    ColumnDescriptor, DataGroup, DataGroupWriter, DataSet, DataSetHeader, GenDataError,
    GenericData, GenericFileWriter, HeaderReadMode, ReadOptions, Result,
};

pub const TOC_NAME_COLUMN: usize = 0;
pub const TOC_POS_COLUMN: usize = 1;

/// Header of a table of contents Data Set with `capacity` rows.
pub fn toc_header(name: &str, capacity: u32) -> DataSetHeader {
    DataSetHeader::new(name, capacity)
        .with_column(ColumnDescriptor::text("Name", TOC_NAME_RESERVE))
        .with_column(ColumnDescriptor::uint32("FilePos"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TocAccessMode {
    Sequential,
    ByIndex,
    ByName,
}

impl TocAccessMode {
    fn label(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::ByIndex => "by-index",
            Self::ByName => "by-name",
        }
    }
}

impl fmt::Display for TocAccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

enum TocState {
    Sequential { index: usize, pos: u32 },
    ByIndex { toc: DataSet },
    ByName { toc: DataSet, names: Option<HashMap<String, u32>> },
}

/// Record access through the table of contents of a generic data file.
///
/// # Examples
///
/// ```rust,no_run
/// use gendata::{TocAccessMode, TocReader};
///
/// # fn main() -> gendata::Result<()> {
/// let mut toc = TocReader::open("HG-U133A.cdf", TocAccessMode::ByName)?;
/// let group = toc.record_by_name("AFFX-BioB-5_at")?;
/// println!("{} has {} data sets", group.name(), group.data_set_count());
/// # Ok(())
/// # }
/// ```
pub struct TocReader {
    data: GenericData,
    mode: TocAccessMode,
    state: TocState,
    record_count: usize,
}

impl TocReader {
    /// Opens `path` reading only the file header and the table of contents group.
    pub fn open<P: AsRef<Path>>(path: P, mode: TocAccessMode) -> Result<Self> {
        Self::open_with(path, mode, ReadOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(
        path: P,
        mode: TocAccessMode,
        options: ReadOptions,
    ) -> Result<Self> {
        let options = options.header_mode(HeaderReadMode::FirstGroupOnly);
        Self::new(GenericData::open_with(path, options)?, mode)
    }

    /// Prepares `data` for access in `mode`.
    pub fn new(data: GenericData, mode: TocAccessMode) -> Result<Self> {
        if data.data_group_count() == 0 {
            return Err(GenDataError::DataGroupNotFound(
                "table of contents (file has no data groups)".to_string(),
            ));
        }
        let toc_group = data.data_group_at(data.header().first_group_pos())?;
        let state = match mode {
            TocAccessMode::Sequential => TocState::Sequential {
                index: 0,
                pos: toc_group.next_group_pos(),
            },
            TocAccessMode::ByIndex => TocState::ByIndex {
                toc: toc_group.data_set(0)?,
            },
            TocAccessMode::ByName => TocState::ByName {
                toc: toc_group.data_set(0)?,
                names: None,
            },
        };
        let record_count = data.data_group_count() - 1;
        debug!(%mode, records = record_count, "prepared table of contents");
        Ok(Self {
            data,
            mode,
            state,
            record_count,
        })
    }

    pub fn mode(&self) -> TocAccessMode {
        self.mode
    }

    /// Number of records (every Data Group after the table of contents).
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn data(&self) -> &GenericData {
        &self.data
    }

    /// Opens record `index`.
    ///
    /// In sequential mode `index` must equal the cursor, which then advances.
    /// Not supported in by-name mode.
    pub fn record(&mut self, index: usize) -> Result<DataGroup> {
        if index >= self.record_count {
            return Err(GenDataError::RecordNotFound(format!(
                "index {} ({} records)",
                index, self.record_count
            )));
        }
        match &mut self.state {
            TocState::Sequential { index: cursor, pos } => {
                if index != *cursor {
                    let detail = format!("requested record {}, cursor is at {}", index, cursor);
                    return Err(violation(self.mode, detail));
                }
                let group = self.data.data_group_at(*pos)?;
                *cursor += 1;
                *pos = group.next_group_pos();
                trace!(index, "sequential record");
                Ok(group)
            }
            TocState::ByIndex { toc } => {
                let pos = toc.get_u32(index, TOC_POS_COLUMN)?;
                self.data.data_group_at(pos)
            }
            TocState::ByName { .. } => {
                Err(violation(self.mode, format!("record {} requested by index", index)))
            }
        }
    }

    /// Opens the record named `name`. Only supported in by-name mode.
    pub fn record_by_name(&mut self, name: &str) -> Result<DataGroup> {
        let TocState::ByName { toc, names } = &mut self.state else {
            return Err(violation(self.mode, format!("record '{}' requested by name", name)));
        };
        if names.is_none() {
            *names = Some(scan(toc)?);
        }
        let pos = names
            .as_ref()
            .and_then(|names| names.get(name).copied())
            .ok_or_else(|| GenDataError::RecordNotFound(format!("'{}'", name)))?;
        self.data.data_group_at(pos)
    }
}

fn violation(mode: TocAccessMode, detail: String) -> GenDataError {
    GenDataError::AccessModeViolation {
        mode: mode.label(),
        detail,
    }
}

/// Reads every table row into a name to position map. A later row with the
/// same name replaces an earlier one.
fn scan(toc: &mut DataSet) -> Result<HashMap<String, u32>> {
    let rows = toc.rows();
    let names = toc.get_text_range(TOC_NAME_COLUMN, 0, rows)?;
    let positions = toc.get_u32_range(TOC_POS_COLUMN, 0, rows)?;
    let mut map = HashMap::with_capacity(rows);
    for (name, pos) in names.into_iter().zip(positions) {
        map.insert(name, pos);
    }
    debug!(records = map.len(), "scanned table of contents");
    Ok(map)
}

/// Writes a file whose first Data Group is a table of contents.
///
/// The table is reserved up front with `capacity` zeroed rows. Each
/// [`begin_record`](Self::begin_record) fills the next row at the table cursor
/// with the record name and the main cursor position, then starts the
/// record's Data Group at the main cursor.
///
/// # Examples
///
/// ```rust
/// use gendata::{ColumnDescriptor, DataSetHeader, GenericDataHeader, GenericFileWriter, TocWriter};
/// use std::io::Cursor;
///
/// # fn main() -> gendata::Result<()> {
/// let file = GenericFileWriter::new(Cursor::new(Vec::new()), &GenericDataHeader::new("affymetrix-calvin-cdf"))?;
/// let mut toc = TocWriter::new(file, "Probe Set Names", 2)?;
///
/// for name in ["AFFX-BioB-5_at", "AFFX-BioC-3_at"] {
///     let mut group = toc.begin_record(name)?;
///     let header = DataSetHeader::new("Atoms", 1).with_column(ColumnDescriptor::uint16("X"));
///     let mut set = group.begin_data_set(&header)?;
///     set.write_u16(12)?;
///     set.finish()?;
///     group.finish()?;
/// }
/// toc.finish()?;
/// # Ok(())
/// # }
/// ```
pub struct TocWriter<W: Write + Seek> {
    file: GenericFileWriter<W>,
    toc_name: String,
    toc_cursor: u64,
    row_size: u64,
    capacity: u32,
    written: u32,
}

impl<W: Write + Seek> TocWriter<W> {
    /// Writes the table of contents group as the first Data Group of `file`.
    pub fn new(mut file: GenericFileWriter<W>, label: &str, capacity: u32) -> Result<Self> {
        if file.groups_written() != 0 {
            return Err(GenDataError::AccessModeViolation {
                mode: "toc writer",
                detail: "table of contents must be the first data group".to_string(),
            });
        }
        let header = toc_header(label, capacity);
        let toc_cursor = {
            let mut group = file.begin_group(label)?;
            let mut set = group.begin_data_set(&header)?;
            let start = set.write_zeroed_rows(capacity)?;
            set.finish()?;
            group.finish()?;
            start
        };
        debug!(capacity, toc_cursor, "reserved table of contents");
        Ok(Self {
            file,
            toc_name: label.to_string(),
            toc_cursor,
            row_size: header.row_size(),
            capacity,
            written: 0,
        })
    }

    pub fn records_written(&self) -> u32 {
        self.written
    }

    /// Position of the next table row to be filled.
    pub fn toc_cursor(&self) -> u64 {
        self.toc_cursor
    }

    /// Position where the next record's Data Group will start.
    pub fn main_cursor(&self) -> u64 {
        self.file.position()
    }

    /// Records `name` in the table and starts its Data Group.
    pub fn begin_record(&mut self, name: &str) -> Result<DataGroupWriter<'_, W>> {
        self.file.ensure_idle()?;
        if self.written == self.capacity {
            return Err(GenDataError::TocFull {
                capacity: self.capacity,
            });
        }
        let units = encode_utf16_be(name);
        let len = units.len() / 2;
        if len > TOC_NAME_RESERVE as usize {
            return Err(GenDataError::ValueExceedsReservation {
                col: TOC_NAME_COLUMN,
                len,
                reserve: TOC_NAME_RESERVE,
            });
        }
        let pos = to_offset(self.file.position())?;

        let mut entry = Vec::with_capacity(self.row_size as usize);
        entry.write_u32::<BigEndian>(len as u32)?;
        entry.extend_from_slice(&units);
        entry.resize(4 + 2 * TOC_NAME_RESERVE as usize, 0);
        entry.write_u32::<BigEndian>(pos)?;
        self.file.out.overwrite(self.toc_cursor, &entry)?;
        trace!(name, pos, toc_cursor = self.toc_cursor, "wrote toc entry");

        self.toc_cursor += self.row_size;
        self.written += 1;
        self.file.begin_group(name)
    }

    /// Checks that every reserved entry was used and finishes the file.
    pub fn finish(self) -> Result<W> {
        if self.written != self.capacity {
            return Err(GenDataError::RowCountMismatch {
                name: self.toc_name,
                expected: self.capacity,
                actual: self.written,
            });
        }
        self.file.finish()
    }
}
