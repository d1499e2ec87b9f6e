//! # gendata - Reader and Writer for Calvin Generic Data Files
//!
//! `gendata` reads and writes the self-describing binary container used by
//! microarray instrument software for intensity, analysis and library files.
//! A file is a tree of typed, named tables: Data Groups holding Data Sets,
//! each a fixed-width, row-major table with named columns and parameters.
//!
//! ## Format Overview
//!
//! All integers and floats are big-endian.
//!
//! ### Preamble (10 bytes)
//! - Magic number: `59`
//! - Version: `1`
//! - Data Group count: `u32`
//! - First Data Group offset: `u32`
//!
//! ### Generic header
//! - File type id, file id, creation time, locale
//! - Typed name/value/MIME parameters
//! - Parent headers describing the file's provenance
//!
//! ### Data Groups and Data Sets
//! - Each Data Group links to the next through an absolute offset
//! - Each Data Set header declares its columns (type and width) and row count
//! - Rows are packed without padding; text cells are `[len:u32][units][padding]`
//!
//! ## Basic Usage
//!
//! ### Writing and Reading a Data Set
//!
//! ```rust
//! use gendata::{ColumnDescriptor, DataSetHeader, GenericData, GenericDataHeader, GenericFileWriter};
//! use tempfile::NamedTempFile;
//!
//! # fn main() -> gendata::Result<()> {
//! let file = NamedTempFile::new()?;
//!
//! // Write one group holding one data set of (x, intensity) rows
//! let header = GenericDataHeader::new(gendata::labels::INTENSITY_FILE_TYPE_ID);
//! let mut writer = GenericFileWriter::from_path(file.path(), &header)?;
//! {
//!     let mut group = writer.begin_group("Default Group")?;
//!     let set = DataSetHeader::new("Intensity", 3)
//!         .with_column(ColumnDescriptor::uint16("X"))
//!         .with_column(ColumnDescriptor::float("Intensity"));
//!     let mut ds = group.begin_data_set(&set)?;
//!     for (x, value) in [(0, 120.5), (1, 98.0), (2, 4011.25)] {
//!         ds.write_u16(x)?;
//!         ds.write_f32(value)?;
//!     }
//!     ds.finish()?;
//!     group.finish()?;
//! }
//! writer.finish()?;
//!
//! // Read it back
//! let data = GenericData::open(file.path())?;
//! assert_eq!(data.file_type_id(), gendata::labels::INTENSITY_FILE_TYPE_ID);
//! assert_eq!(data.data_group_count(), 1);
//!
//! let mut ds = data.data_set_by_name("Default Group", "Intensity")?;
//! assert_eq!(ds.rows(), 3);
//! assert_eq!(ds.get_f32(2, 1)?, 4011.25);
//! assert_eq!(ds.get_u16_range(0, 0, 3)?, vec![0, 1, 2]);
//! # Ok(())
//! # }
//! ```
//!
//! ### Bounded Memory Windows
//!
//! Data Set payloads are memory-mapped through a window that slides as cells
//! are requested. The window size can be capped, or mapping replaced by a
//! one-time buffered load:
//!
//! ```rust,no_run
//! use gendata::{Backing, GenericData, ReadOptions};
//!
//! # fn main() -> gendata::Result<()> {
//! let options = ReadOptions::default().max_map_window(64 * 1024 * 1024);
//! let data = GenericData::open_with("sample.CEL", options)?;
//!
//! let buffered = ReadOptions::default().backing(Backing::Buffered);
//! let small = GenericData::open_with("sample.CHP", buffered)?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Table of Contents Access
//!
//! Library files store one record per Data Group with a name index in the
//! first group. See [`TocReader`] and [`TocWriter`].
//!
//! ```rust,no_run
//! use gendata::{TocAccessMode, TocReader};
//!
//! # fn main() -> gendata::Result<()> {
//! let mut toc = TocReader::open("HG-U133A.cdf", TocAccessMode::ByIndex)?;
//! for index in [10, 3, 7] {
//!     let group = toc.record(index)?;
//!     println!("{}: {:?}", group.name(), group.data_set_names());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Parallel Row Processing
//!
//! ```rust,no_run
//! use gendata::{DataSet, GenericData, ParallelProcessor, ParallelReader};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Clone, Default)]
//! struct Brightest {
//!     local: f32,
//!     global: Arc<Mutex<f32>>,
//! }
//!
//! impl ParallelProcessor for Brightest {
//!     fn process_row(&mut self, ds: &mut DataSet, row: usize) -> gendata::Result<()> {
//!         self.local = self.local.max(ds.get_f32(row, 0)?);
//!         Ok(())
//!     }
//!
//!     fn on_batch_complete(&mut self) -> gendata::Result<()> {
//!         let mut guard = self.global.lock().unwrap();
//!         *guard = guard.max(self.local);
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> gendata::Result<()> {
//! let data = GenericData::open("sample.CEL")?;
//! let ds = data.data_set_by_name("Default Group", "Intensity")?;
//! ds.process_parallel(Brightest::default(), 0)?; // 0 = use all available cores
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, GenDataError>`. Malformed files, missing
//! lookups and caller misuse are told apart with
//! [`GenDataError::is_format_mismatch`], [`GenDataError::is_not_found`] and
//! [`GenDataError::is_misuse`]:
//!
//! ```rust
//! use gendata::{GenDataError, GenericData};
//! use std::io::Write;
//!
//! # fn main() {
//! let mut file = tempfile::NamedTempFile::new().unwrap();
//! file.write_all(&[0u8; 32]).unwrap(); // all zeros - invalid magic number
//!
//! match GenericData::open(file.path()) {
//!     Err(GenDataError::InvalidMagicNumber { expected, actual }) => {
//!         println!("Invalid file format: expected {}, got {}", expected, actual);
//!     }
//!     Err(e) => println!("Other error: {}", e),
//!     Ok(_) => unreachable!(),
//! }
//! # }
//! ```

mod constructs;
mod error;
mod io;
mod parallel;
mod toc;

#[cfg(test)]
mod test_utils;

pub use constructs::{
    labels, mime, ColumnDescriptor, ColumnType, DataGroupHeader, DataSetHeader, FileHeader,
    FilePreamble, GenericDataHeader, Parameter, ParameterList, ParameterValue, MAGIC,
    NUMERIC_BLOB_SIZE, PREAMBLE_SIZE, TEXT_LEN_PREFIX, VERSION,
};
pub use error::{GenDataError, IntoGenDataError, Result};
pub use io::{
    Backing, CellValue, ColumnValue, DataGroup, DataGroupWriter, DataSet, DataSetWriter,
    GenericData, GenericFileUpdater, GenericFileWriter, HeaderReadMode, Placeholder, ReadOptions,
    DEFAULT_MAX_MAP_WINDOW,
};
pub use parallel::{ParallelProcessor, ParallelReader, ROW_BATCH_SIZE};
pub use toc::{toc_header, TocAccessMode, TocReader, TocWriter, TOC_NAME_COLUMN, TOC_POS_COLUMN};
