//! Error handling for the gendata library.
//!
//! This module defines all error types that can occur while parsing headers,
//! reading Data Set payloads, navigating a table of contents, or writing a
//! container. Variants are grouped so callers can tell a corrupt file apart
//! from a misused API and from a record that simply does not exist.

use std::error::Error as StdError;
use thiserror::Error;

use crate::ColumnType;

/// A specialized `Result` type for gendata operations.
///
/// It's equivalent to `std::result::Result<T, GenDataError>`.
///
/// # Examples
///
/// ```rust
/// use gendata::{ColumnDescriptor, DataSetHeader, Result};
///
/// fn intensity_header(rows: u32) -> Result<DataSetHeader> {
///     let mut header = DataSetHeader::new("Intensity", rows);
///     header.add_column(ColumnDescriptor::float("Mean"));
///     Ok(header)
/// }
/// ```
pub type Result<T> = std::result::Result<T, GenDataError>;

/// Error types for gendata operations.
///
/// # Examples
///
/// ```rust
/// use gendata::{GenDataError, GenericData};
///
/// match GenericData::open("missing.gdf") {
///     Err(GenDataError::Io(io_err)) => println!("I/O error: {}", io_err),
///     Err(e) if e.is_format_mismatch() => println!("Not a generic data file: {}", e),
///     Err(e) => println!("Other error: {}", e),
///     Ok(_) => println!("Opened"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum GenDataError {
    /// I/O error from the underlying file or stream.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// The file does not start with the generic data file magic number.
    #[error("Invalid magic number, expected ({expected}), found ({actual})")]
    InvalidMagicNumber { expected: u8, actual: u8 },

    /// The file was written with a newer format version than this library knows.
    #[error("Unsupported version ({actual}), highest known version is ({max})")]
    UnsupportedVersion { max: u8, actual: u8 },

    /// A column descriptor carries a type tag outside the known range.
    #[error("Invalid column type tag: {0}")]
    InvalidColumnType(u8),

    /// A column's declared width cannot hold a value of its type.
    #[error("Column ({name}) of type {column_type:?} has invalid width {width}")]
    InvalidColumnWidth {
        name: String,
        column_type: ColumnType,
        width: u32,
    },

    /// A length-prefixed string could not be decoded.
    #[error("Invalid string at position {pos}: {reason}")]
    InvalidString { pos: u64, reason: String },

    /// A text cell declares more characters than its column reserves.
    #[error("Text cell length ({len}) exceeds column reservation ({reserve})")]
    InvalidStringLength { len: u32, reserve: u32 },

    /// No Data Group matches the requested index, name or file position.
    #[error("Data group not found: {0}")]
    DataGroupNotFound(String),

    /// No Data Set matches the requested index or name.
    #[error("Data set not found: {0}")]
    DataSetNotFound(String),

    /// Column index is past the last declared column.
    #[error("Column index ({col}) out of bounds - must be less than {max}")]
    ColumnIndexOutOfBounds { col: usize, max: usize },

    /// Row index (or the end of a row range) is past the last row.
    #[error("Row index ({row}) out of bounds - must be less than {max}")]
    RowIndexOutOfBounds { row: usize, max: usize },

    /// The requested value type does not match the column's declared type.
    #[error("Unexpected column type for column {col}: requested {requested:?}, declared {declared:?}")]
    UnexpectedColumnType {
        col: usize,
        requested: ColumnType,
        declared: ColumnType,
    },

    /// A cell access was attempted on a Data Set that is not open.
    #[error("Data set ({0}) is not open")]
    DataSetNotOpen(String),

    /// The table of contents was accessed in a way its access mode does not allow.
    #[error("Access not supported by mode {mode}: {detail}")]
    AccessModeViolation { mode: &'static str, detail: String },

    /// A mapping window covering the requested byte range could not be created.
    #[error("Failed to remap window at offset {offset} (len {len})")]
    RemapFailure {
        offset: u64,
        len: usize,
        #[source]
        source: std::io::Error,
    },

    /// The table of contents has no entry for the requested name or index.
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// A typed parameter getter was called on a parameter of another type.
    #[error("Parameter ({name}) holds {actual}, requested {requested}")]
    ParameterMismatch {
        name: String,
        requested: &'static str,
        actual: String,
    },

    /// A text value written to a Data Set does not fit the column reservation.
    #[error("Value length ({len}) exceeds reservation ({reserve}) of column {col}")]
    ValueExceedsReservation { col: usize, len: usize, reserve: u32 },

    /// A Data Set writer was finished with a different number of rows than declared.
    #[error("Data set ({name}) declared {expected} rows but {actual} were written")]
    RowCountMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    /// A group or data set writer was dropped or left open before its parent moved on.
    #[error("Writer for ({0}) was not finished")]
    UnfinishedWriter(String),

    /// No parameter with the requested name exists in the header being updated.
    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),

    /// An in-place update does not fit the space reserved when the parameter was written.
    #[error("Parameter ({name}) update needs {len} bytes but {reserve} are reserved")]
    ParameterExceedsReservation {
        name: String,
        len: usize,
        reserve: usize,
    },

    /// Every reserved table of contents entry has already been written.
    #[error("Table of contents is full ({capacity} entries)")]
    TocFull { capacity: u32 },

    /// Error occurred during parallel processing.
    #[error("Processing error: {0}")]
    Process(Box<dyn StdError + Send + Sync>),

    /// A parallel worker thread panicked.
    #[error("Worker thread {0} panicked")]
    WorkerPanicked(usize),
}

impl GenDataError {
    /// The file is not a readable generic data file (bad magic or version,
    /// or column descriptors that cannot describe a payload).
    pub fn is_format_mismatch(&self) -> bool {
        matches!(
            self,
            Self::InvalidMagicNumber { .. }
                | Self::UnsupportedVersion { .. }
                | Self::InvalidColumnType(_)
                | Self::InvalidColumnWidth { .. }
        )
    }

    /// The caller asked for something the API does not allow in its current state.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Self::ColumnIndexOutOfBounds { .. }
                | Self::RowIndexOutOfBounds { .. }
                | Self::UnexpectedColumnType { .. }
                | Self::DataSetNotOpen(_)
                | Self::AccessModeViolation { .. }
                | Self::ParameterMismatch { .. }
                | Self::ValueExceedsReservation { .. }
                | Self::RowCountMismatch { .. }
                | Self::TocFull { .. }
                | Self::UnfinishedWriter(_)
                | Self::ParameterExceedsReservation { .. }
        )
    }

    /// The requested group, set or record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DataGroupNotFound(_)
                | Self::DataSetNotFound(_)
                | Self::RecordNotFound(_)
                | Self::ParameterNotFound(_)
        )
    }
}

/// Trait for converting errors into `GenDataError::Process` variants.
///
/// This trait provides a convenient way to convert custom error types
/// into gendata errors inside parallel processors.
///
/// # Examples
///
/// ```rust
/// use gendata::{GenDataError, IntoGenDataError};
/// use std::fmt;
///
/// #[derive(Debug)]
/// struct CustomError(String);
///
/// impl fmt::Display for CustomError {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "Custom error: {}", self.0)
///     }
/// }
///
/// impl std::error::Error for CustomError {}
///
/// let err = CustomError("something went wrong".to_string()).into_gendata_error();
/// assert!(matches!(err, GenDataError::Process(_)));
/// ```
pub trait IntoGenDataError {
    /// Converts the error into a `GenDataError`.
    fn into_gendata_error(self) -> GenDataError;
}

/// Blanket implementation for all error types.
impl<E> IntoGenDataError for E
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn into_gendata_error(self) -> GenDataError {
        GenDataError::Process(self.into())
    }
}
