use crate::{GenDataError, Result};

/// Semantic type of a Data Set column.
///
/// The discriminant is the type tag written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ColumnType {
    Int8 = 0,
    UInt8 = 1,
    Int16 = 2,
    UInt16 = 3,
    Int32 = 4,
    UInt32 = 5,
    Float = 6,
    /// Single-byte text with a fixed character reservation.
    Ascii = 7,
    /// UTF-16 text with a fixed character reservation.
    Text = 8,
}

/// Bytes taken by the length prefix of a text cell.
pub const TEXT_LEN_PREFIX: u32 = 4;

impl ColumnType {
    /// Width in bytes of a numeric column, `None` for text columns.
    pub fn fixed_width(self) -> Option<u32> {
        match self {
            Self::Int8 | Self::UInt8 => Some(1),
            Self::Int16 | Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 | Self::Float => Some(4),
            Self::Ascii | Self::Text => None,
        }
    }

    pub fn is_text(self) -> bool {
        matches!(self, Self::Ascii | Self::Text)
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ColumnType {
    type Error = GenDataError;

    fn try_from(tag: u8) -> Result<Self> {
        Ok(match tag {
            0 => Self::Int8,
            1 => Self::UInt8,
            2 => Self::Int16,
            3 => Self::UInt16,
            4 => Self::Int32,
            5 => Self::UInt32,
            6 => Self::Float,
            7 => Self::Ascii,
            8 => Self::Text,
            _ => return Err(GenDataError::InvalidColumnType(tag)),
        })
    }
}

/// Name, type and byte width of one Data Set column.
///
/// Widths are fixed at authoring time. For text columns the width is a
/// reservation: a 4-byte length prefix plus room for `reserve` characters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnDescriptor {
    name: String,
    column_type: ColumnType,
    width: u32,
}

impl ColumnDescriptor {
    fn numeric(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            width: column_type.fixed_width().unwrap_or(0),
        }
    }

    pub fn int8(name: impl Into<String>) -> Self {
        Self::numeric(name, ColumnType::Int8)
    }

    pub fn uint8(name: impl Into<String>) -> Self {
        Self::numeric(name, ColumnType::UInt8)
    }

    pub fn int16(name: impl Into<String>) -> Self {
        Self::numeric(name, ColumnType::Int16)
    }

    pub fn uint16(name: impl Into<String>) -> Self {
        Self::numeric(name, ColumnType::UInt16)
    }

    pub fn int32(name: impl Into<String>) -> Self {
        Self::numeric(name, ColumnType::Int32)
    }

    pub fn uint32(name: impl Into<String>) -> Self {
        Self::numeric(name, ColumnType::UInt32)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::numeric(name, ColumnType::Float)
    }

    /// ASCII column holding up to `reserve` bytes per cell.
    pub fn ascii(name: impl Into<String>, reserve: u32) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::Ascii,
            width: TEXT_LEN_PREFIX + reserve,
        }
    }

    /// UTF-16 column holding up to `reserve` code units per cell.
    pub fn text(name: impl Into<String>, reserve: u32) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::Text,
            width: TEXT_LEN_PREFIX + 2 * reserve,
        }
    }

    /// Rebuilds a descriptor read from disk, trusting the stored width.
    pub(crate) fn from_parts(name: String, column_type: ColumnType, width: u32) -> Self {
        Self {
            name,
            column_type,
            width,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Width of one cell in bytes.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Maximum number of characters a text cell can hold (0 for numeric columns).
    pub fn reserve(&self) -> u32 {
        let room = self.width.saturating_sub(TEXT_LEN_PREFIX);
        match self.column_type {
            ColumnType::Ascii => room,
            ColumnType::Text => room / 2,
            _ => 0,
        }
    }
}
