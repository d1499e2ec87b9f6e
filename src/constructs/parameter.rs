//! Typed name/value metadata attached to file, group and data set headers.
//!
//! On disk a parameter is `[name:string16][value:blob][mime type:string16]`.
//! The MIME type string carries the value type. Numeric values are stored in a
//! 16-byte blob whose first four bytes hold the big-endian 32-bit value, text
//! values are UTF-16BE and ASCII values are raw bytes, both optionally padded
//! with zeros up to a reservation so they can later be overwritten in place.

use byteorder::{BigEndian, ByteOrder};

use crate::{GenDataError, Result};

/// MIME type strings used as parameter value tags.
pub mod mime {
    pub const INT8: &str = "text/x-calvin-integer-8";
    pub const UINT8: &str = "text/x-calvin-unsigned-integer-8";
    pub const INT16: &str = "text/x-calvin-integer-16";
    pub const UINT16: &str = "text/x-calvin-unsigned-integer-16";
    pub const INT32: &str = "text/x-calvin-integer-32";
    pub const UINT32: &str = "text/x-calvin-unsigned-integer-32";
    pub const FLOAT: &str = "text/x-calvin-float";
    pub const TEXT: &str = "text/plain";
    pub const ASCII: &str = "text/ascii";
}

/// Size of the blob holding a numeric parameter value.
pub const NUMERIC_BLOB_SIZE: usize = 16;

/// The typed value of a [`Parameter`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParameterValue {
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Float(f32),
    /// Wide text, stored as UTF-16BE.
    Text(String),
    /// Single-byte text.
    Ascii(String),
    /// A value whose MIME type is not one of the known tags, kept verbatim.
    Raw { mime_type: String, bytes: Vec<u8> },
}

impl ParameterValue {
    /// MIME type string written alongside the value.
    pub fn mime_type(&self) -> &str {
        match self {
            Self::Int8(_) => mime::INT8,
            Self::UInt8(_) => mime::UINT8,
            Self::Int16(_) => mime::INT16,
            Self::UInt16(_) => mime::UINT16,
            Self::Int32(_) => mime::INT32,
            Self::UInt32(_) => mime::UINT32,
            Self::Float(_) => mime::FLOAT,
            Self::Text(_) => mime::TEXT,
            Self::Ascii(_) => mime::ASCII,
            Self::Raw { mime_type, .. } => mime_type,
        }
    }

    /// Short human readable type name, used in mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int8(_) => "int8",
            Self::UInt8(_) => "uint8",
            Self::Int16(_) => "int16",
            Self::UInt16(_) => "uint16",
            Self::Int32(_) => "int32",
            Self::UInt32(_) => "uint32",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Ascii(_) => "ascii",
            Self::Raw { .. } => "raw",
        }
    }

    /// Encodes the value blob. Text values are padded with zeros up to `reserve`
    /// characters when the value is shorter.
    pub(crate) fn encode(&self, reserve: u32) -> Vec<u8> {
        let numeric = |bits: u32| {
            let mut blob = vec![0u8; NUMERIC_BLOB_SIZE];
            BigEndian::write_u32(&mut blob[..4], bits);
            blob
        };
        match self {
            // signed values are sign extended to 32 bits
            Self::Int8(v) => numeric(*v as i32 as u32),
            Self::UInt8(v) => numeric(*v as u32),
            Self::Int16(v) => numeric(*v as i32 as u32),
            Self::UInt16(v) => numeric(*v as u32),
            Self::Int32(v) => numeric(*v as u32),
            Self::UInt32(v) => numeric(*v),
            Self::Float(v) => numeric(v.to_bits()),
            Self::Text(s) => {
                let units: Vec<u16> = s.encode_utf16().collect();
                let len = units.len().max(reserve as usize);
                let mut blob = vec![0u8; len * 2];
                BigEndian::write_u16_into(&units, &mut blob[..units.len() * 2]);
                blob
            }
            Self::Ascii(s) => {
                let mut blob = s.as_bytes().to_vec();
                blob.resize(blob.len().max(reserve as usize), 0);
                blob
            }
            Self::Raw { bytes, .. } => bytes.clone(),
        }
    }

    /// Decodes a value blob according to its MIME type.
    ///
    /// Returns the value and the reservation implied by the blob size.
    pub(crate) fn decode(mime_type: &str, blob: Vec<u8>) -> Result<(Self, u32)> {
        let numeric = |blob: &[u8]| -> Result<u32> {
            if blob.len() < 4 {
                return Err(GenDataError::ParameterMismatch {
                    name: String::new(),
                    requested: "numeric",
                    actual: format!("{} byte blob", blob.len()),
                });
            }
            Ok(BigEndian::read_u32(&blob[..4]))
        };
        let value = match mime_type {
            mime::INT8 => Self::Int8(numeric(&blob)? as i32 as i8),
            mime::UINT8 => Self::UInt8(numeric(&blob)? as u8),
            mime::INT16 => Self::Int16(numeric(&blob)? as i32 as i16),
            mime::UINT16 => Self::UInt16(numeric(&blob)? as u16),
            mime::INT32 => Self::Int32(numeric(&blob)? as i32),
            mime::UINT32 => Self::UInt32(numeric(&blob)?),
            mime::FLOAT => Self::Float(f32::from_bits(numeric(&blob)?)),
            mime::TEXT => {
                let units: Vec<u16> = blob
                    .chunks_exact(2)
                    .map(BigEndian::read_u16)
                    .take_while(|&u| u != 0)
                    .collect();
                let reserve = (blob.len() / 2) as u32;
                let text = String::from_utf16(&units).map_err(|e| GenDataError::InvalidString {
                    pos: 0,
                    reason: e.to_string(),
                })?;
                return Ok((Self::Text(text), reserve));
            }
            mime::ASCII => {
                let reserve = blob.len() as u32;
                let end = blob.iter().position(|&b| b == 0).unwrap_or(blob.len());
                let text = String::from_utf8_lossy(&blob[..end]).into_owned();
                return Ok((Self::Ascii(text), reserve));
            }
            other => Self::Raw {
                mime_type: other.to_string(),
                bytes: blob,
            },
        };
        Ok((value, 0))
    }
}

/// A named, typed metadata value.
///
/// Equality compares name and value; the text reservation is a storage detail
/// and does not take part.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameter {
    name: String,
    value: ParameterValue,
    reserve: u32,
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

macro_rules! typed_getter {
    ($fn:ident, $variant:ident, $ty:ty, $label:literal) => {
        #[doc = concat!("Returns the value if this parameter holds a `", $label, "`.")]
        pub fn $fn(&self) -> Result<$ty> {
            match &self.value {
                ParameterValue::$variant(v) => Ok(v.clone()),
                other => Err(self.mismatch($label, other)),
            }
        }
    };
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: ParameterValue) -> Self {
        Self {
            name: name.into(),
            value,
            reserve: 0,
        }
    }

    /// A wide text parameter padded to at least `reserve` characters on disk.
    pub fn text_reserved(name: impl Into<String>, value: impl Into<String>, reserve: u32) -> Self {
        Self {
            name: name.into(),
            value: ParameterValue::Text(value.into()),
            reserve,
        }
    }

    /// An ASCII parameter padded to at least `reserve` bytes on disk.
    pub fn ascii_reserved(name: impl Into<String>, value: impl Into<String>, reserve: u32) -> Self {
        Self {
            name: name.into(),
            value: ParameterValue::Ascii(value.into()),
            reserve,
        }
    }

    pub(crate) fn with_reserve(mut self, reserve: u32) -> Self {
        self.reserve = reserve;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &ParameterValue {
        &self.value
    }

    pub fn reserve(&self) -> u32 {
        self.reserve
    }

    pub fn mime_type(&self) -> &str {
        self.value.mime_type()
    }

    fn mismatch(&self, requested: &'static str, actual: &ParameterValue) -> GenDataError {
        GenDataError::ParameterMismatch {
            name: self.name.clone(),
            requested,
            actual: actual.type_name().to_string(),
        }
    }

    typed_getter!(as_i8, Int8, i8, "int8");
    typed_getter!(as_u8, UInt8, u8, "uint8");
    typed_getter!(as_i16, Int16, i16, "int16");
    typed_getter!(as_u16, UInt16, u16, "uint16");
    typed_getter!(as_i32, Int32, i32, "int32");
    typed_getter!(as_u32, UInt32, u32, "uint32");
    typed_getter!(as_f32, Float, f32, "float");
    typed_getter!(as_text, Text, String, "text");
    typed_getter!(as_ascii, Ascii, String, "ascii");

    /// Returns the raw bytes of a parameter with an unrecognised MIME type.
    pub fn as_raw(&self) -> Result<&[u8]> {
        match &self.value {
            ParameterValue::Raw { bytes, .. } => Ok(bytes),
            other => Err(self.mismatch("raw", other)),
        }
    }
}

/// Ordered list of parameters.
///
/// Duplicate names are allowed; lookups resolve to the first match.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterList {
    params: Vec<Parameter>,
}

macro_rules! typed_lookup {
    ($fn:ident, $getter:ident, $ty:ty) => {
        /// Typed lookup of the first parameter named `name`.
        ///
        /// Returns `Ok(None)` when no parameter has that name.
        pub fn $fn(&self, name: &str) -> Result<Option<$ty>> {
            self.find(name).map(Parameter::$getter).transpose()
        }
    };
}

impl ParameterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter, keeping any earlier one with the same name.
    pub fn add(&mut self, param: Parameter) {
        self.params.push(param);
    }

    /// Replaces the first parameter with the same name, or appends.
    pub fn set(&mut self, param: Parameter) {
        match self.params.iter_mut().find(|p| p.name == param.name) {
            Some(slot) => *slot = param,
            None => self.params.push(param),
        }
    }

    pub fn find(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    typed_lookup!(get_i8, as_i8, i8);
    typed_lookup!(get_u8, as_u8, u8);
    typed_lookup!(get_i16, as_i16, i16);
    typed_lookup!(get_u16, as_u16, u16);
    typed_lookup!(get_i32, as_i32, i32);
    typed_lookup!(get_u32, as_u32, u32);
    typed_lookup!(get_f32, as_f32, f32);
    typed_lookup!(get_text, as_text, String);
    typed_lookup!(get_ascii, as_ascii, String);

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParameterList {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl FromIterator<Parameter> for ParameterList {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}
