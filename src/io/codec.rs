//! Big-endian primitives shared by the header parser and the writers.
//!
//! `string8` is `[len:i32][bytes]`, `string16` is `[len:i32][UTF-16BE units]`
//! and a blob is `[len:i32][bytes]`.

use std::io::{self, Read, Seek, Write};

use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};

use crate::{GenDataError, Parameter, ParameterList, ParameterValue, Result};

pub(crate) trait ReadExt: Read + Seek + Sized {
    fn read_len(&mut self) -> Result<usize> {
        let pos = self.stream_position()?;
        let len = self.read_i32::<BigEndian>()?;
        usize::try_from(len).map_err(|_| GenDataError::InvalidString {
            pos,
            reason: format!("negative length {}", len),
        })
    }

    /// Reads exactly `len` bytes without trusting `len` for the allocation size.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.by_ref().take(len as u64).read_to_end(&mut buf)?;
        if buf.len() != len {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        Ok(buf)
    }

    fn read_string8(&mut self) -> Result<String> {
        let pos = self.stream_position()?;
        let len = self.read_len()?;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes).map_err(|e| GenDataError::InvalidString {
            pos,
            reason: e.to_string(),
        })
    }

    fn read_string16(&mut self) -> Result<String> {
        let pos = self.stream_position()?;
        let len = self.read_len()?;
        let bytes = self.read_bytes(len * 2)?;
        decode_utf16_be(&bytes).map_err(|reason| GenDataError::InvalidString { pos, reason })
    }

    fn read_blob(&mut self) -> Result<Vec<u8>> {
        let len = self.read_len()?;
        self.read_bytes(len)
    }

    fn read_parameter(&mut self) -> Result<Parameter> {
        let name = self.read_string16()?;
        let blob = self.read_blob()?;
        let mime_type = self.read_string16()?;
        let (value, reserve) = ParameterValue::decode(&mime_type, blob).map_err(|e| match e {
            GenDataError::ParameterMismatch {
                requested, actual, ..
            } => GenDataError::ParameterMismatch {
                name: name.clone(),
                requested,
                actual,
            },
            other => other,
        })?;
        Ok(Parameter::new(name, value).with_reserve(reserve))
    }

    fn read_parameters(&mut self) -> Result<ParameterList> {
        let count = self.read_len()?;
        (0..count).map(|_| self.read_parameter()).collect()
    }
}

impl<R: Read + Seek> ReadExt for R {}

pub(crate) trait WriteExt: Write + Sized {
    fn write_len(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "length exceeds i32 range")
        })?;
        self.write_i32::<BigEndian>(len)?;
        Ok(())
    }

    fn write_string8(&mut self, value: &str) -> Result<()> {
        self.write_len(value.len())?;
        self.write_all(value.as_bytes())?;
        Ok(())
    }

    fn write_string16(&mut self, value: &str) -> Result<()> {
        let bytes = encode_utf16_be(value);
        self.write_len(bytes.len() / 2)?;
        self.write_all(&bytes)?;
        Ok(())
    }

    fn write_blob(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_len(bytes.len())?;
        self.write_all(bytes)?;
        Ok(())
    }

    fn write_parameter(&mut self, param: &Parameter) -> Result<()> {
        self.write_string16(param.name())?;
        self.write_blob(&param.value().encode(param.reserve()))?;
        self.write_string16(param.mime_type())
    }

    fn write_parameters(&mut self, params: &ParameterList) -> Result<()> {
        self.write_len(params.len())?;
        params.iter().try_for_each(|p| self.write_parameter(p))
    }
}

impl<W: Write> WriteExt for W {}

pub(crate) fn encode_utf16_be(value: &str) -> Vec<u8> {
    let units: Vec<u16> = value.encode_utf16().collect();
    let mut bytes = vec![0u8; units.len() * 2];
    BigEndian::write_u16_into(&units, &mut bytes);
    bytes
}

/// Decodes UTF-16BE bytes, stopping at the first NUL unit.
pub(crate) fn decode_utf16_be(bytes: &[u8]) -> std::result::Result<String, String> {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(BigEndian::read_u16)
        .take_while(|&u| u != 0)
        .collect();
    String::from_utf16(&units).map_err(|e| e.to_string())
}
