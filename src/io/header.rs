//! Parsing of the file header, Data Group headers and Data Set headers.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};
use tracing::{debug, trace};

use super::codec::ReadExt;
use crate::{
    ColumnDescriptor, ColumnType, DataGroupHeader, DataSetHeader, FileHeader, FilePreamble,
    GenDataError, GenericDataHeader, HeaderReadMode, Result, PREAMBLE_SIZE, TEXT_LEN_PREFIX,
};

/// Reads the preamble, the generic header and as many group headers as `mode` asks for.
pub(crate) fn read_file_header<R: Read + Seek>(
    reader: &mut R,
    mode: HeaderReadMode,
) -> Result<FileHeader> {
    let mut buf = [0u8; PREAMBLE_SIZE];
    reader.read_exact(&mut buf)?;
    let preamble = FilePreamble::from_bytes(&buf);
    preamble.validate()?;

    let generic = read_generic_header(reader)?;
    let mut header = FileHeader::from_preamble(&preamble, generic);

    let to_read = match mode {
        HeaderReadMode::All => header.group_count(),
        HeaderReadMode::FirstGroupOnly => header.group_count().min(1),
        HeaderReadMode::FileOnly => 0,
    };
    let mut pos = header.first_group_pos();
    for _ in 0..to_read {
        let group = read_data_group_header(reader, pos)?;
        pos = group.next_group_pos();
        header.push_data_group(group);
    }

    debug!(
        file_type = %header.generic().file_type_id,
        groups = header.group_count(),
        parsed = header.data_groups().len(),
        ?mode,
        "parsed file header"
    );
    Ok(header)
}

/// Reads a generic header and, recursively, its parents.
pub(crate) fn read_generic_header<R: Read + Seek>(reader: &mut R) -> Result<GenericDataHeader> {
    let file_type_id = reader.read_string8()?;
    let file_id = reader.read_string8()?;
    let creation_time = reader.read_string16()?;
    let locale = reader.read_string16()?;
    let parameters = reader.read_parameters()?;
    let parent_count = reader.read_len()?;
    let parents = (0..parent_count)
        .map(|_| read_generic_header(reader))
        .collect::<Result<Vec<_>>>()?;
    Ok(GenericDataHeader {
        file_type_id,
        file_id,
        creation_time,
        locale,
        parameters,
        parents,
    })
}

/// Fixed part of a group header: positions, set count and name.
pub(crate) struct GroupPrefix {
    pub next_group_pos: u32,
    pub first_set_pos: u32,
    pub set_count: usize,
    pub name: String,
}

pub(crate) fn read_group_prefix<R: Read + Seek>(reader: &mut R, pos: u32) -> Result<GroupPrefix> {
    reader.seek(SeekFrom::Start(pos as u64))?;
    let next_group_pos = reader.read_u32::<BigEndian>()?;
    let first_set_pos = reader.read_u32::<BigEndian>()?;
    let set_count = reader.read_len()?;
    let name = reader.read_string16()?;
    Ok(GroupPrefix {
        next_group_pos,
        first_set_pos,
        set_count,
        name,
    })
}

/// Reads the group header at `pos` and every Data Set header it chains to.
pub(crate) fn read_data_group_header<R: Read + Seek>(
    reader: &mut R,
    pos: u32,
) -> Result<DataGroupHeader> {
    let prefix = read_group_prefix(reader, pos)?;
    let mut group = DataGroupHeader::new(prefix.name);
    group.set_positions(pos, prefix.first_set_pos, prefix.next_group_pos);

    let mut set_pos = prefix.first_set_pos;
    for _ in 0..prefix.set_count {
        let set = read_data_set_header(reader, set_pos)?;
        set_pos = set.next_set_pos();
        group.add_data_set(set);
    }
    trace!(
        name = group.name(),
        pos,
        sets = group.data_set_count(),
        "parsed data group header"
    );
    Ok(group)
}

/// Reads the Data Set header at `pos`.
pub(crate) fn read_data_set_header<R: Read + Seek>(
    reader: &mut R,
    pos: u32,
) -> Result<DataSetHeader> {
    reader.seek(SeekFrom::Start(pos as u64))?;
    let data_start = reader.read_u32::<BigEndian>()?;
    let next_set_pos = reader.read_u32::<BigEndian>()?;
    let name = reader.read_string16()?;
    let parameters = reader.read_parameters()?;

    let column_count = reader.read_u32::<BigEndian>()?;
    let mut header = DataSetHeader::new(name, 0);
    for _ in 0..column_count {
        let column_name = reader.read_string16()?;
        let column_type = ColumnType::try_from(reader.read_u8()?)?;
        let width = reader.read_i32::<BigEndian>()?.max(0) as u32;
        if width < column_type.fixed_width().unwrap_or(TEXT_LEN_PREFIX) {
            return Err(GenDataError::InvalidColumnWidth {
                name: column_name,
                column_type,
                width,
            });
        }
        header.add_column(ColumnDescriptor::from_parts(column_name, column_type, width));
    }
    let row_count = reader.read_i32::<BigEndian>()?.max(0) as u32;
    header.set_row_count(row_count);
    *header.parameters_mut() = parameters;
    header.set_positions(pos, data_start, next_set_pos);
    Ok(header)
}
