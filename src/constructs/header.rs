use bytemuck::{Pod, Zeroable};

use crate::{DataGroupHeader, GenDataError, Parameter, ParameterList};

pub const MAGIC: u8 = 59;
pub const VERSION: u8 = 1;
pub const PREAMBLE_SIZE: usize = std::mem::size_of::<FilePreamble>();

/// Fixed 10-byte prefix of every generic data file.
///
/// Multi-byte fields are big-endian byte arrays so the struct has no padding
/// and can be cast straight from the file bytes.
#[derive(Copy, Clone, Pod, Zeroable, Debug, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct FilePreamble {
    pub magic: u8,
    pub version: u8,
    pub group_count: [u8; 4],
    pub first_group_pos: [u8; 4],
}
impl FilePreamble {
    pub fn new(group_count: u32, first_group_pos: u32) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            group_count: group_count.to_be_bytes(),
            first_group_pos: first_group_pos.to_be_bytes(),
        }
    }
    pub fn group_count(&self) -> u32 {
        u32::from_be_bytes(self.group_count)
    }
    pub fn first_group_pos(&self) -> u32 {
        u32::from_be_bytes(self.first_group_pos)
    }
    pub fn validate(&self) -> crate::Result<()> {
        if self.magic != MAGIC {
            return Err(GenDataError::InvalidMagicNumber {
                expected: MAGIC,
                actual: self.magic,
            });
        }
        if self.version > VERSION {
            return Err(GenDataError::UnsupportedVersion {
                max: VERSION,
                actual: self.version,
            });
        }
        Ok(())
    }
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
    pub fn from_bytes(bytes: &[u8]) -> Self {
        *bytemuck::from_bytes(bytes)
    }
}

/// File-level metadata: identifiers, parameters and the provenance chain.
///
/// `parents` holds the generic headers of the files this one was derived from,
/// each of which may carry its own parents.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenericDataHeader {
    pub file_type_id: String,
    pub file_id: String,
    pub creation_time: String,
    pub locale: String,
    pub parameters: ParameterList,
    pub parents: Vec<GenericDataHeader>,
}
impl GenericDataHeader {
    pub fn new(file_type_id: impl Into<String>) -> Self {
        Self {
            file_type_id: file_type_id.into(),
            ..Default::default()
        }
    }
    pub fn add_parameter(&mut self, param: Parameter) {
        self.parameters.add(param);
    }
    pub fn get_parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.find(name)
    }
    pub fn add_parent(&mut self, parent: GenericDataHeader) {
        self.parents.push(parent);
    }
    /// Depth-first search of the provenance chain for a header with the given file type.
    pub fn find_parent(&self, file_type_id: &str) -> Option<&GenericDataHeader> {
        self.parents.iter().find_map(|p| {
            if p.file_type_id == file_type_id {
                Some(p)
            } else {
                p.find_parent(file_type_id)
            }
        })
    }
}

/// Everything parsed from the front of a generic data file.
///
/// `group_count` is the count declared in the file. How many entries of
/// `data_groups` are populated depends on the header read mode.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileHeader {
    magic: u8,
    version: u8,
    group_count: u32,
    first_group_pos: u32,
    generic: GenericDataHeader,
    data_groups: Vec<DataGroupHeader>,
}
impl FileHeader {
    pub fn new(generic: GenericDataHeader) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            generic,
            ..Default::default()
        }
    }
    pub(crate) fn from_preamble(preamble: &FilePreamble, generic: GenericDataHeader) -> Self {
        Self {
            magic: preamble.magic,
            version: preamble.version,
            group_count: preamble.group_count(),
            first_group_pos: preamble.first_group_pos(),
            generic,
            data_groups: Vec::new(),
        }
    }
    pub fn magic(&self) -> u8 {
        self.magic
    }
    pub fn version(&self) -> u8 {
        self.version
    }
    /// Number of Data Groups declared by the file.
    pub fn group_count(&self) -> u32 {
        self.group_count
    }
    pub fn first_group_pos(&self) -> u32 {
        self.first_group_pos
    }
    pub fn generic(&self) -> &GenericDataHeader {
        &self.generic
    }
    pub fn generic_mut(&mut self) -> &mut GenericDataHeader {
        &mut self.generic
    }
    pub fn get_parameter(&self, name: &str) -> Option<&Parameter> {
        self.generic.get_parameter(name)
    }
    pub fn add_parameter(&mut self, param: Parameter) {
        self.generic.add_parameter(param);
    }
    /// Group headers parsed so far.
    pub fn data_groups(&self) -> &[DataGroupHeader] {
        &self.data_groups
    }
    pub fn find_data_group(&self, name: &str) -> Option<&DataGroupHeader> {
        self.data_groups.iter().find(|g| g.name() == name)
    }
    /// Whether every declared group header has been parsed.
    pub fn is_fully_parsed(&self) -> bool {
        self.data_groups.len() == self.group_count as usize
    }
    pub(crate) fn push_data_group(&mut self, group: DataGroupHeader) {
        self.data_groups.push(group);
    }
}
