use crate::DataSetHeader;

/// Header of a Data Group: its name and the headers of the Data Sets it holds.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataGroupHeader {
    name: String,
    data_sets: Vec<DataSetHeader>,
    header_start: u32,
    first_set_pos: u32,
    next_group_pos: u32,
}

impl DataGroupHeader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_data_set(&mut self, header: DataSetHeader) {
        self.data_sets.push(header);
    }

    pub fn data_set_count(&self) -> usize {
        self.data_sets.len()
    }

    pub fn data_sets(&self) -> &[DataSetHeader] {
        &self.data_sets
    }

    pub fn data_set(&self, index: usize) -> Option<&DataSetHeader> {
        self.data_sets.get(index)
    }

    /// First Data Set with the given name.
    pub fn find_data_set(&self, name: &str) -> Option<&DataSetHeader> {
        self.data_sets.iter().find(|ds| ds.name() == name)
    }

    pub fn data_set_names(&self) -> Vec<&str> {
        self.data_sets.iter().map(DataSetHeader::name).collect()
    }

    /// File position of this header.
    pub fn header_start(&self) -> u32 {
        self.header_start
    }

    pub fn first_set_pos(&self) -> u32 {
        self.first_set_pos
    }

    /// File position of the next Data Group header.
    pub fn next_group_pos(&self) -> u32 {
        self.next_group_pos
    }

    pub(crate) fn set_positions(&mut self, header_start: u32, first_set_pos: u32, next_group_pos: u32) {
        self.header_start = header_start;
        self.first_set_pos = first_set_pos;
        self.next_group_pos = next_group_pos;
    }
}
