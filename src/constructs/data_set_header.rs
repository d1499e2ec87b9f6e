use crate::{ColumnDescriptor, Parameter, ParameterList};

/// Header of one Data Set: name, row count, ordered columns and parameters.
///
/// The three file positions are filled in by the header parser; a header built
/// by an application for writing leaves them at zero.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataSetHeader {
    name: String,
    row_count: u32,
    columns: Vec<ColumnDescriptor>,
    parameters: ParameterList,
    header_start: u32,
    data_start: u32,
    next_set_pos: u32,
}

impl DataSetHeader {
    pub fn new(name: impl Into<String>, row_count: u32) -> Self {
        Self {
            name: name.into(),
            row_count,
            ..Default::default()
        }
    }

    /// Builder-style column append.
    pub fn with_column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    pub fn add_column(&mut self, column: ColumnDescriptor) {
        self.columns.push(column);
    }

    pub fn add_parameter(&mut self, param: Parameter) {
        self.parameters.add(param);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    pub fn set_row_count(&mut self, row_count: u32) {
        self.row_count = row_count;
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(index)
    }

    pub fn parameters(&self) -> &ParameterList {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterList {
        &mut self.parameters
    }

    /// Bytes per row: the sum of all column widths.
    pub fn row_size(&self) -> u64 {
        self.columns.iter().map(|c| c.width() as u64).sum()
    }

    /// Bytes of payload: `row_size * row_count`.
    pub fn data_size(&self) -> u64 {
        self.row_size() * self.row_count as u64
    }

    /// Byte offset of each column within a row (prefix sums of the widths).
    pub fn column_offsets(&self) -> Vec<u64> {
        self.columns
            .iter()
            .scan(0u64, |acc, c| {
                let offset = *acc;
                *acc += c.width() as u64;
                Some(offset)
            })
            .collect()
    }

    /// File position of this header.
    pub fn header_start(&self) -> u32 {
        self.header_start
    }

    /// File position of the first payload byte.
    pub fn data_start(&self) -> u32 {
        self.data_start
    }

    /// File position of the next Data Set header (the byte after this payload).
    pub fn next_set_pos(&self) -> u32 {
        self.next_set_pos
    }

    pub(crate) fn set_positions(&mut self, header_start: u32, data_start: u32, next_set_pos: u32) {
        self.header_start = header_start;
        self.data_start = data_start;
        self.next_set_pos = next_set_pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_and_data_size() {
        let header = DataSetHeader::new("Intensity", 10)
            .with_column(ColumnDescriptor::uint16("X"))
            .with_column(ColumnDescriptor::float("Mean"))
            .with_column(ColumnDescriptor::text("Name", 8));
        assert_eq!(header.row_size(), 2 + 4 + 20);
        assert_eq!(header.data_size(), 26 * 10);
        assert_eq!(header.column_offsets(), vec![0, 2, 6]);
    }

    #[test]
    fn test_empty_header() {
        let header = DataSetHeader::new("Empty", 0);
        assert_eq!(header.row_size(), 0);
        assert_eq!(header.data_size(), 0);
        assert!(header.column_offsets().is_empty());
        assert!(header.column(0).is_none());
    }
}
