use std::sync::Arc;

use super::{
    data_set::{DataSet, ViewSettings},
    source::Source,
};
use crate::{DataGroupHeader, DataSetHeader, GenDataError, Result};

/// A Data Group opened from a [`GenericData`](crate::GenericData).
///
/// Resolves its Data Sets by index or name and opens them over the shared file.
pub struct DataGroup {
    source: Arc<Source>,
    header: DataGroupHeader,
    settings: ViewSettings,
}

impl DataGroup {
    pub(crate) fn new(source: Arc<Source>, header: DataGroupHeader, settings: ViewSettings) -> Self {
        Self {
            source,
            header,
            settings,
        }
    }

    pub fn header(&self) -> &DataGroupHeader {
        &self.header
    }

    pub fn name(&self) -> &str {
        self.header.name()
    }

    pub fn data_set_count(&self) -> usize {
        self.header.data_set_count()
    }

    pub fn data_set_names(&self) -> Vec<&str> {
        self.header.data_set_names()
    }

    /// File position of the group that follows this one.
    pub fn next_group_pos(&self) -> u32 {
        self.header.next_group_pos()
    }

    /// Opens the Data Set at `index`.
    pub fn data_set(&self, index: usize) -> Result<DataSet> {
        let header = self.header.data_set(index).ok_or_else(|| {
            GenDataError::DataSetNotFound(format!(
                "index {} in group '{}' ({} data sets)",
                index,
                self.name(),
                self.data_set_count()
            ))
        })?;
        self.open_data_set(header)
    }

    /// Opens the first Data Set named `name`.
    pub fn data_set_by_name(&self, name: &str) -> Result<DataSet> {
        let header = self.header.find_data_set(name).ok_or_else(|| {
            GenDataError::DataSetNotFound(format!("'{}' in group '{}'", name, self.name()))
        })?;
        self.open_data_set(header)
    }

    fn open_data_set(&self, header: &DataSetHeader) -> Result<DataSet> {
        let mut data_set = DataSet::new(self.source.clone(), header.clone(), self.settings);
        data_set.open()?;
        Ok(data_set)
    }
}
