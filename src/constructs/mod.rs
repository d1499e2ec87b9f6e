mod column;
mod data_group_header;
mod data_set_header;
mod header;
pub mod labels;
mod parameter;

pub use column::{ColumnDescriptor, ColumnType, TEXT_LEN_PREFIX};
pub use data_group_header::DataGroupHeader;
pub use data_set_header::DataSetHeader;
pub use header::{FileHeader, FilePreamble, GenericDataHeader, MAGIC, PREAMBLE_SIZE, VERSION};
pub use parameter::{mime, Parameter, ParameterList, ParameterValue, NUMERIC_BLOB_SIZE};
