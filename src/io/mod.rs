mod codec;
mod data_group;
mod data_set;
mod generic;
mod header;
mod options;
mod source;
mod updater;
mod view;
mod writer;

pub use data_group::DataGroup;
pub use data_set::{CellValue, ColumnValue, DataSet};
pub use generic::GenericData;
pub use options::{Backing, HeaderReadMode, ReadOptions, DEFAULT_MAX_MAP_WINDOW};
pub use updater::GenericFileUpdater;
pub use writer::{DataGroupWriter, DataSetWriter, GenericFileWriter, Placeholder};

pub(crate) use codec::encode_utf16_be;
pub(crate) use writer::to_offset;
