//! Well-known group labels, parameter names and file type identifiers.

/// File type of probe-set layout files (one Data Group per probe set behind a table of contents).
pub const CDF_FILE_TYPE_ID: &str = "affymetrix-calvin-cdf";
/// File type of cell intensity files.
pub const INTENSITY_FILE_TYPE_ID: &str = "affymetrix-calvin-intensity";
/// File type of scanner acquisition files.
pub const SCAN_ACQUISITION_FILE_TYPE_ID: &str = "affymetrix-calvin-scan-acquisition";

/// Table of contents group of a probe-set layout file.
pub const PROBE_SET_NAMES_LABEL: &str = "Probe Set Names";
/// Table of contents group of a control probe-set layout file.
pub const CONTROL_PROBE_SET_TYPES_LABEL: &str = "Control Probe Set Types";

pub const DEFAULT_GROUP_LABEL: &str = "Default Group";
pub const INTENSITY_LABEL: &str = "Intensity";
pub const STDDEV_LABEL: &str = "StdDev";
pub const PIXEL_LABEL: &str = "Pixel";
pub const OUTLIER_LABEL: &str = "Outlier";
pub const MASK_LABEL: &str = "Mask";

pub const ROWS_PARAM: &str = "ROWS";
pub const COLS_PARAM: &str = "COLS";
pub const SETS_PARAM: &str = "SETS";
pub const REFSEQ_PARAM: &str = "REFSEQ";

pub const ARRAY_TYPE_PARAM: &str = "affymetrix-array-type";
pub const ARRAY_BARCODE_PARAM: &str = "affymetrix-array-barcode";
pub const ARRAY_LOT_PARAM: &str = "affymetrix-array-lot";
pub const MASTER_FILE_PARAM: &str = "affymetrix-master-file";
pub const LIBRARY_PACKAGE_PARAM: &str = "affymetrix-library-package";

/// Reservation (in characters) of the array type parameter.
pub const ARRAY_TYPE_MAX_LEN: u32 = 100;
/// Reservation (in characters) of the array barcode parameter.
pub const ARRAY_BARCODE_MAX_LEN: u32 = 50;

/// Character reservation of the name column of a table of contents.
pub const TOC_NAME_RESERVE: u32 = 32;
