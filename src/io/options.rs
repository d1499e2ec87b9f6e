/// How much of the header tree is parsed when a file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeaderReadMode {
    /// Every Data Group header and every nested Data Set header.
    #[default]
    All,
    /// The file header plus the first Data Group. Further groups are reached
    /// by absolute position, which suits files with one group per record.
    FirstGroupOnly,
    /// The file header only.
    FileOnly,
}

/// How a Data Set payload is made available to the typed getters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Backing {
    /// A read-only memory-mapped window onto the file.
    #[default]
    Mapped,
    /// The payload is copied into a private buffer.
    Buffered,
}

#[cfg(target_pointer_width = "32")]
pub const DEFAULT_MAX_MAP_WINDOW: usize = 256 * 1024 * 1024;
#[cfg(not(target_pointer_width = "32"))]
pub const DEFAULT_MAX_MAP_WINDOW: usize = usize::MAX;

/// Options fixed when a [`GenericData`](crate::GenericData) is opened.
///
/// # Examples
///
/// ```rust
/// use gendata::{Backing, HeaderReadMode, ReadOptions};
///
/// let options = ReadOptions::default()
///     .header_mode(HeaderReadMode::FirstGroupOnly)
///     .backing(Backing::Buffered);
/// assert_eq!(options.get_backing(), Backing::Buffered);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReadOptions {
    header_mode: HeaderReadMode,
    backing: Backing,
    max_map_window: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            header_mode: HeaderReadMode::default(),
            backing: Backing::default(),
            max_map_window: DEFAULT_MAX_MAP_WINDOW,
        }
    }
}

impl ReadOptions {
    pub fn header_mode(mut self, mode: HeaderReadMode) -> Self {
        self.header_mode = mode;
        self
    }

    pub fn backing(mut self, backing: Backing) -> Self {
        self.backing = backing;
        self
    }

    /// Largest mapping window a Data Set will request. Zero is treated as one byte.
    pub fn max_map_window(mut self, bytes: usize) -> Self {
        self.max_map_window = bytes.max(1);
        self
    }

    pub fn get_header_mode(&self) -> HeaderReadMode {
        self.header_mode
    }

    pub fn get_backing(&self) -> Backing {
        self.backing
    }

    pub fn get_max_map_window(&self) -> usize {
        self.max_map_window
    }
}
