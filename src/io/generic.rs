use std::{path::Path, sync::Arc};

use tracing::debug;

use super::{
    data_group::DataGroup,
    data_set::{DataSet, ViewSettings},
    header::{read_data_group_header, read_file_header, read_group_prefix},
    source::Source,
};
use crate::{DataGroupHeader, FileHeader, GenDataError, ReadOptions, Result};

/// A generic data file opened for reading.
///
/// Owns the parsed [`FileHeader`] and the shared read-only file handle, and
/// opens Data Groups and Data Sets by index, by name or by absolute position.
///
/// # Examples
///
/// ```rust,no_run
/// use gendata::{GenericData, HeaderReadMode, ReadOptions};
///
/// # fn main() -> gendata::Result<()> {
/// let data = GenericData::open_with(
///     "sample.cdf",
///     ReadOptions::default().header_mode(HeaderReadMode::FirstGroupOnly),
/// )?;
/// println!("{} ({} groups)", data.file_type_id(), data.data_group_count());
///
/// let group = data.data_group(1)?;
/// let next = data.data_group_at(group.next_group_pos())?;
/// println!("{} then {}", group.name(), next.name());
/// # Ok(())
/// # }
/// ```
pub struct GenericData {
    source: Arc<Source>,
    header: FileHeader,
    options: ReadOptions,
}

impl GenericData {
    /// Opens a file with the default [`ReadOptions`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, ReadOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: ReadOptions) -> Result<Self> {
        let source = Source::open(path)?;
        let header = source.with_reader(0, |reader| {
            read_file_header(reader, options.get_header_mode())
        })?;
        debug!(
            path = %source.path().display(),
            bytes = source.len(),
            backing = ?options.get_backing(),
            "opened generic data file"
        );
        Ok(Self {
            source,
            header,
            options,
        })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    pub fn path(&self) -> &Path {
        self.source.path()
    }

    pub fn file_type_id(&self) -> &str {
        &self.header.generic().file_type_id
    }

    pub fn file_id(&self) -> &str {
        &self.header.generic().file_id
    }

    /// Number of Data Groups declared by the file.
    pub fn data_group_count(&self) -> usize {
        self.header.group_count() as usize
    }

    fn settings(&self) -> ViewSettings {
        ViewSettings {
            backing: self.options.get_backing(),
            max_window: self.options.get_max_map_window(),
        }
    }

    fn wrap(&self, header: DataGroupHeader) -> DataGroup {
        DataGroup::new(self.source.clone(), header, self.settings())
    }

    /// Position and name of every group, from parsed headers where available.
    fn group_index(&self) -> Result<Vec<(u32, String)>> {
        let parsed = self.header.data_groups();
        let mut index: Vec<(u32, String)> = parsed
            .iter()
            .map(|g| (g.header_start(), g.name().to_string()))
            .collect();
        let mut pos = parsed
            .last()
            .map_or(self.header.first_group_pos(), |g| g.next_group_pos());
        let remaining = self.data_group_count().saturating_sub(parsed.len());
        if remaining > 0 {
            self.source.with_reader(0, |reader| {
                for _ in 0..remaining {
                    let prefix = read_group_prefix(reader, pos)?;
                    index.push((pos, prefix.name));
                    pos = prefix.next_group_pos;
                }
                Ok(())
            })?;
        }
        Ok(index)
    }

    fn group_header(&self, index: usize) -> Result<DataGroupHeader> {
        let count = self.data_group_count();
        if index >= count {
            return Err(GenDataError::DataGroupNotFound(format!(
                "index {} ({} groups)",
                index, count
            )));
        }
        let parsed = self.header.data_groups();
        if let Some(header) = parsed.get(index) {
            return Ok(header.clone());
        }
        let mut pos = parsed
            .last()
            .map_or(self.header.first_group_pos(), |g| g.next_group_pos());
        self.source.with_reader(0, |reader| {
            for _ in parsed.len()..index {
                pos = read_group_prefix(reader, pos)?.next_group_pos;
            }
            read_data_group_header(reader, pos)
        })
    }

    /// Opens the Data Group at `index`, walking the group chain if its header
    /// was not parsed at open time.
    pub fn data_group(&self, index: usize) -> Result<DataGroup> {
        Ok(self.wrap(self.group_header(index)?))
    }

    /// Opens the first Data Group named `name`.
    pub fn data_group_by_name(&self, name: &str) -> Result<DataGroup> {
        if let Some(header) = self.header.find_data_group(name) {
            return Ok(self.wrap(header.clone()));
        }
        if !self.header.is_fully_parsed() {
            if let Some((pos, _)) = self.group_index()?.into_iter().find(|(_, n)| n == name) {
                return self.data_group_at(pos);
            }
        }
        Err(GenDataError::DataGroupNotFound(format!("'{}'", name)))
    }

    /// Opens the Data Group whose header starts at the absolute position `pos`.
    pub fn data_group_at(&self, pos: u32) -> Result<DataGroup> {
        if pos == 0 || pos as u64 >= self.source.len() {
            return Err(GenDataError::DataGroupNotFound(format!(
                "file position {}",
                pos
            )));
        }
        let header = self
            .source
            .with_reader(0, |reader| read_data_group_header(reader, pos))?;
        Ok(self.wrap(header))
    }

    pub fn data_group_names(&self) -> Result<Vec<String>> {
        Ok(self
            .group_index()?
            .into_iter()
            .map(|(_, name)| name)
            .collect())
    }

    pub fn data_set_count(&self, group: usize) -> Result<usize> {
        Ok(self.group_header(group)?.data_set_count())
    }

    pub fn data_set_names(&self, group: usize) -> Result<Vec<String>> {
        Ok(self
            .group_header(group)?
            .data_set_names()
            .into_iter()
            .map(String::from)
            .collect())
    }

    /// Opens Data Set `set` of Data Group `group`.
    pub fn data_set(&self, group: usize, set: usize) -> Result<DataSet> {
        self.data_group(group)?.data_set(set)
    }

    /// Opens a Data Set by group name and set name.
    pub fn data_set_by_name(&self, group: &str, set: &str) -> Result<DataSet> {
        self.data_group_by_name(group)?.data_set_by_name(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_utils::{scenario_file, scenario_value, SCENARIO_ROWS, SCENARIO_SETS},
        Backing, CellValue, ColumnType, HeaderReadMode,
    };
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn open(file: &NamedTempFile, options: ReadOptions) -> GenericData {
        GenericData::open_with(file.path(), options).unwrap()
    }

    fn all_backings() -> Vec<ReadOptions> {
        vec![
            ReadOptions::default(),
            ReadOptions::default().backing(Backing::Buffered),
            // forces a remap on nearly every read
            ReadOptions::default().max_map_window(7),
        ]
    }

    #[test]
    fn test_file_header() {
        let file = scenario_file();
        let data = open(&file, ReadOptions::default());

        assert_eq!(data.file_type_id(), "affymetrix-calvin-intensity");
        assert_eq!(data.file_id(), "scenario-0001");
        assert_eq!(data.data_group_count(), 3);
        assert!(data.header().is_fully_parsed());
        assert_eq!(
            data.data_group_names().unwrap(),
            vec!["Results", "Annotations", "Marker"]
        );

        let generic = data.header().generic();
        assert_eq!(
            generic
                .parameters
                .get_text("affymetrix-array-type")
                .unwrap()
                .as_deref(),
            Some("HG-U133A")
        );
        assert_eq!(generic.parents.len(), 1);
        assert_eq!(
            generic.parents[0].file_type_id,
            "affymetrix-calvin-scan-acquisition"
        );
    }

    #[test]
    fn test_scenario_cells_roundtrip() {
        let file = scenario_file();
        for options in all_backings() {
            let data = open(&file, options);
            let group = data.data_group(0).unwrap();
            assert_eq!(group.data_set_count(), SCENARIO_SETS);

            let mut cells = 0;
            for set in 0..SCENARIO_SETS {
                let mut ds = group.data_set(set).unwrap();
                assert_eq!(ds.name(), format!("Set{}", set));
                assert_eq!(ds.rows(), SCENARIO_ROWS);
                assert_eq!(ds.cols(), 2);
                for row in 0..SCENARIO_ROWS {
                    let (x, y) = scenario_value(set, row);
                    assert_eq!(ds.get_u16(row, 0).unwrap(), x);
                    assert_eq!(ds.get_f32(row, 1).unwrap().to_bits(), y.to_bits());
                    cells += 2;
                }
                assert!(matches!(
                    ds.get_u16(SCENARIO_ROWS, 0),
                    Err(GenDataError::RowIndexOutOfBounds { row: 10, max: 10 })
                ));
            }
            assert_eq!(cells, 60);
        }
    }

    #[test]
    fn test_header_positions_are_consistent() {
        let file = scenario_file();
        let data = open(&file, ReadOptions::default());
        let groups = data.header().data_groups();

        for window in groups.windows(2) {
            assert_eq!(window[0].next_group_pos(), window[1].header_start());
        }
        for group in groups {
            for set in group.data_sets() {
                assert_eq!(set.row_size(), set.columns().iter().map(|c| c.width() as u64).sum::<u64>());
                assert_eq!(set.data_size(), set.row_size() * set.row_count() as u64);
                assert_eq!(set.next_set_pos() as u64, set.data_start() as u64 + set.data_size());
            }
            if let Some(last) = group.data_sets().last() {
                assert_eq!(group.next_group_pos(), last.next_set_pos());
            }
        }
        let file_len = std::fs::metadata(file.path()).unwrap().len();
        assert_eq!(groups.last().unwrap().next_group_pos() as u64, file_len);
    }

    #[test]
    fn test_error_precedence() {
        let file = scenario_file();
        for options in all_backings() {
            let data = open(&file, options);
            let mut ds = data.data_set(0, 0).unwrap();

            assert!(matches!(
                ds.get_u16(0, 2),
                Err(GenDataError::ColumnIndexOutOfBounds { col: 2, max: 2 })
            ));
            // column is checked before row
            assert!(matches!(
                ds.get_u16(99, 5),
                Err(GenDataError::ColumnIndexOutOfBounds { .. })
            ));
            // row is checked before type
            assert!(matches!(
                ds.get_f32(10, 0),
                Err(GenDataError::RowIndexOutOfBounds { .. })
            ));
            assert!(matches!(
                ds.get_f32(0, 0),
                Err(GenDataError::UnexpectedColumnType {
                    col: 0,
                    requested: ColumnType::Float,
                    declared: ColumnType::UInt16
                })
            ));
            assert!(matches!(
                ds.get_u32(0, 1),
                Err(GenDataError::UnexpectedColumnType { .. })
            ));

            ds.close();
            assert!(!ds.is_open());
            // open state is checked first
            assert!(matches!(ds.get_u16(99, 5), Err(GenDataError::DataSetNotOpen(_))));
            assert!(matches!(
                ds.get_u16_range(0, 0, 1),
                Err(GenDataError::DataSetNotOpen(_))
            ));

            ds.open().unwrap();
            assert_eq!(ds.get_u16(0, 0).unwrap(), scenario_value(0, 0).0);
        }
    }

    #[test]
    fn test_column_ranges() {
        let file = scenario_file();
        for options in all_backings() {
            let data = open(&file, options);
            let mut ds = data.data_set_by_name("Results", "Set2").unwrap();

            let xs = ds.get_u16_range(0, 3, 5).unwrap();
            let expected: Vec<u16> = (3..8).map(|row| scenario_value(2, row).0).collect();
            assert_eq!(xs, expected);

            let ys = ds.get_f32_range(1, 0, SCENARIO_ROWS).unwrap();
            assert_eq!(ys.len(), SCENARIO_ROWS);
            assert_eq!(ys[9], scenario_value(2, 9).1);

            assert!(ds.get_f32_range(1, 10, 0).unwrap().is_empty());
            assert!(matches!(
                ds.get_f32_range(1, 8, 3),
                Err(GenDataError::RowIndexOutOfBounds { row: 10, max: 10 })
            ));
            assert!(matches!(
                ds.get_f32_range(1, 11, 0),
                Err(GenDataError::RowIndexOutOfBounds { row: 11, .. })
            ));
            assert!(matches!(
                ds.get_u16_range(1, 0, 2),
                Err(GenDataError::UnexpectedColumnType { .. })
            ));
        }
    }

    #[test]
    fn test_single_column_fast_path() {
        let file = scenario_file();
        for options in all_backings() {
            let data = open(&file, options);
            let mut ds = data.data_set_by_name("Annotations", "Scores").unwrap();
            assert_eq!(ds.cols(), 1);

            let all = ds.get_i32_range(0, 0, 4).unwrap();
            assert_eq!(all, vec![-40_000, 0, 7, i32::MAX]);
            let tail = ds.get_i32_range(0, 2, 2).unwrap();
            assert_eq!(tail, vec![7, i32::MAX]);
        }
    }

    #[test]
    fn test_mixed_types_and_text() {
        let file = scenario_file();
        for options in all_backings() {
            let data = open(&file, options);
            let mut ds = data.data_set_by_name("Annotations", "Probes").unwrap();

            assert_eq!(ds.get_ascii(0, 0).unwrap(), "AFFX");
            assert_eq!(ds.get_text(0, 1).unwrap(), "BioB-5_at");
            assert_eq!(ds.get_i8(0, 2).unwrap(), -3);
            assert_eq!(ds.get_u8(0, 3).unwrap(), 250);
            assert_eq!(ds.get_i16(0, 4).unwrap(), -1200);
            assert_eq!(ds.get_u32(0, 5).unwrap(), 4_000_000_000);

            // a value filling the whole reservation
            assert_eq!(ds.get_ascii(1, 0).unwrap(), "CTRL-bkg");
            // an empty value
            assert_eq!(ds.get_text(1, 1).unwrap(), "");

            assert_eq!(
                ds.get_text_range(1, 0, 2).unwrap(),
                vec!["BioB-5_at".to_string(), String::new()]
            );
            assert_eq!(
                ds.get_ascii_range(0, 0, 2).unwrap(),
                vec!["AFFX".to_string(), "CTRL-bkg".to_string()]
            );

            assert_eq!(
                ds.get_row(0).unwrap(),
                vec![
                    CellValue::Ascii("AFFX".to_string()),
                    CellValue::Text("BioB-5_at".to_string()),
                    CellValue::Int8(-3),
                    CellValue::UInt8(250),
                    CellValue::Int16(-1200),
                    CellValue::UInt32(4_000_000_000),
                ]
            );

            assert!(matches!(
                ds.get_text(0, 0),
                Err(GenDataError::UnexpectedColumnType { .. })
            ));
            assert_eq!(
                ds.header()
                    .parameters()
                    .get_u32("ROWS")
                    .unwrap(),
                Some(2)
            );
        }
    }

    #[test]
    fn test_empty_group() {
        let file = scenario_file();
        let data = open(&file, ReadOptions::default());
        let marker = data.data_group_by_name("Marker").unwrap();
        assert_eq!(marker.data_set_count(), 0);
        assert!(matches!(
            marker.data_set(0),
            Err(GenDataError::DataSetNotFound(_))
        ));
        assert_eq!(data.data_set_count(2).unwrap(), 0);
    }

    #[test]
    fn test_not_found() {
        let file = scenario_file();
        let data = open(&file, ReadOptions::default());

        let err = data.data_group(3).err().unwrap();
        assert!(matches!(err, GenDataError::DataGroupNotFound(_)));
        assert!(err.is_not_found());
        assert!(matches!(
            data.data_group_by_name("Missing"),
            Err(GenDataError::DataGroupNotFound(_))
        ));
        assert!(matches!(
            data.data_set(0, 3),
            Err(GenDataError::DataSetNotFound(_))
        ));
        assert!(matches!(
            data.data_set_by_name("Results", "Set9"),
            Err(GenDataError::DataSetNotFound(_))
        ));
        assert!(matches!(
            data.data_group_at(u32::MAX),
            Err(GenDataError::DataGroupNotFound(_))
        ));
    }

    #[test]
    fn test_partial_header_modes() {
        let file = scenario_file();
        let full = open(&file, ReadOptions::default());

        for mode in [HeaderReadMode::FirstGroupOnly, HeaderReadMode::FileOnly] {
            let data = open(&file, ReadOptions::default().header_mode(mode));
            let expected_parsed = if mode == HeaderReadMode::FileOnly { 0 } else { 1 };
            assert_eq!(data.header().data_groups().len(), expected_parsed);
            assert!(!data.header().is_fully_parsed());
            assert_eq!(data.data_group_count(), 3);

            assert_eq!(data.data_group_names().unwrap(), full.data_group_names().unwrap());
            for index in 0..3 {
                assert_eq!(
                    data.data_group(index).unwrap().header(),
                    full.data_group(index).unwrap().header()
                );
            }
            let annotations = data.data_group_by_name("Annotations").unwrap();
            assert_eq!(annotations.header(), &full.header().data_groups()[1]);
            assert_eq!(data.data_set_names(0).unwrap(), vec!["Set0", "Set1", "Set2"]);
        }
    }

    #[test]
    fn test_data_group_by_position() {
        let file = scenario_file();
        let data = open(&file, ReadOptions::default().header_mode(HeaderReadMode::FileOnly));

        let first = data.data_group_at(data.header().first_group_pos()).unwrap();
        assert_eq!(first.name(), "Results");
        let second = data.data_group_at(first.next_group_pos()).unwrap();
        assert_eq!(second.name(), "Annotations");

        let mut ds = second.data_set(0).unwrap();
        assert_eq!(ds.get_ascii(0, 0).unwrap(), "AFFX");
    }

    #[test]
    fn test_fork_reads_independently() {
        let file = scenario_file();
        let data = open(&file, ReadOptions::default().max_map_window(8));
        let mut ds = data.data_set(0, 1).unwrap();
        let mut forked = ds.fork().unwrap();

        ds.close();
        assert!(forked.is_open());
        assert_eq!(forked.get_u16(9, 0).unwrap(), scenario_value(1, 9).0);
    }

    #[test]
    fn test_format_mismatch() {
        let mut bad_magic = NamedTempFile::new().unwrap();
        bad_magic.write_all(&[60, 1, 0, 0, 0, 0, 0, 0, 0, 10]).unwrap();
        let err = GenericData::open(bad_magic.path()).err().unwrap();
        assert!(matches!(
            err,
            GenDataError::InvalidMagicNumber {
                expected: 59,
                actual: 60
            }
        ));
        assert!(err.is_format_mismatch());

        let mut future = NamedTempFile::new().unwrap();
        future.write_all(&[59, 2, 0, 0, 0, 0, 0, 0, 0, 10]).unwrap();
        assert!(matches!(
            GenericData::open(future.path()),
            Err(GenDataError::UnsupportedVersion { max: 1, actual: 2 })
        ));

        let empty = NamedTempFile::new().unwrap();
        assert!(matches!(
            GenericData::open(empty.path()),
            Err(GenDataError::Io(_))
        ));
    }

    fn read_typed(
        ds: &mut DataSet,
        column_type: ColumnType,
        row: usize,
        col: usize,
    ) -> (Result<()>, Result<()>) {
        match column_type {
            ColumnType::Int8 => (ds.get_i8(row, col).map(drop), ds.get_i8_range(col, row, 1).map(drop)),
            ColumnType::UInt8 => (ds.get_u8(row, col).map(drop), ds.get_u8_range(col, row, 1).map(drop)),
            ColumnType::Int16 => (ds.get_i16(row, col).map(drop), ds.get_i16_range(col, row, 1).map(drop)),
            ColumnType::UInt16 => (ds.get_u16(row, col).map(drop), ds.get_u16_range(col, row, 1).map(drop)),
            ColumnType::Int32 => (ds.get_i32(row, col).map(drop), ds.get_i32_range(col, row, 1).map(drop)),
            ColumnType::UInt32 => (ds.get_u32(row, col).map(drop), ds.get_u32_range(col, row, 1).map(drop)),
            ColumnType::Float => (ds.get_f32(row, col).map(drop), ds.get_f32_range(col, row, 1).map(drop)),
            ColumnType::Ascii => (
                ds.get_ascii(row, col).map(drop),
                ds.get_ascii_range(col, row, 1).map(drop),
            ),
            ColumnType::Text => (
                ds.get_text(row, col).map(drop),
                ds.get_text_range(col, row, 1).map(drop),
            ),
        }
    }

    #[test]
    fn test_bounds_for_every_column_type() {
        let file = scenario_file();
        for options in all_backings() {
            let data = open(&file, options);
            for (group, set) in [("Results", "Set0"), ("Annotations", "Probes"), ("Annotations", "Scores")] {
                let mut ds = data.data_set_by_name(group, set).unwrap();
                let (rows, cols) = (ds.rows(), ds.cols());
                let types: Vec<ColumnType> =
                    ds.header().columns().iter().map(|c| c.column_type()).collect();

                for (col, &column_type) in types.iter().enumerate() {
                    let (cell, range) = read_typed(&mut ds, column_type, rows - 1, col);
                    assert!(cell.is_ok() && range.is_ok(), "{}/{} col {}", group, set, col);

                    let (cell, range) = read_typed(&mut ds, column_type, rows, col);
                    assert!(
                        matches!(cell, Err(GenDataError::RowIndexOutOfBounds { row, max }) if row == rows && max == rows),
                        "{}/{} col {}: {:?}",
                        group,
                        set,
                        col,
                        cell
                    );
                    assert!(
                        matches!(range, Err(GenDataError::RowIndexOutOfBounds { .. })),
                        "{}/{} col {}: {:?}",
                        group,
                        set,
                        col,
                        range
                    );

                    let (cell, range) = read_typed(&mut ds, column_type, 0, cols);
                    for result in [cell, range] {
                        assert!(matches!(
                            result,
                            Err(GenDataError::ColumnIndexOutOfBounds { col, max }) if col == cols && max == cols
                        ));
                    }
                }
            }
        }
    }

    fn overwrite(file: &NamedTempFile, pos: u64, bytes: &[u8]) {
        use std::io::{Seek, SeekFrom};
        let mut handle = file.reopen().unwrap();
        handle.seek(SeekFrom::Start(pos)).unwrap();
        handle.write_all(bytes).unwrap();
    }

    #[test]
    fn test_invalid_string_reports_its_own_cell() {
        let file = scenario_file();
        let probes = open(&file, ReadOptions::default())
            .data_set_by_name("Annotations", "Probes")
            .unwrap()
            .header()
            .clone();
        let offsets = probes.column_offsets();
        let row1 = probes.data_start() as u64 + probes.row_size();
        let ascii_cell = row1 + offsets[0];
        let text_cell = row1 + offsets[1];
        // "CTRL-bkg" starts with a byte that is not valid UTF-8
        overwrite(&file, ascii_cell + 4, &[0xFF]);
        // the empty name becomes a lone surrogate
        overwrite(&file, text_cell, &[0, 0, 0, 1, 0xD8, 0x00]);

        for options in all_backings() {
            let data = open(&file, options);
            let mut ds = data.data_set_by_name("Annotations", "Probes").unwrap();
            assert_eq!(ds.get_ascii(0, 0).unwrap(), "AFFX");

            for result in [ds.get_ascii(1, 0), ds.get_ascii_range(0, 0, 2).map(|_| String::new())] {
                match result {
                    Err(GenDataError::InvalidString { pos, .. }) => assert_eq!(pos, ascii_cell),
                    other => panic!("Expected InvalidString, got {:?}", other),
                }
            }
            for result in [ds.get_text(1, 1), ds.get_text_range(1, 0, 2).map(|_| String::new())] {
                match result {
                    Err(GenDataError::InvalidString { pos, .. }) => assert_eq!(pos, text_cell),
                    other => panic!("Expected InvalidString, got {:?}", other),
                }
            }
        }
    }

    #[test]
    fn test_truncated_payload_rejected_by_every_backing() {
        let file = scenario_file();
        let set2 = open(&file, ReadOptions::default()).header().data_groups()[0].data_sets()[2].clone();
        // cut inside the first row of Set2
        file.as_file().set_len(set2.data_start() as u64 + 6).unwrap();

        for options in all_backings() {
            let data = open(&file, options.header_mode(HeaderReadMode::FirstGroupOnly));
            match data.data_set(0, 2) {
                Err(GenDataError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
                Err(other) => panic!("Expected Io error, got {:?}", other),
                Ok(_) => panic!("Expected Io error, got an open data set"),
            }
            let mut set1 = data.data_set(0, 1).unwrap();
            assert_eq!(set1.get_u16(9, 0).unwrap(), scenario_value(1, 9).0);
        }
    }
}
