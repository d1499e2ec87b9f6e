//! Fixtures shared by the unit tests.

use tempfile::NamedTempFile;

use crate::{
    labels, ColumnDescriptor, DataSetHeader, GenericDataHeader, GenericFileWriter, Parameter,
    ParameterValue,
};

pub const SCENARIO_SETS: usize = 3;
pub const SCENARIO_ROWS: usize = 10;

/// The (uint16, float) cell pair stored at `row` of data set `set`.
pub fn scenario_value(set: usize, row: usize) -> (u16, f32) {
    ((set * 100 + row) as u16, set as f32 * 10.0 + row as f32 * 0.25)
}

/// Generic header with one parameter and a one-level provenance chain.
pub fn scenario_header() -> GenericDataHeader {
    let mut parent = GenericDataHeader::new(labels::SCAN_ACQUISITION_FILE_TYPE_ID);
    parent.file_id = "scan-0001".to_string();
    parent.add_parameter(Parameter::new("exposure", ParameterValue::UInt16(250)));

    let mut header = GenericDataHeader::new(labels::INTENSITY_FILE_TYPE_ID);
    header.file_id = "scenario-0001".to_string();
    header.creation_time = "2024-05-01T10:00:00Z".to_string();
    header.locale = "en-US".to_string();
    header.add_parameter(Parameter::text_reserved(
        labels::ARRAY_TYPE_PARAM,
        "HG-U133A",
        labels::ARRAY_TYPE_MAX_LEN,
    ));
    header.add_parent(parent);
    header
}

/// Writes a file with three groups:
///
/// - `Results`: data sets `Set0`..`Set2`, each 10 rows of (uint16 `X`, float `Y`).
/// - `Annotations`: `Probes` (two rows over six column types) and `Scores`
///   (one int32 column, four rows).
/// - `Marker`: no data sets.
pub fn scenario_file() -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    let mut writer = GenericFileWriter::from_path(file.path(), &scenario_header()).unwrap();

    {
        let mut group = writer.begin_group("Results").unwrap();
        for set in 0..SCENARIO_SETS {
            let header = DataSetHeader::new(format!("Set{}", set), SCENARIO_ROWS as u32)
                .with_column(ColumnDescriptor::uint16("X"))
                .with_column(ColumnDescriptor::float("Y"));
            let mut ds = group.begin_data_set(&header).unwrap();
            for row in 0..SCENARIO_ROWS {
                let (x, y) = scenario_value(set, row);
                ds.write_u16(x).unwrap();
                ds.write_f32(y).unwrap();
            }
            ds.finish().unwrap();
        }
        group.finish().unwrap();
    }

    {
        let mut group = writer.begin_group("Annotations").unwrap();

        let mut probes = DataSetHeader::new("Probes", 2)
            .with_column(ColumnDescriptor::ascii("Code", 8))
            .with_column(ColumnDescriptor::text("Name", 16))
            .with_column(ColumnDescriptor::int8("Direction"))
            .with_column(ColumnDescriptor::uint8("Kind"))
            .with_column(ColumnDescriptor::int16("Offset"))
            .with_column(ColumnDescriptor::uint32("Cells"));
        probes.add_parameter(Parameter::new(labels::ROWS_PARAM, ParameterValue::UInt32(2)));
        let mut ds = group.begin_data_set(&probes).unwrap();
        ds.write_ascii("AFFX").unwrap();
        ds.write_text("BioB-5_at").unwrap();
        ds.write_i8(-3).unwrap();
        ds.write_u8(250).unwrap();
        ds.write_i16(-1200).unwrap();
        ds.write_u32(4_000_000_000).unwrap();
        ds.write_ascii("CTRL-bkg").unwrap();
        ds.write_text("").unwrap();
        ds.write_i8(0).unwrap();
        ds.write_u8(0).unwrap();
        ds.write_i16(0).unwrap();
        ds.write_u32(0).unwrap();
        ds.finish().unwrap();

        let scores = DataSetHeader::new("Scores", 4).with_column(ColumnDescriptor::int32("Score"));
        let mut ds = group.begin_data_set(&scores).unwrap();
        for value in [-40_000, 0, 7, i32::MAX] {
            ds.write_i32(value).unwrap();
        }
        ds.finish().unwrap();

        group.finish().unwrap();
    }

    writer.begin_group("Marker").unwrap().finish().unwrap();
    writer.finish().unwrap();
    file
}
