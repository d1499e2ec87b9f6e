use std::time::Instant;

use anyhow::{ensure, Result};
use clap::Parser;
use gendata::{
    labels, Backing, ColumnDescriptor, DataSetHeader, GenericData, GenericDataHeader,
    GenericFileWriter, Parameter, ParameterValue, ReadOptions,
};
use tracing_subscriber::EnvFilter;

/// Writes an intensity-like file and reads it back through both backings.
#[derive(Parser)]
struct Args {
    /// Number of rows in the intensity data set
    #[arg(short, long, default_value_t = 10_000_000)]
    rows: u32,

    /// Output path
    #[arg(short, long, default_value = "test_roundtrip.gdf")]
    output: String,

    /// Mapping window cap in MiB
    #[arg(short, long, default_value_t = 64)]
    window_mib: usize,

    /// Keep the file after the run
    #[arg(long)]
    keep: bool,
}

const ROW_SIZE: u64 = 2 + 2 + 4;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    println!("Generic Data Roundtrip Test");
    println!("===========================");
    println!("Rows: {}", args.rows);
    println!(
        "Payload size: ~{:.2} GB\n",
        (args.rows as u64 * ROW_SIZE) as f64 / 1_000_000_000.0
    );

    let mut header = GenericDataHeader::new(labels::INTENSITY_FILE_TYPE_ID);
    header.file_id = "roundtrip".to_string();
    header.add_parameter(Parameter::text_reserved(
        labels::ARRAY_TYPE_PARAM,
        "HG-U133A",
        labels::ARRAY_TYPE_MAX_LEN,
    ));

    // ========== WRITE TEST ==========
    println!("Writing...");
    let write_start = Instant::now();
    {
        let mut writer = GenericFileWriter::from_path(&args.output, &header)?;
        let mut group = writer.begin_group(labels::DEFAULT_GROUP_LABEL)?;
        let set = DataSetHeader::new(labels::INTENSITY_LABEL, args.rows)
            .with_column(ColumnDescriptor::uint16("X"))
            .with_column(ColumnDescriptor::uint16("Y"))
            .with_column(ColumnDescriptor::float(labels::INTENSITY_LABEL));
        let mut ds = group.begin_data_set(&set)?;
        for i in 0..args.rows {
            ds.write_u16((i % 1164) as u16)?;
            ds.write_u16((i / 1164) as u16)?;
            ds.write_f32(intensity(i))?;
        }
        ds.finish()?;
        group.finish()?;
        writer.finish()?;
    }
    let write_duration = write_start.elapsed();
    println!("  ✓ Write complete");
    println!("  Duration: {:.2}s", write_duration.as_secs_f64());
    println!(
        "  Rate: {:.2} M rows/s\n",
        args.rows as f64 / write_duration.as_secs_f64() / 1_000_000.0
    );

    // ========== READ TEST ==========
    let mapped = ReadOptions::default().max_map_window(args.window_mib * 1024 * 1024);
    let buffered = ReadOptions::default().backing(Backing::Buffered);
    let mut checksums = Vec::new();
    for (label, options) in [("mapped", mapped), ("buffered", buffered)] {
        println!("Reading ({})...", label);
        let read_start = Instant::now();

        let data = GenericData::open_with(&args.output, options)?;
        ensure!(data.file_id() == "roundtrip", "unexpected file id");
        let mut ds = data.data_set_by_name(labels::DEFAULT_GROUP_LABEL, labels::INTENSITY_LABEL)?;
        ensure!(ds.rows() == args.rows as usize, "row count mismatch");

        let mut checksum = 0u64;
        for row in 0..ds.rows() {
            checksum ^= ds.get_u16(row, 0)? as u64;
            checksum ^= (ds.get_u16(row, 1)? as u64) << 16;
            checksum ^= (ds.get_f32(row, 2)?.to_bits() as u64) << 32;
        }
        let read_duration = read_start.elapsed();
        println!("  ✓ Read complete");
        println!("  Duration: {:.2}s", read_duration.as_secs_f64());
        println!(
            "  Rate: {:.2} M rows/s",
            ds.rows() as f64 / read_duration.as_secs_f64() / 1_000_000.0
        );
        println!("  Checksum: 0x{:016X}\n", checksum);
        checksums.push(checksum);
    }
    ensure!(checksums[0] == checksums[1], "backings disagree");

    // ========== Column Load ===========
    let start = Instant::now();
    let data = GenericData::open(&args.output)?;
    let mut ds = data.data_set(0, 0)?;
    let column = ds.get_f32_range(2, 0, ds.rows())?;
    let elapsed = start.elapsed();
    println!("Column Load:");
    println!("  Duration: {:.2}s", elapsed.as_secs_f64());
    println!(
        "  Rate: {:.2} M cells/s\n",
        column.len() as f64 / elapsed.as_secs_f64() / 1_000_000.0
    );

    // ========== CLEANUP ==========
    if !args.keep {
        std::fs::remove_file(&args.output)?;
        println!("✓ Test complete - file cleaned up");
    }
    Ok(())
}

fn intensity(i: u32) -> f32 {
    (i % 65_536) as f32 * 0.25
}
