use std::time::Instant;

use anyhow::{ensure, Result};
use clap::Parser;
use gendata::{
    labels, ColumnDescriptor, DataSetHeader, GenericDataHeader, GenericFileWriter, Parameter,
    ParameterValue, TocAccessMode, TocReader, TocWriter,
};
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Generates a library-style file with one random probe set per Data Group
/// and reads records back in random order through the table of contents.
#[derive(Parser)]
struct Args {
    /// Output file path
    #[clap(required = true)]
    path: String,
    /// Number of probe sets to generate
    #[clap(long, default_value_t = 20_000)]
    records: u32,
    /// Maximum atoms per probe set
    #[clap(long, default_value_t = 16)]
    max_atoms: u32,
    /// Random lookups to perform after writing
    #[clap(long, default_value_t = 10_000)]
    lookups: usize,
    #[clap(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = if let Some(seed) = args.seed {
        SmallRng::seed_from_u64(seed)
    } else {
        SmallRng::from_os_rng()
    };

    let mut header = GenericDataHeader::new(labels::CDF_FILE_TYPE_ID);
    header.add_parameter(Parameter::new(labels::ROWS_PARAM, ParameterValue::UInt32(1164)));
    header.add_parameter(Parameter::new(labels::COLS_PARAM, ParameterValue::UInt32(1164)));

    let start = Instant::now();
    let writer = GenericFileWriter::from_path(&args.path, &header)?;
    let mut toc = TocWriter::new(writer, labels::PROBE_SET_NAMES_LABEL, args.records)?;
    let mut atom_counts = Vec::with_capacity(args.records as usize);
    for i in 0..args.records {
        let atoms = rng.random_range(1..=args.max_atoms);
        atom_counts.push(atoms);

        let mut group = toc.begin_record(&format!("{}_at", i))?;
        let set = DataSetHeader::new("Atoms", atoms)
            .with_column(ColumnDescriptor::uint16("X"))
            .with_column(ColumnDescriptor::uint16("Y"))
            .with_column(ColumnDescriptor::uint8("Match"));
        let mut ds = group.begin_data_set(&set)?;
        for _ in 0..atoms {
            ds.write_u16(rng.random_range(0..1164))?;
            ds.write_u16(rng.random_range(0..1164))?;
            ds.write_u8(rng.random_range(0..2))?;
        }
        ds.finish()?;
        group.finish()?;
    }
    toc.finish()?;
    let elapsed = start.elapsed();

    let total_bytes = std::fs::metadata(&args.path)?.len();
    eprintln!("Finished generating {} probe sets", args.records);
    eprintln!("Elapsed time: {:?}", elapsed);
    eprintln!(
        "Bandwidth: {:.2} Gb/s",
        total_bytes as f64 / elapsed.as_millis().max(1) as f64 * 1000.0 / 1_000_000_000.0
    );

    if args.records == 0 {
        return Ok(());
    }
    let start = Instant::now();
    let mut by_index = TocReader::open(&args.path, TocAccessMode::ByIndex)?;
    let mut by_name = TocReader::open(&args.path, TocAccessMode::ByName)?;
    for _ in 0..args.lookups {
        let index = rng.random_range(0..args.records) as usize;
        let a = by_index.record(index)?;
        let b = by_name.record_by_name(&format!("{}_at", index))?;
        ensure!(a.header() == b.header(), "index and name lookups disagree");
        ensure!(
            a.data_set(0)?.rows() == atom_counts[index] as usize,
            "atom count mismatch"
        );
    }
    eprintln!("Checked {} random lookups in {:?}", args.lookups, start.elapsed());

    Ok(())
}
