use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use gendata::{
    labels, ColumnDescriptor, DataSet, DataSetHeader, GenericData, GenericDataHeader,
    GenericFileWriter, ParallelProcessor, ParallelReader,
};
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

/// Sums an intensity data set across threads.
#[derive(Parser)]
struct Args {
    #[arg(short, long, default_value_t = 50_000_000)]
    rows: u32,

    /// Worker threads (0 = all cores)
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    #[arg(short, long, default_value = "test_parallel.gdf")]
    output: String,
}

#[derive(Clone, Default)]
pub struct Processor {
    local: [u64; 3],
    global: Arc<Mutex<[u64; 3]>>,
}
impl Processor {
    pub fn final_counts(&self) -> [u64; 3] {
        *self.global.lock()
    }
}
impl ParallelProcessor for Processor {
    fn process_row(&mut self, ds: &mut DataSet, row: usize) -> gendata::Result<()> {
        self.local[0] += ds.get_u16(row, 0)? as u64;
        self.local[1] += ds.get_u16(row, 1)? as u64;
        self.local[2] += ds.get_f32(row, 2)? as u64;
        Ok(())
    }
    fn on_batch_complete(&mut self) -> gendata::Result<()> {
        let mut guard = self.global.lock();
        for (total, local) in guard.iter_mut().zip(self.local) {
            *total += local;
        }
        self.local = [0; 3];
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    println!("Generic Data Parallel Test");
    println!("==========================");
    println!("Rows: {}\n", args.rows);

    println!("Writing...");
    let write_start = Instant::now();
    {
        let header = GenericDataHeader::new(labels::INTENSITY_FILE_TYPE_ID);
        let mut writer = GenericFileWriter::from_path(&args.output, &header)?;
        let mut group = writer.begin_group(labels::DEFAULT_GROUP_LABEL)?;
        let set = DataSetHeader::new(labels::INTENSITY_LABEL, args.rows)
            .with_column(ColumnDescriptor::uint16("X"))
            .with_column(ColumnDescriptor::uint16("Y"))
            .with_column(ColumnDescriptor::float(labels::INTENSITY_LABEL));
        let mut ds = group.begin_data_set(&set)?;
        for i in 0..args.rows {
            ds.write_u16((i % 1000) as u16)?;
            ds.write_u16((i / 1000 % 1000) as u16)?;
            ds.write_f32((i % 4096) as f32)?;
        }
        ds.finish()?;
        group.finish()?;
        writer.finish()?;
    }
    println!("  Duration: {:.2}s\n", write_start.elapsed().as_secs_f64());

    println!("Sequential...");
    let start = Instant::now();
    let data = GenericData::open(&args.output)?;
    let mut ds = data.data_set(0, 0)?;
    let mut expected = [0u64; 3];
    for row in 0..ds.rows() {
        expected[0] += ds.get_u16(row, 0)? as u64;
        expected[1] += ds.get_u16(row, 1)? as u64;
        expected[2] += ds.get_f32(row, 2)? as u64;
    }
    let sequential = start.elapsed();
    println!("  Duration: {:.2}s\n", sequential.as_secs_f64());

    println!("Parallel...");
    let start = Instant::now();
    let processor = Processor::default();
    ds.process_parallel(processor.clone(), args.threads)?;
    let parallel = start.elapsed();
    println!("  Duration: {:.2}s", parallel.as_secs_f64());
    println!(
        "  Speedup: {:.2}x\n",
        sequential.as_secs_f64() / parallel.as_secs_f64()
    );

    let counts = processor.final_counts();
    println!("Counts: {:?}", counts);
    anyhow::ensure!(counts == expected, "parallel sums differ from sequential");
    println!("  ✓ Sums match");

    std::fs::remove_file(&args.output)?;
    Ok(())
}
