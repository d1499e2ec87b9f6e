use criterion::{criterion_group, criterion_main, Criterion};
use std::{hint::black_box, path::Path};

use gendata::{
    Backing, ColumnDescriptor, DataSetHeader, GenericData, GenericDataHeader, GenericFileWriter,
    ReadOptions,
};
use tempfile::NamedTempFile;

const ROWS: u32 = 1_000_000;

fn intensity_header(rows: u32) -> DataSetHeader {
    DataSetHeader::new("Intensity", rows)
        .with_column(ColumnDescriptor::uint16("X"))
        .with_column(ColumnDescriptor::uint16("Y"))
        .with_column(ColumnDescriptor::float("Intensity"))
}

fn write_file(path: &Path, rows: u32) {
    let header = GenericDataHeader::new("affymetrix-calvin-intensity");
    let mut writer = GenericFileWriter::from_path(path, &header).unwrap();
    let mut group = writer.begin_group("Default Group").unwrap();
    let mut ds = group.begin_data_set(&intensity_header(rows)).unwrap();
    for i in 0..rows {
        ds.write_u16((i % 1164) as u16).unwrap();
        ds.write_u16((i / 1164) as u16).unwrap();
        ds.write_f32(i as f32 * 0.5).unwrap();
    }
    ds.finish().unwrap();
    group.finish().unwrap();
    writer.finish().unwrap();
}

fn bench_io(c: &mut Criterion) {
    let mut group = c.benchmark_group("io");
    let file = NamedTempFile::new().unwrap();

    group.bench_function("write", |b| {
        b.iter(|| write_file(file.path(), black_box(ROWS)));
    });

    write_file(file.path(), ROWS);
    let variants = [
        ("cell_read_mapped", ReadOptions::default()),
        (
            "cell_read_small_window",
            ReadOptions::default().max_map_window(1024 * 1024),
        ),
        (
            "cell_read_buffered",
            ReadOptions::default().backing(Backing::Buffered),
        ),
    ];
    for (name, options) in variants {
        group.bench_function(name, |b| {
            b.iter(|| {
                let data = GenericData::open_with(file.path(), options).unwrap();
                let mut ds = data.data_set(0, 0).unwrap();
                let mut sum = 0.0f64;
                for row in 0..ds.rows() {
                    sum += ds.get_f32(row, 2).unwrap() as f64;
                }
                black_box(sum)
            });
        });
    }

    group.bench_function("column_range_read", |b| {
        b.iter(|| {
            let data = GenericData::open(file.path()).unwrap();
            let mut ds = data.data_set(0, 0).unwrap();
            black_box(ds.get_f32_range(2, 0, ds.rows()).unwrap())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_io);
criterion_main!(benches);
