//! Virtual file benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hlpdec_bench::utils::random_data;
use hlpdec_storage::{copy_bytes, DiskFile, MemoryFile, VirtualFile};
use std::io::Write;
use tempfile::TempDir;

/// Benchmark byte-at-a-time reads, the decompressors' access pattern.
fn bench_get_byte(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_byte");

    for size in [1024usize, 65536] {
        let data = random_data(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("memory", size), &data, |b, data| {
            b.iter(|| {
                let mut file = MemoryFile::reader(data);
                let mut sum = 0u32;
                while let Some(byte) = file.get_byte().unwrap() {
                    sum = sum.wrapping_add(u32::from(byte));
                }
                black_box(sum);
            });
        });

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bench.dat");
        let mut raw = std::fs::File::create(&path).unwrap();
        raw.write_all(&data).unwrap();
        raw.sync_all().unwrap();
        drop(raw);

        group.bench_with_input(BenchmarkId::new("disk", size), &path, |b, path| {
            let mut file = DiskFile::open(path).unwrap();
            b.iter(|| {
                file.seek(0).unwrap();
                let mut sum = 0u32;
                while let Some(byte) = file.get_byte().unwrap() {
                    sum = sum.wrapping_add(u32::from(byte));
                }
                black_box(sum);
            });
        });
    }

    group.finish();
}

/// Benchmark buffered copies between files.
fn bench_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy_bytes");
    group.sample_size(50);

    for size in [4096usize, 1 << 20] {
        let data = random_data(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("memory", size), &data, |b, data| {
            let mut out = vec![0u8; size];
            b.iter(|| {
                let mut source = MemoryFile::reader(data);
                let mut sink = MemoryFile::writer(&mut out);
                black_box(copy_bytes(&mut source, size as u64, &mut sink).unwrap());
            });
        });

        group.bench_with_input(BenchmarkId::new("to_disk", size), &data, |b, data| {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("copy.dat");
            b.iter(|| {
                let mut source = MemoryFile::reader(data);
                let mut sink = DiskFile::create(&path).unwrap();
                black_box(copy_bytes(&mut source, size as u64, &mut sink).unwrap());
                sink.flush().unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_get_byte, bench_copy);

criterion_main!(benches);
