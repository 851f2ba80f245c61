//! Decompression and integer codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hlpdec_bench::utils::{help_text, random_data};
use hlpdec_codec::{compress, decompress, read_compressed_u32, scan_long, Method};
use hlpdec_storage::MemoryFile;

const METHODS: [Method; 4] = [Method::Copy, Method::RunLength, Method::Lz77, Method::Combined];

/// Benchmark expanding help-like text with every method.
fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress");

    for size in [4096usize, 65536] {
        let text = help_text(size);
        for method in METHODS {
            let packed = compress(method, &text);
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("{method:?}"), size),
                &packed,
                |b, packed| {
                    let mut out = vec![0u8; size];
                    b.iter(|| {
                        let mut source = MemoryFile::reader(packed);
                        let mut sink = MemoryFile::writer(&mut out);
                        let produced =
                            decompress(method, &mut source, packed.len() as u64, &mut sink).unwrap();
                        black_box(produced);
                    });
                },
            );
        }
    }

    group.finish();
}

/// Benchmark LZ77 on incompressible input, where every token is a literal.
fn bench_decompress_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress_random");
    let data = random_data(65536);
    let packed = compress(Method::Lz77, &data);
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("lz77_64k", |b| {
        let mut out = vec![0u8; data.len()];
        b.iter(|| {
            let mut source = MemoryFile::reader(&packed);
            let mut sink = MemoryFile::writer(&mut out);
            black_box(decompress(Method::Lz77, &mut source, packed.len() as u64, &mut sink).unwrap());
        });
    });

    group.finish();
}

/// Benchmark the compressor used to build fixtures.
fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");
    let text = help_text(65536);
    group.throughput(Throughput::Bytes(text.len() as u64));

    for method in [Method::RunLength, Method::Lz77, Method::Combined] {
        group.bench_function(format!("{method:?}"), |b| {
            b.iter(|| black_box(compress(method, black_box(&text))));
        });
    }

    group.finish();
}

/// Benchmark reading compressed integers.
fn bench_compressed_ints(c: &mut Criterion) {
    let mut group = c.benchmark_group("compressed_ints");

    // 1000 long-form stream dwords
    let mut stream = Vec::new();
    for i in 0..1000u32 {
        stream.extend_from_slice(&(((i * 40_000) << 1) | 1).to_le_bytes());
    }
    group.bench_function("stream_u32_x1000", |b| {
        b.iter(|| {
            let mut file = MemoryFile::reader(&stream);
            for _ in 0..1000 {
                black_box(read_compressed_u32(&mut file).unwrap());
            }
        });
    });

    // 1000 short-form link longs
    let link: Vec<u8> = (0..1000u16)
        .flat_map(|i| ((i + 0x4000) << 1).to_le_bytes())
        .collect();
    group.bench_function("link_long_x1000", |b| {
        b.iter(|| {
            let mut buf = link.as_slice();
            for _ in 0..1000 {
                black_box(scan_long(&mut buf).unwrap());
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_decompress,
    bench_decompress_random,
    bench_compress,
    bench_compressed_ints,
);

criterion_main!(benches);
