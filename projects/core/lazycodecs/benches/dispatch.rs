use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use lazycodecs::{ArrayBuffer, CodecOptions, Destination, ElementType, Namespace, ReadOptions};
use std::hint::black_box;

fn resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("Attribute Resolution");

    group.bench_function("cold (fresh namespace)", |b| {
        b.iter_batched(
            || Namespace::builder().build(),
            |namespace| black_box(namespace.get("zstd_decode").is_ok()),
            BatchSize::SmallInput,
        )
    });

    let namespace = Namespace::builder().build();
    let _ = namespace.get("zstd_decode");
    group.bench_function("cached", |b| {
        b.iter(|| black_box(namespace.get(black_box("zstd_decode")).is_ok()))
    });

    group.bench_function("cached alias", |b| {
        b.iter(|| black_box(namespace.get(black_box("j2k_decode")).is_ok()))
    });

    group.finish();
}

fn read_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Read Dispatch");
    let namespace = Namespace::builder().build();

    // 64 KiB of float32 samples as NPY
    let array = ArrayBuffer::new(vec![0u8; 65536], vec![128, 128], ElementType::F32)
        .expect("valid shape");
    let mut npy = Vec::new();
    namespace
        .write(
            Destination::Stream(&mut npy),
            &array,
            Some("numpy".into()),
            &CodecOptions::new(),
        )
        .expect("numpy encode");

    group.throughput(criterion::Throughput::Bytes(npy.len() as u64));
    group.bench_function("numpy via fallback order", |b| {
        b.iter(|| namespace.read(black_box(&npy), &ReadOptions::new()))
    });
    group.bench_function("numpy by name", |b| {
        let options = ReadOptions::new().codec("numpy");
        b.iter(|| namespace.read(black_box(&npy), &options))
    });

    group.finish();
}

criterion_group!(benches, resolution, read_dispatch);
criterion_main!(benches);
