use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dframe_columnar::{Series, ValueType};
use std::time::Duration;

fn bench_rows() -> usize {
    std::env::var("DFRAME_FAST_PATH_BENCH_ROWS")
        .ok()
        .and_then(|v| v.replace('_', "").parse::<usize>().ok())
        .filter(|&v| (10_000..=10_000_000).contains(&v))
        .unwrap_or(1_000_000)
}

fn bench_compare(c: &mut Criterion) {
    let rows = bench_rows();
    let left = Series::of_long((0..rows as i64).map(|v| v % 1_000).collect());
    let right = Series::of_long((0..rows as i64).map(|v| v % 997).collect());
    // Same values, generic encoding: forces the element-wise `Value` path.
    let boxed = left.unsafe_cast_as(ValueType::Object);

    let mut group = c.benchmark_group("long_eq");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(rows as u64));

    group.bench_with_input(BenchmarkId::new("primitive", rows), &rows, |b, _| {
        b.iter(|| black_box(left.eq(&right).unwrap()))
    });
    group.bench_with_input(BenchmarkId::new("generic", rows), &rows, |b, _| {
        b.iter(|| black_box(boxed.eq(&right).unwrap()))
    });
    group.finish();

    let mut group = c.benchmark_group("long_add");
    group.sample_size(10);
    group.throughput(Throughput::Elements(rows as u64));
    group.bench_with_input(BenchmarkId::new("primitive", rows), &rows, |b, _| {
        b.iter(|| black_box(left.add(&right).unwrap()))
    });
    group.bench_with_input(BenchmarkId::new("generic", rows), &rows, |b, _| {
        b.iter(|| black_box(boxed.add(&right).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_compare);
criterion_main!(benches);
