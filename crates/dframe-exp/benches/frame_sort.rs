use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dframe_exp::columnar::Series;
use dframe_exp::{col, int_col, DataFrame};
use std::time::Duration;

fn bench_rows() -> usize {
    std::env::var("DFRAME_FRAME_SORT_BENCH_ROWS")
        .ok()
        .and_then(|v| v.replace('_', "").parse::<usize>().ok())
        .filter(|&v| (10_000..=5_000_000).contains(&v))
        .unwrap_or(500_000)
}

fn build_frame(rows: usize) -> DataFrame {
    // Few distinct keys so the second key and stability both matter.
    let keys: Vec<i32> = (0..rows).map(|i| ((i * 7_919) % 64) as i32).collect();
    let values: Vec<i64> = (0..rows as i64).map(|i| (i * 104_729) % 10_007).collect();
    DataFrame::new(&["k", "v"], vec![Series::of_int(keys), Series::of_long(values)])
        .expect("frame")
}

fn bench_sort(c: &mut Criterion) {
    let rows = bench_rows();
    let df = build_frame(rows);

    let mut group = c.benchmark_group("frame_sort");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(rows as u64));

    group.bench_with_input(BenchmarkId::new("one_key", rows), &rows, |b, _| {
        b.iter(|| black_box(df.sort_index(&[int_col("k").asc()]).unwrap()))
    });
    group.bench_with_input(BenchmarkId::new("two_keys", rows), &rows, |b, _| {
        b.iter(|| black_box(df.sort_index(&[col("k").asc(), col("v").desc()]).unwrap()))
    });
    group.bench_with_input(BenchmarkId::new("sort_and_materialize", rows), &rows, |b, _| {
        b.iter(|| black_box(df.sort(&[col("k").asc()]).unwrap().materialize()))
    });
    group.finish();
}

criterion_group!(benches, bench_sort);
criterion_main!(benches);
