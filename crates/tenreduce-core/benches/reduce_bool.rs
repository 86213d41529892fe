/// Boolean Reduction Benchmarks
///
/// Measures the scalar path against the per-axis path, and the serial kernel
/// against the rayon-backed one, across input sizes.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use tenreduce_core::ops::reduction::CpuReduceBoolKernel;
use tenreduce_core::{BoolReduceOp, DeclarableOp, LegacyReduceBoolOp, NDArray, OpContext};

struct BenchConfig {
    name: &'static str,
    rows: usize,
    cols: usize,
}

const SIZES: &[BenchConfig] = &[
    BenchConfig {
        name: "small_32x32",
        rows: 32,
        cols: 32,
    },
    BenchConfig {
        name: "medium_256x256",
        rows: 256,
        cols: 256,
    },
    BenchConfig {
        name: "large_1024x1024",
        rows: 1024,
        cols: 1024,
    },
];

fn input(config: &BenchConfig) -> NDArray {
    let data: Vec<f32> = (0..config.rows * config.cols)
        .map(|i| (i % 97) as f32 + 1.0)
        .collect();
    NDArray::from_vec(data, &[config.rows, config.cols]).unwrap()
}

fn run(op: &LegacyReduceBoolOp, x: &NDArray, axes: Vec<i64>) -> bool {
    let mut ctx = OpContext::new().with_input(x.clone()).with_i_args(axes);
    op.execute(&mut ctx).unwrap();
    ctx.output(0).is_some()
}

fn bench_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce_bool_paths");
    let op = LegacyReduceBoolOp::new(BoolReduceOp::All);

    for config in SIZES {
        let x = input(config);
        group.bench_with_input(BenchmarkId::new("scalar", config.name), &x, |b, x| {
            b.iter(|| black_box(run(&op, x, vec![])))
        });
        group.bench_with_input(BenchmarkId::new("rows", config.name), &x, |b, x| {
            b.iter(|| black_box(run(&op, x, vec![1])))
        });
        group.bench_with_input(BenchmarkId::new("columns", config.name), &x, |b, x| {
            b.iter(|| black_box(run(&op, x, vec![0])))
        });
    }
    group.finish();
}

fn bench_parallel_threshold(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce_bool_parallel");
    let serial = LegacyReduceBoolOp::with_kernel(
        BoolReduceOp::IsFinite,
        Arc::new(CpuReduceBoolKernel::with_parallel_threshold(usize::MAX)),
    );
    let parallel = LegacyReduceBoolOp::with_kernel(
        BoolReduceOp::IsFinite,
        Arc::new(CpuReduceBoolKernel::with_parallel_threshold(0)),
    );

    for config in SIZES {
        let x = input(config);
        group.bench_with_input(BenchmarkId::new("serial", config.name), &x, |b, x| {
            b.iter(|| black_box(run(&serial, x, vec![1])))
        });
        group.bench_with_input(BenchmarkId::new("parallel", config.name), &x, |b, x| {
            b.iter(|| black_box(run(&parallel, x, vec![1])))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_paths, bench_parallel_threshold);
criterion_main!(benches);
