//! Benchmarks for shell cloud generation
//!
//! Measures performance of:
//! - Single-shell sampling at increasing quotas
//! - Full cloud sampling
//! - Rebuild against the headless scene

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, SeedableRng};
use shellcloud_core::{
    generate_shell, sample_cloud, shell_quotas, CloudBuilder, GenerationParameters, MemoryScene,
    MeshId, ShellBand, SizeRange,
};

/// Benchmark sampling a single shell
fn bench_generate_shell(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_shell");
    let band = ShellBand::of(3, 7, 50.0);
    let sizes = SizeRange::new(0.5, 3.0);

    for &quota in &[100u32, 1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(quota as u64));
        group.bench_with_input(BenchmarkId::from_parameter(quota), &quota, |b, &q| {
            let mut rng = StdRng::seed_from_u64(1);
            b.iter(|| generate_shell(&mut rng, black_box(&band), black_box(q), sizes))
        });
    }
    group.finish();
}

/// Benchmark quota computation for many shells
fn bench_quotas(c: &mut Criterion) {
    let mut group = c.benchmark_group("shell_quotas");

    for &shells in &[7u32, 64, 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(shells), &shells, |b, &n| {
            b.iter(|| shell_quotas(black_box(1_000_000), black_box(n)))
        });
    }
    group.finish();
}

/// Benchmark sampling every shell of a cloud
fn bench_sample_cloud(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_cloud");
    group.sample_size(20);

    for &count in &[10_000u32, 100_000] {
        let params = GenerationParameters::default().with_triangle_count(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &params, |b, p| {
            let mut rng = StdRng::seed_from_u64(2);
            b.iter(|| sample_cloud(&mut rng, black_box(p)))
        });
    }
    group.finish();
}

/// Benchmark a full rebuild including disposal of the previous cloud
fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");
    group.sample_size(20);

    let params = GenerationParameters::default();
    let mut scene = MemoryScene::new();
    let mut builder: CloudBuilder<MeshId, StdRng> = CloudBuilder::new(StdRng::seed_from_u64(3));

    group.throughput(Throughput::Elements(params.total_triangle_count as u64));
    group.bench_function("default", |b| {
        b.iter(|| builder.rebuild(&mut scene, black_box(params)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_generate_shell,
    bench_quotas,
    bench_sample_cloud,
    bench_rebuild,
);

criterion_main!(benches);
