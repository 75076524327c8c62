//! Criterion benchmarks for the analysis hot paths.
//!
//! Benchmarks:
//! 1. Indicator computation (every default indicator)
//! 2. Level detection (pivots + Fibonacci ladder)
//! 3. Full pipeline (indicators through both recommendations)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use signalab_core::config::{AnalysisConfig, IndicatorParams, LevelParams};
use signalab_core::domain::{Bar, Series};
use signalab_core::indicators::compute_indicators;
use signalab_core::levels::LevelSet;
use signalab_core::analyze;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            let open = close - 0.3;
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000 + (i as u64 % 500_000),
            }
        })
        .collect()
}

// ── 1. Indicators ────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");
    let params = IndicatorParams::default();

    for &bar_count in &[252, 1260, 2520] {
        let bars = make_bars(bar_count);
        group.bench_with_input(BenchmarkId::new("default_set", bar_count), &bar_count, |b, _| {
            b.iter(|| compute_indicators(black_box(&bars), black_box(&params)));
        });
    }

    group.finish();
}

// ── 2. Levels ────────────────────────────────────────────────────────

fn bench_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("levels");
    let params = LevelParams::default();
    let bars = make_bars(1260);

    group.bench_function("detect_1260_bars", |b| {
        b.iter(|| LevelSet::detect(black_box(&bars), black_box(&params)));
    });

    group.finish();
}

// ── 3. Full pipeline ─────────────────────────────────────────────────

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let config = AnalysisConfig::default();

    for &bar_count in &[252, 1260] {
        let series = Series::new("BENCH", make_bars(bar_count)).unwrap();
        group.bench_with_input(BenchmarkId::new("analyze", bar_count), &bar_count, |b, _| {
            b.iter(|| analyze(black_box(&series), black_box(&config)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_indicators, bench_levels, bench_pipeline);
criterion_main!(benches);
