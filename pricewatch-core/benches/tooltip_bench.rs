//! Criterion benchmarks for the pointer-move and rebuild paths.
//!
//! Benchmarks:
//! 1. Tooltip composition (runs once per pointer move)
//! 2. Full chart rebuild (runs on period change / refresh)

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pricewatch_core::{EngineConfig, PriceChart, RawSample, StoreBatch};

// ── Helpers ──────────────────────────────────────────────────────────

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
}

/// `stores` stores sampled hourly with a per-store jitter, `n` samples each.
fn make_batches(stores: usize, n: usize) -> Vec<StoreBatch> {
    (0..stores)
        .map(|si| {
            let jitter = Duration::minutes((si as i64 * 7) % 60);
            let samples = (0..n)
                .map(|i| {
                    let price = 1000.0 + (si as f64 * 25.0) + (i as f64 * 0.1).sin() * 50.0;
                    RawSample {
                        timestamp: base() + Duration::hours(i as i64) + jitter,
                        price: (i % 17 != 0).then_some(price),
                        stock: u32::from(i % 23 != 0),
                    }
                })
                .collect();
            StoreBatch::new(format!("store{si}"), 1.0 + si as f64 * 0.01, samples)
        })
        .collect()
}

fn now_after(n: usize) -> DateTime<Utc> {
    base() + Duration::hours(n as i64 + 1)
}

// ── 1. Tooltip composition ───────────────────────────────────────────

fn bench_tooltip(c: &mut Criterion) {
    let mut group = c.benchmark_group("tooltip_compose");

    for &samples in &[720, 2160, 8760] {
        let batches = make_batches(8, samples);
        let chart =
            PriceChart::build(batches, &EngineConfig::default(), now_after(samples)).unwrap();
        let queries: Vec<DateTime<Utc>> = (0..256i64)
            .map(|i| base() + Duration::minutes(i * 97 % (samples as i64 * 60)))
            .collect();

        group.bench_with_input(BenchmarkId::new("8_stores", samples), &samples, |b, _| {
            b.iter(|| {
                for &q in &queries {
                    black_box(chart.tooltip(black_box(q)).ranked());
                }
            });
        });
    }

    group.finish();
}

// ── 2. Chart rebuild ─────────────────────────────────────────────────

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("chart_rebuild");

    for &samples in &[720, 8760] {
        let batches = make_batches(8, samples);
        let config = EngineConfig::default();
        group.bench_with_input(BenchmarkId::new("8_stores", samples), &samples, |b, _| {
            b.iter(|| {
                PriceChart::build(black_box(batches.clone()), &config, now_after(samples)).unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tooltip, bench_rebuild);
criterion_main!(benches);
