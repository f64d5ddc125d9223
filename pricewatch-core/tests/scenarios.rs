//! End-to-end scenarios: batch in, timeline/outages/tooltips out.

use chrono::{DateTime, Duration, TimeZone, Utc};
use pricewatch_core::{
    batch, ChartSession, EngineConfig, PriceChart, RawSample, StoreBatch, StoreId, Visibility,
};

fn t(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, day, hour, minute, 0).unwrap()
}

fn raw(ts: DateTime<Utc>, price: Option<f64>, stock: u32) -> RawSample {
    RawSample {
        timestamp: ts,
        price,
        stock,
    }
}

fn id(s: &str) -> StoreId {
    StoreId::from(s)
}

// ── Section: exact-instant query ─────────────────────────────────────

#[test]
fn query_at_shared_instant_reports_both_stores() {
    let t0 = t(1, 12, 0);
    let input = vec![
        StoreBatch::new("X", 1.0, vec![raw(t0, Some(1000.0), 1)]),
        StoreBatch::new("Y", 1.0, vec![raw(t0, Some(1100.0), 0)]),
    ];
    let chart = PriceChart::build(input, &EngineConfig::default(), t(1, 13, 0)).unwrap();

    let snapshot = chart.tooltip(t0);
    assert_eq!(snapshot.anchor, Some(t0));
    let x = snapshot.entry(&id("X")).unwrap();
    let y = snapshot.entry(&id("Y")).unwrap();
    assert!(x.has_data && y.has_data);
    assert_eq!(x.converted_price, Some(1000));
    assert_eq!(y.converted_price, Some(1100));

    // X had stock, so t0 is not an outage
    assert!(chart.outages().iter().all(|o| !o.contains(0)));
}

// ── Section: shared outage over three hours ──────────────────────────

#[test]
fn contiguous_outage_hours_give_one_interval() {
    let x = vec![
        raw(t(2, 1, 0), Some(500.0), 0),
        raw(t(2, 2, 0), Some(500.0), 0),
        raw(t(2, 3, 0), Some(500.0), 0),
        raw(t(2, 4, 0), Some(500.0), 1),
    ];
    let y = vec![
        raw(t(2, 1, 20), None, 0),
        raw(t(2, 2, 20), None, 0),
        raw(t(2, 3, 20), None, 0),
        raw(t(2, 4, 20), Some(520.0), 1),
    ];
    let input = vec![StoreBatch::new("X", 1.0, x), StoreBatch::new("Y", 1.0, y)];
    let chart = PriceChart::build(input, &EngineConfig::default(), t(2, 6, 0)).unwrap();

    assert_eq!(chart.outages().len(), 1);
    let (start, end) = chart.outage_spans()[0];
    assert_eq!(start, t(2, 1, 0));
    assert_eq!(end, t(2, 3, 20));
}

// ── Section: a store without samples ─────────────────────────────────

#[test]
fn store_without_samples_never_has_data_and_is_ignored_for_outages() {
    let x = vec![
        raw(t(3, 1, 0), Some(10.0), 0),
        raw(t(3, 2, 0), Some(10.0), 0),
    ];
    let with_z = vec![
        StoreBatch::new("X", 1.0, x.clone()),
        StoreBatch::new("Z", 1.0, vec![]),
    ];
    let without_z = vec![StoreBatch::new("X", 1.0, x)];

    let now = t(3, 5, 0);
    let chart = PriceChart::build(with_z, &EngineConfig::default(), now).unwrap();
    let reference = PriceChart::build(without_z, &EngineConfig::default(), now).unwrap();
    assert_eq!(chart.outages(), reference.outages());
    assert_eq!(chart.timeline(), reference.timeline());

    for minute in [0, 30, 59] {
        let snapshot = chart.tooltip(t(3, 2, minute));
        assert!(!snapshot.entry(&id("Z")).unwrap().has_data);
    }
}

// ── Section: cadence mismatch and staleness ──────────────────────────

#[test]
fn slow_store_goes_stale_between_checks() {
    // fast checks every 15 minutes, slow once at 10:00
    let fast: Vec<RawSample> = (0..8)
        .map(|i| raw(t(4, 10, 0) + Duration::minutes(15 * i), Some(100.0), 1))
        .collect();
    let slow = vec![raw(t(4, 10, 0), Some(90.0), 1)];
    let input = vec![
        StoreBatch::new("fast", 1.0, fast),
        StoreBatch::new("slow", 1.0, slow),
    ];
    let config = EngineConfig::from_toml("check_interval_secs = 1800").unwrap();
    let chart = PriceChart::build(input, &config, t(4, 13, 0)).unwrap();

    let early = chart.tooltip(t(4, 10, 20));
    assert_eq!(early.anchor, Some(t(4, 10, 15)));
    assert!(early.entry(&id("slow")).unwrap().has_data);
    assert_eq!(early.cheapest().unwrap().store_id, id("slow"));

    let late = chart.tooltip(t(4, 11, 40));
    assert_eq!(late.anchor, Some(t(4, 11, 30)));
    let slow = late.entry(&id("slow")).unwrap();
    assert!(!slow.has_data);
    assert_eq!(slow.converted_price, None);
    assert_eq!(late.ranked().last().unwrap().entry.store_id, id("slow"));
}

#[test]
fn query_before_any_sample_is_empty() {
    let input = vec![StoreBatch::new("a", 1.0, vec![raw(t(5, 10, 0), Some(1.0), 1)])];
    let chart = PriceChart::build(input, &EngineConfig::default(), t(5, 12, 0)).unwrap();
    let snapshot = chart.tooltip(t(5, 9, 0));
    assert!(snapshot.entries.is_empty());
    assert!(snapshot.anchor.is_none());
}

// ── Section: currency normalization in the ranking ───────────────────

#[test]
fn foreign_currency_store_is_ranked_after_conversion() {
    let at = t(6, 9, 0);
    let input = vec![
        StoreBatch::new("home", 1.0, vec![raw(at, Some(1200.0), 3)]),
        StoreBatch::new("abroad", 11.0, vec![raw(at, Some(99.0), 1)]),
        StoreBatch::new("gone", 1.0, vec![raw(t(5, 9, 0), Some(1.0), 1)]),
    ];
    let chart = PriceChart::build(input, &EngineConfig::default(), t(6, 10, 0)).unwrap();
    let ranked = chart.tooltip(at).ranked();

    let order: Vec<&str> = ranked.iter().map(|r| r.entry.store_id.as_str()).collect();
    assert_eq!(order, vec!["abroad", "home", "gone"]);
    assert_eq!(ranked[0].entry.converted_price, Some(1089));
    assert_eq!(ranked[1].delta_from_cheapest, Some(111));
    assert_eq!(ranked[2].delta_from_cheapest, None);
}

// ── Section: session swaps and legend ────────────────────────────────

#[test]
fn period_change_swaps_whole_chart() {
    let input = || {
        vec![
            StoreBatch::new(
                "a",
                1.0,
                vec![raw(t(1, 0, 0), Some(5.0), 1), raw(t(20, 0, 0), Some(6.0), 1)],
            ),
            StoreBatch::new("b", 1.0, vec![raw(t(20, 0, 0), Some(7.0), 1)]),
        ]
    };
    let now = t(21, 0, 0);
    let mut session = ChartSession::new();
    session.replace(PriceChart::build(input(), &EngineConfig::default(), now).unwrap());
    assert_eq!(session.chart().unwrap().timeline().len(), 3);

    session.toggle(&id("b"));
    let config = EngineConfig::from_toml("period = \"7d\"").unwrap();
    let previous = session
        .replace(PriceChart::build(input(), &config, now).unwrap())
        .unwrap();
    assert_eq!(previous.timeline().len(), 3);
    assert_eq!(session.chart().unwrap().timeline().len(), 2);

    // the old day-1 sample is gone from the new chart's index
    assert!(session.tooltip(t(2, 0, 0)).rows.is_empty());
    assert_eq!(session.visibility(), &Visibility::IsolatedOn(id("b")));
    let rows = session.tooltip(t(20, 0, 0)).rows;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entry.store_id, id("b"));
}

// ── Section: wire formats ────────────────────────────────────────────

#[test]
fn json_batch_builds_the_same_chart_as_typed_input() {
    let json = r#"[
        {"store_id": "a", "currency_rate": 2.0, "samples": [
            {"timestamp": "2024-09-07T08:00:00Z", "price": 50.0, "stock": 1}
        ]},
        {"store_id": "b", "samples": [
            {"timestamp": "2024-09-07T08:30:00Z", "price": null, "stock": 0}
        ]}
    ]"#;
    let from_json = batch::from_json_str(json).unwrap();
    let typed = vec![
        StoreBatch::new("a", 2.0, vec![raw(t(7, 8, 0), Some(50.0), 1)]),
        StoreBatch::new("b", 1.0, vec![raw(t(7, 8, 30), None, 0)]),
    ];
    assert_eq!(from_json, typed);

    let chart = PriceChart::build(from_json, &EngineConfig::default(), t(7, 9, 0)).unwrap();
    assert_eq!(chart.price_lines()[&id("a")], vec![Some(100), None, None]);
    assert!(chart.has_displayable_prices());
}

#[test]
fn unsorted_json_batch_is_rejected() {
    let json = r#"[{"store_id": "a", "samples": [
        {"timestamp": "2024-09-07T09:00:00Z", "price": 1.0, "stock": 1},
        {"timestamp": "2024-09-07T08:00:00Z", "price": 1.0, "stock": 1}
    ]}]"#;
    let batches = batch::from_json_str(json).unwrap();
    let err = PriceChart::build(batches, &EngineConfig::default(), t(7, 10, 0)).unwrap_err();
    assert!(err.to_string().contains("not strictly ascending"));
}
