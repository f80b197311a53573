use weiscreener::chart::{build_chart, AxisId, TRACES_PER_SERIES};
use weiscreener::data::{Candle, CandleSeries};
use weiscreener::indicators::IndicatorConfig;

/// Deterministic pseudo-random walk so the checks see jagged, realistic prices.
fn random_walk(label: &str, len: usize, seed: u64) -> CandleSeries {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as f64 / (1u64 << 31) as f64
    };

    let mut close = 0.05;
    let candles = (0..len)
        .map(|i| {
            let open = close;
            close = (open * (1.0 + (next() - 0.5) * 0.1)).max(1e-6);
            let high = open.max(close) * (1.0 + next() * 0.02);
            let low = open.min(close) * (1.0 - next() * 0.02);
            Candle::new(1_700_000_000_000 + i as i64 * 3_600_000, open, high, low, close)
        })
        .collect();
    CandleSeries::new(label, candles)
}

fn trace<'a>(chart: &'a weiscreener::chart::ChartSpec, name: &str) -> &'a [Option<f64>] {
    &chart
        .traces
        .iter()
        .find(|t| t.name == name)
        .unwrap_or_else(|| panic!("no trace {name}"))
        .y
}

#[test]
fn trace_count_scales_with_series() {
    let config = IndicatorConfig::default();
    for count in 1..=3 {
        let series: Vec<_> = (0..count)
            .map(|n| random_walk(&format!("T{n}"), 50, n as u64 + 1))
            .collect();
        let chart = build_chart(&series, &config).unwrap();
        assert_eq!(chart.traces.len(), TRACES_PER_SERIES * count);
        assert_eq!(chart.axes.len(), 5);
    }
}

#[test]
fn bollinger_upper_never_below_lower() {
    for seed in 1..20 {
        let series = random_walk("X", 120, seed);
        let chart = build_chart(&[series], &IndicatorConfig::default()).unwrap();
        let upper = trace(&chart, "X Bollinger High");
        let lower = trace(&chart, "X Bollinger Low");
        for (u, l) in upper.iter().zip(lower) {
            if let (Some(u), Some(l)) = (u, l) {
                assert!(u >= l, "upper {u} < lower {l}");
            }
        }
    }
}

#[test]
fn oscillators_stay_in_bounds() {
    for seed in 1..20 {
        let series = random_walk("X", 120, seed);
        let chart = build_chart(&[series], &IndicatorConfig::default()).unwrap();
        for name in ["X RSI", "X Stoch %K", "X Stoch %D"] {
            for v in trace(&chart, name).iter().flatten() {
                assert!((0.0..=100.0 + 1e-9).contains(v), "{name} out of range: {v}");
            }
        }
        assert!(trace(&chart, "X ATR").iter().flatten().all(|v| *v >= 0.0));
    }
}

#[test]
fn rising_closes_pin_rsi_at_one_hundred() {
    let candles = (0..40)
        .map(|i| {
            let c = 1.0 + i as f64;
            Candle::new(i * 60_000, c - 0.5, c + 0.1, c - 0.6, c)
        })
        .collect();
    let series = CandleSeries::new("UP", candles);
    let chart = build_chart(&[series], &IndicatorConfig::default()).unwrap();
    let rsi = trace(&chart, "UP RSI");
    assert!(rsi.iter().flatten().all(|v| *v == 100.0));
    assert_eq!(rsi.iter().flatten().count(), 27);
}

#[test]
fn flat_closes_keep_ema_exact() {
    let candles = (0..40)
        .map(|i| Candle::new(i * 60_000, 0.0123, 0.0124, 0.0122, 0.0123))
        .collect();
    let series = CandleSeries::new("FLAT", candles);
    let chart = build_chart(&[series], &IndicatorConfig::default()).unwrap();
    let ema = trace(&chart, "FLAT EMA (20)");

    assert!(ema[..19].iter().all(Option::is_none));
    assert!(ema[19..].iter().all(|v| *v == Some(0.0123)));
}

#[test]
fn building_twice_gives_identical_charts() {
    let series = vec![random_walk("DOGE", 80, 7), random_walk("SHIB", 80, 8)];
    let config = IndicatorConfig::default();
    assert_eq!(build_chart(&series, &config).unwrap(), build_chart(&series, &config).unwrap());
}

#[test]
fn compared_series_share_axes() {
    let series = vec![random_walk("DOGE", 40, 1), random_walk("SHIB", 40, 2)];
    let chart = build_chart(&series, &IndicatorConfig::default()).unwrap();

    assert_eq!(chart.traces.len(), 2 * TRACES_PER_SERIES);
    for id in AxisId::all() {
        let labels: Vec<_> = chart
            .traces_on(id)
            .map(|t| t.name.split(' ').next().unwrap_or_default())
            .collect();
        assert!(labels.contains(&"DOGE") && labels.contains(&"SHIB"), "{id:?}");
    }
}
