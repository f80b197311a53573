//! Technical indicators over candle series.
//!
//! Every function returns one entry per input value. Entries inside the
//! indicator's lookback window are `None`.

use crate::data::CandleSeries;
use serde::{Deserialize, Serialize};

/// Window lengths and multipliers for the indicator bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub ema_window: usize,
    pub bollinger_window: usize,
    pub bollinger_multiplier: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub rsi_window: usize,
    pub stoch_window: usize,
    pub stoch_smooth: usize,
    pub atr_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ema_window: 20,
            bollinger_window: 20,
            bollinger_multiplier: 2.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            rsi_window: 14,
            stoch_window: 14,
            stoch_smooth: 3,
            atr_window: 14,
        }
    }
}

impl IndicatorConfig {
    pub fn sanitized(mut self) -> Self {
        let defaults = IndicatorConfig::default();
        for (value, default) in [
            (&mut self.ema_window, defaults.ema_window),
            (&mut self.bollinger_window, defaults.bollinger_window),
            (&mut self.macd_fast, defaults.macd_fast),
            (&mut self.macd_slow, defaults.macd_slow),
            (&mut self.macd_signal, defaults.macd_signal),
            (&mut self.rsi_window, defaults.rsi_window),
            (&mut self.stoch_window, defaults.stoch_window),
            (&mut self.stoch_smooth, defaults.stoch_smooth),
            (&mut self.atr_window, defaults.atr_window),
        ] {
            if *value == 0 {
                *value = default;
            }
        }

        if self.macd_fast >= self.macd_slow {
            self.macd_fast = defaults.macd_fast;
            self.macd_slow = defaults.macd_slow;
        }

        if !self.bollinger_multiplier.is_finite() || self.bollinger_multiplier < 0.0 {
            self.bollinger_multiplier = defaults.bollinger_multiplier;
        }
        self
    }
}

/// The derived series for one [`CandleSeries`], aligned by index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub ema: Vec<Option<f64>>,
    pub bollinger_upper: Vec<Option<f64>>,
    pub bollinger_lower: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub stoch_k: Vec<Option<f64>>,
    pub stoch_d: Vec<Option<f64>>,
    pub atr: Vec<Option<f64>>,
}

impl IndicatorSet {
    /// Number of derived sub-series per candle series.
    pub const SUB_SERIES: usize = 9;

    pub fn compute(series: &CandleSeries, config: &IndicatorConfig) -> Self {
        let closes = series.closes();
        let highs = series.highs();
        let lows = series.lows();

        let bands = bollinger(&closes, config.bollinger_window, config.bollinger_multiplier);
        let macd = macd(&closes, config.macd_fast, config.macd_slow, config.macd_signal);
        let stoch = stochastic(&highs, &lows, &closes, config.stoch_window, config.stoch_smooth);

        Self {
            ema: ema(&closes, config.ema_window),
            bollinger_upper: bands.upper,
            bollinger_lower: bands.lower,
            macd: macd.line,
            macd_signal: macd.signal,
            rsi: rsi(&closes, config.rsi_window),
            stoch_k: stoch.k,
            stoch_d: stoch.d,
            atr: atr(&highs, &lows, &closes, config.atr_window),
        }
    }
}

/// Recursive exponential smoothing, seeded with the first defined value.
///
/// `None` inputs are skipped and produce `None`. An output is only emitted
/// once `min_periods` defined inputs have been seen.
fn smooth(values: &[Option<f64>], alpha: f64, min_periods: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut state: Option<f64> = None;
    let mut seen = 0;

    for value in values {
        let Some(v) = *value else {
            out.push(None);
            continue;
        };

        let next = match state {
            // prev + a*(v - prev) keeps a flat series exactly flat
            Some(prev) => prev + alpha * (v - prev),
            None => v,
        };
        state = Some(next);
        seen += 1;
        out.push((seen >= min_periods).then_some(next));
    }

    out
}

pub fn ema(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let defined: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    ema_of(&defined, window)
}

fn ema_of(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    smooth(values, 2.0 / (window as f64 + 1.0), window)
}

pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 || values.len() < window {
        return vec![None; values.len()];
    }

    let mut out = vec![None; window - 1];
    for i in (window - 1)..values.len() {
        let sum: f64 = values[(i + 1 - window)..=i].iter().sum();
        out.push(Some(sum / window as f64));
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub middle: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Moving average with an envelope at `multiplier` population standard deviations.
pub fn bollinger(values: &[f64], window: usize, multiplier: f64) -> BollingerBands {
    let middle = sma(values, window);
    let mut upper = Vec::with_capacity(values.len());
    let mut lower = Vec::with_capacity(values.len());

    for (i, mean) in middle.iter().enumerate() {
        match mean {
            Some(mean) => {
                let slice = &values[(i + 1 - window)..=i];
                let variance =
                    slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / window as f64;
                let width = multiplier * variance.sqrt();
                upper.push(Some(mean + width));
                lower.push(Some(mean - width));
            }
            None => {
                upper.push(None);
                lower.push(None);
            }
        }
    }

    BollingerBands {
        middle,
        upper,
        lower,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
}

pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);

    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = ema_of(&line, signal);

    Macd { line, signal }
}

/// Relative strength index with Wilder smoothing (alpha = 1/window).
pub fn rsi(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut gains = Vec::with_capacity(values.len());
    let mut losses = Vec::with_capacity(values.len());
    // no change before the first close
    gains.push(Some(0.0));
    losses.push(Some(0.0));
    for pair in values.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(Some(change.max(0.0)));
        losses.push(Some((-change).max(0.0)));
    }

    let alpha = 1.0 / window as f64;
    let avg_gain = smooth(&gains, alpha, window);
    let avg_loss = smooth(&losses, alpha, window);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(gain, loss)| {
            let (gain, loss) = ((*gain)?, (*loss)?);
            if loss == 0.0 {
                Some(100.0)
            } else {
                let rs = gain / loss;
                Some(100.0 - (100.0 / (1.0 + rs)))
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stochastic {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
}

/// %K over `window` candles and its `smooth`-period mean %D.
pub fn stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    window: usize,
    smooth: usize,
) -> Stochastic {
    let len = closes.len();
    let mut k = vec![None; len];

    if window > 0 && len >= window {
        for i in (window - 1)..len {
            let range = (i + 1 - window)..=i;
            let lowest = lows[range.clone()].iter().copied().fold(f64::INFINITY, f64::min);
            let highest = highs[range].iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let spread = highest - lowest;
            if spread > 0.0 {
                k[i] = Some(100.0 * (closes[i] - lowest) / spread);
            }
        }
    }

    let mut d = vec![None; len];
    if smooth > 0 && len >= smooth {
        for i in (smooth - 1)..len {
            let window_k: Option<Vec<f64>> = k[(i + 1 - smooth)..=i].iter().copied().collect();
            d[i] = window_k.map(|vals| vals.iter().sum::<f64>() / smooth as f64);
        }
    }

    Stochastic { k, d }
}

/// Average true range, seeded with the mean of the first `window` true ranges.
pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let len = closes.len();
    if window == 0 || len < window {
        return vec![None; len];
    }

    let true_ranges: Vec<f64> = (0..len)
        .map(|i| {
            let high_low = highs[i] - lows[i];
            if i == 0 {
                return high_low;
            }
            let prev_close = closes[i - 1];
            high_low
                .max((highs[i] - prev_close).abs())
                .max((lows[i] - prev_close).abs())
        })
        .collect();

    let mut out = vec![None; window - 1];
    let mut current = true_ranges[..window].iter().sum::<f64>() / window as f64;
    out.push(Some(current));

    for tr in &true_ranges[window..] {
        current = (current * (window as f64 - 1.0) + tr) / window as f64;
        out.push(Some(current));
    }
    out
}
