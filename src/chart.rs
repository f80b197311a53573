//! Chart composition: candle series and their indicators laid out on five axes.

use crate::data::CandleSeries;
use crate::error::UsageError;
use crate::indicators::{IndicatorConfig, IndicatorSet};

pub const CHART_TITLE: &str = "Price History and Technical Indicators";
pub const TRACES_PER_SERIES: usize = 1 + IndicatorSet::SUB_SERIES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AxisId {
    Price,
    Macd,
    Rsi,
    Stochastic,
    Atr,
}

impl AxisId {
    pub fn all() -> [AxisId; 5] {
        [
            AxisId::Price,
            AxisId::Macd,
            AxisId::Rsi,
            AxisId::Stochastic,
            AxisId::Atr,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSide {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub id: AxisId,
    pub title: String,
    pub side: AxisSide,
    /// The axis this one is drawn over; `None` for the primary axis.
    pub overlaying: Option<AxisId>,
    /// Free anchor as a fraction of the plot width. `None` sits on the plot edge.
    pub position: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dot,
    Dash,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub name: String,
    pub axis: AxisId,
    pub style: LineStyle,
    pub x: Vec<i64>,
    pub y: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_title: String,
    pub height: u32,
    pub axes: Vec<Axis>,
    pub traces: Vec<Trace>,
}

impl ChartSpec {
    pub fn axis(&self, id: AxisId) -> Option<&Axis> {
        self.axes.iter().find(|axis| axis.id == id)
    }

    pub fn traces_on(&self, id: AxisId) -> impl Iterator<Item = &Trace> {
        self.traces.iter().filter(move |trace| trace.axis == id)
    }

    /// Min and max of every defined value on an axis.
    pub fn axis_range(&self, id: AxisId) -> Option<(f64, f64)> {
        self.traces_on(id)
            .flat_map(|trace| trace.y.iter().flatten().copied())
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn time_range(&self) -> Option<(i64, i64)> {
        let min = self.traces.iter().flat_map(|t| t.x.first()).min()?;
        let max = self.traces.iter().flat_map(|t| t.x.last()).max()?;
        Some((*min, *max))
    }
}

fn default_axes() -> Vec<Axis> {
    vec![
        Axis {
            id: AxisId::Price,
            title: "Price (USD)".to_string(),
            side: AxisSide::Left,
            overlaying: None,
            position: None,
        },
        Axis {
            id: AxisId::Macd,
            title: "MACD".to_string(),
            side: AxisSide::Right,
            overlaying: Some(AxisId::Price),
            position: None,
        },
        Axis {
            id: AxisId::Rsi,
            title: "RSI".to_string(),
            side: AxisSide::Right,
            overlaying: Some(AxisId::Price),
            position: Some(1.05),
        },
        Axis {
            id: AxisId::Stochastic,
            title: "Stochastic".to_string(),
            side: AxisSide::Right,
            overlaying: Some(AxisId::Price),
            position: Some(1.10),
        },
        Axis {
            id: AxisId::Atr,
            title: "ATR".to_string(),
            side: AxisSide::Right,
            overlaying: Some(AxisId::Price),
            position: Some(1.15),
        },
    ]
}

/// Computes the indicator bank for every series and lays all traces out on one five-axis chart.
pub fn build_chart(
    series: &[CandleSeries],
    config: &IndicatorConfig,
) -> Result<ChartSpec, UsageError> {
    if series.is_empty() {
        return Err(UsageError::NoSeries);
    }
    if let Some(short) = series.iter().find(|s| s.len() < 2) {
        return Err(UsageError::TooFewCandles {
            label: short.label().to_string(),
            len: short.len(),
        });
    }

    let mut traces = Vec::with_capacity(series.len() * TRACES_PER_SERIES);
    for s in series {
        let set = IndicatorSet::compute(s, config);
        let x = s.timestamps();
        let label = s.label();

        let mut push = |name: String, axis: AxisId, style: LineStyle, y: Vec<Option<f64>>| {
            traces.push(Trace {
                name: format!("{} {}", label, name),
                axis,
                style,
                x: x.clone(),
                y,
            });
        };

        let closes = s.closes().into_iter().map(Some).collect();
        push("Price".into(), AxisId::Price, LineStyle::Solid, closes);
        push(format!("EMA ({})", config.ema_window), AxisId::Price, LineStyle::Dot, set.ema);
        push("Bollinger High".into(), AxisId::Price, LineStyle::Dash, set.bollinger_upper);
        push("Bollinger Low".into(), AxisId::Price, LineStyle::Dash, set.bollinger_lower);
        push("MACD".into(), AxisId::Macd, LineStyle::Solid, set.macd);
        push("MACD Signal".into(), AxisId::Macd, LineStyle::Solid, set.macd_signal);
        push("RSI".into(), AxisId::Rsi, LineStyle::Solid, set.rsi);
        push("Stoch %K".into(), AxisId::Stochastic, LineStyle::Solid, set.stoch_k);
        push("Stoch %D".into(), AxisId::Stochastic, LineStyle::Solid, set.stoch_d);
        push("ATR".into(), AxisId::Atr, LineStyle::Solid, set.atr);
    }

    Ok(ChartSpec {
        title: CHART_TITLE.to_string(),
        x_title: "Date".to_string(),
        height: 1200,
        axes: default_axes(),
        traces,
    })
}
