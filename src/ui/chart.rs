use crate::chart::{AxisId, AxisSide, ChartSpec, LineStyle, TRACES_PER_SERIES};
use chrono::DateTime;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Block, Borders, Paragraph, Wrap,
    },
    Frame,
};

const LEFT_GUTTER: u16 = 12;
const RIGHT_SLOT: u16 = 10;

const PALETTES: [[Color; TRACES_PER_SERIES]; 2] = [
    [
        Color::White,
        Color::LightBlue,
        Color::Gray,
        Color::Gray,
        Color::Cyan,
        Color::LightCyan,
        Color::Magenta,
        Color::Yellow,
        Color::LightYellow,
        Color::LightRed,
    ],
    [
        Color::LightGreen,
        Color::Blue,
        Color::DarkGray,
        Color::DarkGray,
        Color::Green,
        Color::LightGreen,
        Color::LightMagenta,
        Color::Rgb(255, 165, 0),
        Color::Rgb(255, 215, 130),
        Color::Red,
    ],
];

pub fn trace_color(index: usize) -> Color {
    let palette = &PALETTES[(index / TRACES_PER_SERIES) % PALETTES.len()];
    palette[index % TRACES_PER_SERIES]
}

pub fn axis_color(id: AxisId) -> Color {
    match id {
        AxisId::Price => Color::White,
        AxisId::Macd => Color::Cyan,
        AxisId::Rsi => Color::Magenta,
        AxisId::Stochastic => Color::Yellow,
        AxisId::Atr => Color::LightRed,
    }
}

/// Compact label for values that span from whole dollars down to meme-coin fractions.
pub fn format_value(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1000.0 {
        format!("{:.0}", value)
    } else if abs >= 1.0 || abs == 0.0 {
        format!("{:.2}", value)
    } else if abs >= 0.01 {
        format!("{:.4}", value)
    } else {
        format!("{:.2e}", value)
    }
}

fn format_time(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Axis bounds with a little headroom; flat ranges are widened so they still plot.
fn padded(range: (f64, f64)) -> (f64, f64) {
    let (lo, hi) = range;
    let span = hi - lo;
    if span <= f64::EPSILON * lo.abs().max(1.0) {
        let pad = (lo.abs() * 0.05).max(1e-12);
        (lo - pad, hi + pad)
    } else {
        (lo - span * 0.05, hi + span * 0.05)
    }
}

/// Zoom and pan over the time axis of a [`ChartSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartView {
    pub zoom: usize,
    /// Quarter-windows panned back from the latest candle.
    pub offset: usize,
}

impl Default for ChartView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartView {
    pub fn new() -> Self {
        Self { zoom: 1, offset: 0 }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 2).min(32);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 2).max(1);
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn pan_left(&mut self) {
        if self.offset < self.max_offset() {
            self.offset += 1;
        }
    }

    pub fn pan_right(&mut self) {
        self.offset = self.offset.saturating_sub(1);
    }

    fn max_offset(&self) -> usize {
        self.zoom * 4 - 4
    }

    /// Visible time window within `range`.
    pub fn window(&self, range: (i64, i64)) -> (f64, f64) {
        let (min, max) = (range.0 as f64, range.1 as f64);
        let visible = (max - min) / self.zoom as f64;
        let end = max - self.offset as f64 * visible / 4.0;
        let start = (end - visible).max(min);
        if end > start {
            (start, end)
        } else {
            (min - 1.0, max + 1.0)
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, chart: Option<&ChartSpec>) {
        let title = chart.map(|c| c.title.as_str()).unwrap_or("Chart");
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(chart) = chart else {
            let hint = Paragraph::new(Line::from(Span::styled(
                "Enter a contract address (0x...) or a symbol, e.g. DOGE or DOGE,SHIB",
                Style::default().fg(Color::Gray),
            )));
            frame.render_widget(hint, inner);
            return;
        };

        let secondary: Vec<_> = self.secondary_axes(chart);
        let right_width = RIGHT_SLOT * secondary.len() as u16;
        if inner.width < LEFT_GUTTER + right_width + 10 || inner.height < 6 {
            return;
        }

        let plot = Rect {
            x: inner.x + LEFT_GUTTER,
            y: inner.y + 1,
            width: inner.width - LEFT_GUTTER - right_width,
            height: inner.height - 2,
        };

        let Some(range) = chart.time_range() else {
            return;
        };
        let (start, end) = self.window(range);

        self.render_traces(frame, plot, chart, (start, end));
        self.render_axis_labels(frame, inner, plot, chart, &secondary);
        self.render_time_labels(frame, plot, (start, end), &chart.x_title);
    }

    /// Right-hand axes ordered from the plot edge outward.
    fn secondary_axes(&self, chart: &ChartSpec) -> Vec<AxisId> {
        let mut axes: Vec<(f64, AxisId)> = chart
            .axes
            .iter()
            .filter(|axis| axis.side == AxisSide::Right)
            .map(|axis| (axis.position.unwrap_or(1.0), axis.id))
            .collect();
        axes.sort_by(|a, b| a.0.total_cmp(&b.0));
        axes.into_iter().map(|(_, id)| id).collect()
    }

    fn render_traces(&self, frame: &mut Frame, plot: Rect, chart: &ChartSpec, window: (f64, f64)) {
        let (start, end) = window;
        let mut segments: Vec<(Color, f64, f64, f64, f64)> = Vec::new();
        let mut dots: Vec<(Color, Vec<(f64, f64)>)> = Vec::new();

        for (idx, trace) in chart.traces.iter().enumerate() {
            let Some((lo, hi)) = chart.axis_range(trace.axis).map(padded) else {
                continue;
            };
            let color = trace_color(idx);
            let normalize = |v: f64| (v - lo) / (hi - lo);

            let mut prev: Option<(f64, f64)> = None;
            let mut dotted = Vec::new();
            for (n, (x, y)) in trace.x.iter().zip(&trace.y).enumerate() {
                let x = *x as f64;
                let point = y.filter(|v| v.is_finite()).map(|v| (x, normalize(v)));
                let in_view = x >= start && x <= end;

                match trace.style {
                    LineStyle::Dot => {
                        if let (Some(p), true) = (point, in_view) {
                            dotted.push(p);
                        }
                    }
                    LineStyle::Solid | LineStyle::Dash => {
                        if let (Some(a), Some(b)) = (prev, point) {
                            let visible = b.0 >= start && a.0 <= end;
                            let drawn = trace.style == LineStyle::Solid || n % 2 == 0;
                            if visible && drawn {
                                segments.push((color, a.0, a.1, b.0, b.1));
                            }
                        }
                    }
                }
                prev = point;
            }
            if !dotted.is_empty() {
                dots.push((color, dotted));
            }
        }

        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([start, end])
            .y_bounds([0.0, 1.0])
            .paint(|ctx| {
                for (color, x1, y1, x2, y2) in &segments {
                    ctx.draw(&CanvasLine {
                        x1: *x1,
                        y1: *y1,
                        x2: *x2,
                        y2: *y2,
                        color: *color,
                    });
                }
                for (color, coords) in &dots {
                    ctx.draw(&Points {
                        coords: coords.as_slice(),
                        color: *color,
                    });
                }
            });
        frame.render_widget(canvas, plot);
    }

    fn render_axis_labels(
        &self,
        frame: &mut Frame,
        inner: Rect,
        plot: Rect,
        chart: &ChartSpec,
        secondary: &[AxisId],
    ) {
        let rows = [plot.y, plot.y + plot.height / 2, plot.y + plot.height - 1];
        let fractions = [1.0, 0.5, 0.0];

        let mut columns = vec![(AxisId::Price, inner.x, LEFT_GUTTER - 1)];
        for (slot, id) in secondary.iter().enumerate() {
            let x = plot.x + plot.width + 1 + slot as u16 * RIGHT_SLOT;
            columns.push((*id, x, RIGHT_SLOT - 1));
        }

        for (id, x, width) in columns {
            let color = axis_color(id);
            let title = chart.axis(id).map(|a| a.title.as_str()).unwrap_or("");
            let title_style = Style::default().fg(color).add_modifier(Modifier::BOLD);
            frame
                .buffer_mut()
                .set_stringn(x, inner.y, title, width as usize, title_style);

            let Some((lo, hi)) = chart.axis_range(id).map(padded) else {
                continue;
            };
            for (row, fraction) in rows.iter().zip(fractions) {
                let value = lo + (hi - lo) * fraction;
                let label = if id == AxisId::Price {
                    format!("{:>width$}", format_value(value), width = width as usize)
                } else {
                    format_value(value)
                };
                frame
                    .buffer_mut()
                    .set_stringn(x, *row, label, width as usize, Style::default().fg(color));
            }
        }
    }

    fn render_time_labels(&self, frame: &mut Frame, plot: Rect, window: (f64, f64), x_title: &str) {
        let y = plot.y + plot.height;
        let style = Style::default().fg(Color::Gray);
        let (start, end) = window;

        let first = format_time(start as i64);
        let last = format_time(end as i64);
        frame
            .buffer_mut()
            .set_stringn(plot.x, y, &first, plot.width as usize, style);

        let title_x = plot.x + plot.width / 2 - (x_title.len() as u16 / 2).min(plot.width / 2);
        frame
            .buffer_mut()
            .set_stringn(title_x, y, x_title, x_title.len(), style);

        let last_x = (plot.x + plot.width).saturating_sub(last.len() as u16).max(plot.x);
        frame
            .buffer_mut()
            .set_stringn(last_x, y, &last, plot.width as usize, style);
    }
}

/// One coloured entry per trace, wrapped to the area width.
pub fn render_legend(frame: &mut Frame, area: Rect, chart: Option<&ChartSpec>) {
    let block = Block::default()
        .title("Legend")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    let spans: Vec<Span> = chart
        .map(|chart| {
            chart
                .traces
                .iter()
                .enumerate()
                .flat_map(|(idx, trace)| {
                    let marker = match trace.style {
                        LineStyle::Solid => "━",
                        LineStyle::Dot => "┈",
                        LineStyle::Dash => "╌",
                    };
                    vec![
                        Span::styled(marker, Style::default().fg(trace_color(idx))),
                        Span::styled(
                            format!(" {}  ", trace.name),
                            Style::default().fg(Color::White),
                        ),
                    ]
                })
                .collect()
        })
        .unwrap_or_default();

    let para = Paragraph::new(Line::from(spans))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(para, area);
}
