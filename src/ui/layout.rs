use crate::app::{App, Status};
use crate::chart::TRACES_PER_SERIES;
use crate::ui::{chart::render_legend, SearchBar, StatusBar};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub struct LayoutManager {
    pub search: SearchBar,
    pub statusbar: StatusBar,
}

impl LayoutManager {
    pub fn new() -> Self {
        Self {
            search: SearchBar,
            statusbar: StatusBar::new(),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, app: &App, area: Rect) {
        let legend_height = match &app.chart {
            Some(chart) if chart.traces.len() > TRACES_PER_SERIES => 6,
            Some(_) => 4,
            None => 0,
        };

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(legend_height),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_title(frame, main_chunks[0]);
        self.search.render(
            frame,
            main_chunks[1],
            &app.input,
            matches!(app.status, Status::Loading(_)),
        );

        match &app.status {
            Status::Failed(message) => self.render_error(frame, main_chunks[2], message),
            _ => app.view.render(frame, main_chunks[2], app.chart.as_ref()),
        }
        if legend_height > 0 {
            render_legend(frame, main_chunks[3], app.chart.as_ref());
        }

        self.statusbar.status = app.status.clone();
        self.statusbar.render(frame, main_chunks[4]);
    }

    fn render_title(&self, frame: &mut Frame, area: Rect) {
        let title = Line::from(vec![
            Span::styled(
                "weiscreener",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  MEME Coin Analyzer", Style::default().fg(Color::White)),
        ]);
        let para = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(para, area);
    }

    fn render_error(&self, frame: &mut Frame, area: Rect, message: &str) {
        let block = Block::default()
            .title("Error")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));
        let para = Paragraph::new(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red),
        )))
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(para, area);
    }
}

impl Default for LayoutManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::build_chart;
    use crate::data::{Candle, CandleSeries};
    use crate::error::{FetchError, ScreenerError};
    use crate::indicators::IndicatorConfig;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw_rows(app: &App) -> Vec<String> {
        let mut layout = LayoutManager::new();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                layout.render(frame, app, area)
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .chunks(120)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    fn draw(app: &App) -> String {
        draw_rows(app).concat()
    }

    fn charted(labels: &[&str]) -> App {
        let series: Vec<_> = labels
            .iter()
            .map(|label| {
                let candles = (0..40)
                    .map(|i| Candle::new(i * 60_000, 1.0, 1.1, 0.9, 1.0 + i as f64 * 0.01))
                    .collect();
                CandleSeries::new(*label, candles)
            })
            .collect();
        let mut app = App::new();
        let chart = build_chart(&series, &IndicatorConfig::default());
        app.finish(&labels.join(","), chart.map_err(ScreenerError::from));
        app
    }

    fn legend_row(app: &App) -> usize {
        draw_rows(app)
            .iter()
            .position(|row| row.contains("Legend"))
            .unwrap()
    }

    #[test]
    fn failure_shows_message_instead_of_chart() {
        let mut app = App::new();
        app.input = "0xdead".to_string();
        app.finish("0xdead", Err(ScreenerError::Fetch(FetchError::LookupFailure)));

        let text = draw(&app);
        assert!(text.contains("Unable to fetch data for the given coin"));
        assert!(!text.contains("Legend"));
    }

    #[test]
    fn idle_screen_shows_search_box() {
        let text = draw(&App::new());
        assert!(text.contains("MEME Coin Analyzer"));
        assert!(text.contains("READY"));
    }

    #[test]
    fn legend_grows_once_a_second_series_is_charted() {
        // 30 rows: title 3, search 3, chart, legend, status 1.
        assert_eq!(legend_row(&charted(&["DOGE"])), 30 - 1 - 4);
        assert_eq!(legend_row(&charted(&["DOGE", "SHIB"])), 30 - 1 - 6);
    }
}
