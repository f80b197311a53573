use crate::chart::{ChartSpec, TRACES_PER_SERIES};
use crate::error::ScreenerResult;
use crate::screener::{load_chart, ChartSettings, MarketSource};
use crate::ui::{ChartView, LayoutManager};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Idle,
    Loading(String),
    Charted { query: String, series: usize },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Submit(String),
    Quit,
}

pub struct App {
    pub input: String,
    pub status: Status,
    pub chart: Option<ChartSpec>,
    pub view: ChartView,
}

impl App {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            status: Status::Idle,
            chart: None,
            view: ChartView::new(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if matches!(self.status, Status::Loading(_)) {
            return Action::None;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            KeyCode::Esc => Action::Quit,
            KeyCode::Enter => Action::Submit(self.input.trim().to_string()),
            KeyCode::Backspace => {
                self.input.pop();
                Action::None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                Action::None
            }
            KeyCode::Left => {
                self.view.pan_left();
                Action::None
            }
            KeyCode::Right => {
                self.view.pan_right();
                Action::None
            }
            KeyCode::Up => {
                self.view.zoom_in();
                Action::None
            }
            KeyCode::Down => {
                self.view.zoom_out();
                Action::None
            }
            _ => Action::None,
        }
    }

    pub fn start_loading(&mut self, query: &str) {
        self.status = Status::Loading(query.to_string());
    }

    /// A chart or an error, never both.
    pub fn finish(&mut self, query: &str, result: ScreenerResult<ChartSpec>) {
        match result {
            Ok(chart) => {
                info!(query, traces = chart.traces.len(), "chart ready");
                self.status = Status::Charted {
                    query: query.to_string(),
                    series: chart.traces.len() / TRACES_PER_SERIES,
                };
                self.chart = Some(chart);
                self.view.reset();
            }
            Err(err) => {
                warn!(query, "no chart: {}", err);
                self.status = Status::Failed(err.to_string());
                self.chart = None;
            }
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Event loop. Each submitted query is fetched and charted before the next key is read.
pub async fn run<S: MarketSource>(
    terminal: &mut DefaultTerminal,
    source: &S,
    settings: &ChartSettings,
) -> color_eyre::Result<()> {
    let mut app = App::new();
    let mut layout = LayoutManager::new();

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            layout.render(frame, &app, area)
        })?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.handle_key(key) {
            Action::Quit => break,
            Action::Submit(query) => {
                app.start_loading(&query);
                terminal.draw(|frame| {
                    let area = frame.area();
                    layout.render(frame, &app, area)
                })?;
                let result = load_chart(source, &query, settings).await;
                app.finish(&query, result);
            }
            Action::None => {}
        }
    }

    Ok(())
}
