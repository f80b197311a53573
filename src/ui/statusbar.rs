use crate::app::Status;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

pub struct StatusBar {
    pub status: Status,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            status: Status::Idle,
        }
    }

    fn describe(&self) -> (Color, String) {
        match &self.status {
            Status::Idle => (Color::Gray, "READY".to_string()),
            Status::Loading(query) => (Color::Yellow, format!("Fetching data for {}...", query)),
            Status::Charted { query, series } => (
                Color::Green,
                format!("{} ({} series)", query, series),
            ),
            Status::Failed(message) => (Color::Red, message.clone()),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (status_color, status_text) = self.describe();

        let text = Line::from(vec![
            Span::styled("● ", Style::default().fg(status_color)),
            Span::styled(status_text, Style::default().fg(Color::White)),
            Span::raw(" | "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(":Quit "),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(":Search "),
            Span::styled("←→", Style::default().fg(Color::Yellow)),
            Span::raw(":Pan "),
            Span::styled("↑↓", Style::default().fg(Color::Yellow)),
            Span::raw(":Zoom"),
        ]);

        let para = Paragraph::new(text).block(Block::default());
        frame.render_widget(para, area);
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}
