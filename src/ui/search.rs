use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct SearchBar;

impl SearchBar {
    pub fn render(&self, frame: &mut Frame, area: Rect, input: &str, busy: bool) {
        let border = if busy { Color::DarkGray } else { Color::Magenta };
        let block = Block::default()
            .title("Enter MEME coin contract address or symbol")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));

        let mut spans = vec![Span::styled(
            input.to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )];
        if !busy {
            spans.push(Span::styled("█", Style::default().fg(Color::Gray)));
        }

        let para = Paragraph::new(Line::from(spans)).block(block);
        frame.render_widget(para, area);
    }
}
