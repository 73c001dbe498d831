//! Chat view for displaying the transcript.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use chatstream_core::{Message, Role};

use super::text::wrap_indented;
use super::theme::Theme;

const PLACEHOLDER: &str = "Send a message to start chatting with your AI agent";
const TYPING: &str = "● ● ●";

/// Transcript view with an optional streaming indicator.
pub struct ChatView<'a> {
    messages: &'a [Message],
    /// Show the typing indicator below the last message.
    streaming: bool,
    /// Lines scrolled up from the bottom.
    scroll_back: usize,
    theme: &'a Theme,
}

impl<'a> ChatView<'a> {
    pub fn new(messages: &'a [Message], theme: &'a Theme) -> Self {
        Self {
            messages,
            streaming: false,
            scroll_back: 0,
            theme,
        }
    }

    pub fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn scroll_back(mut self, lines: usize) -> Self {
        self.scroll_back = lines;
        self
    }

    /// All lines of the transcript wrapped to `width` columns.
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        if self.messages.is_empty() && !self.streaming {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(PLACEHOLDER, self.theme.muted_style())).centered());
            return lines;
        }

        for msg in self.messages {
            let style = match msg.role() {
                Role::User => self.theme.user_style(),
                Role::Assistant => self.theme.assistant_style(),
            };

            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", msg.role().label()), style),
                Span::styled(msg.timestamp(), self.theme.muted_style()),
            ]));

            for wrapped in wrap_indented(msg.content(), width, "  ") {
                lines.push(Line::from(wrapped));
            }

            lines.push(Line::from(""));
        }

        if self.streaming {
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", Role::Assistant.label()), self.theme.assistant_style()),
                Span::styled(TYPING, self.theme.muted_style()),
            ]));
        }

        lines
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let visible_height = area.height.saturating_sub(2) as usize;
        let text_width = area.width.saturating_sub(2) as usize;

        let all_lines = self.lines(text_width);
        let total_lines = all_lines.len();

        let max_scroll = total_lines.saturating_sub(visible_height);
        let scroll_offset = max_scroll.saturating_sub(self.scroll_back);

        let lines: Vec<Line> = all_lines
            .into_iter()
            .skip(scroll_offset)
            .take(visible_height)
            .collect();

        let title = if scroll_offset < max_scroll {
            format!(" Chat [{} more below, End to follow] ", max_scroll - scroll_offset)
        } else {
            " Chat ".to_string()
        };

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(self.theme.unfocused_border())
                .title(title),
        );

        frame.render_widget(paragraph, area);
    }
}
