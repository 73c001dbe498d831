//! Rendering of the chat screen.

mod chat;
mod text;
mod theme;

use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use chatstream_client::ChatSession;

use crate::state::UiState;
use chat::ChatView;
use theme::Theme;

/// Render the whole screen.
pub fn render(frame: &mut Frame, session: &ChatSession, state: &UiState) {
    let theme = Theme::default();

    let [header, body, input, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(frame, header, session, &theme);

    ChatView::new(session.transcript().messages(), &theme)
        .streaming(session.is_streaming())
        .scroll_back(state.scroll_back)
        .render(frame, body);

    render_input(frame, input, session, state, &theme);
    render_footer(frame, footer, state, &theme);
}

fn render_header(frame: &mut Frame, area: Rect, session: &ChatSession, theme: &Theme) {
    let transcript = session.transcript();
    let summary = if transcript.is_empty() {
        "No messages yet".to_string()
    } else {
        format!(
            "{} sent | {} messages",
            transcript.user_turns(),
            transcript.len()
        )
    };

    let status = if session.is_streaming() {
        Span::styled(" | streaming", theme.assistant_style())
    } else {
        Span::styled(" | ready", theme.muted_style())
    };

    let line = Line::from(vec![
        Span::styled(" AI Agent ", theme.title_style()),
        Span::styled(summary, theme.muted_style()),
        status,
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(
    frame: &mut Frame,
    area: Rect,
    session: &ChatSession,
    state: &UiState,
    theme: &Theme,
) {
    let streaming = session.is_streaming();
    let can_send = session.can_submit(&state.input);

    let (title, border) = if streaming {
        (" Waiting for reply... ", theme.unfocused_border())
    } else {
        (" Type your message here ", theme.focused_border())
    };

    let send = if can_send {
        Span::styled(" [Send ⏎] ", theme.title_style())
    } else {
        Span::styled(" [Send ⏎] ", theme.muted_style())
    };

    // Only the tail of the input fits on one line
    let last_line = state.input.rsplit('\n').next().unwrap_or_default();
    let paragraph = Paragraph::new(Line::from(last_line.to_string())).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title)
            .title_bottom(Line::from(send).right_aligned()),
    );
    frame.render_widget(paragraph, area);

    if !streaming {
        let max_x = area.x + area.width.saturating_sub(2);
        let x = (area.x + 1).saturating_add(last_line.width() as u16).min(max_x);
        frame.set_cursor_position(Position::new(x, area.y + 1));
    }
}

fn render_footer(frame: &mut Frame, area: Rect, state: &UiState, theme: &Theme) {
    let mut spans = vec![Span::styled(
        " Enter send | Shift+Enter newline | ↑↓ PgUp PgDn scroll | End latest | Esc quit",
        theme.muted_style(),
    )];

    if let Some(error) = &state.last_error {
        spans.push(Span::styled(format!("  error: {}", error), theme.error_style()));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
