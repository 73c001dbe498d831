//! Colors and styles.

use ratatui::style::{Color, Modifier, Style};

/// Theme for the chat screen.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color (focused input, header)
    pub accent: Color,
    /// Error color (failed streams)
    pub error: Color,
    /// Muted color (timestamps, hints, disabled controls)
    pub muted: Color,
    /// User message color
    pub user: Color,
    /// Assistant message color
    pub assistant: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Indexed(63),
            error: Color::Red,
            muted: Color::DarkGray,
            user: Color::Cyan,
            assistant: Color::Green,
        }
    }
}

impl Theme {
    /// Border of an enabled, focused control.
    pub fn focused_border(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Border of a disabled or unfocused control.
    pub fn unfocused_border(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn user_style(&self) -> Style {
        Style::default().fg(self.user).add_modifier(Modifier::BOLD)
    }

    pub fn assistant_style(&self) -> Style {
        Style::default()
            .fg(self.assistant)
            .add_modifier(Modifier::BOLD)
    }
}
