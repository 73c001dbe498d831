//! UI state for rendering.

/// Input and view state owned by the UI thread (no async, no locks).
#[derive(Debug, Default)]
pub struct UiState {
    /// Text being typed.
    pub input: String,

    /// Lines scrolled up from the latest message (0 = follow latest).
    pub scroll_back: usize,

    /// Transcript revision last rendered.
    pub seen_revision: u64,

    /// Last stream error (if any).
    pub last_error: Option<String>,

    /// Set when the user asked to quit.
    pub quit_requested: bool,
}

impl UiState {
    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    pub fn follow_latest(&mut self) {
        self.scroll_back = 0;
    }
}
