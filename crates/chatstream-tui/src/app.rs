//! Application state and main event loop.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use chatstream_client::{ChatSession, ClientError, ReadFlow, SessionState};

use crate::event::{BackendCommand, UiEvent};
use crate::state::UiState;
use crate::ui;

/// Lines moved by PageUp/PageDown.
const PAGE: usize = 10;

/// Main application: owns the chat session and the channel handles.
pub struct App {
    /// The conversation and its send controller.
    session: ChatSession,

    /// Input and view state.
    state: UiState,

    /// Receiver for events from the network thread.
    ui_rx: mpsc::Receiver<UiEvent>,

    /// Sender for commands to the network thread.
    cmd_tx: mpsc::Sender<BackendCommand>,
}

impl App {
    pub fn new(
        session: ChatSession,
        ui_rx: mpsc::Receiver<UiEvent>,
        cmd_tx: mpsc::Sender<BackendCommand>,
    ) -> Self {
        Self {
            session,
            state: UiState::default(),
            ui_rx,
            cmd_tx,
        }
    }

    /// Run the main event loop.
    ///
    /// This runs on the main thread and handles:
    /// - Drawing the UI
    /// - Processing keyboard input
    /// - Folding reply chunks from the network thread into the transcript
    pub fn run(&mut self, mut terminal: DefaultTerminal) -> std::io::Result<()> {
        loop {
            terminal.draw(|frame| ui::render(frame, &self.session, &self.state))?;

            // Poll terminal events (non-blocking with short timeout)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            // Process network events (non-blocking)
            while let Ok(event) = self.ui_rx.try_recv() {
                self.apply_event(event);
            }

            if self.state.quit_requested {
                break;
            }
        }

        let _ = self.cmd_tx.blocking_send(BackendCommand::Quit);

        Ok(())
    }

    /// Apply an event from the network thread.
    fn apply_event(&mut self, event: UiEvent) {
        let id = event.stream_id();
        let was_active = self.session.state() == SessionState::Streaming(id);

        match event {
            UiEvent::Chunk { id, bytes } => {
                if self.session.receive(id, &bytes) == ReadFlow::Stop {
                    let _ = self.cmd_tx.blocking_send(BackendCommand::Abandon(id));
                }
            }
            UiEvent::BodyEnded { id } => {
                self.session.finish(id);
            }
            UiEvent::StreamFailed { id, error } => {
                if was_active {
                    self.state.last_error = Some(error.to_string());
                }
                self.session.fail(id, &error);
            }
        }

        if !was_active {
            debug!(stream_id = %id, "Event for inactive stream ignored");
        }

        self.follow_new_content();
    }

    /// Scroll to the latest message whenever the transcript changed.
    fn follow_new_content(&mut self) {
        let revision = self.session.revision();
        if revision != self.state.seen_revision {
            self.state.seen_revision = revision;
            self.state.follow_latest();
        }
    }

    fn submit(&mut self) {
        match self.session.submit(&mut self.state.input) {
            Ok(request) => {
                let id = request.stream_id;
                self.state.last_error = None;
                self.follow_new_content();
                if self
                    .cmd_tx
                    .blocking_send(BackendCommand::Send(request))
                    .is_err()
                {
                    warn!("Network thread is gone; cannot send message");
                    let error = ClientError::Transport("network thread stopped".to_string());
                    self.state.last_error = Some(error.to_string());
                    self.session.fail(id, &error);
                }
            }
            Err(e) => {
                debug!(error = %e, "Submit ignored");
            }
        }
    }

    /// Handle a key press.
    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.quit_requested = true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.quit_requested = true;
            }

            // Enter sends; Shift+Enter is a newline in the message
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                if !self.session.is_streaming() {
                    self.state.input.push('\n');
                }
            }
            KeyCode::Enter => self.submit(),

            // Input is disabled while a reply is streaming
            KeyCode::Char(c) => {
                let chord = key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
                if !chord && !self.session.is_streaming() {
                    self.state.input.push(c);
                }
            }
            KeyCode::Backspace => {
                if !self.session.is_streaming() {
                    self.state.input.pop();
                }
            }

            KeyCode::Up => self.state.scroll_up(1),
            KeyCode::Down => self.state.scroll_down(1),
            KeyCode::PageUp => self.state.scroll_up(PAGE),
            KeyCode::PageDown => self.state.scroll_down(PAGE),
            KeyCode::End => self.state.follow_latest(),

            _ => {}
        }
    }
}
