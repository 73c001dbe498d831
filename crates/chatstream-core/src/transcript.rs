//! Append-only conversation transcript and stream reconciliation.

use crate::chat::{Message, Role};
use crate::error::CoreError;
use crate::event::StreamEvent;

/// Outcome of applying one [`StreamEvent`] to a [`Transcript`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// A new message was appended at this index.
    Appended(usize),
    /// The message at this index had content appended in place.
    Extended(usize),
    /// The event carried nothing to apply.
    Unchanged,
    /// The stream signalled completion; nothing was applied.
    Finished,
}

impl Reconciled {
    /// Returns true if the transcript was mutated.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Appended(_) | Self::Extended(_))
    }
}

/// Ordered conversation history. Insertion order is conversation order.
///
/// Messages are never removed or reordered. The only in-place update is
/// appending a token to the trailing assistant message.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of turns the user has submitted.
    pub fn user_turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role() == Role::User)
            .count()
    }

    /// Append a user turn. Rejects blank input.
    pub fn push_user(&mut self, content: impl Into<String>) -> Result<usize, CoreError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(CoreError::EmptyMessage);
        }
        Ok(self.push(Message::user(content)))
    }

    /// Apply one stream event.
    ///
    /// `Token` extends the trailing assistant message if there is one and
    /// otherwise opens a new assistant turn. `AssistantMessage` always opens
    /// a new turn, even directly after another assistant message.
    pub fn apply(&mut self, event: StreamEvent) -> Reconciled {
        match event {
            StreamEvent::AssistantMessage { content } => {
                Reconciled::Appended(self.push(Message::assistant(content)))
            }
            StreamEvent::Token { content } => {
                match self.messages.last_mut() {
                    Some(last) if last.is_assistant() => {
                        last.push_content(&content);
                        Reconciled::Extended(self.messages.len() - 1)
                    }
                    _ => Reconciled::Appended(self.push(Message::assistant(content))),
                }
            }
            StreamEvent::StreamEnd => Reconciled::Finished,
            StreamEvent::Unparseable { .. } => Reconciled::Unchanged,
        }
    }

    fn push(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }
}
