//! chatstream Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Terminal rendering
//! - Runtime specifics
//!
//! It owns the conversation transcript and the rules for folding
//! streamed events into it.

pub mod chat;
pub mod error;
pub mod event;
pub mod transcript;

// Re-export commonly used types
pub use chat::{Message, Role};
pub use error::CoreError;
pub use event::StreamEvent;
pub use transcript::{Reconciled, Transcript};
