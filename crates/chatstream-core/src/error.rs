//! Core domain errors.

use thiserror::Error;

/// Core domain errors for chatstream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Message content was empty or whitespace only.
    #[error("message content is empty")]
    EmptyMessage,
}
