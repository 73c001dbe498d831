//! Error types for the chat client.

use chatstream_core::CoreError;
use thiserror::Error;

/// Errors that can occur while talking to the chat backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Client configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Request could not be sent.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Backend answered without a readable streaming body.
    #[error("response has no readable body")]
    NoBody,

    /// Reading the body failed mid-stream.
    #[error("stream read failed: {0}")]
    Transport(String),
}

/// Reasons a submission is rejected. A rejected submission changes nothing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// A reply is still streaming for the previous submission.
    #[error("a reply is already streaming")]
    AlreadyStreaming,

    /// The input itself is not a valid message.
    #[error(transparent)]
    Invalid(#[from] CoreError),
}
