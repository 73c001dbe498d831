//! Events decoded from the assistant response stream.

/// One classified frame of the response stream.
///
/// Produced from a single `data:` frame and consumed immediately by
/// [`Transcript::apply`](crate::Transcript::apply).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A complete assistant turn.
    AssistantMessage { content: String },
    /// Fragment to append to the in-progress assistant turn.
    Token { content: String },
    /// The `[DONE]` sentinel.
    StreamEnd,
    /// Payload that failed structured decoding or carried an unknown type.
    Unparseable { raw: String },
}
