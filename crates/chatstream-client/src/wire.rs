//! Wire format of the chat stream.
//!
//! Events are separated by a blank line. Each event is a single
//! `data:` line carrying either the `[DONE]` sentinel or a JSON object
//! `{"type": "...", "content": "..."}`.

use chatstream_core::StreamEvent;
use serde::Deserialize;
use tracing::warn;

/// Separator between events.
pub const FRAME_DELIMITER: &str = "\n\n";

/// Marker every event frame starts with.
pub const DATA_PREFIX: &str = "data:";

/// Payload marking the end of the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// JSON payloads the client understands.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Payload {
    AssistantMessage { content: String },
    Token { content: String },
}

impl From<Payload> for StreamEvent {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::AssistantMessage { content } => StreamEvent::AssistantMessage { content },
            Payload::Token { content } => StreamEvent::Token { content },
        }
    }
}

/// Classify one frame.
///
/// Returns `None` for frames that do not carry the `data:` marker.
/// Undecodable payloads become [`StreamEvent::Unparseable`].
pub fn parse_frame(frame: &str) -> Option<StreamEvent> {
    let payload = frame.strip_prefix(DATA_PREFIX)?.trim();

    if payload == DONE_SENTINEL {
        return Some(StreamEvent::StreamEnd);
    }

    match serde_json::from_str::<Payload>(payload) {
        Ok(parsed) => Some(parsed.into()),
        Err(e) => {
            warn!(payload = %payload, error = %e, "Could not parse stream frame");
            Some(StreamEvent::Unparseable {
                raw: payload.to_string(),
            })
        }
    }
}

/// Events of a decoded segment, in order of appearance.
pub fn events(segment: &str) -> impl Iterator<Item = StreamEvent> + '_ {
    segment.split(FRAME_DELIMITER).filter_map(parse_frame)
}
