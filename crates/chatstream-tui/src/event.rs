//! Event types for communication between the network thread and the UI.

use chatstream_client::{ChatRequest, ClientError, StreamId};

/// Events sent from the network thread to the UI thread.
#[derive(Debug)]
pub enum UiEvent {
    /// Raw chunk of a reply body.
    Chunk { id: StreamId, bytes: Vec<u8> },

    /// Reply body ended.
    BodyEnded { id: StreamId },

    /// Request or body read failed.
    StreamFailed { id: StreamId, error: ClientError },
}

impl UiEvent {
    pub fn stream_id(&self) -> StreamId {
        match self {
            Self::Chunk { id, .. } | Self::BodyEnded { id } | Self::StreamFailed { id, .. } => *id,
        }
    }
}

/// Commands sent from the UI thread to the network thread.
#[derive(Debug)]
pub enum BackendCommand {
    /// Send a chat request and start reading its reply.
    Send(ChatRequest),

    /// Stop reading a reply and drop its connection.
    Abandon(StreamId),

    /// Shut down the network thread.
    Quit,
}
