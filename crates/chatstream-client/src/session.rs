//! Send controller: one chat session and its request/response cycle.
//!
//! The session is a two-state machine (`Idle`, `Streaming`) that owns the
//! transcript and the decoder residual. It can be driven two ways:
//! - [`ChatSession::stream_reply`] reads the body itself on the current task
//! - a network thread forwards chunks and the owner calls
//!   [`receive`](ChatSession::receive), [`finish`](ChatSession::finish) and
//!   [`fail`](ChatSession::fail) from its own loop

use std::fmt;

use chatstream_core::{Reconciled, Transcript};
use futures_util::StreamExt;
use serde::Serialize;
use tracing::{debug, error, info, trace};

use crate::decoder::StreamDecoder;
use crate::error::{ClientError, SubmitError};
use crate::transport::ChatTransport;
use crate::wire;

/// Identifies one request/response cycle within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StreamId(u64);

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request body sent to the chat backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// Cycle this request belongs to. Not sent over the wire.
    #[serde(skip)]
    pub stream_id: StreamId,
    pub user_id: String,
    pub message: String,
}

/// Whether a reply is currently being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Streaming(StreamId),
}

/// What the reader should do after handing over a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFlow {
    /// Keep reading the body.
    Continue,
    /// Stop reading and drop the body.
    Stop,
}

/// A single chat session.
#[derive(Debug)]
pub struct ChatSession {
    user_id: String,
    transcript: Transcript,
    state: SessionState,
    decoder: StreamDecoder,
    next_stream: u64,
    /// Bumped on every transcript mutation.
    revision: u64,
}

impl ChatSession {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            transcript: Transcript::new(),
            state: SessionState::Idle,
            decoder: StreamDecoder::new(),
            next_stream: 0,
            revision: 0,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.state, SessionState::Streaming(_))
    }

    /// Counter that changes whenever the transcript does. Renderers compare
    /// it against the last value they saw to decide when to redraw and
    /// scroll to the latest message.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether `input` would currently be accepted by [`submit`](Self::submit).
    pub fn can_submit(&self, input: &str) -> bool {
        !self.is_streaming() && !input.trim().is_empty()
    }

    /// Start a new cycle with the user's input.
    ///
    /// On success the user message is appended, `input` is cleared and the
    /// session enters `Streaming`. The caller must send the returned request.
    /// On rejection nothing changes, `input` included.
    pub fn submit(&mut self, input: &mut String) -> Result<ChatRequest, SubmitError> {
        if let SessionState::Streaming(active) = self.state {
            debug!(stream_id = %active, "Submit rejected while streaming");
            return Err(SubmitError::AlreadyStreaming);
        }

        self.transcript.push_user(input.as_str())?;
        let message = std::mem::take(input);

        let stream_id = StreamId(self.next_stream);
        self.next_stream += 1;
        self.decoder.reset();
        self.state = SessionState::Streaming(stream_id);
        self.revision += 1;

        info!(stream_id = %stream_id, chars = message.chars().count(), "Message submitted");

        Ok(ChatRequest {
            stream_id,
            user_id: self.user_id.clone(),
            message,
        })
    }

    /// Hand over one chunk of the reply body.
    ///
    /// Chunks for any stream other than the active one are ignored and
    /// answered with [`ReadFlow::Stop`].
    pub fn receive(&mut self, id: StreamId, chunk: &[u8]) -> ReadFlow {
        if !self.is_active(id) {
            debug!(stream_id = %id, "Ignoring chunk from inactive stream");
            return ReadFlow::Stop;
        }

        trace!(stream_id = %id, bytes = chunk.len(), "Chunk received");

        match self.decoder.push(chunk) {
            Some(segment) => self.apply_segment(&segment),
            None => ReadFlow::Continue,
        }
    }

    /// The reply body ended. Buffered text is flushed and the session
    /// returns to `Idle` whether or not `[DONE]` was seen.
    pub fn finish(&mut self, id: StreamId) {
        if !self.is_active(id) {
            return;
        }

        if let Some(segment) = self.decoder.finish() {
            if self.apply_segment(&segment) == ReadFlow::Stop {
                return;
            }
        }

        info!(stream_id = %id, "Reply body ended without end marker");
        self.go_idle();
    }

    /// Reading the reply failed. Whatever was already applied stays.
    pub fn fail(&mut self, id: StreamId, err: &ClientError) {
        if !self.is_active(id) {
            return;
        }

        error!(stream_id = %id, error = %err, "Reply stream failed");
        self.go_idle();
    }

    /// Send `request` through `transport` and read the reply to completion.
    ///
    /// `on_change` runs after every chunk that mutated the transcript.
    /// Transport errors return the session to `Idle` and are returned.
    pub async fn stream_reply<T, F>(
        &mut self,
        transport: &T,
        request: ChatRequest,
        mut on_change: F,
    ) -> Result<(), ClientError>
    where
        T: ChatTransport + ?Sized,
        F: FnMut(&Transcript),
    {
        let id = request.stream_id;

        let mut body = match transport.open(&request).await {
            Ok(body) => body,
            Err(e) => {
                self.fail(id, &e);
                return Err(e);
            }
        };

        let mut seen = self.revision;
        while let Some(chunk) = body.next().await {
            let flow = match chunk {
                Ok(bytes) => self.receive(id, &bytes),
                Err(e) => {
                    self.fail(id, &e);
                    return Err(e);
                }
            };

            if self.revision != seen {
                seen = self.revision;
                on_change(&self.transcript);
            }

            if flow == ReadFlow::Stop {
                return Ok(());
            }
        }

        self.finish(id);
        if self.revision != seen {
            on_change(&self.transcript);
        }

        Ok(())
    }

    fn is_active(&self, id: StreamId) -> bool {
        self.state == SessionState::Streaming(id)
    }

    fn apply_segment(&mut self, segment: &str) -> ReadFlow {
        for event in wire::events(segment) {
            match self.transcript.apply(event) {
                Reconciled::Finished => {
                    info!(messages = self.transcript.len(), "Reply completed");
                    self.go_idle();
                    return ReadFlow::Stop;
                }
                outcome if outcome.is_mutation() => self.revision += 1,
                _ => {}
            }
        }
        ReadFlow::Continue
    }

    fn go_idle(&mut self) {
        self.state = SessionState::Idle;
        self.decoder.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chatstream_core::{CoreError, Role};
    use futures_util::stream;

    use crate::transport::ByteStream;

    const HEL: &[u8] = b"data: {\"type\":\"token\",\"content\":\"Hel\"}\n\n";
    const LO: &[u8] = b"data: {\"type\":\"token\",\"content\":\"lo\"}\n\n";
    const DONE: &[u8] = b"data: [DONE]\n\n";

    /// Replays a fixed list of chunks, optionally failing at the end.
    struct ScriptedTransport {
        chunks: Vec<Vec<u8>>,
        fail_with: Option<String>,
        refuse: bool,
    }

    impl ScriptedTransport {
        fn new(chunks: &[&[u8]]) -> Self {
            Self {
                chunks: chunks.iter().map(|c| c.to_vec()).collect(),
                fail_with: None,
                refuse: false,
            }
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn open(&self, _request: &ChatRequest) -> Result<ByteStream, ClientError> {
            if self.refuse {
                return Err(ClientError::NoBody);
            }
            let mut items: Vec<Result<Vec<u8>, ClientError>> =
                self.chunks.iter().cloned().map(Ok).collect();
            if let Some(reason) = &self.fail_with {
                items.push(Err(ClientError::Transport(reason.clone())));
            }
            Ok(stream::iter(items).boxed())
        }
    }

    fn started(input: &str) -> (ChatSession, StreamId) {
        let mut session = ChatSession::new("1");
        let mut input = input.to_string();
        let request = session.submit(&mut input).unwrap();
        (session, request.stream_id)
    }

    #[test]
    fn test_submit_appends_user_message_and_streams() {
        let mut session = ChatSession::new("1");
        let mut input = "hi".to_string();

        let request = session.submit(&mut input).unwrap();

        assert!(input.is_empty());
        assert_eq!(request.message, "hi");
        assert_eq!(request.user_id, "1");
        assert_eq!(session.state(), SessionState::Streaming(request.stream_id));

        let messages = session.transcript().messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role(), Role::User);
        assert_eq!(messages[0].content(), "hi");
    }

    #[test]
    fn test_request_body_shape() {
        let (mut session, _) = started("first");
        session.go_idle();
        let mut input = "second".to_string();
        let request = session.submit(&mut input).unwrap();

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"user_id": "1", "message": "second"}));
    }

    #[test]
    fn test_blank_submit_is_noop() {
        let mut session = ChatSession::new("1");
        let revision = session.revision();

        for blank in ["", "   ", "\n\t "] {
            let mut input = blank.to_string();
            assert_eq!(
                session.submit(&mut input),
                Err(SubmitError::Invalid(CoreError::EmptyMessage))
            );
            assert_eq!(input, blank);
        }

        assert!(session.transcript().is_empty());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.revision(), revision);
    }

    #[test]
    fn test_submit_while_streaming_is_noop() {
        let (mut session, id) = started("hi");
        let mut input = "again".to_string();

        assert_eq!(
            session.submit(&mut input).unwrap_err(),
            SubmitError::AlreadyStreaming
        );
        assert_eq!(input, "again");
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.state(), SessionState::Streaming(id));
        assert!(!session.can_submit("again"));
    }

    #[test]
    fn test_token_stream_builds_reply() {
        let (mut session, id) = started("hi");

        assert_eq!(session.receive(id, HEL), ReadFlow::Continue);
        assert_eq!(session.receive(id, LO), ReadFlow::Continue);
        assert_eq!(session.receive(id, DONE), ReadFlow::Stop);

        let last = session.transcript().last().unwrap();
        assert_eq!(last.role(), Role::Assistant);
        assert_eq!(last.content(), "Hello");
        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_full_message_appends_one_turn() {
        let (mut session, id) = started("hi");

        session.receive(
            id,
            b"data: {\"type\":\"assistant_message\",\"content\":\"Full reply\"}\n\n",
        );
        assert_eq!(session.receive(id, DONE), ReadFlow::Stop);

        let messages = session.transcript().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role(), Role::Assistant);
        assert_eq!(messages[1].content(), "Full reply");
    }

    #[test]
    fn test_unparseable_frame_is_skipped() {
        let (mut session, id) = started("hi");

        assert_eq!(session.receive(id, b"data: not-json\n\n"), ReadFlow::Continue);
        assert_eq!(session.transcript().len(), 1);

        session.receive(id, LO);
        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.transcript().last().unwrap().content(), "lo");
        assert!(session.is_streaming());
    }

    #[test]
    fn test_stream_end_does_not_mutate() {
        let (mut session, id) = started("hi");
        session.receive(id, HEL);
        let revision = session.revision();

        assert_eq!(session.receive(id, DONE), ReadFlow::Stop);
        assert_eq!(session.revision(), revision);
        assert_eq!(session.transcript().last().unwrap().content(), "Hel");
        assert!(!session.is_streaming());
    }

    #[test]
    fn test_frames_after_done_are_ignored() {
        let (mut session, id) = started("hi");
        let mut chunk = Vec::new();
        chunk.extend_from_slice(HEL);
        chunk.extend_from_slice(DONE);
        chunk.extend_from_slice(LO);

        assert_eq!(session.receive(id, &chunk), ReadFlow::Stop);
        assert_eq!(session.transcript().last().unwrap().content(), "Hel");

        assert_eq!(session.receive(id, LO), ReadFlow::Stop);
        assert_eq!(session.transcript().last().unwrap().content(), "Hel");
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let (mut session, id) = started("hi");
        let (a, b) = HEL.split_at(17);

        session.receive(id, a);
        assert_eq!(session.transcript().len(), 1);
        session.receive(id, b);
        assert_eq!(session.transcript().last().unwrap().content(), "Hel");
    }

    #[test]
    fn test_multibyte_token_split_across_chunks() {
        let frame = "data: {\"type\":\"token\",\"content\":\"café ☕\"}\n\n".as_bytes();
        let cut = frame.iter().position(|b| *b == 0xe2).unwrap() + 1;

        let (mut whole, whole_id) = started("hi");
        whole.receive(whole_id, frame);

        let (mut split, split_id) = started("hi");
        split.receive(split_id, &frame[..cut]);
        split.receive(split_id, &frame[cut..]);

        assert_eq!(
            split.transcript().last().unwrap().content(),
            whole.transcript().last().unwrap().content()
        );
        assert_eq!(split.transcript().last().unwrap().content(), "café ☕");
    }

    #[test]
    fn test_finish_without_done_flushes_and_idles() {
        let (mut session, id) = started("hi");
        session.receive(id, HEL);
        session.receive(id, b"data: {\"type\":\"token\",\"content\":\"p\"}");

        session.finish(id);

        assert_eq!(session.transcript().last().unwrap().content(), "Help");
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_failure_keeps_partial_reply() {
        let (mut session, id) = started("hi");
        session.receive(id, HEL);

        session.fail(id, &ClientError::Transport("connection reset".to_string()));

        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.transcript().last().unwrap().content(), "Hel");
    }

    #[test]
    fn test_stale_stream_is_ignored() {
        let (mut session, old) = started("first");
        session.receive(old, DONE);

        let mut input = "second".to_string();
        let current = session.submit(&mut input).unwrap().stream_id;
        assert_ne!(old, current);

        assert_eq!(session.receive(old, HEL), ReadFlow::Stop);
        session.finish(old);
        session.fail(old, &ClientError::NoBody);

        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.state(), SessionState::Streaming(current));
    }

    #[test]
    fn test_revision_tracks_mutations() {
        let (mut session, id) = started("hi");
        let after_submit = session.revision();
        assert_eq!(after_submit, 1);

        session.receive(id, b"data: nope\n\n");
        assert_eq!(session.revision(), after_submit);

        session.receive(id, HEL);
        session.receive(id, LO);
        assert_eq!(session.revision(), after_submit + 2);
    }

    #[tokio::test]
    async fn test_stream_reply_to_done() {
        let transport = ScriptedTransport::new(&[HEL, LO, DONE]);
        let mut session = ChatSession::new("1");
        let mut input = "hi".to_string();
        let request = session.submit(&mut input).unwrap();

        let mut snapshots = Vec::new();
        session
            .stream_reply(&transport, request, |t| {
                snapshots.push(t.last().map(|m| m.content().to_string()));
            })
            .await
            .unwrap();

        assert_eq!(
            snapshots,
            vec![Some("Hel".to_string()), Some("Hello".to_string())]
        );
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_stream_reply_end_of_body() {
        let transport = ScriptedTransport::new(&[HEL, b"data: {\"type\":\"token\",\"content\":\"p\"}"]);
        let mut session = ChatSession::new("1");
        let mut input = "hi".to_string();
        let request = session.submit(&mut input).unwrap();

        session
            .stream_reply(&transport, request, |_| {})
            .await
            .unwrap();

        assert_eq!(session.transcript().last().unwrap().content(), "Help");
        assert!(!session.is_streaming());
    }

    #[tokio::test]
    async fn test_stream_reply_transport_failure() {
        let mut transport = ScriptedTransport::new(&[HEL]);
        transport.fail_with = Some("connection reset".to_string());
        let mut session = ChatSession::new("1");
        let mut input = "hi".to_string();
        let request = session.submit(&mut input).unwrap();

        let result = session.stream_reply(&transport, request, |_| {}).await;

        assert!(matches!(result, Err(ClientError::Transport(_))));
        assert!(!session.is_streaming());
        assert_eq!(session.transcript().last().unwrap().content(), "Hel");
    }

    #[tokio::test]
    async fn test_stream_reply_unreadable_body() {
        let mut transport = ScriptedTransport::new(&[]);
        transport.refuse = true;
        let mut session = ChatSession::new("1");
        let mut input = "hi".to_string();
        let request = session.submit(&mut input).unwrap();

        let result = session.stream_reply(&transport, request, |_| {}).await;

        assert!(matches!(result, Err(ClientError::NoBody)));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.transcript().len(), 1);
    }
}
