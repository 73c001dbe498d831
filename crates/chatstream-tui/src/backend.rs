//! Network thread: sends chat requests and forwards reply chunks to the UI.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use chatstream_client::{ChatRequest, ChatTransport, StreamId};

use crate::event::{BackendCommand, UiEvent};

/// Run the command loop.
///
/// This function runs in a separate thread with its own tokio runtime.
/// At most one reply is read at a time; sending a new request abandons
/// the previous one.
pub async fn run_backend(
    transport: Arc<dyn ChatTransport>,
    ui_tx: mpsc::Sender<UiEvent>,
    mut cmd_rx: mpsc::Receiver<BackendCommand>,
) {
    let mut active: Option<(StreamId, JoinHandle<()>)> = None;

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            BackendCommand::Send(request) => {
                if let Some((previous, handle)) = active.take() {
                    debug!(stream_id = %previous, "Abandoning previous reply");
                    handle.abort();
                }

                let id = request.stream_id;
                let handle = tokio::spawn(read_reply(
                    Arc::clone(&transport),
                    request,
                    ui_tx.clone(),
                ));
                active = Some((id, handle));
            }
            BackendCommand::Abandon(id) => {
                if let Some((current, handle)) = active.take() {
                    if current == id {
                        debug!(stream_id = %id, "Reply abandoned");
                        handle.abort();
                    } else {
                        active = Some((current, handle));
                    }
                }
            }
            BackendCommand::Quit => {
                info!("Received quit command, shutting down backend");
                break;
            }
        }
    }

    if let Some((_, handle)) = active {
        handle.abort();
    }

    info!("Backend shutdown complete");
}

/// Open the reply for `request` and forward its body chunk by chunk.
async fn read_reply(
    transport: Arc<dyn ChatTransport>,
    request: ChatRequest,
    ui_tx: mpsc::Sender<UiEvent>,
) {
    let id = request.stream_id;

    let mut body = match transport.open(&request).await {
        Ok(body) => body,
        Err(error) => {
            let _ = ui_tx.send(UiEvent::StreamFailed { id, error }).await;
            return;
        }
    };

    while let Some(chunk) = body.next().await {
        let event = match chunk {
            Ok(bytes) => UiEvent::Chunk { id, bytes },
            Err(error) => {
                let _ = ui_tx.send(UiEvent::StreamFailed { id, error }).await;
                return;
            }
        };

        if ui_tx.send(event).await.is_err() {
            // UI is gone
            return;
        }
    }

    let _ = ui_tx.send(UiEvent::BodyEnded { id }).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chatstream_client::{ByteStream, ChatSession, ClientError};
    use futures_util::stream;

    struct FixedReply(Vec<&'static [u8]>);

    #[async_trait]
    impl ChatTransport for FixedReply {
        async fn open(&self, _request: &ChatRequest) -> Result<ByteStream, ClientError> {
            let chunks: Vec<Result<Vec<u8>, ClientError>> =
                self.0.iter().map(|c| Ok(c.to_vec())).collect();
            Ok(stream::iter(chunks).boxed())
        }
    }

    struct Unreachable;

    #[async_trait]
    impl ChatTransport for Unreachable {
        async fn open(&self, _request: &ChatRequest) -> Result<ByteStream, ClientError> {
            Err(ClientError::Transport("connection refused".to_string()))
        }
    }

    fn request() -> ChatRequest {
        let mut session = ChatSession::new("1");
        let mut input = "hi".to_string();
        session.submit(&mut input).unwrap()
    }

    #[tokio::test]
    async fn test_forwards_chunks_then_end() {
        let transport: Arc<dyn ChatTransport> =
            Arc::new(FixedReply(vec![&b"data: a\n\n"[..], &b"data: [DONE]\n\n"[..]]));
        let (ui_tx, mut ui_rx) = mpsc::channel(16);
        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let backend = tokio::spawn(run_backend(transport, ui_tx, cmd_rx));

        let request = request();
        let id = request.stream_id;
        cmd_tx.send(BackendCommand::Send(request)).await.unwrap();

        match ui_rx.recv().await.unwrap() {
            UiEvent::Chunk { id: got, bytes } => {
                assert_eq!(got, id);
                assert_eq!(bytes, b"data: a\n\n");
            }
            other => panic!("Expected Chunk, got {:?}", other),
        }
        assert!(matches!(ui_rx.recv().await, Some(UiEvent::Chunk { .. })));
        assert!(matches!(ui_rx.recv().await, Some(UiEvent::BodyEnded { .. })));

        cmd_tx.send(BackendCommand::Quit).await.unwrap();
        backend.await.unwrap();
    }

    #[tokio::test]
    async fn test_open_failure_is_reported() {
        let transport: Arc<dyn ChatTransport> = Arc::new(Unreachable);
        let (ui_tx, mut ui_rx) = mpsc::channel(16);
        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let backend = tokio::spawn(run_backend(transport, ui_tx, cmd_rx));

        cmd_tx.send(BackendCommand::Send(request())).await.unwrap();

        let event = ui_rx.recv().await.unwrap();
        assert!(matches!(
            event,
            UiEvent::StreamFailed {
                error: ClientError::Transport(_),
                ..
            }
        ));

        drop(cmd_tx);
        backend.await.unwrap();
    }
}
