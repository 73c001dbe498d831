//! Transport seam between the send controller and the network.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::ChatRequest;

/// Response body as an ordered stream of raw chunks.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, ClientError>>;

/// Opens a streamed reply for one chat request.
///
/// Dropping the returned stream releases the connection. The server is
/// not told that the reply was abandoned.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send the request and return its body once it is known to be readable.
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream, ClientError>;
}

/// HTTP transport: `POST`s the request as JSON and streams the response body.
pub struct HttpTransport {
    inner: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport for the configured endpoint.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let inner = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            inner,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream, ClientError> {
        debug!(url = %self.endpoint, stream_id = %request.stream_id, "POST chat request");

        let response = self.inner.post(&self.endpoint).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            return Err(ClientError::NoBody);
        }

        info!(stream_id = %request.stream_id, status = status.as_u16(), "Reply stream opened");

        Ok(response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| ClientError::Transport(e.to_string()))
            })
            .boxed())
    }
}
