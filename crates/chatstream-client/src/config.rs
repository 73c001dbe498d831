//! Client configuration.

use std::time::Duration;

use reqwest::Url;

use crate::error::ClientError;

/// Chat stream endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/chat/chat/stream";

/// User id sent with every request when none is configured.
pub const DEFAULT_USER_ID: &str = "1";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the chat stream endpoint.
    pub endpoint: String,

    /// Identifier sent as `user_id` in the request body.
    pub user_id: String,

    /// Timeout for establishing the TCP connection.
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Check that the endpoint is an absolute http(s) URL and the user id is set.
    pub fn validate(&self) -> Result<(), ClientError> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| ClientError::Config(format!("endpoint '{}': {}", self.endpoint, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "endpoint '{}' must use http or https",
                self.endpoint
            )));
        }

        if self.user_id.trim().is_empty() {
            return Err(ClientError::Config("user id is empty".to_string()));
        }

        Ok(())
    }
}
