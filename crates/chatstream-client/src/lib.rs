//! Streaming chat client for chatstream.
//!
//! Sends a user message to a chat backend and folds the streamed reply
//! into a [`Transcript`](chatstream_core::Transcript) as it arrives.
//!
//! # Example
//!
//! ```rust,no_run
//! use chatstream_client::{ChatSession, ClientConfig, HttpTransport};
//!
//! async fn ask() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::default();
//!     let transport = HttpTransport::new(&config)?;
//!     let mut session = ChatSession::new(config.user_id.clone());
//!
//!     let mut input = String::from("What is 2 + 2?");
//!     let request = session.submit(&mut input)?;
//!     session
//!         .stream_reply(&transport, request, |transcript| {
//!             if let Some(last) = transcript.last() {
//!                 println!("{}", last.content());
//!             }
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```

mod config;
mod decoder;
mod error;
mod session;
mod transport;
mod wire;

pub use config::{ClientConfig, DEFAULT_ENDPOINT, DEFAULT_USER_ID};
pub use decoder::StreamDecoder;
pub use error::{ClientError, SubmitError};
pub use session::{ChatRequest, ChatSession, ReadFlow, SessionState, StreamId};
pub use transport::{ByteStream, ChatTransport, HttpTransport};
pub use wire::{events, parse_frame, DATA_PREFIX, DONE_SENTINEL, FRAME_DELIMITER};
