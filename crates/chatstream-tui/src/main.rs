//! chatstream terminal client.
//!
//! Sends messages to a chat backend and renders the assistant reply as it
//! streams in.

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;

use chatstream_client::{
    ChatSession, ChatTransport, ClientConfig, HttpTransport, DEFAULT_ENDPOINT, DEFAULT_USER_ID,
};

mod app;
mod ask;
mod backend;
mod event;
mod logging;
mod state;
mod ui;

use app::App;
use ask::ReplyPrinter;
use event::{BackendCommand, UiEvent};

#[derive(Parser)]
#[command(name = "chatstream")]
#[command(about = "Streaming chat client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat screen
    #[command(alias = "c")]
    Chat {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// File to write logs to (the terminal is owned by the UI)
        #[arg(long, default_value = "/tmp/chatstream.log")]
        log_file: PathBuf,
    },

    /// Send one message and print the streamed reply to stdout
    #[command(alias = "a")]
    Ask {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Message to send
        message: String,
    },
}

#[derive(Args)]
struct ConnectionArgs {
    /// Chat stream endpoint
    #[arg(short, long, env = "CHATSTREAM_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// User id sent with each message
    #[arg(short, long, env = "CHATSTREAM_USER_ID", default_value = DEFAULT_USER_ID)]
    user_id: String,

    /// Connect timeout in seconds
    #[arg(long, default_value = "10")]
    connect_timeout: u64,
}

impl ConnectionArgs {
    fn into_config(self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint,
            user_id: self.user_id,
            connect_timeout: Duration::from_secs(self.connect_timeout),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            connection,
            log_file,
        } => {
            logging::init_file(&log_file);
            run_chat_tui(connection.into_config())?;
        }
        Commands::Ask {
            connection,
            message,
        } => {
            logging::init_stderr();
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(ask(connection.into_config(), message))?;
        }
    }

    Ok(())
}

fn run_chat_tui(config: ClientConfig) -> Result<(), Box<dyn Error>> {
    let transport: Arc<dyn ChatTransport> = Arc::new(HttpTransport::new(&config)?);
    info!(endpoint = %config.endpoint, user_id = %config.user_id, "Starting chat TUI");

    // Create channels for UI <-> backend communication
    let (ui_tx, ui_rx) = mpsc::channel::<UiEvent>(256);
    let (cmd_tx, cmd_rx) = mpsc::channel::<BackendCommand>(16);

    // Network reads run on a background thread with its own tokio runtime
    let rt = tokio::runtime::Runtime::new()?;
    let bg_handle = std::thread::spawn(move || {
        rt.block_on(backend::run_backend(transport, ui_tx, cmd_rx));
    });

    // Initialize terminal (enters alternate screen, enables raw mode)
    let terminal = ratatui::init();

    let mut app = App::new(ChatSession::new(config.user_id), ui_rx, cmd_tx);
    let result = app.run(terminal);

    // Restore terminal (exits alternate screen, disables raw mode)
    ratatui::restore();

    let _ = bg_handle.join();

    info!("TUI shutdown complete");

    result.map_err(|e| e.into())
}

async fn ask(config: ClientConfig, message: String) -> Result<(), Box<dyn Error>> {
    let transport = HttpTransport::new(&config)?;
    let mut session = ChatSession::new(config.user_id);

    let mut input = message;
    let request = session.submit(&mut input)?;

    let mut printer = ReplyPrinter::new(session.transcript(), std::io::stdout().lock());
    let streamed = session
        .stream_reply(&transport, request, |transcript| printer.update(transcript))
        .await;

    let mut out = printer.into_inner()?;
    writeln!(out)?;
    out.flush()?;

    streamed.map_err(|e| e.into())
}
