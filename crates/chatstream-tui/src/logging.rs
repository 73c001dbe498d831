//! Tracing subscriber setup.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "chatstream=info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Log to a file so the terminal UI is not disturbed.
///
/// If the file cannot be created, logging stays disabled.
pub fn init_file(path: &Path) {
    let Ok(file) = File::create(path) else {
        return;
    };

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_env_filter(filter())
        .with_ansi(false)
        .init();
}

/// Log to stderr, keeping stdout for the reply text.
pub fn init_stderr() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter())
        .init();
}
