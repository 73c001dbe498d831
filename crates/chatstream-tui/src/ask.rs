//! Incremental stdout rendering for the `ask` command.

use std::io::{self, Write};

use chatstream_core::Transcript;

/// Writes only what is new in the transcript since the last update.
///
/// Tokens extending the current reply are written as they arrive; a new
/// assistant turn starts on a new line.
pub struct ReplyPrinter<W: Write> {
    out: W,
    /// Index of the message currently being written.
    current: usize,
    /// Bytes of `current` already written.
    written: usize,
    /// Whether `current` has been opened (line break emitted if needed).
    started: bool,
    /// Messages before this index belong to earlier turns.
    first_reply: usize,
    error: Option<io::Error>,
}

impl<W: Write> ReplyPrinter<W> {
    /// Start after everything already in `transcript`.
    pub fn new(transcript: &Transcript, out: W) -> Self {
        Self {
            out,
            current: transcript.len(),
            written: 0,
            started: false,
            first_reply: transcript.len(),
            error: None,
        }
    }

    pub fn update(&mut self, transcript: &Transcript) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.write_new(transcript) {
            self.error = Some(e);
        }
    }

    /// Return the writer, or the first write error seen.
    pub fn into_inner(self) -> io::Result<W> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.out),
        }
    }

    fn write_new(&mut self, transcript: &Transcript) -> io::Result<()> {
        let messages = transcript.messages();

        for (index, message) in messages.iter().enumerate().skip(self.current) {
            if !message.is_assistant() {
                continue;
            }
            if index != self.current {
                self.current = index;
                self.written = 0;
                self.started = false;
            }
            if !self.started {
                if index != self.first_reply {
                    writeln!(self.out)?;
                }
                self.started = true;
            }

            let content = message.content();
            self.out.write_all(content[self.written..].as_bytes())?;
            self.written = content.len();
        }

        self.out.flush()
    }
}
