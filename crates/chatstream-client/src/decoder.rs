//! Incremental UTF-8 decoding of the response body into whole frames.

use crate::wire::FRAME_DELIMITER;

/// Stateful decoder that turns body chunks into text segments made of
/// complete frames.
///
/// Two residuals are carried between chunks: the bytes of a multi-byte
/// character cut by a chunk boundary, and decoded text after the last
/// frame delimiter. Neither is emitted until it is complete or the body ends.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    /// Undecoded tail of an incomplete UTF-8 sequence.
    partial: Vec<u8>,
    /// Decoded text not yet terminated by a frame delimiter.
    pending: String,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk. Returns the decoded text up to and including the last
    /// frame delimiter, or `None` if no frame was completed by this chunk.
    pub fn push(&mut self, chunk: &[u8]) -> Option<String> {
        self.decode(chunk);

        let end = self.pending.rfind(FRAME_DELIMITER)? + FRAME_DELIMITER.len();
        let rest = self.pending.split_off(end);
        Some(std::mem::replace(&mut self.pending, rest))
    }

    /// Flush everything still buffered at end of body.
    ///
    /// A dangling partial character is emitted as U+FFFD.
    pub fn finish(&mut self) -> Option<String> {
        if !self.partial.is_empty() {
            self.partial.clear();
            self.pending.push(char::REPLACEMENT_CHARACTER);
        }

        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }

    /// Drop all buffered state.
    pub fn reset(&mut self) {
        self.partial.clear();
        self.pending.clear();
    }

    /// Number of buffered bytes not yet emitted.
    pub fn buffered_len(&self) -> usize {
        self.partial.len() + self.pending.len()
    }

    fn decode(&mut self, chunk: &[u8]) {
        let mut input = std::mem::take(&mut self.partial);
        input.extend_from_slice(chunk);

        let mut rest: &[u8] = &input;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.pending.push_str(text);
                    return;
                }
                Err(err) => {
                    let (valid, invalid) = rest.split_at(err.valid_up_to());
                    // `valid` is exactly the prefix from_utf8 accepted.
                    self.pending
                        .push_str(std::str::from_utf8(valid).unwrap_or_default());

                    match err.error_len() {
                        Some(len) => {
                            self.pending.push(char::REPLACEMENT_CHARACTER);
                            rest = &invalid[len..];
                        }
                        None => {
                            self.partial = invalid.to_vec();
                            return;
                        }
                    }
                }
            }
        }
    }
}
