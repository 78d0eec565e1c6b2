//! Streaming line framer for inbound host data
//!
//! The transport delivers arbitrary byte chunks; the codec accumulates them
//! and yields one whitespace-trimmed line per LF terminator. Partial lines
//! stay buffered until their terminator arrives.

use tracing::warn;

/// Maximum useful line length; the buffer guard is a multiple of this
const MAX_LINE_LEN: usize = 256;

/// Accumulates raw transport bytes and yields complete command lines
#[derive(Debug)]
pub struct LineCodec {
    buffer: Vec<u8>,
}

impl LineCodec {
    /// Create an empty codec
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(MAX_LINE_LEN),
        }
    }

    /// Push raw bytes into the codec's buffer
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);

        // A peer that never sends a terminator must not grow the buffer
        // unboundedly; keep only the tail
        if self.buffer.len() > MAX_LINE_LEN * 4 {
            let dropped = self.buffer.len() - MAX_LINE_LEN;
            warn!("discarding {dropped} unframed bytes");
            let start = self.buffer.len() - MAX_LINE_LEN;
            self.buffer = self.buffer[start..].to_vec();
        }
    }

    /// Take the next complete line, trimmed of surrounding whitespace
    ///
    /// Returns `None` until a full LF-terminated line is buffered. The
    /// returned line has CR and any other surrounding whitespace stripped.
    pub fn next_line(&mut self) -> Option<String> {
        let term_pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let line_bytes: Vec<u8> = self.buffer.drain(..=term_pos).collect();
        Some(String::from_utf8_lossy(&line_bytes).trim().to_string())
    }

    /// Drop any buffered bytes
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}
