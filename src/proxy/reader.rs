//! Protocol Line Reader
//!
//! Buffered reader yielding one newline-terminated byte line at a time,
//! robust against partial reads and binary-safe.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// Upper bound on a single protocol line.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

// == Line Reader ==
/// Reads `\n`-terminated lines from a buffered stream.
///
/// Lines are returned with their terminator intact so callers can forward
/// them verbatim. A line that hits end-of-stream before its newline is
/// returned as-is; callers decide whether a partial line is acceptable.
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    /// Wraps a buffered stream.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    // == Read Line ==
    /// Returns the next line, or `None` at a clean end-of-stream.
    ///
    /// Fails with `InvalidData` when a line exceeds [`MAX_LINE_BYTES`];
    /// the limit is enforced while reading, so an unterminated flood
    /// cannot grow the buffer without bound.
    pub async fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();

        let mut limited = (&mut self.inner).take(MAX_LINE_BYTES as u64 + 1);
        limited.read_until(b'\n', &mut line).await?;

        if line.is_empty() {
            return Ok(None);
        }
        if line.len() > MAX_LINE_BYTES {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "protocol line too long",
            ));
        }
        Ok(Some(line))
    }
}
