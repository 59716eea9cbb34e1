//! Cancel-safe line reader for local input

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Reads newline-terminated lines from local input.
///
/// The sender waits on [`next_line`](Self::next_line) under a timeout, so the
/// future may be dropped at any await point. Partial lines are kept in the
/// reader itself rather than in the future, which makes the wait cancel-safe
/// and lets the same reader survive across sessions.
#[derive(Debug)]
pub struct LineInput<R> {
    reader: BufReader<R>,
    pending: Vec<u8>,
    eof: bool,
}

impl<R: AsyncRead + Unpin> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            pending: Vec::new(),
            eof: false,
        }
    }

    /// Whether local input has been closed
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Next line including its terminator, or the unterminated tail at end of input.
    ///
    /// Returns `Ok(None)` once input is exhausted.
    pub async fn next_line(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        if self.eof {
            return Ok(None);
        }

        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                self.eof = true;
                if self.pending.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(std::mem::take(&mut self.pending)));
            }

            let (used, complete) = match available.iter().position(|&b| b == b'\n') {
                Some(index) => (index + 1, true),
                None => (available.len(), false),
            };
            self.pending.extend_from_slice(&available[..used]);
            self.reader.consume(used);

            if complete {
                return Ok(Some(std::mem::take(&mut self.pending)));
            }
        }
    }
}
