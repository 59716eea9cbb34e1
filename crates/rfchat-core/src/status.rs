//! Connection status markers written to the local output stream
//!
//! External supervisors and pipelines watch stdout for these lines, so each
//! marker is flushed as soon as it is written.

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Marker emitted when a session starts
pub const CONNECTED_MARKER: &str = "[CONNECTED]";

/// Marker emitted before acquisition starts and after a session ends
pub const DISCONNECTED_MARKER: &str = "[DISCONNECTED]";

/// Link status as reported on the output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Connected,
    Disconnected,
}

impl Status {
    /// Marker text for this status
    pub fn marker(self) -> &'static str {
        match self {
            Self::Connected => CONNECTED_MARKER,
            Self::Disconnected => DISCONNECTED_MARKER,
        }
    }
}

/// Write the status marker as its own line and flush it
pub async fn emit_status<W>(output: &mut W, status: Status) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut line = Vec::with_capacity(status.marker().len() + 1);
    line.extend_from_slice(status.marker().as_bytes());
    line.push(b'\n');
    output.write_all(&line).await?;
    output.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_status_writes_marker_lines() {
        let mut output = Vec::new();
        emit_status(&mut output, Status::Disconnected).await.unwrap();
        emit_status(&mut output, Status::Connected).await.unwrap();
        assert_eq!(output, b"[DISCONNECTED]\n[CONNECTED]\n");
    }
}
