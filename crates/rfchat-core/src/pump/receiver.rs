//! Receiver pump: link chunks to local output

use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::debug;

use super::{PumpReport, PumpSide};
use crate::error::ChatError;
use crate::signal::DisconnectSignal;

/// Copy inbound chunks from the link to local output until the session ends.
///
/// Bytes are forwarded exactly as read, one chunk per read, with no framing or
/// decoding. A zero-length read (orderly close), a transport error or a failed
/// output write raises the disconnect signal. Timeouts are not errors.
pub async fn run_receiver<R, W>(
    link: &mut R,
    output: &mut W,
    signal: &DisconnectSignal,
    poll_timeout: Duration,
    buffer_size: usize,
) -> PumpReport
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut bytes_received = 0u64;

    let error = loop {
        if signal.is_raised() {
            debug!("Receiver stopping after {} bytes", bytes_received);
            return PumpReport::signalled(PumpSide::Receiver, bytes_received);
        }

        let n = match timeout(poll_timeout, link.read(&mut buf)).await {
            Err(_) => continue,
            Ok(Ok(0)) => break ChatError::PeerClosed,
            Ok(Ok(n)) => n,
            Ok(Err(e)) if is_timeout(&e) => continue,
            Ok(Err(e)) => break ChatError::ReceiveFailed(e.to_string()),
        };

        if let Err(e) = forward(output, &buf[..n]).await {
            break ChatError::OutputFailed(e.to_string());
        }
        bytes_received += n as u64;
    };

    let initiated = signal.raise();
    debug!("Receive ended: {}", error);
    PumpReport::failed(PumpSide::Receiver, bytes_received, error, initiated)
}

async fn forward<W: AsyncWrite + Unpin>(output: &mut W, chunk: &[u8]) -> io::Result<()> {
    output.write_all(chunk).await?;
    output.flush().await
}

/// Socket-level timeouts surface as errors on some transports
fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}
