//! Sender pump: local input lines to the link

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::{sleep, timeout};
use tracing::debug;

use super::{LineInput, PumpReport, PumpSide};
use crate::error::ChatError;
use crate::signal::DisconnectSignal;

/// Forward local input lines to the link until the session ends.
///
/// A failed or timed-out transmission raises the disconnect signal; there is no
/// retry within the pump. Once local input is exhausted the pump stays idle and
/// keeps watching the signal so a closed stdin does not end the session.
pub async fn run_sender<R, W>(
    input: &mut LineInput<R>,
    link: &mut W,
    signal: &DisconnectSignal,
    poll_timeout: Duration,
) -> PumpReport
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines_sent = 0u64;

    loop {
        if signal.is_raised() {
            debug!("Sender stopping after {} lines", lines_sent);
            return PumpReport::signalled(PumpSide::Sender, lines_sent);
        }

        if input.is_eof() {
            sleep(poll_timeout).await;
            continue;
        }

        let line = match timeout(poll_timeout, input.next_line()).await {
            Err(_) => continue,
            Ok(Ok(Some(line))) => line,
            Ok(Ok(None)) => {
                debug!("Local input closed; sender idling");
                continue;
            }
            Ok(Err(e)) => {
                debug!("Failed to read local input: {}; sender idling", e);
                sleep(poll_timeout).await;
                continue;
            }
        };

        if let Err(error) = transmit(link, &line, poll_timeout).await {
            let initiated = signal.raise();
            debug!("Send failed: {}", error);
            return PumpReport::failed(PumpSide::Sender, lines_sent, error, initiated);
        }
        lines_sent += 1;
    }
}

async fn transmit<W>(link: &mut W, line: &[u8], poll_timeout: Duration) -> Result<(), ChatError>
where
    W: AsyncWrite + Unpin,
{
    let write = async {
        link.write_all(line).await?;
        link.flush().await
    };

    match timeout(poll_timeout, write).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ChatError::SendFailed(e.to_string())),
        Err(_) => Err(ChatError::SendFailed("timed out".into())),
    }
}
