//! Session manager: one connected link, two pumps
//!
//! A session owns its link from start to teardown. Both pumps run concurrently
//! inside [`SessionManager::run`] and are joined before the link is shut down,
//! so no pump can outlive the session that started it.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::pump::{run_receiver, run_sender, LineInput, PumpExit, PumpReport, PumpSide};
use crate::signal::DisconnectSignal;
use crate::status::{emit_status, Status};
use crate::transport::Link;

// ----------------------------------------------------------------------------
// Session Report
// ----------------------------------------------------------------------------

/// Outcome of one session
#[derive(Debug)]
pub struct SessionReport {
    pub lines_sent: u64,
    pub bytes_received: u64,
    /// The pump that ended the session and the error it hit
    pub cause: Option<(PumpSide, ChatError)>,
}

impl SessionReport {
    fn from_pumps(sender: PumpReport, receiver: PumpReport) -> Self {
        let lines_sent = sender.transferred;
        let bytes_received = receiver.transferred;

        // The initiating pump wins; a pump that failed after the signal was
        // already raised only matters if nobody else reported a cause.
        let mut cause = None;
        for report in [sender, receiver] {
            if let PumpExit::Failed { error, initiated } = report.exit {
                if initiated || cause.is_none() {
                    cause = Some((report.side, error));
                }
            }
        }

        Self {
            lines_sent,
            bytes_received,
            cause,
        }
    }
}

// ----------------------------------------------------------------------------
// Session Manager
// ----------------------------------------------------------------------------

/// Drives one session over a connected link
pub struct SessionManager<'a, I, O> {
    config: &'a ChatConfig,
    signal: &'a mut DisconnectSignal,
    input: &'a mut LineInput<I>,
    output: &'a mut O,
}

impl<'a, I, O> SessionManager<'a, I, O>
where
    I: AsyncRead + Unpin,
    O: AsyncWrite + Unpin,
{
    pub fn new(
        config: &'a ChatConfig,
        signal: &'a mut DisconnectSignal,
        input: &'a mut LineInput<I>,
        output: &'a mut O,
    ) -> Self {
        Self {
            config,
            signal,
            input,
            output,
        }
    }

    /// Run both pumps over `link` until either ends the session, then tear down.
    ///
    /// On return the link has been shut down and dropped, the disconnect signal
    /// is lowered and `[DISCONNECTED]` has been written.
    pub async fn run<L: Link>(&mut self, link: L) -> SessionReport {
        if self.signal.is_raised() {
            warn!("Disconnect signal was still raised at session start");
            self.signal.reset();
        }

        if let Err(e) = emit_status(&mut *self.output, Status::Connected).await {
            warn!("Failed to write connected marker: {}", e);
        }

        let (mut reader, mut writer) = tokio::io::split(link);
        let poll_timeout = self.config.poll_timeout;
        let buffer_size = self.config.read_buffer_size;
        let signal = &*self.signal;

        let (sender, receiver) = tokio::join!(
            run_sender(&mut *self.input, &mut writer, signal, poll_timeout),
            run_receiver(&mut reader, &mut *self.output, signal, poll_timeout, buffer_size),
        );

        let mut link = reader.unsplit(writer);
        if let Err(e) = link.shutdown().await {
            debug!("Link shutdown reported: {}", e);
        }
        drop(link);

        self.signal.reset();

        if let Err(e) = emit_status(&mut *self.output, Status::Disconnected).await {
            warn!("Failed to write disconnected marker: {}", e);
        }

        let report = SessionReport::from_pumps(sender, receiver);
        match &report.cause {
            Some((side, error)) => info!(
                "Session closed by {:?}: {} ({} lines sent, {} bytes received)",
                side, error, report.lines_sent, report.bytes_received
            ),
            None => info!(
                "Session closed ({} lines sent, {} bytes received)",
                report.lines_sent, report.bytes_received
            ),
        }
        report
    }
}
