//! Sender and receiver pumps
//!
//! Each session runs two pumps over the halves of one link. Both poll with a
//! bounded wait so that a raised [`DisconnectSignal`](crate::DisconnectSignal)
//! is observed within roughly one poll timeout.

mod input;
mod receiver;
mod sender;

pub use input::LineInput;
pub use receiver::run_receiver;
pub use sender::run_sender;

use crate::error::ChatError;

// ----------------------------------------------------------------------------
// Pump Outcomes
// ----------------------------------------------------------------------------

/// Which pump a report or disconnect cause belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpSide {
    Sender,
    Receiver,
}

/// Why a pump stopped
#[derive(Debug)]
pub enum PumpExit {
    /// The other pump raised the disconnect signal
    Signalled,
    /// This pump hit a session-fatal error and raised the signal itself
    Failed {
        error: ChatError,
        /// `false` when the other pump had already raised the signal
        initiated: bool,
    },
}

/// Summary of one pump run
#[derive(Debug)]
pub struct PumpReport {
    pub side: PumpSide,
    /// Lines sent (sender) or bytes received (receiver)
    pub transferred: u64,
    pub exit: PumpExit,
}

impl PumpReport {
    pub(crate) fn signalled(side: PumpSide, transferred: u64) -> Self {
        Self {
            side,
            transferred,
            exit: PumpExit::Signalled,
        }
    }

    pub(crate) fn failed(side: PumpSide, transferred: u64, error: ChatError, initiated: bool) -> Self {
        Self {
            side,
            transferred,
            exit: PumpExit::Failed { error, initiated },
        }
    }

    /// Whether this pump was the one that ended the session
    pub fn initiated_disconnect(&self) -> bool {
        matches!(self.exit, PumpExit::Failed { initiated: true, .. })
    }
}
