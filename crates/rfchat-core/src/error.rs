//! Error types for rfchat
//!
//! Every failure is mapped to exactly one [`ErrorKind`]: retryable conditions
//! restart acquisition, session-fatal conditions end the current session, and
//! process-fatal conditions prevent the supervisor from starting (or, for an
//! interrupt, stop it).

use thiserror::Error;

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Errors raised while acquiring links and running sessions
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("No service named {name:?} found")]
    NoServiceFound { name: String },

    #[error("Service lookup is ambiguous: {count} matches")]
    AmbiguousService { count: usize },

    #[error("Listener is not ready to accept")]
    AcceptNotReady,

    #[error("Service discovery failed: {0}")]
    Discovery(String),

    #[error("Service advertisement failed: {0}")]
    Advertisement(String),

    #[error("Failed to connect to service: {0}")]
    Connect(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to send to peer: {0}")]
    SendFailed(String),

    #[error("Peer closed the connection")]
    PeerClosed,

    #[error("Failed to receive from peer: {0}")]
    ReceiveFailed(String),

    #[error("Failed to write local output: {0}")]
    OutputFailed(String),

    #[error("Interrupted by operator")]
    Interrupted,

    #[error("Invalid service descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for rfchat operations
pub type ChatResult<T> = std::result::Result<T, ChatError>;

/// How the supervisor reacts to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Discovery, advertisement and transient I/O failures; the cycle is retried
    Retryable,
    /// Transmit/receive failures; the current session ends
    SessionFatal,
    /// Operator interrupt and unusable configuration. Configuration is rejected
    /// before the supervisor starts; once running, only an interrupt stops it.
    ProcessFatal,
}

impl ChatError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoServiceFound { .. }
            | Self::AmbiguousService { .. }
            | Self::AcceptNotReady
            | Self::Discovery(_)
            | Self::Advertisement(_)
            | Self::Connect(_)
            | Self::Io(_) => ErrorKind::Retryable,
            Self::SendFailed(_)
            | Self::PeerClosed
            | Self::ReceiveFailed(_)
            | Self::OutputFailed(_) => ErrorKind::SessionFatal,
            Self::Interrupted | Self::InvalidDescriptor(_) | Self::Config(_) => {
                ErrorKind::ProcessFatal
            }
        }
    }

    /// Whether acquisition should simply be attempted again without restarting the run.
    ///
    /// Lookups that found nothing (or too much) and listeners that were not ready
    /// stay in place; every other retryable error restarts from idle.
    pub fn retry_in_place(&self) -> bool {
        matches!(
            self,
            Self::NoServiceFound { .. } | Self::AmbiguousService { .. } | Self::AcceptNotReady
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ChatError::NoServiceFound { name: "chat".into() }.kind(),
            ErrorKind::Retryable
        );
        assert_eq!(ChatError::Discovery("boom".into()).kind(), ErrorKind::Retryable);
        assert_eq!(ChatError::PeerClosed.kind(), ErrorKind::SessionFatal);
        assert_eq!(ChatError::SendFailed("pipe".into()).kind(), ErrorKind::SessionFatal);
        assert_eq!(ChatError::Interrupted.kind(), ErrorKind::ProcessFatal);
    }

    #[test]
    fn test_retry_in_place() {
        assert!(ChatError::AmbiguousService { count: 2 }.retry_in_place());
        assert!(ChatError::AcceptNotReady.retry_in_place());
        assert!(!ChatError::Connect("refused".into()).retry_in_place());
        assert!(!ChatError::Advertisement("busy".into()).retry_in_place());
    }
}
