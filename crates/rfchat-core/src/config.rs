//! Session and supervisor configuration

use std::time::Duration;

use crate::discoverable::DiscoverableCommand;
use crate::error::{ChatError, ChatResult};

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Configuration shared by the supervisor, the session manager and both pumps
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChatConfig {
    /// Bounded wait used by both pumps when polling input, link reads and link writes
    pub poll_timeout: Duration,
    /// Largest inbound chunk taken from the link in one read
    pub read_buffer_size: usize,
    /// Pause between failed acquisition attempts (zero retries immediately)
    pub retry_delay: Duration,
    /// Command run before advertising in the server role; `None` skips it
    pub discoverable: Option<DiscoverableCommand>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(1),
            read_buffer_size: 1024,
            retry_delay: Duration::ZERO,
            discoverable: Some(DiscoverableCommand::default()),
        }
    }
}

impl ChatConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pump poll timeout
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Set the inbound read buffer size
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Set the delay between acquisition retries
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set or clear the discoverability command
    pub fn with_discoverable(mut self, command: Option<DiscoverableCommand>) -> Self {
        self.discoverable = command;
        self
    }

    /// Reject settings the pumps cannot work with
    pub fn validate(&self) -> ChatResult<()> {
        if self.poll_timeout.is_zero() {
            return Err(ChatError::Config("poll timeout must be non-zero".into()));
        }
        if self.read_buffer_size == 0 {
            return Err(ChatError::Config("read buffer size must be non-zero".into()));
        }
        if let Some(command) = &self.discoverable {
            if command.program.trim().is_empty() {
                return Err(ChatError::Config("discoverable command is empty".into()));
            }
        }
        Ok(())
    }
}
