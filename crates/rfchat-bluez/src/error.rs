//! Error types for the BlueZ transport

use rfchat_core::ChatError;
use thiserror::Error;

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Errors specific to the BlueZ transport
#[derive(Error, Debug)]
pub enum BluezError {
    #[cfg(target_os = "linux")]
    #[error("BlueZ error: {0}")]
    Bluez(#[from] bluer::Error),

    #[error("Invalid Bluetooth address: {0:?}")]
    InvalidAddress(String),

    #[error("Profile registration closed")]
    ProfileClosed,

    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),

    #[error("Socket error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BluezError> for ChatError {
    fn from(err: BluezError) -> Self {
        ChatError::Connect(err.to_string())
    }
}
