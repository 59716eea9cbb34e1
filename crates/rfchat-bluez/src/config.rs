//! BlueZ transport configuration

use std::time::Duration;

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Configuration for the BlueZ transport
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BluezConfig {
    /// Adapter to use (e.g. "hci0"); `None` picks the default adapter
    pub adapter: Option<String>,
    /// How long to scan for a remote device that BlueZ does not know yet
    pub scan_timeout: Duration,
    /// Maximum time to wait for a profile-level connection
    pub connect_timeout: Duration,
}

impl Default for BluezConfig {
    fn default() -> Self {
        Self {
            adapter: None,
            scan_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl BluezConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific adapter
    pub fn with_adapter(mut self, adapter: Option<String>) -> Self {
        self.adapter = adapter;
        self
    }

    /// Set scan timeout
    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = BluezConfig::new()
            .with_adapter(Some("hci1".into()))
            .with_scan_timeout(Duration::from_secs(3))
            .with_connect_timeout(Duration::from_secs(4));

        assert_eq!(config.adapter.as_deref(), Some("hci1"));
        assert_eq!(config.scan_timeout, Duration::from_secs(3));
        assert_eq!(config.connect_timeout, Duration::from_secs(4));
    }
}
