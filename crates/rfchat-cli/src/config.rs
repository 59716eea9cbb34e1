//! rfchat CLI configuration
//!
//! Settings come from an optional TOML file and are then overridden by
//! command-line flags. Every section is optional; missing keys take defaults.
//!
//! ```toml
//! log_level = "info"
//!
//! [session]
//! poll_timeout_ms = 1000
//! read_buffer_size = 1024
//! retry_delay_ms = 0
//!
//! [discoverable]
//! enabled = true
//! program = "bluetoothctl"
//! args = ["discoverable", "on"]
//!
//! [bluez]
//! adapter = "hci0"
//! scan_timeout_ms = 10000
//! connect_timeout_ms = 10000
//! ```

use std::path::Path;
use std::time::Duration;

use rfchat_bluez::BluezConfig;
use rfchat_core::{ChatConfig, DiscoverableCommand};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::{CliError, Result};

// ----------------------------------------------------------------------------
// Configuration Sections
// ----------------------------------------------------------------------------

/// Complete configuration for the rfchat binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default tracing level (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
    pub session: SessionSection,
    pub discoverable: DiscoverableSection,
    pub bluez: BluezSection,
}

/// Pump and retry timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub poll_timeout_ms: u64,
    pub read_buffer_size: usize,
    pub retry_delay_ms: u64,
}

/// Command that makes the local adapter discoverable in the server role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverableSection {
    pub enabled: bool,
    pub program: String,
    pub args: Vec<String>,
}

/// BlueZ adapter selection and timeouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BluezSection {
    /// Adapter name such as `hci0`; the default adapter when unset
    pub adapter: Option<String>,
    pub scan_timeout_ms: u64,
    pub connect_timeout_ms: u64,
}

// ----------------------------------------------------------------------------
// Default Implementations
// ----------------------------------------------------------------------------

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            session: SessionSection::default(),
            discoverable: DiscoverableSection::default(),
            bluez: BluezSection::default(),
        }
    }
}

impl Default for SessionSection {
    fn default() -> Self {
        let chat = ChatConfig::default();
        Self {
            poll_timeout_ms: duration_ms(chat.poll_timeout),
            read_buffer_size: chat.read_buffer_size,
            retry_delay_ms: duration_ms(chat.retry_delay),
        }
    }
}

impl Default for DiscoverableSection {
    fn default() -> Self {
        let command = DiscoverableCommand::default();
        Self {
            enabled: true,
            program: command.program,
            args: command.args,
        }
    }
}

impl Default for BluezSection {
    fn default() -> Self {
        let bluez = BluezConfig::default();
        Self {
            adapter: bluez.adapter,
            scan_timeout_ms: duration_ms(bluez.scan_timeout),
            connect_timeout_ms: duration_ms(bluez.connect_timeout),
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ----------------------------------------------------------------------------
// Loading and Conversion
// ----------------------------------------------------------------------------

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line flags on top of the loaded values
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(ms) = cli.poll_timeout_ms {
            self.session.poll_timeout_ms = ms;
        }
        if let Some(ms) = cli.retry_delay_ms {
            self.session.retry_delay_ms = ms;
        }
        if cli.no_discoverable {
            self.discoverable.enabled = false;
        }
        if cli.verbose {
            self.log_level = "debug".to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(CliError::Config(format!(
                "Unknown log level: {}",
                self.log_level
            )));
        }
        if self.discoverable.enabled && self.discoverable.program.trim().is_empty() {
            return Err(CliError::Config(
                "Discoverable program must not be empty".to_string(),
            ));
        }
        self.chat_config().validate()?;
        Ok(())
    }

    pub fn chat_config(&self) -> ChatConfig {
        let discoverable = self.discoverable.enabled.then(|| {
            DiscoverableCommand::new(
                self.discoverable.program.clone(),
                self.discoverable.args.iter().cloned(),
            )
        });

        ChatConfig::new()
            .with_poll_timeout(Duration::from_millis(self.session.poll_timeout_ms))
            .with_read_buffer_size(self.session.read_buffer_size)
            .with_retry_delay(Duration::from_millis(self.session.retry_delay_ms))
            .with_discoverable(discoverable)
    }

    pub fn bluez_config(&self) -> BluezConfig {
        BluezConfig::new()
            .with_adapter(self.bluez.adapter.clone())
            .with_scan_timeout(Duration::from_millis(self.bluez.scan_timeout_ms))
            .with_connect_timeout(Duration::from_millis(self.bluez.connect_timeout_ms))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config_matches_core_defaults() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chat_config(), ChatConfig::default());
        assert_eq!(config.bluez_config(), BluezConfig::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            log_level = "warn"

            [session]
            poll_timeout_ms = 250

            [bluez]
            adapter = "hci1"
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "warn");
        assert_eq!(config.session.poll_timeout_ms, 250);
        assert_eq!(config.session.read_buffer_size, 1024);
        assert_eq!(config.bluez.adapter.as_deref(), Some("hci1"));
        assert!(config.discoverable.enabled);

        let chat = config.chat_config();
        assert_eq!(chat.poll_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(AppConfig::from_toml("log_level = \"loud\"").is_err());
        assert!(AppConfig::from_toml("[session]\npoll_timeout_ms = 0").is_err());
        assert!(AppConfig::from_toml("[session]\nread_buffer_size = 0").is_err());
        assert!(AppConfig::from_toml("[discoverable]\nprogram = \"\"").is_err());
        assert!(AppConfig::from_toml("[session]\npoll_timeout_ms = \"soon\"").is_err());
    }

    #[test]
    fn test_disabled_discoverable_skips_command() {
        let config = AppConfig::from_toml("[discoverable]\nenabled = false\nprogram = \"\"").unwrap();
        assert_eq!(config.chat_config().discoverable, None);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "rfchat",
            "--poll-timeout-ms",
            "50",
            "--retry-delay-ms",
            "500",
            "--no-discoverable",
            "--verbose",
            "server",
            "chat",
            "94f39d29-7d6d-437d-973b-fba39e49d4ee",
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides(&cli);

        assert_eq!(config.log_level, "debug");
        let chat = config.chat_config();
        assert_eq!(chat.poll_timeout, Duration::from_millis(50));
        assert_eq!(chat.retry_delay, Duration::from_millis(500));
        assert_eq!(chat.discoverable, None);
    }
}
