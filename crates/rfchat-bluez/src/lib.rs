//! BlueZ RFCOMM transport for rfchat
//!
//! This crate implements the collaborator traits from `rfchat-core` on top of
//! the Linux Bluetooth stack, using the `bluer` crate to talk to `bluetoothd`.
//!
//! ## Architecture
//!
//! - `config` - Adapter selection and lookup/connect timeouts
//! - `error` - Error types specific to the BlueZ transport
//! - `protocol` - Bluetooth address parsing and the Serial Port SDP record
//! - `stack` - Lazily opened `bluetoothd` session and adapter
//! - `discovery` - Service lookup and connection (client role)
//! - `advertising` - Profile registration and accept loop (server role)
//!
//! ## Usage
//!
//! ```rust,no_run
//! # #[cfg(target_os = "linux")]
//! # async fn example() -> rfchat_core::ChatResult<()> {
//! use rfchat_bluez::{BluezConfig, BluezDiscovery};
//! use rfchat_core::{ChatConfig, ClientEndpoint, ConnectionSupervisor, ServiceDescriptor};
//!
//! let descriptor = ServiceDescriptor::client(
//!     "chat",
//!     "94f39d29-7d6d-437d-973b-fba39e49d4ee",
//!     "00:1A:7D:DA:71:13",
//! )?;
//! let endpoint = ClientEndpoint::new(BluezDiscovery::new(BluezConfig::default()), descriptor);
//! let mut supervisor = ConnectionSupervisor::new(
//!     endpoint,
//!     ChatConfig::default(),
//!     tokio::io::stdin(),
//!     tokio::io::stdout(),
//! );
//! supervisor.run_until(std::future::pending()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Platform Support
//!
//! Discovery and advertisement require BlueZ and are only built on Linux.
//! Configuration, errors and address parsing are available everywhere.

mod config;
mod error;
mod protocol;

#[cfg(target_os = "linux")]
mod advertising;
#[cfg(target_os = "linux")]
mod discovery;
#[cfg(target_os = "linux")]
mod stack;

// Public API exports
pub use config::BluezConfig;
pub use error::BluezError;
pub use protocol::{parse_address, serial_port_record, SERIAL_PORT_CLASS};

#[cfg(target_os = "linux")]
pub use advertising::{BluezAdvertiser, BluezListener};
#[cfg(target_os = "linux")]
pub use discovery::BluezDiscovery;
