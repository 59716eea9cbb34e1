//! Connection supervisor and duplex session engine for rfchat
//!
//! This crate keeps a line-oriented text session alive over a connection-oriented
//! serial link (RFCOMM in practice), acting either as the advertising endpoint
//! ("server") or the discovering endpoint ("client"). It is transport-agnostic:
//! anything implementing `AsyncRead + AsyncWrite` can be driven as a link, and the
//! wireless stack is reached only through the collaborator traits in [`transport`].
//!
//! ## Architecture
//!
//! - [`signal`] - Per-session, set-once disconnect flag shared by the two pumps
//! - [`pump`] - Sender (local input to link) and receiver (link to local output) loops
//! - [`session`] - Runs both pumps over one link and tears the link down
//! - [`supervisor`] - Outer retry loop: acquire a link, run a session, repeat
//! - [`endpoint`] - Client (discovery) and server (advertisement) acquisition policies
//! - [`transport`] - Service descriptors and collaborator traits for the wireless stack
//! - [`discoverable`] - Fire-and-forget command that makes the local adapter discoverable
//! - [`status`] - `[CONNECTED]` / `[DISCONNECTED]` stdout markers
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rfchat_core::{ChatConfig, ClientEndpoint, ConnectionSupervisor, ServiceDescriptor};
//! # use rfchat_core::transport::ServiceDiscovery;
//!
//! # async fn example<D: ServiceDiscovery>(discovery: D) -> rfchat_core::ChatResult<()> {
//! let descriptor = ServiceDescriptor::client(
//!     "chat",
//!     "94f39d29-7d6d-437d-973b-fba39e49d4ee",
//!     "00:1A:7D:DA:71:13",
//! )?;
//! let endpoint = ClientEndpoint::new(discovery, descriptor);
//! let mut supervisor = ConnectionSupervisor::new(
//!     endpoint,
//!     ChatConfig::default(),
//!     tokio::io::stdin(),
//!     tokio::io::stdout(),
//! );
//!
//! // Runs until Ctrl-C; every other failure restarts the cycle.
//! supervisor
//!     .run_until(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod discoverable;
pub mod endpoint;
pub mod error;
pub mod pump;
pub mod session;
pub mod signal;
pub mod status;
pub mod supervisor;
pub mod transport;

// Public API exports
pub use config::ChatConfig;
pub use discoverable::DiscoverableCommand;
pub use endpoint::{ClientEndpoint, Endpoint, Role, ServerEndpoint};
pub use error::{ChatError, ChatResult, ErrorKind};
pub use pump::{LineInput, PumpExit, PumpReport, PumpSide};
pub use session::{SessionManager, SessionReport};
pub use signal::DisconnectSignal;
pub use status::{emit_status, Status, CONNECTED_MARKER, DISCONNECTED_MARKER};
pub use supervisor::{ConnectionSupervisor, SupervisorState, SupervisorStats};
pub use transport::{
    Link, PeerInfo, ServiceAdvertiser, ServiceDescriptor, ServiceDiscovery, ServiceListener,
    ServiceMatch,
};
