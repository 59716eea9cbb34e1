//! Role dispatch: builds the endpoint for the chosen role and runs the
//! supervisor over stdin/stdout until the operator interrupts.

use rfchat_core::{ChatConfig, Endpoint, ServiceDescriptor, SupervisorStats};
use tracing::{info, warn};

use crate::cli::Commands;
use crate::config::AppConfig;
use crate::error::Result;

/// Validated invocation, ready to run
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Client(ServiceDescriptor),
    Server(ServiceDescriptor),
}

impl Invocation {
    /// Check the command-line arguments before any Bluetooth work starts
    pub fn from_command(command: &Commands) -> Result<Self> {
        match command {
            Commands::Client {
                name,
                uuid,
                address,
                channel,
            } => {
                rfchat_bluez::parse_address(address)?;
                let descriptor = ServiceDescriptor::client(name, uuid, address)?;
                Ok(Invocation::Client(descriptor.with_channel(*channel)))
            }
            Commands::Server {
                name,
                uuid,
                channel,
            } => {
                let descriptor = ServiceDescriptor::server(name, uuid)?;
                Ok(Invocation::Server(descriptor.with_channel(*channel)))
            }
        }
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        match self {
            Invocation::Client(descriptor) | Invocation::Server(descriptor) => descriptor,
        }
    }
}

/// Run the chat for `invocation` until Ctrl-C
#[cfg(target_os = "linux")]
pub async fn run(invocation: Invocation, config: &AppConfig) -> Result<SupervisorStats> {
    use rfchat_bluez::{BluezAdvertiser, BluezDiscovery};
    use rfchat_core::{ClientEndpoint, ServerEndpoint};

    let chat = config.chat_config();
    let bluez = config.bluez_config();

    match invocation {
        Invocation::Client(descriptor) => {
            info!("Running as client for {}", descriptor);
            let endpoint = ClientEndpoint::new(BluezDiscovery::new(bluez), descriptor);
            supervise(endpoint, chat).await
        }
        Invocation::Server(descriptor) => {
            info!("Running as server for {}", descriptor);
            let discoverable = chat.discoverable.clone();
            let endpoint =
                ServerEndpoint::new(BluezAdvertiser::new(bluez), descriptor, discoverable);
            supervise(endpoint, chat).await
        }
    }
}

#[cfg(not(target_os = "linux"))]
pub async fn run(invocation: Invocation, _config: &AppConfig) -> Result<SupervisorStats> {
    Err(crate::error::CliError::FeatureNotAvailable(format!(
        "Bluetooth RFCOMM requires BlueZ on Linux (cannot serve {})",
        invocation.descriptor()
    )))
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
async fn supervise<E: Endpoint>(endpoint: E, chat: ChatConfig) -> Result<SupervisorStats> {
    let mut supervisor = rfchat_core::ConnectionSupervisor::new(
        endpoint,
        chat,
        tokio::io::stdin(),
        tokio::io::stdout(),
    );
    let stats = supervisor.run_until(interrupted()).await?;
    Ok(stats)
}

/// Resolves on Ctrl-C. If the handler cannot be installed the chat runs until killed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
