//! Service descriptors and wireless-stack collaborator traits
//!
//! Discovery, advertisement and connection setup are delegated to the platform's
//! Bluetooth stack. The supervisor only sees the traits below and the links they
//! produce.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};
use uuid::Uuid;

use crate::error::{ChatError, ChatResult};

// ----------------------------------------------------------------------------
// Links
// ----------------------------------------------------------------------------

/// Connected, stream-oriented channel to the peer
pub trait Link: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> Link for T {}

// ----------------------------------------------------------------------------
// Service Descriptions
// ----------------------------------------------------------------------------

/// The service this endpoint looks for (client) or offers (server)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub name: String,
    pub uuid: Uuid,
    /// Remote device address; only meaningful for the client role
    pub address: Option<String>,
    /// Fixed RFCOMM channel; `None` lets the stack pick or resolve one
    pub channel: Option<u8>,
}

impl ServiceDescriptor {
    /// Descriptor for the client role
    pub fn client(name: &str, uuid: &str, address: &str) -> ChatResult<Self> {
        let address = address.trim();
        if address.is_empty() {
            return Err(ChatError::InvalidDescriptor("remote address is empty".into()));
        }
        Ok(Self {
            address: Some(address.to_string()),
            ..Self::server(name, uuid)?
        })
    }

    /// Descriptor for the server role
    pub fn server(name: &str, uuid: &str) -> ChatResult<Self> {
        if name.trim().is_empty() {
            return Err(ChatError::InvalidDescriptor("service name is empty".into()));
        }
        let uuid = Uuid::parse_str(uuid.trim()).map_err(|e| {
            ChatError::InvalidDescriptor(format!("service uuid {:?}: {}", uuid, e))
        })?;
        Ok(Self {
            name: name.to_string(),
            uuid,
            address: None,
            channel: None,
        })
    }

    /// Pin the RFCOMM channel
    pub fn with_channel(mut self, channel: Option<u8>) -> Self {
        self.channel = channel;
        self
    }
}

impl fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({})", self.name, self.uuid)?;
        if let Some(address) = &self.address {
            write!(f, " at {}", address)?;
        }
        Ok(())
    }
}

/// One result of a service lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMatch {
    pub name: String,
    pub host: String,
    /// RFCOMM channel, when the lookup could resolve it
    pub port: Option<u8>,
}

/// The remote side of an accepted connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    pub address: String,
    pub channel: Option<u8>,
}

impl fmt::Display for PeerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.channel {
            Some(channel) => write!(f, "{} channel {}", self.address, channel),
            None => f.write_str(&self.address),
        }
    }
}

// ----------------------------------------------------------------------------
// Collaborator Traits
// ----------------------------------------------------------------------------

/// Client-side stack operations: service lookup and connect
#[async_trait]
pub trait ServiceDiscovery: Send {
    type Link: Link;

    /// Look up services matching the descriptor
    async fn find(&mut self, descriptor: &ServiceDescriptor) -> ChatResult<Vec<ServiceMatch>>;

    /// Open a link to a lookup result
    async fn connect(
        &mut self,
        service: &ServiceMatch,
        descriptor: &ServiceDescriptor,
    ) -> ChatResult<Self::Link>;
}

/// Server-side stack operation: register the service so peers can find it
#[async_trait]
pub trait ServiceAdvertiser: Send {
    type Listener: ServiceListener;

    /// Start listening and advertise the descriptor.
    ///
    /// The advertisement stays active for as long as the returned listener lives.
    async fn advertise(&mut self, descriptor: &ServiceDescriptor) -> ChatResult<Self::Listener>;
}

/// Accepts incoming connections for an advertised service
#[async_trait]
pub trait ServiceListener: Send {
    type Link: Link;

    /// Wait for the next peer
    async fn accept(&mut self) -> ChatResult<(Self::Link, PeerInfo)>;
}
