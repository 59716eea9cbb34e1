//! Client and server acquisition policies
//!
//! An [`Endpoint`] turns the wireless-stack collaborators into connected links:
//! the client looks the service up and connects to the single match, the server
//! advertises once per run and then accepts peers one at a time.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::discoverable::DiscoverableCommand;
use crate::error::{ChatError, ChatResult};
use crate::transport::{
    Link, PeerInfo, ServiceAdvertiser, ServiceDescriptor, ServiceDiscovery, ServiceListener,
};

/// Which side of the service this process plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

/// Source of connected links for the supervisor
#[async_trait]
pub trait Endpoint: Send {
    type Link: Link;

    fn role(&self) -> Role;

    /// Prepare a fresh run (discoverability, advertisement)
    async fn open(&mut self) -> ChatResult<()>;

    /// Block until a link to a peer is established
    async fn acquire(&mut self) -> ChatResult<(Self::Link, PeerInfo)>;
}

// ----------------------------------------------------------------------------
// Client Endpoint
// ----------------------------------------------------------------------------

/// Discovers the service and connects to it
pub struct ClientEndpoint<D> {
    discovery: D,
    descriptor: ServiceDescriptor,
}

impl<D: ServiceDiscovery> ClientEndpoint<D> {
    pub fn new(discovery: D, descriptor: ServiceDescriptor) -> Self {
        Self {
            discovery,
            descriptor,
        }
    }
}

#[async_trait]
impl<D: ServiceDiscovery> Endpoint for ClientEndpoint<D> {
    type Link = D::Link;

    fn role(&self) -> Role {
        Role::Client
    }

    async fn open(&mut self) -> ChatResult<()> {
        debug!("Starting client for {}", self.descriptor);
        Ok(())
    }

    async fn acquire(&mut self) -> ChatResult<(Self::Link, PeerInfo)> {
        let mut matches = self.discovery.find(&self.descriptor).await?;

        let service = match matches.len() {
            0 => {
                return Err(ChatError::NoServiceFound {
                    name: self.descriptor.name.clone(),
                })
            }
            1 => matches.remove(0),
            count => return Err(ChatError::AmbiguousService { count }),
        };

        info!("Found service \"{}\" on host {}", service.name, service.host);
        let link = self.discovery.connect(&service, &self.descriptor).await?;

        Ok((
            link,
            PeerInfo {
                address: service.host,
                channel: service.port,
            },
        ))
    }
}

// ----------------------------------------------------------------------------
// Server Endpoint
// ----------------------------------------------------------------------------

/// Advertises the service and accepts peers
pub struct ServerEndpoint<A: ServiceAdvertiser> {
    advertiser: A,
    descriptor: ServiceDescriptor,
    discoverable: Option<DiscoverableCommand>,
    listener: Option<A::Listener>,
}

impl<A: ServiceAdvertiser> ServerEndpoint<A> {
    pub fn new(
        advertiser: A,
        descriptor: ServiceDescriptor,
        discoverable: Option<DiscoverableCommand>,
    ) -> Self {
        Self {
            advertiser,
            descriptor,
            discoverable,
            listener: None,
        }
    }

    /// Whether an advertisement is currently registered
    pub fn is_advertising(&self) -> bool {
        self.listener.is_some()
    }
}

#[async_trait]
impl<A: ServiceAdvertiser> Endpoint for ServerEndpoint<A> {
    type Link = <A::Listener as ServiceListener>::Link;

    fn role(&self) -> Role {
        Role::Server
    }

    async fn open(&mut self) -> ChatResult<()> {
        // Withdraw the previous advertisement before registering a new one
        self.listener = None;

        if let Some(command) = &self.discoverable {
            command.launch();
        }

        debug!("Starting server for {}", self.descriptor);
        let listener = self.advertiser.advertise(&self.descriptor).await?;
        self.listener = Some(listener);
        info!("Advertising {}", self.descriptor);
        Ok(())
    }

    async fn acquire(&mut self) -> ChatResult<(Self::Link, PeerInfo)> {
        let listener = self
            .listener
            .as_mut()
            .ok_or_else(|| ChatError::Advertisement("service is not advertised".into()))?;

        debug!("Waiting for client");
        listener.accept().await
    }
}
