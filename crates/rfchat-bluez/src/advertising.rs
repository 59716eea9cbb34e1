//! Service advertisement and accept loop for the server role

use async_trait::async_trait;
use bluer::rfcomm::{Profile, ProfileHandle, Role, Stream};
use bluer::Session;
use futures::StreamExt;
use rfchat_core::{
    ChatError, ChatResult, PeerInfo, ServiceAdvertiser, ServiceDescriptor, ServiceListener,
};
use tracing::{debug, info};

use crate::config::BluezConfig;
use crate::error::BluezError;
use crate::protocol::serial_port_record;
use crate::stack::BluezStack;

// ----------------------------------------------------------------------------
// Advertiser
// ----------------------------------------------------------------------------

/// Registers the service as an RFCOMM server profile with BlueZ.
///
/// BlueZ publishes the SDP record and listens on the channel; incoming
/// connections arrive as profile connect requests.
pub struct BluezAdvertiser {
    stack: BluezStack,
}

impl BluezAdvertiser {
    pub fn new(config: BluezConfig) -> Self {
        Self {
            stack: BluezStack::new(&config),
        }
    }

    async fn register(&mut self, descriptor: &ServiceDescriptor) -> Result<BluezListener, BluezError> {
        let (session, _adapter) = self.stack.open().await?;

        // BlueZ picks the channel when none is given, so a hand-written record
        // (which has to name the channel) is only possible for a fixed one.
        let service_record = descriptor
            .channel
            .map(|channel| serial_port_record(&descriptor.name, &descriptor.uuid, channel));
        let profile = Profile {
            uuid: descriptor.uuid,
            name: Some(descriptor.name.clone()),
            role: Some(Role::Server),
            channel: descriptor.channel.map(u16::from),
            require_authentication: Some(false),
            require_authorization: Some(false),
            service_record,
            ..Default::default()
        };
        let handle = session.register_profile(profile).await?;

        info!(
            "Registered RFCOMM profile {} on channel {}",
            descriptor.uuid,
            descriptor
                .channel
                .map_or_else(|| "any".to_string(), |channel| channel.to_string())
        );
        Ok(BluezListener {
            handle,
            _session: session,
        })
    }
}

#[async_trait]
impl ServiceAdvertiser for BluezAdvertiser {
    type Listener = BluezListener;

    async fn advertise(&mut self, descriptor: &ServiceDescriptor) -> ChatResult<BluezListener> {
        match self.register(descriptor).await {
            Ok(listener) => Ok(listener),
            Err(e) => {
                self.stack.reset();
                Err(ChatError::Advertisement(e.to_string()))
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Listener
// ----------------------------------------------------------------------------

/// Accepts peers for a registered profile. Dropping it unregisters the service.
pub struct BluezListener {
    handle: ProfileHandle,
    _session: Session,
}

#[async_trait]
impl ServiceListener for BluezListener {
    type Link = Stream;

    async fn accept(&mut self) -> ChatResult<(Stream, PeerInfo)> {
        let request = self
            .handle
            .next()
            .await
            .ok_or_else(|| ChatError::Advertisement(BluezError::ProfileClosed.to_string()))?;

        let address = request.device();
        match request.accept() {
            Ok(stream) => {
                let channel = stream.peer_addr().ok().map(|peer| peer.channel);
                Ok((
                    stream,
                    PeerInfo {
                        address: address.to_string(),
                        channel,
                    },
                ))
            }
            Err(e) => {
                debug!("Failed to accept connection from {}: {}", address, e);
                Err(ChatError::AcceptNotReady)
            }
        }
    }
}
