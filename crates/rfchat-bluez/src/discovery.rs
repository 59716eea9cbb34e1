//! Service lookup and connection for the client role

use std::collections::HashSet;

use async_trait::async_trait;
use bluer::rfcomm::{ConnectRequest, Profile, ProfileHandle, Role, SocketAddr, Stream};
use bluer::{Adapter, AdapterEvent, Address, Device};
use futures::{pin_mut, StreamExt};
use rfchat_core::{ChatError, ChatResult, ServiceDescriptor, ServiceDiscovery, ServiceMatch};
use tokio::time::timeout;
use tracing::debug;
use uuid::Uuid;

use crate::config::BluezConfig;
use crate::error::BluezError;
use crate::stack::{bluer_address, BluezStack};

// ----------------------------------------------------------------------------
// Discovery Implementation
// ----------------------------------------------------------------------------

/// Finds the service on a remote device and connects to it over RFCOMM
pub struct BluezDiscovery {
    config: BluezConfig,
    stack: BluezStack,
}

impl BluezDiscovery {
    pub fn new(config: BluezConfig) -> Self {
        Self {
            stack: BluezStack::new(&config),
            config,
        }
    }

    /// Report the devices that offer the service UUID.
    ///
    /// BlueZ does not expose remote service record names, so matching is by
    /// UUID and matches carry the requested name.
    async fn lookup(
        &mut self,
        descriptor: &ServiceDescriptor,
    ) -> Result<Vec<ServiceMatch>, BluezError> {
        let (_session, adapter) = self.stack.open().await?;

        let candidates = match &descriptor.address {
            Some(address) => {
                let address = bluer_address(address)?;
                let cached = cached_uuids(&adapter, address).await?;
                if needs_refresh(cached.as_ref(), &descriptor.uuid) {
                    self.refresh(&adapter, address, &descriptor.uuid).await?;
                }
                vec![address]
            }
            None => adapter.device_addresses().await?,
        };

        let mut matches = Vec::new();
        for address in candidates {
            let uuids = cached_uuids(&adapter, address).await?;
            if needs_refresh(uuids.as_ref(), &descriptor.uuid) {
                continue;
            }

            let device = adapter.device(address)?;
            debug!(
                "{} ({}) offers {}",
                address,
                device.alias().await.unwrap_or_default(),
                descriptor.uuid
            );
            matches.push(ServiceMatch {
                name: descriptor.name.clone(),
                host: address.to_string(),
                port: descriptor.channel,
            });
        }
        Ok(matches)
    }

    /// Scan until the device reports the service or the scan timeout passes.
    ///
    /// Covers both devices BlueZ has never seen and known devices whose cached
    /// service list predates the remote server starting: properties of devices
    /// found during the inquiry are refreshed and reported as change events.
    async fn refresh(
        &self,
        adapter: &Adapter,
        address: Address,
        service: &Uuid,
    ) -> Result<(), BluezError> {
        debug!(
            "{} not known to offer {}; scanning for up to {:?}",
            address, service, self.config.scan_timeout
        );
        let events = adapter.discover_devices_with_changes().await?;
        pin_mut!(events);

        let scan = async {
            while let Some(event) = events.next().await {
                let AdapterEvent::DeviceAdded(seen) = event else {
                    continue;
                };
                if seen != address {
                    continue;
                }
                match cached_uuids(adapter, address).await {
                    Ok(uuids) if !needs_refresh(uuids.as_ref(), service) => return true,
                    Ok(_) => {}
                    Err(e) => debug!("Failed to read services of {}: {}", address, e),
                }
            }
            false
        };

        if !timeout(self.config.scan_timeout, scan).await.unwrap_or(false) {
            debug!("{} was not seen offering {} during the scan", address, service);
        }
        Ok(())
    }

    /// Let BlueZ resolve the channel via SDP and hand us the socket
    async fn connect_profile(
        &mut self,
        address: Address,
        descriptor: &ServiceDescriptor,
    ) -> Result<Stream, BluezError> {
        let (session, adapter) = self.stack.open().await?;

        let profile = Profile {
            uuid: descriptor.uuid,
            name: Some(descriptor.name.clone()),
            role: Some(Role::Client),
            require_authentication: Some(false),
            require_authorization: Some(false),
            auto_connect: Some(false),
            ..Default::default()
        };
        let mut handle = session.register_profile(profile).await?;
        let device = adapter.device(address)?;

        let request = timeout(
            self.config.connect_timeout,
            next_request(&mut handle, &device, &descriptor.uuid),
        )
        .await
        .map_err(|_| BluezError::Timeout("profile connection"))??;

        Ok(request.accept()?)
    }
}

async fn next_request(
    handle: &mut ProfileHandle,
    device: &Device,
    uuid: &Uuid,
) -> Result<ConnectRequest, BluezError> {
    let connect = device.connect_profile(uuid);
    tokio::pin!(connect);
    let mut connected = false;

    loop {
        tokio::select! {
            request = handle.next() => return request.ok_or(BluezError::ProfileClosed),
            result = &mut connect, if !connected => {
                result?;
                connected = true;
            }
        }
    }
}

/// Service UUIDs BlueZ currently lists for `address`; `None` for unknown devices
async fn cached_uuids(
    adapter: &Adapter,
    address: Address,
) -> Result<Option<HashSet<Uuid>>, BluezError> {
    if !adapter.device_addresses().await?.contains(&address) {
        return Ok(None);
    }
    match adapter.device(address)?.uuids().await {
        Ok(uuids) => Ok(uuids),
        Err(e) => {
            debug!("No service records for {}: {}", address, e);
            Ok(None)
        }
    }
}

/// Whether the cached service list fails to show `service`
fn needs_refresh(cached: Option<&HashSet<Uuid>>, service: &Uuid) -> bool {
    !cached.is_some_and(|uuids| uuids.contains(service))
}

#[async_trait]
impl ServiceDiscovery for BluezDiscovery {
    type Link = Stream;

    async fn find(&mut self, descriptor: &ServiceDescriptor) -> ChatResult<Vec<ServiceMatch>> {
        match self.lookup(descriptor).await {
            Ok(matches) => Ok(matches),
            Err(e) => {
                self.stack.reset();
                Err(ChatError::Discovery(e.to_string()))
            }
        }
    }

    async fn connect(
        &mut self,
        service: &ServiceMatch,
        descriptor: &ServiceDescriptor,
    ) -> ChatResult<Stream> {
        let address = bluer_address(&service.host)?;

        let stream = match service.port {
            Some(channel) => Stream::connect(SocketAddr::new(address, channel))
                .await
                .map_err(BluezError::from)?,
            None => self.connect_profile(address, descriptor).await?,
        };

        debug!("RFCOMM link to {} established", address);
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: Uuid = Uuid::from_u128(0x94f39d29_7d6d_437d_973b_fba39e49d4ee);
    const OTHER: Uuid = Uuid::from_u128(0x0000_1101_0000_1000_8000_0080_5f9b_34fb);

    #[test]
    fn test_unknown_device_needs_refresh() {
        assert!(needs_refresh(None, &SERVICE));
    }

    #[test]
    fn test_stale_cache_needs_refresh() {
        let stale: HashSet<Uuid> = [OTHER].into_iter().collect();
        assert!(needs_refresh(Some(&stale), &SERVICE));
        assert!(needs_refresh(Some(&HashSet::new()), &SERVICE));
    }

    #[test]
    fn test_cached_offer_is_used() {
        let cached: HashSet<Uuid> = [OTHER, SERVICE].into_iter().collect();
        assert!(!needs_refresh(Some(&cached), &SERVICE));
    }
}
