//! Lazily opened connection to `bluetoothd`

use bluer::{Adapter, Address, Session};
use tracing::{debug, info};

use crate::config::BluezConfig;
use crate::error::BluezError;
use crate::protocol::parse_address;

/// Session and adapter shared by discovery and advertising.
///
/// Opened on first use and dropped again after a failure, so the next
/// supervisor run reconnects to `bluetoothd` from scratch.
pub(crate) struct BluezStack {
    adapter_name: Option<String>,
    handles: Option<(Session, Adapter)>,
}

impl BluezStack {
    pub(crate) fn new(config: &BluezConfig) -> Self {
        Self {
            adapter_name: config.adapter.clone(),
            handles: None,
        }
    }

    /// Session and powered adapter, opening them if needed
    pub(crate) async fn open(&mut self) -> Result<(Session, Adapter), BluezError> {
        if let Some((session, adapter)) = &self.handles {
            return Ok((session.clone(), adapter.clone()));
        }

        let session = Session::new().await?;
        let adapter = match &self.adapter_name {
            Some(name) => session.adapter(name)?,
            None => session.default_adapter().await?,
        };

        if !adapter.is_powered().await.unwrap_or(false) {
            adapter.set_powered(true).await?;
        }

        info!("Bluetooth adapter {} initialized", adapter.name());
        self.handles = Some((session.clone(), adapter.clone()));
        Ok((session, adapter))
    }

    /// Forget the current session after an error
    pub(crate) fn reset(&mut self) {
        if self.handles.take().is_some() {
            debug!("Dropped BlueZ session");
        }
    }
}

pub(crate) fn bluer_address(address: &str) -> Result<Address, BluezError> {
    parse_address(address).map(Address::new)
}
