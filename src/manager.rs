//! Discovery and selection.
//!
//! [`DeviceManager`] enumerates attached transports through a [`HidBackend`],
//! matches them against the registry by `(vendor_id, product_id)` and opens
//! the chosen model as a [`DeviceSession`].
//!
//! One physical device often enumerates several times (one entry per HID
//! interface); [`list_connected`](DeviceManager::list_connected) reports each
//! model once, in first-seen enumeration order.

#[cfg(feature = "hid")]
use crate::backends::hid::HidApiBackend;
use crate::backends::HidBackend;
use crate::config::SessionConfig;
use crate::error::{Result, SpaceMouseError};
use crate::eventbus::StateCallback;
use crate::registry::{self, DeviceSpec};
use crate::session::DeviceSession;
use tracing::{debug, info};

pub struct DeviceManager<B: HidBackend> {
    backend: B,
    config: SessionConfig,
}

#[cfg(feature = "hid")]
impl DeviceManager<HidApiBackend> {
    /// Manager over the platform HID stack.
    pub fn discover() -> Result<Self> {
        Ok(Self::new(HidApiBackend::new()?))
    }
}

impl<B: HidBackend> DeviceManager<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, SessionConfig::default())
    }

    pub fn with_config(backend: B, config: SessionConfig) -> Self {
        Self { backend, config }
    }

    /// Direct access to the backend, e.g. for raw enumeration.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Names of the supported models currently attached, each at most once.
    pub fn list_connected(&mut self) -> Result<Vec<&'static str>> {
        let mut names: Vec<&'static str> = Vec::new();
        for meta in self.backend.enumerate()? {
            if let Some(spec) = registry::find_by_transport_id(meta.vid, meta.pid) {
                if !names.contains(&spec.name) {
                    debug!(device = spec.name, path = ?meta.path, "matched transport");
                    names.push(spec.name);
                }
            }
        }
        Ok(names)
    }

    /// Pick a spec: the named model if it is attached, else the first attached one.
    pub fn select(&mut self, name: Option<&str>) -> Result<&'static DeviceSpec> {
        let connected = self.list_connected()?;
        match name {
            Some(name) => {
                let spec = registry::lookup(name)?;
                if connected.contains(&spec.name) {
                    Ok(spec)
                } else {
                    Err(SpaceMouseError::DeviceNotFound(name.to_string()))
                }
            }
            None => connected
                .first()
                .map(|first| registry::lookup(first))
                .unwrap_or(Err(SpaceMouseError::NoDeviceConnected)),
        }
    }

    /// Select, open, and wire callbacks. `name` falls back to the configured device.
    pub fn open(
        &mut self,
        name: Option<&str>,
        motion: Option<StateCallback>,
        buttons: Option<StateCallback>,
    ) -> Result<DeviceSession> {
        let wanted = name.map(str::to_string).or_else(|| self.config.device.clone());
        let spec = self.select(wanted.as_deref())?.clone();
        let mut session = DeviceSession::with_config(spec, self.config.clone());
        session.set_callbacks(motion, buttons);
        session.open(&mut self.backend)?;
        info!("{}", session.describe_connection());
        Ok(session)
    }
}
