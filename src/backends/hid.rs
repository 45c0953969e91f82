//! `hidapi`-backed transport.
//!
//! [`HidApiBackend`] wraps a `hidapi::HidApi` context; [`HidTransport`] wraps
//! an open `hidapi::HidDevice`. Reads are blocking with a timeout, which is
//! what lets the poller notice a stop request within one timeout interval.

use crate::backends::HidBackend;
use crate::device::Transport;
use crate::error::{Result, SpaceMouseError};
use crate::metadata::DeviceMeta;
use hidapi::{DeviceInfo, HidApi, HidDevice};
use tracing::debug;

pub struct HidApiBackend {
    api: HidApi,
}

impl HidApiBackend {
    pub fn new() -> Result<Self> {
        let api = HidApi::new().map_err(|e| SpaceMouseError::Transport(e.to_string()))?;
        Ok(Self { api })
    }
}

impl HidBackend for HidApiBackend {
    fn enumerate(&mut self) -> Result<Vec<DeviceMeta>> {
        self.api
            .refresh_devices()
            .map_err(|e| SpaceMouseError::Transport(e.to_string()))?;
        Ok(self.api.device_list().map(meta).collect())
    }

    fn open(&mut self, vendor_id: u16, product_id: u16) -> Result<Box<dyn Transport>> {
        let raw = self
            .api
            .open(vendor_id, product_id)
            .map_err(|e| SpaceMouseError::Transport(e.to_string()))?;
        debug!(vid = vendor_id, pid = product_id, "opened hid transport");
        Ok(Box::new(HidTransport { raw }))
    }
}

/// Build a [`DeviceMeta`] snapshot for a `hidapi` device entry.
fn meta(info: &DeviceInfo) -> DeviceMeta {
    let interface_number = match info.interface_number() {
        n if n >= 0 => Some(n),
        _ => None,
    };
    DeviceMeta {
        vid: info.vendor_id(),
        pid: info.product_id(),
        path: Some(info.path().to_string_lossy().to_string()),
        product_string: info.product_string().map(str::to_string),
        manufacturer_string: info.manufacturer_string().map(str::to_string),
        serial_number: info.serial_number().map(str::to_string),
        usage_page: Some(info.usage_page()),
        usage: Some(info.usage()),
        interface_number,
    }
}

pub struct HidTransport {
    raw: HidDevice,
}

impl Transport for HidTransport {
    fn read(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize> {
        self.raw
            .read_timeout(buf, timeout_ms)
            .map_err(|e| SpaceMouseError::TransportGone(e.to_string()))
    }

    fn product_string(&self) -> Result<Option<String>> {
        self.raw
            .get_product_string()
            .map_err(|e| SpaceMouseError::Transport(e.to_string()))
    }

    fn manufacturer_string(&self) -> Result<Option<String>> {
        self.raw
            .get_manufacturer_string()
            .map_err(|e| SpaceMouseError::Transport(e.to_string()))
    }

    fn serial_number(&self) -> Result<Option<String>> {
        self.raw
            .get_serial_number_string()
            .map_err(|e| SpaceMouseError::Transport(e.to_string()))
    }
}
