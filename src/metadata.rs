//! Enumeration record for one attached transport.
//!
//! [`DeviceMeta`] is a lightweight, cloneable description returned by
//! [`HidBackend::enumerate`](crate::backends::HidBackend::enumerate). Backends
//! populate what they know; unknown fields remain `None`.
//!
//! ## Identity notes
//! - `vid`/`pid` select the [`DeviceSpec`](crate::registry::DeviceSpec).
//! - One physical device may enumerate several times (one entry per HID
//!   interface or usage), so discovery de-duplicates by model.
//! - `path` is platform-specific; treat it as diagnostic, not identity.

use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeviceMeta {
    pub vid: u16,
    pub pid: u16,

    /// OS/topological path to the device (opaque).
    pub path: Option<String>,

    pub product_string: Option<String>,

    pub manufacturer_string: Option<String>,

    pub serial_number: Option<String>,

    /// HID Usage Page (0x01 Generic Desktop for 6-DoF controllers), if known.
    pub usage_page: Option<u16>,

    /// HID Usage within the page (0x08 Multi-axis Controller), if known.
    pub usage: Option<u16>,

    /// Some stacks report `-1` for "not applicable"; that maps to `None`.
    pub interface_number: Option<i32>,
}

impl DeviceMeta {
    pub fn new(vid: u16, pid: u16) -> Self {
        Self {
            vid,
            pid,
            ..Default::default()
        }
    }

    #[inline]
    pub fn transport_id(&self) -> (u16, u16) {
        (self.vid, self.pid)
    }
}
