//! Transport backends for `spacemouse`.
//!
//! A [`HidBackend`] enumerates attached devices and opens a [`Transport`]
//! for a `(vendor_id, product_id)` pair. Discovery only depends on this
//! narrow surface.
//!
//! # Feature flags
//! - **`hid`** (default): [`hid::HidApiBackend`], backed by `hidapi`.
//!
//! [`virtual_input::VirtualBackend`] is always available; it serves scripted
//! reports from memory for demos and tests.

use crate::device::Transport;
use crate::error::Result;
use crate::metadata::DeviceMeta;

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
pub mod hid;
pub mod virtual_input;

pub trait HidBackend {
    /// Every attached HID transport, in OS enumeration order.
    fn enumerate(&mut self) -> Result<Vec<DeviceMeta>>;

    /// Open the first transport matching `(vendor_id, product_id)`.
    fn open(&mut self, vendor_id: u16, product_id: u16) -> Result<Box<dyn Transport>>;
}

impl<B: HidBackend + ?Sized> HidBackend for &mut B {
    fn enumerate(&mut self) -> Result<Vec<DeviceMeta>> {
        (**self).enumerate()
    }

    fn open(&mut self, vendor_id: u16, product_id: u16) -> Result<Box<dyn Transport>> {
        (**self).open(vendor_id, product_id)
    }
}
