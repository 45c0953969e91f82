//! Transport seam.
//!
//! A [`Transport`] is an open handle to one physical device. The session owns
//! it exclusively and only ever touches it from one thread at a time (the
//! caller's `read()` or the poller, never both).

use crate::error::Result;

pub trait Transport: Send {
    /// Blocking read of one input report into `buf`, waiting at most
    /// `timeout_ms` (`-1` blocks indefinitely). Returns the number of bytes
    /// written, `0` on timeout.
    ///
    /// An I/O failure must map to [`SpaceMouseError::TransportGone`](crate::SpaceMouseError::TransportGone).
    fn read(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize>;

    fn product_string(&self) -> Result<Option<String>>;

    fn manufacturer_string(&self) -> Result<Option<String>>;

    fn serial_number(&self) -> Result<Option<String>> {
        Ok(None)
    }

    /// Release the handle. Dropping the transport must also release it.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Descriptor strings captured when a transport is opened.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub vendor_name: String,
    pub product_name: String,
    pub serial_number: String,
}

impl ConnectionInfo {
    /// Query the descriptor strings; failures degrade to empty strings.
    pub fn query(transport: &dyn Transport) -> Self {
        let text = |r: Result<Option<String>>| r.ok().flatten().unwrap_or_default();
        Self {
            vendor_name: text(transport.manufacturer_string()),
            product_name: text(transport.product_string()),
            serial_number: text(transport.serial_number()),
        }
    }
}
