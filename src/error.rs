//! Crate-wide error type.
//!
//! Every fallible operation returns [`Result`]. Discovery and configuration
//! errors are surfaced to the caller and never retried. [`SpaceMouseError::TransportGone`]
//! is special: the background poller treats it as a normal end of the
//! stream (device unplugged) and exits cleanly.

use thiserror::Error;

/// Hint appended to open failures; the usual cause is another process holding the device.
pub const UNAVAILABLE_HINT: &str = "Please check that the device is available and unused. \
On macOS, check that '3DconnexionHelper' is not running in Activity Monitor.";

#[derive(Error, Debug)]
pub enum SpaceMouseError {
    /// The name is not one of the known device models.
    #[error("unrecognized device name {0:?}")]
    UnknownDevice(String),

    #[error("no connected devices found")]
    NoDeviceConnected,

    /// The model is known but no matching transport is attached.
    #[error("device {0:?} is not connected")]
    DeviceNotFound(String),

    #[error("failed to open/access {name:?} device: {reason}. {hint}", hint = UNAVAILABLE_HINT)]
    DeviceUnavailable { name: String, reason: String },

    /// A report was shorter than the byte offsets its channel references.
    #[error("malformed report on channel {channel}: need {needed} bytes, got {actual}")]
    MalformedReport {
        channel: u8,
        needed: usize,
        actual: usize,
    },

    /// I/O failure during a read, typically a physical disconnect.
    #[error("transport gone: {0}")]
    TransportGone(String),

    #[error("not connected")]
    NotConnected,

    #[error("a session for {active:?} is already installed")]
    AlreadyInstalled { active: String },

    /// Non-fatal transport failure (descriptor queries, enumeration).
    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("poller thread panicked")]
    PollerPanicked,
}

impl From<toml::de::Error> for SpaceMouseError {
    fn from(e: toml::de::Error) -> Self {
        SpaceMouseError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SpaceMouseError>;
