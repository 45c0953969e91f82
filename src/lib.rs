//! spacemouse: real-time decoder for 3Dconnexion 6-DoF input devices.
//!
//! Finds a supported device among the attached HID transports, decodes its
//! raw reports into normalized [`MotionState`] snapshots, and delivers them
//! by callback, pull queue, or on-demand peek.
//!
//! ```no_run
//! use spacemouse::{DeviceManager, StateLogger};
//!
//! # fn main() -> spacemouse::Result<()> {
//! let mut manager = DeviceManager::discover()?;
//! let mut session = manager.open(None, Some(StateLogger::new("mouse").into_callback()), None)?;
//! session.run()?;
//! # Ok(())
//! # }
//! ```

pub mod active;
pub mod backends;
pub mod config;
pub mod decoder;
pub mod device;
pub mod error;
pub mod event;
pub mod eventbus;
pub mod logger;
pub mod manager;
pub mod metadata;
pub mod poller;
pub mod registry;
pub mod session;
pub mod snapshot;

pub use config::SessionConfig;
pub use decoder::{to_int16, ReportDecoder};
pub use device::*;
pub use error::{Result, SpaceMouseError};
pub use event::*;
pub use eventbus::{StateCallback, StateEvent, StateKind};
pub use logger::StateLogger;
pub use manager::DeviceManager;
pub use metadata::DeviceMeta;
pub use poller::PollerState;
pub use registry::{DeviceSpec, Sign};
pub use session::DeviceSession;
pub use snapshot::{ButtonState, MotionState};
