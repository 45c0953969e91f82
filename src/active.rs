//! Process-wide default session.
//!
//! A thin convenience layer over [`DeviceSession`] for scripts that want
//! top-level `read()`/`run()`/`close()` calls without carrying a handle.
//! At most one session is installed at a time. [`install`] hands back an
//! [`ActiveGuard`]; dropping it closes and uninstalls that session, so
//! keeping the guard alive in `main` gives cleanup on every exit path.
//!
//! Callbacks of the installed session must not call back into this module.

use crate::backends::HidBackend;
use crate::error::{Result, SpaceMouseError};
use crate::eventbus::StateCallback;
use crate::manager::DeviceManager;
use crate::session::DeviceSession;
use crate::snapshot::MotionState;
use parking_lot::{const_rwlock, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

struct Slot {
    id: u64,
    session: DeviceSession,
}

static ACTIVE: RwLock<Option<Slot>> = const_rwlock(None);
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Closes and uninstalls its session when dropped. Errors at that point are logged and dropped.
#[must_use = "dropping the guard closes the active session"]
pub struct ActiveGuard {
    id: u64,
    name: &'static str,
}

impl ActiveGuard {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        let taken = {
            let mut slot = ACTIVE.write();
            match slot.as_ref() {
                Some(current) if current.id == self.id => slot.take(),
                _ => None,
            }
        };
        if let Some(mut slot) = taken {
            if let Err(e) = slot.session.close() {
                debug!(device = self.name, error = %e, "error closing active session");
            }
        }
    }
}

fn check_free(slot: &Option<Slot>) -> Result<()> {
    match slot {
        Some(current) if current.session.connected() => Err(SpaceMouseError::AlreadyInstalled {
            active: current.session.name().to_string(),
        }),
        _ => Ok(()),
    }
}

/// Make `session` the active one. Fails while another connected session is installed.
pub fn install(session: DeviceSession) -> Result<ActiveGuard> {
    let name = session.name();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let replaced = {
        let mut slot = ACTIVE.write();
        check_free(&slot)?;
        slot.replace(Slot { id, session })
    };
    if let Some(old) = replaced {
        debug!(device = old.session.name(), "replacing disconnected active session");
    }
    info!(device = name, "active session installed");
    Ok(ActiveGuard { id, name })
}

/// Discover, open and install in one step.
pub fn open<B: HidBackend>(
    manager: &mut DeviceManager<B>,
    name: Option<&str>,
    motion: Option<StateCallback>,
    buttons: Option<StateCallback>,
) -> Result<ActiveGuard> {
    check_free(&ACTIVE.read())?;
    let session = manager.open(name, motion, buttons)?;
    install(session)
}

/// Name of the installed session, if any.
pub fn installed() -> Option<&'static str> {
    ACTIVE.read().as_ref().map(|slot| slot.session.name())
}

pub fn read(timeout_ms: i32) -> Result<MotionState> {
    match ACTIVE.read().as_ref() {
        Some(slot) => slot.session.read(timeout_ms),
        None => Err(SpaceMouseError::NotConnected),
    }
}

pub fn state() -> Option<MotionState> {
    ACTIVE.read().as_ref().and_then(|slot| slot.session.state())
}

pub fn run() -> Result<()> {
    match ACTIVE.write().as_mut() {
        Some(slot) => slot.session.run(),
        None => Err(SpaceMouseError::NotConnected),
    }
}

/// Stop the active session's poller. No-op when nothing is installed.
pub fn stop() -> Result<()> {
    match ACTIVE.write().as_mut() {
        Some(slot) => slot.session.stop(),
        None => Ok(()),
    }
}

/// Close and uninstall the active session. No-op when nothing is installed.
pub fn close() -> Result<()> {
    match uninstall() {
        Some(mut session) => session.close(),
        None => Ok(()),
    }
}

/// Take the installed session out of the slot without closing it.
pub fn uninstall() -> Option<DeviceSession> {
    ACTIVE.write().take().map(|slot| slot.session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_input::{VirtualBackend, VirtualDevice};
    use crate::registry;

    // The slot is process-wide; keep every scenario in one test.
    #[test]
    fn active_slot_lifecycle() {
        assert!(matches!(read(0), Err(SpaceMouseError::NotConnected)));
        assert!(state().is_none());
        stop().expect("stop with nothing installed");
        close().expect("close with nothing installed");

        let nav = VirtualDevice::for_spec(registry::lookup("SpaceNavigator").expect("known"));
        let pro = VirtualDevice::for_spec(registry::lookup("SpaceMouse Pro").expect("known"));
        let mut manager = DeviceManager::new(
            VirtualBackend::new()
                .with_device(nav.clone())
                .with_device(pro.clone()),
        );

        let guard = open(&mut manager, Some("SpaceNavigator"), None, None).expect("open");
        assert_eq!(guard.name(), "SpaceNavigator");
        assert_eq!(installed(), Some("SpaceNavigator"));

        nav.push_motion([350, 0, 0, 0, 0, 0]);
        read(10).expect("translation");
        let snapshot = read(10).expect("rotation");
        assert!((snapshot.x - 1.0).abs() < 1e-9);
        assert_eq!(state(), Some(snapshot));

        match open(&mut manager, Some("SpaceMouse Pro"), None, None) {
            Err(SpaceMouseError::AlreadyInstalled { active }) => {
                assert_eq!(active, "SpaceNavigator")
            }
            Err(e) => panic!("expected AlreadyInstalled, got {e:?}"),
            Ok(_) => panic!("second install succeeded"),
        }
        assert!(!pro.is_open(), "second device must not be opened");

        run().expect("run");
        stop().expect("stop");

        drop(guard);
        assert!(installed().is_none());
        assert!(!nav.is_open());

        // A disconnected session is replaced.
        let stale = open(&mut manager, Some("SpaceNavigator"), None, None).expect("reopen");
        nav.disconnect();
        assert!(matches!(read(10), Err(SpaceMouseError::TransportGone(_))));
        let fresh = open(&mut manager, Some("SpaceMouse Pro"), None, None).expect("replace");
        assert_eq!(installed(), Some("SpaceMouse Pro"));

        // Dropping the stale guard leaves the newer session alone.
        drop(stale);
        assert_eq!(installed(), Some("SpaceMouse Pro"));
        assert!(pro.is_open());

        close().expect("close");
        assert!(installed().is_none());
        assert!(!pro.is_open());
        drop(fresh);
    }
}
