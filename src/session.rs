//! One open device.
//!
//! [`DeviceSession`] owns the transport handle, the working state, the
//! decoder for its (private copy of the) [`DeviceSpec`], the registered
//! callbacks and the background [`Poller`]. It is responsible for:
//! - opening the transport and capturing its descriptor strings
//! - one blocking, timeout-bounded read per [`read`](DeviceSession::read)
//! - publishing snapshots (callbacks, pull queues, [`state`](DeviceSession::state))
//! - releasing everything on [`close`](DeviceSession::close) or drop
//!
//! Pick one reading style per session: either call `read()` yourself or
//! `run()` the background poller. Both are memory-safe together, but they
//! would split the report stream between two consumers.
//!
//! Callbacks run on the reading thread without any session lock held. They
//! may call [`state`](DeviceSession::state) but must not block for long.

use crate::backends::HidBackend;
use crate::config::{SessionConfig, DEFAULT_READ_TIMEOUT_MS};
use crate::decoder::ReportDecoder;
use crate::device::{ConnectionInfo, Transport};
use crate::error::{Result, SpaceMouseError};
use crate::event::{Channel, DecodeEvent};
use crate::eventbus::{Handlers, StateCallback, StateEvent};
use crate::poller::{Poller, PollerState};
use crate::registry::DeviceSpec;
use crate::snapshot::MotionState;
use crossbeam::channel::Receiver;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

struct Link {
    transport: Option<Box<dyn Transport>>,
    working: MotionState,
    buf: Vec<u8>,
}

/// State reachable from both the caller and the poller thread.
struct Shared {
    decoder: ReportDecoder,
    link: Mutex<Link>,
    published: RwLock<MotionState>,
    info: RwLock<Option<ConnectionInfo>>,
    connected: AtomicBool,
    handlers: Mutex<Handlers>,
    epoch: Instant,
}

impl Shared {
    fn name(&self) -> &'static str {
        self.decoder.spec().name
    }

    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    fn read_once(&self, timeout_ms: i32) -> Result<MotionState> {
        let (event, snapshot) = {
            let mut guard = self.link.lock();
            let link = &mut *guard;
            let Some(transport) = link.transport.as_mut() else {
                return Err(SpaceMouseError::NotConnected);
            };

            let n = match transport.read(&mut link.buf, timeout_ms) {
                Ok(n) => n.min(link.buf.len()),
                Err(SpaceMouseError::TransportGone(reason)) => {
                    warn!(device = self.name(), %reason, "transport gone");
                    if let Err(e) = release(&mut link.transport) {
                        debug!(device = self.name(), error = %e, "close after disconnect failed");
                    }
                    self.connected.store(false, Ordering::Release);
                    *self.info.write() = None;
                    return Err(SpaceMouseError::TransportGone(reason));
                }
                Err(e) => return Err(e),
            };

            let report = &link.buf[..n];
            let event = self
                .decoder
                .decode_into(&mut link.working, report, self.now())?;
            if n > 0 {
                debug!(device = self.name(), ?event, bytes = ?report, "decoded report");
            }

            if event.publishes() {
                let snapshot = link.working.clone();
                *self.published.write() = snapshot.clone();
                (event, Some(snapshot))
            } else {
                (event, None)
            }
        };

        match snapshot {
            Some(snapshot) => {
                self.dispatch(event, &snapshot);
                Ok(snapshot)
            }
            None => Ok(self.published.read().clone()),
        }
    }

    fn dispatch(&self, event: DecodeEvent, snapshot: &MotionState) {
        let callback = {
            let mut handlers = self.handlers.lock();
            handlers.enqueue(event, snapshot);
            handlers.callback_for(event)
        };
        if let Some(callback) = callback {
            callback(snapshot);
        }
    }
}

fn release(transport: &mut Option<Box<dyn Transport>>) -> Result<()> {
    match transport.take() {
        Some(mut t) => t.close(),
        None => Ok(()),
    }
}

pub struct DeviceSession {
    shared: Arc<Shared>,
    poller: Poller,
    config: SessionConfig,
}

impl DeviceSession {
    /// A closed session bound to its own copy of `spec`.
    pub fn new(spec: DeviceSpec) -> Self {
        Self::with_config(spec, SessionConfig::default())
    }

    /// A non-positive `read_timeout_ms` is replaced by the default so the
    /// poller can always observe a stop request.
    pub fn with_config(spec: DeviceSpec, mut config: SessionConfig) -> Self {
        if config.read_timeout_ms <= 0 {
            warn!(
                device = spec.name,
                requested = config.read_timeout_ms,
                "non-positive read timeout, using {DEFAULT_READ_TIMEOUT_MS} ms"
            );
            config.read_timeout_ms = DEFAULT_READ_TIMEOUT_MS;
        }
        let longest = [Channel::Translation, Channel::Rotation, Channel::Buttons]
            .into_iter()
            .filter_map(|ch| spec.required_len(ch))
            .max()
            .unwrap_or(1);
        let decoder = ReportDecoder::new(spec);
        let working = decoder.initial_state();
        Self {
            shared: Arc::new(Shared {
                link: Mutex::new(Link {
                    transport: None,
                    working: working.clone(),
                    buf: vec![0u8; config.report_len.max(longest)],
                }),
                published: RwLock::new(working),
                info: RwLock::new(None),
                connected: AtomicBool::new(false),
                handlers: Mutex::new(Handlers::new()),
                epoch: Instant::now(),
                decoder,
            }),
            poller: Poller::new(),
            config,
        }
    }

    pub fn spec(&self) -> &DeviceSpec {
        self.shared.decoder.spec()
    }

    pub fn name(&self) -> &'static str {
        self.shared.name()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Open the transport through `backend`. No-op when already open.
    pub fn open<B: HidBackend + ?Sized>(&mut self, backend: &mut B) -> Result<()> {
        let mut link = self.shared.link.lock();
        if link.transport.is_some() {
            return Ok(());
        }
        let spec = self.shared.decoder.spec();
        let transport = backend
            .open(spec.vendor_id, spec.product_id)
            .map_err(|e| SpaceMouseError::DeviceUnavailable {
                name: spec.name.to_string(),
                reason: e.to_string(),
            })?;
        let info = ConnectionInfo::query(transport.as_ref());
        info!(
            device = spec.name,
            vendor = %info.vendor_name,
            product = %info.product_name,
            "device opened"
        );

        let fresh = self.shared.decoder.initial_state();
        link.working = fresh.clone();
        link.transport = Some(transport);
        *self.shared.published.write() = fresh;
        *self.shared.info.write() = Some(info);
        self.shared.connected.store(true, Ordering::Release);
        Ok(())
    }

    /// One blocking read (at most `timeout_ms`), decoded into the working
    /// state. Returns the latest published snapshot.
    pub fn read(&self, timeout_ms: i32) -> Result<MotionState> {
        self.shared.read_once(timeout_ms)
    }

    /// Last published snapshot, or `None` when not connected. Never blocks on the transport.
    pub fn state(&self) -> Option<MotionState> {
        if self.connected() {
            Some(self.shared.published.read().clone())
        } else {
            None
        }
    }

    pub fn connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    pub fn connection_info(&self) -> Option<ConnectionInfo> {
        self.shared.info.read().clone()
    }

    pub fn describe_connection(&self) -> String {
        match self.shared.info.read().as_ref() {
            Some(info) if self.connected() => format!(
                "{} connected to {} {} [serial: {}]",
                self.name(),
                info.vendor_name,
                info.product_name,
                info.serial_number
            ),
            _ => format!("{} [disconnected]", self.name()),
        }
    }

    pub fn set_motion_callback(&self, callback: impl Fn(&MotionState) + Send + Sync + 'static) {
        self.shared.handlers.lock().set_motion(Some(Arc::new(callback)));
    }

    pub fn set_button_callback(&self, callback: impl Fn(&MotionState) + Send + Sync + 'static) {
        self.shared.handlers.lock().set_buttons(Some(Arc::new(callback)));
    }

    /// Install (or clear, with `None`) both callbacks at once.
    pub fn set_callbacks(&self, motion: Option<StateCallback>, buttons: Option<StateCallback>) {
        let mut handlers = self.shared.handlers.lock();
        handlers.set_motion(motion);
        handlers.set_buttons(buttons);
    }

    /// Pull-based alternative to callbacks; holds up to `queue_capacity` events.
    pub fn subscribe(&self) -> Receiver<StateEvent> {
        self.shared
            .handlers
            .lock()
            .subscribe(self.config.queue_capacity)
    }

    /// Start background polling with the configured read timeout.
    ///
    /// If the previous run ended with an error that no `stop()` has reported
    /// yet, that error is returned and polling is not restarted.
    pub fn run(&mut self) -> Result<()> {
        if !self.connected() {
            return Err(SpaceMouseError::NotConnected);
        }
        let name = self.name();
        let shared = Arc::clone(&self.shared);
        let timeout_ms = self.config.read_timeout_ms;
        self.poller
            .run(name, move || shared.read_once(timeout_ms).map(|_| ()))
    }

    /// Stop background polling and wait for the poller thread to exit.
    pub fn stop(&mut self) -> Result<()> {
        self.poller.stop()
    }

    pub fn is_running(&self) -> bool {
        self.poller.is_running()
    }

    pub fn poller_state(&self) -> PollerState {
        self.poller.state()
    }

    /// Stop polling and release the transport. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<()> {
        let stopped = self.poller.stop();
        let released = release(&mut self.shared.link.lock().transport);
        let was_connected = self.shared.connected.swap(false, Ordering::AcqRel);
        *self.shared.info.write() = None;
        if was_connected {
            info!(device = self.name(), "device closed");
        }
        stopped.and(released)
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            debug!(device = self.name(), error = %e, "error while closing dropped session");
        }
    }
}
