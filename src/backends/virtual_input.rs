//! In-memory backend serving scripted reports.
//!
//! A [`VirtualDevice`] is a cheap, cloneable handle: clones share the same
//! report queue and connection flags, so a test can keep one clone to feed
//! reports while the session reads through a [`VirtualTransport`] opened
//! from another.

use crate::backends::HidBackend;
use crate::decoder::{axis_channels, encode_axes, encode_buttons};
use crate::device::Transport;
use crate::error::{Result, SpaceMouseError};
use crate::metadata::DeviceMeta;
use crate::registry::DeviceSpec;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Shared {
    queue: Mutex<VecDeque<Vec<u8>>>,
    ready: Condvar,
    connected: AtomicBool,
    busy: AtomicBool,
    open_handles: AtomicUsize,
}

#[derive(Clone)]
pub struct VirtualDevice {
    meta: DeviceMeta,
    spec: Option<DeviceSpec>,
    shared: Arc<Shared>,
}

impl VirtualDevice {
    pub fn new(vid: u16, pid: u16) -> Self {
        Self {
            meta: DeviceMeta::new(vid, pid),
            spec: None,
            shared: Arc::new(Shared {
                queue: Mutex::new(VecDeque::new()),
                ready: Condvar::new(),
                connected: AtomicBool::new(true),
                busy: AtomicBool::new(false),
                open_handles: AtomicUsize::new(0),
            }),
        }
    }

    /// A device that enumerates as `spec` and can encode reports for it.
    pub fn for_spec(spec: &DeviceSpec) -> Self {
        let mut dev = Self::new(spec.vendor_id, spec.product_id);
        dev.meta.product_string = Some(spec.name.to_string());
        dev.meta.manufacturer_string = Some("3Dconnexion".to_string());
        dev.meta.usage_page = Some(0x01);
        dev.meta.usage = Some(0x08);
        dev.spec = Some(spec.clone());
        dev
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.meta.path = Some(path.into());
        self
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.meta.serial_number = Some(serial.into());
        self
    }

    pub fn meta(&self) -> &DeviceMeta {
        &self.meta
    }

    /// Queue one raw report.
    pub fn feed(&self, report: impl Into<Vec<u8>>) {
        self.shared.queue.lock().push_back(report.into());
        self.shared.ready.notify_all();
    }

    /// Queue the axis reports for one motion sample (raw values in
    /// [`Axis::ALL`](crate::Axis::ALL) order). No-op without a spec.
    pub fn push_motion(&self, raw: [i16; 6]) {
        if let Some(spec) = &self.spec {
            for channel in axis_channels(spec) {
                self.feed(encode_axes(spec, channel, raw));
            }
        }
    }

    /// Queue a buttons report. No-op without a spec.
    pub fn push_buttons(&self, pressed: &[bool]) {
        if let Some(spec) = &self.spec {
            self.feed(encode_buttons(spec, pressed));
        }
    }

    pub fn pending(&self) -> usize {
        self.shared.queue.lock().len()
    }

    /// Simulate unplugging: every read from now on fails with `TransportGone`.
    pub fn disconnect(&self) {
        self.shared.connected.store(false, Ordering::Release);
        self.shared.ready.notify_all();
    }

    /// While busy, opening fails the way a device claimed by another process does.
    pub fn set_busy(&self, busy: bool) {
        self.shared.busy.store(busy, Ordering::Release);
    }

    /// True while at least one transport opened from this device is alive.
    pub fn is_open(&self) -> bool {
        self.shared.open_handles.load(Ordering::Acquire) > 0
    }
}

#[derive(Default)]
pub struct VirtualBackend {
    devices: Vec<VirtualDevice>,
}

impl VirtualBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_device(&mut self, device: VirtualDevice) {
        self.devices.push(device);
    }

    pub fn with_device(mut self, device: VirtualDevice) -> Self {
        self.add_device(device);
        self
    }
}

impl HidBackend for VirtualBackend {
    fn enumerate(&mut self) -> Result<Vec<DeviceMeta>> {
        Ok(self
            .devices
            .iter()
            .filter(|d| d.shared.connected.load(Ordering::Acquire))
            .map(|d| d.meta.clone())
            .collect())
    }

    fn open(&mut self, vendor_id: u16, product_id: u16) -> Result<Box<dyn Transport>> {
        let device = self
            .devices
            .iter()
            .find(|d| {
                d.meta.transport_id() == (vendor_id, product_id)
                    && d.shared.connected.load(Ordering::Acquire)
            })
            .ok_or_else(|| {
                SpaceMouseError::Transport(format!("no device {vendor_id:04x}:{product_id:04x}"))
            })?;
        if device.shared.busy.load(Ordering::Acquire) {
            return Err(SpaceMouseError::Transport("device busy".to_string()));
        }
        device.shared.open_handles.fetch_add(1, Ordering::AcqRel);
        Ok(Box::new(VirtualTransport {
            device: device.clone(),
        }))
    }
}

pub struct VirtualTransport {
    device: VirtualDevice,
}

impl Transport for VirtualTransport {
    fn read(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize> {
        let shared = &self.device.shared;
        let mut queue = shared.queue.lock();
        if queue.is_empty() && shared.connected.load(Ordering::Acquire) {
            match u64::try_from(timeout_ms) {
                Ok(0) => {}
                Ok(ms) => {
                    shared.ready.wait_for(&mut queue, Duration::from_millis(ms));
                }
                Err(_) => {
                    while queue.is_empty() && shared.connected.load(Ordering::Acquire) {
                        shared.ready.wait(&mut queue);
                    }
                }
            }
        }
        if !shared.connected.load(Ordering::Acquire) {
            return Err(SpaceMouseError::TransportGone(
                "virtual device disconnected".to_string(),
            ));
        }
        match queue.pop_front() {
            Some(report) => {
                let n = report.len().min(buf.len());
                buf[..n].copy_from_slice(&report[..n]);
                Ok(n)
            }
            None => Ok(0),
        }
    }

    fn product_string(&self) -> Result<Option<String>> {
        Ok(self.device.meta.product_string.clone())
    }

    fn manufacturer_string(&self) -> Result<Option<String>> {
        Ok(self.device.meta.manufacturer_string.clone())
    }

    fn serial_number(&self) -> Result<Option<String>> {
        Ok(self.device.meta.serial_number.clone())
    }
}

impl Drop for VirtualTransport {
    fn drop(&mut self) {
        self.device.shared.open_handles.fetch_sub(1, Ordering::AcqRel);
    }
}
