//! End-to-end session behavior against scripted virtual devices.

use spacemouse::backends::virtual_input::{VirtualBackend, VirtualDevice};
use spacemouse::{registry, DeviceManager, PollerState, SessionConfig, StateKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    false
}

fn fast_config() -> SessionConfig {
    SessionConfig {
        read_timeout_ms: 10,
        ..SessionConfig::default()
    }
}

fn manager_with(name: &str) -> (DeviceManager<VirtualBackend>, VirtualDevice) {
    let spec = registry::lookup(name).expect("known model");
    let device = VirtualDevice::for_spec(spec);
    let backend = VirtualBackend::new().with_device(device.clone());
    (DeviceManager::with_config(backend, fast_config()), device)
}

#[test]
fn poller_publishes_one_snapshot_per_pair() {
    let (mut manager, device) = manager_with("SpaceMouse Compact");
    let motions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&motions);
    let mut session = manager
        .open(
            None,
            Some(Arc::new(move |_: &spacemouse::MotionState| {
                counter.fetch_add(1, Ordering::Relaxed);
            })),
            None,
        )
        .expect("open");
    let events = session.subscribe();
    session.run().expect("run");
    assert_eq!(session.poller_state(), PollerState::Running);

    device.push_motion([350, 0, -700, 0, 175, 0]);
    device.push_motion([0, 350, 0, 0, 0, -350]);

    let first = events.recv_timeout(Duration::from_secs(5)).expect("first");
    let second = events.recv_timeout(Duration::from_secs(5)).expect("second");
    assert_eq!(first.kind, StateKind::Motion);
    assert!((first.state.x - 1.0).abs() < 1e-9);
    // y, z, pitch and roll are inverted by the mapping
    assert!((first.state.z - 2.0).abs() < 1e-9);
    assert!((first.state.pitch + 0.5).abs() < 1e-9);
    assert!((second.state.y + 1.0).abs() < 1e-9);
    assert!((second.state.yaw + 1.0).abs() < 1e-9);
    assert!(second.state.t >= first.state.t);
    // queues are filled before the callback runs
    assert!(wait_until(|| motions.load(Ordering::Relaxed) == 2));

    session.stop().expect("stop");
    assert_eq!(session.poller_state(), PollerState::Idle);
    session.stop().expect("second stop is a no-op");
    assert!(session.connected(), "stopping keeps the transport open");
}

#[test]
fn combined_layout_publishes_on_single_report() {
    let (mut manager, device) = manager_with("SpaceMouse Wireless");
    let session = manager.open(None, None, None).expect("open");
    let events = session.subscribe();

    device.push_motion([0, 0, 0, 350, 0, 0]);
    let snapshot = session.read(10).expect("read");
    assert!((snapshot.roll + 1.0).abs() < 1e-9);
    assert_eq!(events.try_recv().expect("published").kind, StateKind::Motion);
}

#[test]
fn unplug_stops_poller_and_disconnects() {
    let (mut manager, device) = manager_with("SpaceNavigator");
    let mut session = manager.open(None, None, None).expect("open");
    session.run().expect("run");

    device.disconnect();
    assert!(wait_until(|| session.poller_state() == PollerState::Idle));
    assert!(!session.connected());
    assert!(session.state().is_none());
    assert!(session.describe_connection().ends_with("[disconnected]"));
    session.stop().expect("transport loss is not an error");
    session.close().expect("close");
    assert!(!device.is_open());
}

#[test]
fn malformed_report_ends_poller_with_error() {
    let (mut manager, device) = manager_with("SpaceNavigator");
    let mut session = manager.open(None, None, None).expect("open");
    session.run().expect("run");

    device.feed(vec![1, 0x10]);
    assert!(wait_until(|| session.poller_state() == PollerState::Idle));
    assert!(matches!(
        session.stop(),
        Err(spacemouse::SpaceMouseError::MalformedReport {
            channel: 1,
            needed: 7,
            actual: 2
        })
    ));
    assert!(session.connected());
}

#[test]
fn restart_after_malformed_report_returns_the_error() {
    let (mut manager, device) = manager_with("SpaceNavigator");
    let mut session = manager.open(None, None, None).expect("open");
    session.run().expect("run");

    device.feed(vec![2, 0x01, 0x02]);
    assert!(wait_until(|| session.poller_state() == PollerState::Idle));
    assert!(matches!(
        session.run(),
        Err(spacemouse::SpaceMouseError::MalformedReport { channel: 2, .. })
    ));
    assert_eq!(session.poller_state(), PollerState::Idle);
    session.stop().expect("error is reported once");

    session.run().expect("polling resumes");
    device.push_motion([350, 0, 0, 0, 0, 0]);
    assert!(wait_until(|| session
        .state()
        .map_or(false, |s| (s.x - 1.0).abs() < 1e-9)));
    session.stop().expect("stop");
}

#[test]
fn button_presses_reach_callback_and_queue() {
    let (mut manager, device) = manager_with("SpaceMouse Pro");
    let presses = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&presses);
    let mut session = manager
        .open(
            Some("SpaceMouse Pro"),
            None,
            Some(Arc::new(move |s: &spacemouse::MotionState| {
                sink.lock().push(s.buttons.get(0))
            })),
        )
        .expect("open");
    let events = session.subscribe();
    session.run().expect("run");

    let spec = registry::lookup("SpaceMouse Pro").expect("known model");
    let mut pressed = vec![false; spec.buttons.len()];
    pressed[0] = true;
    device.push_buttons(&pressed);
    device.push_buttons(&[]);

    let down = events.recv_timeout(Duration::from_secs(5)).expect("down");
    let up = events.recv_timeout(Duration::from_secs(5)).expect("up");
    assert_eq!(down.kind, StateKind::Buttons);
    assert!(down.state.buttons.get(0));
    assert!(!up.state.buttons.get(0));
    assert_eq!(up.state.buttons.mask(), 0);

    session.close().expect("close");
    assert_eq!(*presses.lock(), vec![true, false]);
}

#[test]
fn listing_collapses_duplicate_interfaces() {
    let spec = registry::lookup("SpacePilot Pro").expect("known model");
    let backend = VirtualBackend::new()
        .with_device(VirtualDevice::for_spec(spec).with_path("if0"))
        .with_device(VirtualDevice::for_spec(spec).with_path("if1"));
    let mut manager = DeviceManager::new(backend);
    assert_eq!(manager.list_connected().expect("list"), vec!["SpacePilot Pro"]);
}
