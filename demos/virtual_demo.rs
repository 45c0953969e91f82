use spacemouse::backends::virtual_input::{VirtualBackend, VirtualDevice};
use spacemouse::{registry, DeviceManager, StateKind};

fn main() {
    // A scripted SpaceNavigator; no hardware needed.
    let spec = registry::lookup("SpaceNavigator").expect("known model");
    let device = VirtualDevice::for_spec(spec).with_serial("VIRTUAL-1");
    let mut mgr = DeviceManager::new(VirtualBackend::new().with_device(device.clone()));

    let mut session = mgr.open(None, None, None).expect("open virtual device");
    println!("{}", session.describe_connection());
    let events = session.subscribe();
    session.run().expect("start poller");

    device.push_motion([350, -175, 0, 0, 0, 700]);
    device.push_buttons(&[true, false]);
    device.push_buttons(&[false, false]);

    for event in events.iter() {
        match event.kind {
            StateKind::Motion => println!("(Virtual) motion  {}", event.state),
            StateKind::Buttons => println!(
                "(Virtual) buttons {:?} mask={:#b}",
                event.state.buttons.as_slice(),
                event.state.buttons.mask()
            ),
        }
        if event.kind == StateKind::Buttons && event.state.buttons.mask() == 0 {
            break;
        }
    }

    session.close().expect("close");
}
