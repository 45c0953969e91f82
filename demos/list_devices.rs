use spacemouse::backends::HidBackend;
use spacemouse::{registry, DeviceManager};

fn main() {
    let mut mgr = DeviceManager::discover().expect("init hidapi");

    for meta in mgr.backend_mut().enumerate().expect("enumerate") {
        let model = registry::find_by_transport_id(meta.vid, meta.pid)
            .map(|spec| spec.name)
            .unwrap_or("-");
        println!(
            "VID:PID={:04x}:{:04x} up={:?} u={:?} iface={:?} model={} prod={:?} ser={:?} path={}",
            meta.vid,
            meta.pid,
            meta.usage_page,
            meta.usage,
            meta.interface_number,
            model,
            meta.product_string,
            meta.serial_number,
            meta.path.as_deref().unwrap_or("?")
        );
    }

    println!("Connected models:");
    for name in mgr.list_connected().expect("enumerate") {
        println!("- {name}");
    }
}
