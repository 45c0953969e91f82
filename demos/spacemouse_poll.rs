use spacemouse::{active, DeviceManager, SessionConfig, StateLogger};
use tracing_subscriber::EnvFilter;

fn main() {
    // Optional config path as the first argument.
    let config = match std::env::args().nth(1) {
        Some(path) => SessionConfig::load(path).expect("load config"),
        None => SessionConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let mut mgr = DeviceManager::with_config(
        spacemouse::backends::hid::HidApiBackend::new().expect("init hidapi"),
        config,
    );
    println!("Connected: {:?}", mgr.list_connected().expect("enumerate"));

    let logger = StateLogger::new("spacemouse").into_callback();
    let _guard = active::open(&mut mgr, None, Some(logger.clone()), Some(logger))
        .expect("open device");
    active::run().expect("start poller");

    loop {
        std::thread::sleep(std::time::Duration::from_millis(500));
        if active::state().is_none() {
            println!("Device disconnected");
            break;
        }
    }
}
