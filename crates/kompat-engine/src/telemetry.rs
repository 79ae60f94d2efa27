//! Tracing setup for binaries and harnesses embedding the engine

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr subscriber
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` when `debug` is
/// true. Returns false when a global subscriber was already installed.
pub fn init_tracing(debug: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .is_ok()
}

fn default_directive(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}
