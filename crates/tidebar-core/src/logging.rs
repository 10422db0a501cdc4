//! Logging initialization.
//!
//! Verbosity comes from the CLI `-v` count; `RUST_LOG` overrides it when set.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// - 0: warnings and errors only
/// - 1 (`-v`): info
/// - 2 (`-vv`): debug
/// - 3+ (`-vvv`): trace
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tidebar={0},tidebar_core={0}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
