use std::env;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding an explicit filter, e.g. `shelf=debug`
pub const LOG_ENV: &str = "SHELF_LOG";

/// Filter used when `SHELF_LOG` is unset
pub fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the stderr subscriber. Stdout stays reserved for command output.
pub fn init_logging(verbose: u8) {
    let filter = env::var(LOG_ENV).unwrap_or_else(|_| default_filter(verbose).to_string());
    let filter_layer = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter_layer)
        .try_init();
}
