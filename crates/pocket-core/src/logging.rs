//! Logging setup
//!
//! `RUST_LOG` overrides the default filter. Initialising twice is harmless;
//! the second call reports `false`.

use tracing_subscriber::EnvFilter;

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install a human-readable subscriber
pub fn init_logging(default_filter: &str) -> bool {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_target(false)
        .try_init()
        .is_ok();
    if installed {
        tracing::info!(filter = default_filter, "Logging initialized");
    }
    installed
}

/// Install a JSON subscriber with file and line fields
pub fn init_json_logging(default_filter: &str) -> bool {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .try_init()
        .is_ok();
    if installed {
        tracing::info!(filter = default_filter, "JSON logging initialized");
    }
    installed
}
