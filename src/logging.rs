//! Tracing setup for embedding applications and tools.

use std::path::PathBuf;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{self, Config};

/// Install a subscriber writing to stderr and, when `log_to_file` is set,
/// to `mimepart.log` in the cache directory.
///
/// `RUST_LOG` overrides the configured level. A subscriber that is already
/// installed is left in place. Returns the log file in use, if any.
pub fn init(config: &Config) -> Option<PathBuf> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let log_dir = config::cache_dir(config);
    let file_layer = (config.general.log_to_file && std::fs::create_dir_all(&log_dir).is_ok())
        .then(|| {
            let appender = tracing_appender::rolling::never(&log_dir, "mimepart.log");
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(appender)
        });
    let log_file = file_layer
        .as_ref()
        .map(|_| config::log_file_path(config));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init();

    log_file
}
