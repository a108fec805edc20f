//src/logging.rs

use env_logger::Env;

/// Starts stderr logging for a binary. Defaults to `info` so run summaries
/// are shown; `RUST_LOG` overrides it.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();
}
