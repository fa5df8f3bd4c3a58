//! Structured logging for the Tellus terrain engine.
//!
//! Span-based, filterable logging via the `tracing` ecosystem: console
//! output with timestamps and module paths, plus optional JSON file logging
//! in debug builds. Integrates with the configuration system so the filter
//! can be overridden from `config.ron` without recompiling.

use std::path::Path;

use tellus_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// - Console output with uptime timestamps, module paths, and severity
/// - JSON file logging when `debug_build` is set and `log_dir` is given
/// - Environment-based filtering (respects `RUST_LOG`)
/// - Config `debug.log_level` override when no environment filter is set
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = config
        .map(|c| c.debug.log_level.as_str())
        .filter(|level| !level.is_empty())
        .map_or_else(default_filter_string, |level| {
            format!("{level},wgpu=warn,naga=warn")
        });

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    // In debug builds, also log to a file for post-mortem analysis
    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join("tellus.log"))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Create an `EnvFilter` with the default filter string: `info` for all
/// targets, `warn` for the noisy `wgpu`/`naga` internals.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(default_filter_string())
}

fn default_filter_string() -> String {
    "info,wgpu=warn,naga=warn".to_string()
}
