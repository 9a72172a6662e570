//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout carries only command output (passwords,
//! drive lists). The filter comes from `DRIVEWARD_LOG`, then `RUST_LOG`,
//! then `-v` flags, then the configured level.

use driveward_core::config::{LogLevel, LoggingConfig};
use driveward_core::env::{self, vars};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "driveward=info";

/// Install the global subscriber. Later calls are ignored.
pub fn init(logging: &LoggingConfig, verbose: u8) {
    let override_filter = env::get_var(vars::DRIVEWARD_LOG).or_else(|| env::get_var("RUST_LOG"));
    let directive = filter_directive(override_filter, logging.level, verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if logging.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Resolve the filter directive.
pub fn filter_directive(override_filter: Option<String>, level: LogLevel, verbose: u8) -> String {
    if let Some(filter) = override_filter {
        return filter;
    }
    let level = match verbose {
        0 => level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    format!("driveward={level}")
}
