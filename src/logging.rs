//! Tracing subscriber setup for the binary.

use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "MANIFOLD_LOG";

/// Crate level for a `-v` count: 0 info, 1 debug, 2+ trace.
#[must_use]
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Filter used when `MANIFOLD_LOG` is unset.
#[must_use]
pub fn default_directive(verbosity: u8) -> String {
    format!("warn,manifold={}", level_for(verbosity))
}

/// Installs a stderr subscriber. `MANIFOLD_LOG` takes precedence over the
/// verbosity flag. Calling this twice is a no-op.
pub fn init(verbosity: u8) {
    let directive = std::env::var(LOG_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default_directive(verbosity));

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directive);

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(env_filter)
        .try_init();
}
