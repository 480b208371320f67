//! Logging setup for the viewer.
//!
//! Logs go to stderr so figure JSON on stdout stays machine-readable.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing with a custom default filter.
///
/// `RUST_LOG` takes precedence when set to valid directives.
pub fn init_with_filter(default_filter: &str) {
    let filter = build_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok(), default_filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Directives from the environment, falling back to `default_filter` when they
/// are absent or do not parse.
fn build_filter(env_directives: Option<String>, default_filter: &str) -> EnvFilter {
    env_directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter))
}
