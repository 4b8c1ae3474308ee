//! Logging setup.
//!
//! Structured logging through the `tracing` ecosystem. Every log line goes to
//! **stderr**; stdout belongs to the host that launched the provider.
//!
//! # Quick Start
//!
//! ```ignore
//! use galaxy_provider::{init_logging, GalaxyProvider};
//!
//! fn main() {
//!     // Reads RUST_LOG; defaults to info
//!     init_logging();
//!
//!     tracing::info!("Starting Galaxy provider");
//!     let provider = GalaxyProvider::new();
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Controls log levels (e.g., `info`, `debug`, `galaxy_provider=debug`)
//!
//! # Examples
//!
//! ```bash
//! # Show request-level detail for the provider only
//! RUST_LOG=galaxy_provider=debug ./galaxy-provider
//!
//! # Include reqwest and hyper internals
//! RUST_LOG=debug ./galaxy-provider
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// The level used when `RUST_LOG` is unset.
pub const DEFAULT_LEVEL: &str = "info";

/// `RUST_LOG` if set and valid, otherwise `default_level`.
fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

/// Initialize the default logging subscriber.
///
/// Writes to stderr, honours `RUST_LOG`, and falls back to `info`.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default(DEFAULT_LEVEL);
}

/// Initialize logging with a custom default level.
///
/// Like [`init_logging`], but `default_level` (e.g. `"debug"` or
/// `"warn,galaxy_provider=debug"`) applies when `RUST_LOG` is not set.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    tracing_subscriber::registry()
        .with(filter(default_level))
        .with(stderr_layer())
        .init();
}

/// Try to initialize logging, returning false if already initialized.
///
/// Unlike [`init_logging`], this does not panic when a subscriber is
/// already installed, which makes it safe to call from tests.
pub fn try_init_logging() -> bool {
    tracing_subscriber::registry()
        .with(filter(DEFAULT_LEVEL))
        .with(stderr_layer())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    // The global subscriber can only be set once per process, so
    // initialization itself is exercised through try_init_logging only.

    use super::*;

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new(DEFAULT_LEVEL).is_ok());
        assert!(EnvFilter::try_new("galaxy_provider=debug").is_ok());
        assert!(EnvFilter::try_new("warn,galaxy_provider=debug,reqwest=info").is_ok());
    }

    #[test]
    fn test_try_init_is_idempotent() {
        try_init_logging();
        assert!(!try_init_logging());
    }
}
