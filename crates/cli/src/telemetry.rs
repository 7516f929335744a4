use tracing_subscriber::{EnvFilter, fmt};

/// Initialise the global tracing subscriber, writing to stderr so it does
/// not interleave with rendered listings.
///
/// Respects `RUST_LOG` env var; defaults to `info` level.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
