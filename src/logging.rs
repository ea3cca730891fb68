use tracing_subscriber::EnvFilter;

/// Initialize console logging. Level is controlled via RUST_LOG and
/// defaults to info.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();
}
