/*!
 * Logging
 * tracing-subscriber setup for binaries and benches embedding the containers
 *
 * The adapters only emit events; installing a subscriber is left to the host.
 */

use tracing::info;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
    EnvFilter,
};

/// Environment variable switching the output to JSON
pub const ENV_TRACE_JSON: &str = "CONTAINERS_TRACE_JSON";

/// Install a global subscriber
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - CONTAINERS_TRACE_JSON: Enable JSON output (default: false)
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing() -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()?;
        info!("Tracing initialized with JSON output");
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .compact(),
            )
            .try_init()?;
        info!("Tracing initialized");
    }

    Ok(())
}
