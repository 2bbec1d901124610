//! Tracing bootstrap for hosts embedding the cache.
//!
//! Every action emits structured events: `debug!` on dispatch, `info!` on
//! committed transitions, `warn!` on failures. This module installs a
//! subscriber suitable for development; hosts with their own subscriber can
//! skip it entirely.

/// Installs the env-filtered compact subscriber.
///
/// The log level is controlled through `RUST_LOG`, e.g. `RUST_LOG=debug` to
/// see dispatch events with their payloads.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
