//! Fakes and fixtures shared by labmark's integration tests.

pub mod builders;
pub mod fake_process;
pub mod recording_sink;
pub mod scripted_operator;

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a per-test capturing subscriber (once per test binary).
///
/// Captured logs only show up for failing tests. The filter is read from
/// `LABMARK_LOG`, then `RUST_LOG`; by default labmark logs at debug and
/// everything else at warn.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = ["LABMARK_LOG", "RUST_LOG"]
            .into_iter()
            .find_map(|var| std::env::var(var).ok())
            .and_then(|value| EnvFilter::try_new(value).ok())
            .unwrap_or_else(|| EnvFilter::new("labmark=debug,warn"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init();
    });
}
