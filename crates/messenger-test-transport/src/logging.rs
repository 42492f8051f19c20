//! Log capture for test runs.
//!
//! The transport logs through `tracing`; nothing is printed unless a
//! subscriber is installed. Call [`init_test_logging`] at the top of a test
//! to see the send/process/ack/reject trail, filtered by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` is not set.
pub const DEFAULT_TEST_LOG_LEVEL: &str = "warn";

/// Installs a fmt subscriber that writes through the test harness' capture.
///
/// Safe to call from every test; only the first call installs anything.
///
/// ```
/// messenger_test_transport::logging::init_test_logging();
/// tracing::warn!("captured by the test writer");
/// ```
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_LOG_LEVEL));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(true)
        .try_init();
}
