use unitmock_common::testing::fixture_catalog;

use crate::MockSession;

/// Helper to route tracing output through the test harness
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Helper to create a session over the fixture catalog
pub(crate) fn fixture_session() -> MockSession {
    init_tracing();
    MockSession::new(fixture_catalog())
}
