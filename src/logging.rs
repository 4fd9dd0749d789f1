use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::DEFAULT_LOG_DIRECTIVE;

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber. `RUST_LOG` wins over `filter`; later calls
/// are no-ops. Output goes to stderr so stdout stays machine-readable.
pub fn init(filter: &str) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(filter))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));

        // another subscriber may already be installed (tests, embedding apps)
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
