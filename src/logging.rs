//! Diagnostics go to stderr through `tracing`; stdout is reserved for plans and reports.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Maps `-v` occurrences to a default filter directive.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over `verbosity`.
/// Later calls are ignored.
pub fn init_tracing(verbosity: u8) {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

        let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

        // Another subscriber may already be installed (tests, embedding); keep it.
        let _ = tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init();
    });
}
