//! Diagnostic logging on stderr
//!
//! Stdout is reserved for results so the output can be piped straight into a
//! test runner.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. `RUST_LOG` wins over `verbose`.
pub fn init(verbose: bool) {
  let default_filter = if verbose {
    "git_select_tests=debug"
  } else {
    "git_select_tests=warn"
  };

  // try_init: a second call (tests) keeps the first subscriber
  let _ = tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
    .try_init();
}
