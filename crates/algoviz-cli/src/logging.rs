//! Logging setup for the `algoviz` binary.
//!
//! Logs go to stderr so the visualization on stdout stays readable.
//!
//! - no `-v`: `RUST_LOG` if set, else `algoviz=info`
//! - `-v`: `algoviz=debug`
//! - `-vv`: `algoviz=trace`

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor `-v` is given.
pub const DEFAULT_FILTER: &str = "algoviz=info";

/// Filter directive for a `-v` count. `None` defers to the environment.
pub fn filter_for_verbosity(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("algoviz=debug"),
        _ => Some("algoviz=trace"),
    }
}

/// Install the global subscriber.
pub fn init_logging(verbosity: u8) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = match filter_for_verbosity(verbosity) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
}
