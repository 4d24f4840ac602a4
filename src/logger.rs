//! Logging setup and the named sub-logger handed to bean constructors that
//! want one.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global `tracing` subscriber. `RUST_LOG` wins when set;
/// otherwise everything logs at `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
}

/// A named view onto the global subscriber: every call carries `name` as
/// its `tracing` target, so filtering and output can key on which
/// subsystem or bean produced a line.
#[derive(Debug, Clone)]
pub struct Logger {
    name: &'static str,
}

impl Logger {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn info(&self, msg: &str) {
        tracing::info!(target: "weave", logger = self.name, "{msg}");
    }

    pub fn warn(&self, msg: &str) {
        tracing::warn!(target: "weave", logger = self.name, "{msg}");
    }

    pub fn error(&self, msg: &str) {
        tracing::error!(target: "weave", logger = self.name, "{msg}");
    }

    pub fn debug(&self, msg: &str) {
        tracing::debug!(target: "weave", logger = self.name, "{msg}");
    }
}
