//! Logging setup
//!
//! The subscriber is installed before configuration is resolved so that
//! config diagnostics (fallback to defaults, env overrides) are emitted into
//! a live subscriber. The configured level is applied afterwards through a
//! reload handle, unless `RUST_LOG` pinned the filter.

use tracing_subscriber::{reload, EnvFilter, Registry};

/// Level used until the configured one is known
pub const STARTUP_LEVEL: &str = "info";

/// Filter directives covering both workspace crates at `level`
pub fn directives(level: &str) -> String {
    format!("eegi_intake={level},eegi_common={level}")
}

/// Swaps the active filter once configuration is loaded
pub struct LogLevelHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    pinned_by_env: bool,
}

impl LogLevelHandle {
    /// Switch to the configured level; a no-op when `RUST_LOG` is set
    pub fn apply_level(&self, level: &str) -> Result<(), reload::Error> {
        if self.pinned_by_env {
            return Ok(());
        }
        self.handle.reload(EnvFilter::new(directives(level)))
    }
}

/// Filter layer for the startup subscriber
///
/// Uses `RUST_LOG` when present, otherwise `STARTUP_LEVEL` for the eegi crates.
pub fn reloadable_filter() -> (reload::Layer<EnvFilter, Registry>, LogLevelHandle) {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => with_filter(filter, true),
        Err(_) => with_filter(EnvFilter::new(directives(STARTUP_LEVEL)), false),
    }
}

fn with_filter(
    filter: EnvFilter,
    pinned_by_env: bool,
) -> (reload::Layer<EnvFilter, Registry>, LogLevelHandle) {
    let (layer, handle) = reload::Layer::new(filter);
    (
        layer,
        LogLevelHandle {
            handle,
            pinned_by_env,
        },
    )
}
