//! Logging setup
//!
//! The library only emits `tracing` events. Binaries and the Tauri layer call
//! [`init_logging`] once to print them.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directives for a given level
fn default_directives(level: Level) -> String {
    format!(
        "anistream_core={level},anistream_tauri={level},hyper=warn,reqwest=warn,html5ever=warn,selectors=warn",
        level = level
    )
}

/// Install a console subscriber.
///
/// `RUST_LOG` overrides `default_level` when set. Returns `false` if a global
/// subscriber was already installed, in which case nothing changes.
pub fn init_logging(default_level: Level) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(default_level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_level(true))
        .try_init()
        .is_ok()
}
