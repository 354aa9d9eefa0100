//! Tracing subscriber setup.

use crate::error::{Error, Result};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Installs a compact fmt subscriber as the global default.
///
/// # Errors
///
/// [`Error::Internal`] if a global subscriber is already set.
pub fn init(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Internal(format!("failed to set tracing subscriber: {e}")))
}

/// Like [`init`], but returns `false` instead of failing when a subscriber
/// is already installed.
pub fn try_init(level: Level) -> bool {
    init(level).is_ok()
}
