use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::shared::config::model::{Settings, load_settings};

/// Process-wide settings. Falls back to built-in defaults when no config
/// source can be loaded, so library users are never forced to ship a file.
pub static CONFIG: Lazy<Arc<Settings>> = Lazy::new(|| {
    Arc::new(load_settings().unwrap_or_else(|err| {
        tracing::warn!(
            target: "segment_stream::config",
            error = %err,
            "Failed to load configuration, using defaults"
        );
        Settings::default()
    }))
});
