//! Reload logic for runtime filter changes

use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, Registry};

use crate::core::{LogError, LogResult};

/// Handle for runtime configuration changes
#[derive(Clone)]
pub struct ReloadHandle {
    filter: tracing_subscriber::reload::Handle<EnvFilter, Registry>,
    /// Current filter string, lock-free reads
    current_filter: Arc<ArcSwap<String>>,
}

impl ReloadHandle {
    /// Reload the log filter at runtime
    ///
    /// # Errors
    /// Returns error if filter parsing fails or reload fails
    pub fn reload(&self, filter: &str) -> LogResult<()> {
        let new_filter =
            EnvFilter::try_new(filter).map_err(|e| LogError::Filter(format!("{filter}: {e}")))?;
        self.filter
            .reload(new_filter)
            .map_err(|e| LogError::Config(format!("Failed to reload filter: {e}")))?;
        self.current_filter.store(Arc::new(filter.to_string()));
        Ok(())
    }

    /// Get the current filter string
    pub fn current_filter(&self) -> Arc<String> {
        self.current_filter.load_full()
    }
}

impl std::fmt::Debug for ReloadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadHandle")
            .field("current_filter", &self.current_filter.load())
            .finish_non_exhaustive()
    }
}

/// Wraps `filter` in a reloadable layer
pub(super) fn create_filter_layer(
    filter: EnvFilter,
    level_str: &str,
) -> (
    tracing_subscriber::reload::Layer<EnvFilter, Registry>,
    ReloadHandle,
) {
    let (layer, handle) = tracing_subscriber::reload::Layer::new(filter);
    let reload_handle = ReloadHandle {
        filter: handle,
        current_filter: Arc::new(ArcSwap::from_pointee(level_str.to_string())),
    };
    (layer, reload_handle)
}
