//! Logger builder implementation
//!
//! - `reload`: runtime filter reload

mod reload;

pub use reload::ReloadHandle;

use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::{Config, DisplayConfig, Format};
use crate::core::{LogError, LogResult};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

/// Returned by a successful [`LoggerBuilder::build`]
///
/// The subscriber stays installed whether or not this is kept; it only holds
/// the reload handle when the config asked for one.
#[derive(Debug)]
pub struct LoggerGuard {
    reload_handle: Option<ReloadHandle>,
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Parses the configured filter without installing anything.
    pub fn filter(&self) -> LogResult<EnvFilter> {
        EnvFilter::try_new(&self.config.level)
            .map_err(|e| LogError::Filter(format!("{}: {}", &self.config.level, e)))
    }

    /// Build and initialize the logger
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Filter string cannot be parsed
    /// - A global subscriber is already installed
    pub fn build(self) -> LogResult<LoggerGuard> {
        let filter = self.filter()?;
        let fmt_layer = create_fmt_layer(self.config.format, &self.config.display);

        let reload_handle = if self.config.reloadable {
            let (filter_layer, handle) = reload::create_filter_layer(filter, &self.config.level);
            Registry::default()
                .with(fmt_layer.with_filter(filter_layer))
                .try_init()
                .map_err(|e| LogError::Init(e.to_string()))?;
            Some(handle)
        } else {
            Registry::default()
                .with(fmt_layer.with_filter(filter))
                .try_init()
                .map_err(|e| LogError::Init(e.to_string()))?;
            None
        };

        tracing::debug!(
            level = %self.config.level,
            format = ?self.config.format,
            "logger initialized"
        );

        Ok(LoggerGuard { reload_handle })
    }
}

impl LoggerGuard {
    /// Handle for changing the filter, when the config asked for one.
    #[must_use]
    pub fn reload_handle(&self) -> Option<&ReloadHandle> {
        self.reload_handle.as_ref()
    }
}

fn create_fmt_layer(format: Format, display: &DisplayConfig) -> BoxedLayer {
    match format {
        Format::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_ansi(display.colors)
                .with_target(display.target)
                .with_file(display.source)
                .with_line_number(display.source);
            if display.time {
                layer.boxed()
            } else {
                layer.without_time().boxed()
            }
        }
        Format::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_ansi(display.colors)
                .with_target(display.target)
                .with_file(display.source)
                .with_line_number(display.source);
            if display.time {
                layer.boxed()
            } else {
                layer.without_time().boxed()
            }
        }
        Format::Json => {
            let layer = fmt::layer()
                .json()
                .flatten_event(display.flatten)
                .with_current_span(true)
                .with_target(display.target)
                .with_file(display.source)
                .with_line_number(display.source);
            if display.time {
                layer.boxed()
            } else {
                layer.without_time().boxed()
            }
        }
    }
}
