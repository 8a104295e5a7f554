//! # vigil-log
//!
//! Logging bootstrap on top of `tracing-subscriber`.
//!
//! ```rust,no_run
//! let _guard = vigil_log::init(vigil_log::Config::from_env())?;
//! tracing::info!("ready");
//! # Ok::<(), vigil_log::LogError>(())
//! ```

mod builder;
mod config;
mod core;

pub use builder::{LoggerBuilder, LoggerGuard, ReloadHandle};
pub use config::{Config, DisplayConfig, Format};
pub use crate::core::{LogError, LogResult};

/// Installs the global subscriber described by `config`.
pub fn init(config: Config) -> LogResult<LoggerGuard> {
    LoggerBuilder::from_config(config).build()
}

/// Installs a subscriber with [`Config::development`] settings.
pub fn init_development() -> LogResult<LoggerGuard> {
    init(Config::development())
}
