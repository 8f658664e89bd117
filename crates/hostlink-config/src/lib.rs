//! Shared configuration for the hostlink daemon and its command-line client.
//!
//! Values are layered by [`ortho_config`]: built-in defaults, then a TOML file
//! named by `--config-path` or `HOSTLINK_CONFIG_PATH`, then `HOSTLINK_*`
//! environment variables, then command-line flags. The resulting [`Config`]
//! is read-only once the server has been constructed.

mod defaults;
mod logging;

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_CLIENT_TIMEOUT_SECONDS, DEFAULT_LOG_FILTER, DEFAULT_PORT, DEFAULT_RECEIVE_BUFFER_SIZE,
    DEFAULT_TICK_INTERVAL_SECONDS, default_client_timeout_seconds, default_log_filter,
    default_log_filter_string, default_log_format, default_port, default_receive_buffer_size,
    default_tick_interval_seconds,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Server and process configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "HOSTLINK")]
pub struct Config {
    /// TCP port the command listener binds on the loopback interface.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds without a successful read before a client is evicted.
    #[serde(default = "default_client_timeout_seconds")]
    pub client_timeout_seconds: f64,
    /// Bytes requested from the socket on each read.
    #[serde(default = "default_receive_buffer_size")]
    pub receive_buffer_size: usize,
    /// Seconds between scheduler ticks.
    #[serde(default = "default_tick_interval_seconds")]
    pub tick_interval_seconds: f64,
    /// Promotes per-connection and per-message events to `info`.
    #[serde(default)]
    pub verbose: bool,
    /// `tracing` filter expression.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            client_timeout_seconds: DEFAULT_CLIENT_TIMEOUT_SECONDS,
            receive_buffer_size: DEFAULT_RECEIVE_BUFFER_SIZE,
            tick_interval_seconds: DEFAULT_TICK_INTERVAL_SECONDS,
            verbose: false,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Loads layered configuration using the process arguments.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a flag, environment variable or
    /// configuration file cannot be parsed.
    pub fn load() -> OrthoResult<Self> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads layered configuration from an explicit argument list. The first
    /// item is the program name.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a flag, environment variable or
    /// configuration file cannot be parsed.
    pub fn load_from_iter<I, T>(args: I) -> OrthoResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Listener port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Idle period after which a client is evicted.
    ///
    /// Values [`validate`](Self::validate) rejects map to zero.
    #[must_use]
    pub fn client_timeout(&self) -> Duration {
        seconds(self.client_timeout_seconds)
    }

    /// Bytes requested from the socket on each read.
    #[must_use]
    pub const fn receive_buffer_size(&self) -> usize {
        self.receive_buffer_size
    }

    /// Interval between scheduler ticks.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        seconds(self.tick_interval_seconds)
    }

    /// Whether per-message logging is promoted to `info`.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Checks that the durations and buffer size are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_seconds("client_timeout_seconds", self.client_timeout_seconds)?;
        check_seconds("tick_interval_seconds", self.tick_interval_seconds)?;
        if self.receive_buffer_size == 0 {
            return Err(ConfigError::EmptyReceiveBuffer);
        }
        Ok(())
    }
}

fn check_seconds(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && Duration::try_from_secs_f64(value).is_ok() {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration { field, value })
    }
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

/// Errors raised when a loaded configuration cannot drive the server.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A duration field is zero, negative, or not finite.
    #[error("{field} must be a positive number of seconds, got {value}")]
    InvalidDuration {
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// The receive buffer size is zero.
    #[error("receive_buffer_size must be greater than zero")]
    EmptyReceiveBuffer,
}
