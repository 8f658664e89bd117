//! Command-line argument definitions for the `hostlink` client.

use std::time::Duration;

use clap::Parser;
use hostlink_config::DEFAULT_PORT;
use serde_json::{Map, Value};

use crate::errors::AppError;

/// Sends one command to a running `hostlinkd` and prints the response.
#[derive(Parser, Debug)]
#[command(name = "hostlink", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Host the command server listens on.
    #[arg(long, default_value = "127.0.0.1")]
    pub(crate) host: String,
    /// Port the command server listens on.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub(crate) port: u16,
    /// Connect and read timeout in milliseconds.
    #[arg(
        long = "timeout-ms",
        value_name = "MS",
        default_value_t = 5000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub(crate) timeout_ms: u64,
    /// Name of the command to invoke (for example `ping`).
    #[arg(value_name = "COMMAND")]
    pub(crate) command: String,
    /// Command parameters as a JSON object.
    #[arg(value_name = "PARAMS_JSON")]
    pub(crate) params: Option<String>,
}

impl Cli {
    pub(crate) const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parses the optional parameter argument into a JSON object.
    pub(crate) fn params(&self) -> Result<Map<String, Value>, AppError> {
        let Some(raw) = self.params.as_deref() else {
            return Ok(Map::new());
        };
        match serde_json::from_str(raw).map_err(AppError::ParseParams)? {
            Value::Object(params) => Ok(params),
            Value::Null => Ok(Map::new()),
            _ => Err(AppError::ParamsNotObject),
        }
    }
}
