//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use hostlink_config::Config;
use ortho_config::OrthoError;

use crate::bootstrap::ConfigLoader;

/// Configuration bound to an ephemeral loopback port.
#[must_use]
pub fn ephemeral_config() -> Config {
    Config {
        port: 0,
        ..Config::default()
    }
}

/// Loader that yields an ephemeral-port configuration.
pub struct TestConfigLoader;

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(ephemeral_config())
    }
}

/// Loader that intentionally fails by passing an invalid CLI argument.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("hostlinkd"),
            OsString::from("--port"),
            OsString::from("not-a-port"),
        ];
        Config::load_from_iter(args)
    }
}

/// Loader whose configuration loads but fails validation.
pub struct InvalidConfigLoader;

impl ConfigLoader for InvalidConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            client_timeout_seconds: 0.0,
            ..ephemeral_config()
        })
    }
}
