//! Test harness utilities shared by the daemon suites.

mod client;
mod config_loader;
mod listener;
mod reporter;
mod world;

use std::cell::RefCell;

pub use client::{STEP, TestClient, tick_until};
pub use config_loader::{
    FailingConfigLoader, InvalidConfigLoader, TestConfigLoader, ephemeral_config,
};
pub use listener::BreakableListener;
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use world::{FAILURE_MESSAGE, ServerWorld};

/// Fresh scenario world.
#[must_use]
pub fn world() -> RefCell<ServerWorld> {
    RefCell::new(ServerWorld::new())
}
