//! Launch sequencing for the foreground daemon.

use std::sync::Arc;

use tracing::info;

use crate::StructuredHealthReporter;
use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::handlers::register_builtins;
use crate::health::HealthReporter;
use crate::registry::HandlerRegistry;
use crate::server::IntervalTicker;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to launch the daemon runtime.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) shutdown: S,
}

/// Runs the daemon using the production collaborators.
///
/// Blocks the calling thread until a shutdown signal arrives.
///
/// # Errors
///
/// Returns [`LaunchError`] when signal handling, bootstrap or the command
/// server fails.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with(LaunchPlan {
        loader: SystemConfigLoader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        shutdown: SystemShutdownSignal,
    })
}

/// Runs the daemon with injected collaborators.
pub(crate) fn run_daemon_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        reporter,
        shutdown,
    } = plan;

    let shutdown = shutdown.arm()?;
    let mut registry = HandlerRegistry::new();
    register_builtins(&mut registry);

    let mut daemon = bootstrap_with(&loader, reporter, registry)?;
    daemon.start()?;
    let mut ticker = IntervalTicker::new(daemon.config().tick_interval());
    daemon.run(&mut ticker, &shutdown)?;
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(())
}
