//! Daemon entrypoint. Delegates to [`hostlinkd::run_daemon`].

use std::process::ExitCode;

fn main() -> ExitCode {
    match hostlinkd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("hostlinkd: {error}");
            ExitCode::FAILURE
        }
    }
}
