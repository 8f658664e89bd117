//! CLI entrypoint for the hostlink command client.
//!
//! The binary delegates to [`hostlink_cli::run`], which parses arguments,
//! performs one request/response exchange and sets the exit status.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    hostlink_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
