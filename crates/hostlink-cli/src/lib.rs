//! Command-line client for the hostlink command server.
//!
//! The client sends one `{"command": .., "params": ..}` request over TCP,
//! waits for the first complete response frame, prints it on stdout and
//! maps the response status onto the process exit code: success for
//! `"ok"`, failure for anything else. Transport and parse failures are
//! reported on stderr.
//!
//! [`run`] takes its arguments and output streams as parameters so the whole
//! flow can be exercised from tests without spawning a process.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use hostlink_protocol::{Request, Response};

mod cli;
mod errors;
mod transport;

use cli::Cli;
use errors::AppError;
use transport::{connect, exchange};

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        // `--help` and `--version` are reported through the error path.
        Err(error) if !error.use_stderr() => {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            let _ = write!(stderr, "{}", AppError::CliUsage(error));
            return ExitCode::FAILURE;
        }
    };

    match invoke(&cli, stdout) {
        Ok(exit_code) => exit_code,
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn invoke<W>(cli: &Cli, stdout: &mut W) -> Result<ExitCode, AppError>
where
    W: Write,
{
    let request = Request::new(cli.command.clone(), cli.params()?);
    let payload = request.to_frame().map_err(AppError::SerialiseRequest)?;

    let mut stream = connect(&cli.host, cli.port, cli.timeout())?;
    let frame = exchange(&mut stream, &payload, cli.timeout())?;
    let response = Response::from_frame(&frame).map_err(AppError::ParseResponse)?;

    let text = String::from_utf8_lossy(&frame);
    writeln!(stdout, "{}", text.trim()).map_err(AppError::ForwardResponse)?;
    stdout.flush().map_err(AppError::ForwardResponse)?;

    Ok(if response.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests;
