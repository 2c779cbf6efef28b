//! CLI entrypoint for the Tapestry call graph tool.
//!
//! The binary delegates to [`tapestry_cli::run`], which loads configuration,
//! installs telemetry, analyses the requested file and writes the graph as
//! JSON to standard output.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    tapestry_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
