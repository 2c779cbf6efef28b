//! CLI argument definitions for the Tapestry toolchain.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Command-line interface for the Tapestry call graph tool.
#[derive(Parser, Debug)]
#[command(name = "tapestry", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// The analysis to run.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Analysis modes.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Graphs every top-level function and method in one file.
    File {
        /// Source file to analyse.
        #[arg(value_name = "PATH")]
        path: Utf8PathBuf,
        /// Output controls.
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Expands the graph reachable from one function, across files.
    Trace {
        /// Source file declaring the root function.
        #[arg(value_name = "PATH")]
        path: Utf8PathBuf,
        /// Name of the root function (`name` or `Receiver.name`).
        #[arg(
            value_name = "SYMBOL",
            required_unless_present = "line",
            conflicts_with = "line"
        )]
        symbol: Option<String>,
        /// Zero-based line inside the root function.
        #[arg(long, requires = "column")]
        line: Option<u32>,
        /// Zero-based column inside the root function.
        #[arg(long, requires = "line")]
        column: Option<u32>,
        /// Output controls.
        #[command(flatten)]
        output: OutputArgs,
    },
}

impl CliCommand {
    pub(crate) const fn output(&self) -> OutputArgs {
        match self {
            Self::File { output, .. } | Self::Trace { output, .. } => *output,
        }
    }
}

/// How the resulting graph is written.
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct OutputArgs {
    /// Indents the JSON output.
    #[arg(long)]
    pub(crate) pretty: bool,
    /// Prints node and edge counts instead of the graph.
    #[arg(long)]
    pub(crate) summary: bool,
}
