//! Maps configuration and commands onto the graph engine.

use camino::{Utf8Path, Utf8PathBuf};
use tapestry_config::Config;
use tapestry_graph::{
    AnalysisOptions, CallGraphAnalyzer, GraphData, IdentityScheme, ScopeFilter, SourcePosition,
};
use tapestry_syntax::TreeSitterResolver;
use tracing::debug;

use crate::AppError;
use crate::cli::CliCommand;

/// Files whose presence marks a project root.
const PROJECT_MARKERS: &[&str] = &[
    ".git",
    "Cargo.toml",
    "go.mod",
    "package.json",
    "pyproject.toml",
    "setup.py",
    "tsconfig.json",
];

/// Builds engine options from the loaded configuration.
pub(crate) fn analysis_options(config: &Config, workspace_root: &Utf8Path) -> AnalysisOptions {
    let scope = ScopeFilter::new()
        .with_workspace_root(workspace_root)
        .with_exclusions(config.exclude_paths().iter().cloned());
    let identity = if config.qualify_receivers() {
        IdentityScheme::Receiver
    } else {
        IdentityScheme::Name
    };
    AnalysisOptions::new()
        .with_max_depth(config.max_call_depth())
        .with_scope(scope)
        .with_identity(identity)
        .with_max_nodes(config.max_nodes())
}

/// Returns the nearest ancestor of `file` holding a project marker, or the
/// file's own directory when none does.
pub(crate) fn discover_workspace_root(file: &Utf8Path) -> Utf8PathBuf {
    let directory = file.parent().unwrap_or(file);
    directory
        .ancestors()
        .find(|candidate| {
            PROJECT_MARKERS
                .iter()
                .any(|marker| candidate.join(marker).exists())
        })
        .unwrap_or(directory)
        .to_owned()
}

fn canonical(path: &Utf8Path) -> Result<Utf8PathBuf, AppError> {
    path.canonicalize_utf8()
        .map_err(|source| AppError::ResolvePath {
            path: path.to_owned(),
            source,
        })
}

/// Runs the analysis `command` asks for.
pub(crate) fn execute(command: &CliCommand, config: &Config) -> Result<GraphData, AppError> {
    let (CliCommand::File { path, .. } | CliCommand::Trace { path, .. }) = command;
    let file = canonical(path)?;
    let root = match config.workspace_root() {
        Some(configured) => canonical(configured)?,
        None => discover_workspace_root(&file),
    };
    debug!(%file, %root, "resolved analysis scope");

    let options = analysis_options(config, &root);
    let mut analyzer = CallGraphAnalyzer::new(TreeSitterResolver::new(root), options);

    let graph = match command {
        CliCommand::File { .. } => analyzer.analyze_file(&file)?,
        CliCommand::Trace {
            symbol: Some(symbol),
            ..
        } => analyzer.analyze_from_name(&file, symbol)?,
        CliCommand::Trace {
            line: Some(line),
            column,
            ..
        } => analyzer.analyze_from_position(&SourcePosition::new(
            file,
            *line,
            column.unwrap_or_default(),
        ))?,
        CliCommand::Trace { .. } => return Err(AppError::MissingRoot),
    };
    Ok(graph)
}
