//! Layered configuration for the Tapestry toolchain.
//!
//! [`Config`] merges built-in defaults, an optional configuration file
//! (`--config-path` or `TAPESTRY_CONFIG_PATH`), `TAPESTRY_*` environment
//! variables and command-line flags, in increasing order of precedence.
//! The crate knows nothing about the graph engine; the binary maps the
//! loaded values onto analysis options.

mod defaults;
mod logging;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_CALL_DEPTH, default_log_filter, default_log_filter_string,
    default_log_format, default_max_call_depth,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime configuration shared by the Tapestry binaries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "TAPESTRY")]
pub struct Config {
    /// Tracing filter expression, such as `info` or `tapestry_graph=debug`.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Bound on call-order recursion depth.
    #[serde(default = "default_max_call_depth")]
    #[ortho_config(default = default_max_call_depth())]
    pub max_call_depth: usize,
    /// Upper bound on the number of nodes in a result; unset means unlimited.
    #[serde(default)]
    pub max_nodes: Option<usize>,
    /// Extra path fragments marking definitions as external.
    #[serde(default)]
    #[ortho_config(default = Vec::new())]
    pub exclude_paths: Vec<String>,
    /// Directory outside which every definition is external.
    #[serde(default)]
    pub workspace_root: Option<Utf8PathBuf>,
    /// Keeps methods on different receivers apart in node identities.
    #[serde(default)]
    #[ortho_config(default = false)]
    pub qualify_receivers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            max_call_depth: default_max_call_depth(),
            max_nodes: None,
            exclude_paths: Vec::new(),
            workspace_root: None,
            qualify_receivers: false,
        }
    }
}

impl Config {
    /// Returns the tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the call-order recursion bound.
    #[must_use]
    pub const fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }

    /// Returns the node cap, if any.
    #[must_use]
    pub const fn max_nodes(&self) -> Option<usize> {
        self.max_nodes
    }

    /// Returns the extra external path fragments.
    #[must_use]
    pub fn exclude_paths(&self) -> &[String] {
        &self.exclude_paths
    }

    /// Returns the configured workspace root.
    #[must_use]
    pub fn workspace_root(&self) -> Option<&camino::Utf8Path> {
        self.workspace_root.as_deref()
    }

    /// Returns whether method identities include their receiver.
    #[must_use]
    pub const fn qualify_receivers(&self) -> bool {
        self.qualify_receivers
    }
}
