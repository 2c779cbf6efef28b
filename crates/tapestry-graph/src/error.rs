//! Error types for call graph operations.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors returned by call graph operations.
///
/// Only failures that abort a whole traversal surface through this type.
/// Unresolvable call sites, out-of-scope definitions, and dangling edges are
/// logged and dropped by the engine instead.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The symbol resolution service failed.
    #[error("symbol resolution failed: {0}")]
    Resolver(String),

    /// Failed to resolve the symbol at the given position.
    #[error("no symbol found at {path}:{line}:{column}")]
    SymbolNotFound {
        /// Path to the file containing the position.
        path: Utf8PathBuf,
        /// Line number (0-based).
        line: u32,
        /// Column number (0-based).
        column: u32,
    },

    /// No callable symbol with the requested name exists in the file.
    #[error("no function or method named '{name}' in {path}")]
    RootNotFound {
        /// File that was searched.
        path: Utf8PathBuf,
        /// Name that was requested.
        name: String,
    },

    /// An IO error occurred during graph operations.
    #[error("IO error: {message}")]
    Io {
        /// Description of the IO error.
        message: String,
        /// Underlying error wrapped in Arc for Clone support.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A traversal was aborted while processing the named symbol.
    #[error("analysis of '{symbol}' failed: {source}")]
    Traversal {
        /// Symbol being processed when the failure occurred.
        symbol: String,
        /// The failure that aborted the traversal.
        #[source]
        source: Box<GraphError>,
    },

    /// The requested node was not found in the graph.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// Input failed validation.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl GraphError {
    /// Creates a new `Resolver` error.
    #[must_use]
    pub fn resolver(message: impl Into<String>) -> Self {
        Self::Resolver(message.into())
    }

    /// Creates a new `SymbolNotFound` error.
    #[must_use]
    pub fn symbol_not_found(path: impl Into<Utf8PathBuf>, line: u32, column: u32) -> Self {
        Self::SymbolNotFound {
            path: path.into(),
            line,
            column,
        }
    }

    /// Creates a new `RootNotFound` error.
    #[must_use]
    pub fn root_not_found(path: impl Into<Utf8PathBuf>, name: impl Into<String>) -> Self {
        Self::RootNotFound {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Creates a new `Io` error.
    #[must_use]
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Wraps a fatal failure with the name of the symbol being analysed.
    #[must_use]
    pub fn traversal(symbol: impl Into<String>, source: Self) -> Self {
        Self::Traversal {
            symbol: symbol.into(),
            source: Box::new(source),
        }
    }

    /// Creates a new `NodeNotFound` error.
    #[must_use]
    pub fn node_not_found(node_id: impl Into<String>) -> Self {
        Self::NodeNotFound(node_id.into())
    }

    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
