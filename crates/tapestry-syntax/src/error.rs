//! Error types for the Tree-sitter symbol backend.
//!
//! [`SyntaxError`] covers parser initialisation, language detection and file
//! access. It converts into [`GraphError`] so the backend can sit behind the
//! engine's `SymbolResolver` seam.

use camino::Utf8PathBuf;
use tapestry_graph::GraphError;
use thiserror::Error;

use crate::language::SupportedLanguage;

/// Errors from syntactic analysis operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser for a language.
    #[error("failed to initialise parser for {language}: {message}")]
    ParserInitError {
        /// The language that failed to initialise.
        language: SupportedLanguage,
        /// Description of the failure.
        message: String,
    },

    /// Failed to determine language from file path.
    #[error("could not determine language for path: {path}")]
    UnknownLanguage {
        /// The path that could not be mapped to a language.
        path: Utf8PathBuf,
    },

    /// Failed to parse source code.
    #[error("failed to parse {language}: {message}")]
    ParseError {
        /// The language that failed to parse.
        language: SupportedLanguage,
        /// Description of the failure.
        message: String,
    },

    /// A source file could not be read.
    #[error("failed to read {path}: {source}")]
    ReadError {
        /// The file that could not be read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::ParserInitError {
            language,
            message: message.into(),
        }
    }

    /// Creates an unknown language error.
    #[must_use]
    pub fn unknown_language(path: impl Into<Utf8PathBuf>) -> Self {
        Self::UnknownLanguage { path: path.into() }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::ParseError {
            language,
            message: message.into(),
        }
    }

    /// Creates a read error.
    #[must_use]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }
}

impl From<SyntaxError> for GraphError {
    fn from(error: SyntaxError) -> Self {
        match error {
            SyntaxError::ReadError { path, source } => {
                Self::io(format!("failed to read {path}"), source)
            }
            other => Self::resolver(other.to_string()),
        }
    }
}
