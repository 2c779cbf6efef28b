//! Tree-sitter powered symbol resolution for the Tapestry toolchain.
//!
//! This crate provides a native backend for the call graph engine in
//! `tapestry-graph`, so graphs can be built without a running language
//! server:
//!
//! - **Parsing** via [`Parser`], which wraps Tree-sitter and records syntax
//!   errors without failing
//! - **Outlines** via [`outline`], which reports functions, methods and type
//!   declarations the way `textDocument/documentSymbol` does
//! - **Resolution** via [`TreeSitterResolver`], which implements
//!   `SymbolResolver` with name-based go-to-definition across a workspace
//!
//! # Supported Languages
//!
//! - Rust (`.rs`)
//! - Python (`.py`, `.pyi`)
//! - TypeScript (`.ts`, `.tsx`, `.mts`, `.cts`)
//! - Go (`.go`)
//!
//! # Example
//!
//! ```ignore
//! use camino::Utf8Path;
//! use tapestry_graph::{AnalysisOptions, CallGraphAnalyzer};
//! use tapestry_syntax::TreeSitterResolver;
//!
//! let resolver = TreeSitterResolver::new("/work/project");
//! let mut analyzer = CallGraphAnalyzer::new(resolver, AnalysisOptions::default());
//! let graph = analyzer.analyze_from_name(Utf8Path::new("/work/project/main.go"), "main")?;
//! ```

mod error;
mod language;
mod outline;
mod parser;
mod position;
mod resolver;

pub use error::SyntaxError;
pub use language::SupportedLanguage;
pub use outline::outline;
pub use parser::{ParseResult, Parser, SyntaxErrorInfo};
pub use resolver::TreeSitterResolver;

#[cfg(test)]
mod tests;
