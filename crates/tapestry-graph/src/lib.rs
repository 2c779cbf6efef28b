//! Call and usage graph construction for the Tapestry toolchain.
//!
//! This crate builds a navigable graph rooted at a chosen function: which
//! functions it calls, which user-defined types it references, and in what
//! order calls and returns occur in a simulated sequential execution.
//!
//! Source understanding is delegated to a [`SymbolResolver`], which supplies
//! document outlines and go-to-definition answers. [`LspSymbolResolver`]
//! adapts a language server client; `tapestry-syntax` provides a native
//! Tree-sitter backend.
//!
//! # Core Types
//!
//! - [`GraphNode`] - A callable, or one usage of a declaration
//! - [`GraphEdge`] - A `calls`, `uses` or `implements` relationship
//! - [`CallGraph`] - Node arena with bidirectional edge indexing
//! - [`GraphData`] - The serialisable result handed to renderers
//!
//! # Analysis
//!
//! [`CallGraphAnalyzer`] offers two modes:
//!
//! - **Single file**: every top-level function and method in a file, with
//!   their calls and type usages
//! - **Root expansion**: breadth-first expansion across files from one root,
//!   followed by a depth-first pass assigning `callOrder` and `returnOrder`
//!
//! Unresolvable call sites, definitions in external code, and dangling edges
//! are logged and dropped. Only failures to read the analysed file abort.
//!
//! # Example
//!
//! ```ignore
//! use tapestry_graph::{AnalysisOptions, CallGraphAnalyzer, SourcePosition};
//!
//! let mut analyzer = CallGraphAnalyzer::new(resolver, AnalysisOptions::default());
//! let graph = analyzer.analyze_from_position(&SourcePosition::new("main.go", 4, 5))?;
//! for edge in &graph.edges {
//!     // Render the edge
//! }
//! ```

mod analysis;
mod call_order;
mod calls;
mod declarations;
mod edge;
mod error;
mod factory;
mod graph;
mod lsp;
mod node;
mod resolver;
mod scope;
mod signature;
mod text;
mod uri;

pub use analysis::{AnalysisOptions, CallGraphAnalyzer, DEFAULT_MAX_CALL_DEPTH, SourcePosition};
pub use calls::{CallSite, detect_return_value_usage, scan_call_sites};
pub use edge::{EdgeKind, GraphEdge};
pub use error::GraphError;
pub use factory::{CleanName, IdentityScheme, NodeFactory, clean_name};
pub use graph::{CallGraph, Degree, GraphData, GraphSummary};
pub use lsp::{DocumentSymbolClient, LspSymbolResolver};
pub use node::{GraphNode, NodeId, NodeSource, Position, SourceRange, SymbolKind};
pub use resolver::{DocumentSymbol, Location, ResolvedSymbol, SymbolResolver};
pub use scope::{DEFAULT_EXCLUDED_FRAGMENTS, ScopeFilter};
pub use signature::{ReturnSignature, SourceLanguage, return_signature};
pub use uri::{path_to_uri, uri_to_path};

#[cfg(test)]
mod tests;
