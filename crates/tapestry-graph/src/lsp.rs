//! Symbol resolution backed by a language server.
//!
//! [`LspSymbolResolver`] adapts any client able to answer
//! `textDocument/documentSymbol` and `textDocument/definition` into a
//! [`SymbolResolver`]. Starting and supervising the server process is the
//! client's concern.

use camino::Utf8Path;
use lsp_types::{
    DocumentSymbolParams, DocumentSymbolResponse, GotoDefinitionParams, GotoDefinitionResponse,
    PartialResultParams, SymbolInformation, TextDocumentIdentifier, TextDocumentPositionParams,
    WorkDoneProgressParams,
};

use crate::error::GraphError;
use crate::node::{Position, SourceRange, SymbolKind};
use crate::resolver::{DocumentSymbol, Location, SymbolResolver};
use crate::uri::{path_to_uri, uri_to_path};

/// Client abstraction for the LSP requests the engine needs.
///
/// This trait enables testing with fake clients and abstracts over
/// different LSP client implementations.
pub trait DocumentSymbolClient {
    /// Requests the symbol outline of a document.
    ///
    /// # Errors
    /// Returns an error if the LSP request fails.
    fn document_symbols(
        &mut self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>, GraphError>;

    /// Requests the definition of the symbol at a position.
    ///
    /// # Errors
    /// Returns an error if the LSP request fails.
    fn goto_definition(
        &mut self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>, GraphError>;
}

/// LSP-based symbol resolver.
///
/// Source text is read from the file system.
pub struct LspSymbolResolver<C> {
    client: C,
}

impl<C> LspSymbolResolver<C> {
    /// Creates a resolver backed by `client`.
    #[must_use]
    pub const fn new(client: C) -> Self {
        Self { client }
    }

    /// Returns the wrapped client.
    #[must_use]
    pub fn into_client(self) -> C {
        self.client
    }
}

impl<C: DocumentSymbolClient> SymbolResolver for LspSymbolResolver<C> {
    fn list_symbols(&mut self, path: &Utf8Path) -> Result<Vec<DocumentSymbol>, GraphError> {
        let params = DocumentSymbolParams {
            text_document: TextDocumentIdentifier {
                uri: path_to_uri(path)?,
            },
            work_done_progress_params: WorkDoneProgressParams::default(),
            partial_result_params: PartialResultParams::default(),
        };

        Ok(match self.client.document_symbols(params)? {
            Some(DocumentSymbolResponse::Nested(symbols)) => {
                symbols.into_iter().map(convert_nested).collect()
            }
            Some(DocumentSymbolResponse::Flat(symbols)) => nest_flat(&symbols),
            None => Vec::new(),
        })
    }

    fn resolve_definition(
        &mut self,
        path: &Utf8Path,
        position: Position,
    ) -> Result<Option<Location>, GraphError> {
        let params = GotoDefinitionParams {
            text_document_position_params: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier {
                    uri: path_to_uri(path)?,
                },
                position: lsp_types::Position::new(position.line, position.column),
            },
            work_done_progress_params: WorkDoneProgressParams::default(),
            partial_result_params: PartialResultParams::default(),
        };

        let location = match self.client.goto_definition(params)? {
            Some(GotoDefinitionResponse::Scalar(location)) => Some(convert_location(&location)),
            Some(GotoDefinitionResponse::Array(locations)) => {
                locations.first().map(convert_location)
            }
            Some(GotoDefinitionResponse::Link(links)) => links.first().map(|link| {
                Location::new(
                    uri_to_path(&link.target_uri),
                    convert_range(link.target_selection_range),
                )
            }),
            None => None,
        };
        Ok(location)
    }

    fn open_document(&mut self, path: &Utf8Path) -> Result<String, GraphError> {
        std::fs::read_to_string(path)
            .map_err(|error| GraphError::io(format!("failed to read {path}"), error))
    }
}

fn convert_range(range: lsp_types::Range) -> SourceRange {
    SourceRange::new(
        Position::new(range.start.line, range.start.character),
        Position::new(range.end.line, range.end.character),
    )
}

fn convert_location(location: &lsp_types::Location) -> Location {
    Location::new(uri_to_path(&location.uri), convert_range(location.range))
}

fn convert_nested(symbol: lsp_types::DocumentSymbol) -> DocumentSymbol {
    let children = symbol
        .children
        .unwrap_or_default()
        .into_iter()
        .map(convert_nested)
        .collect();
    DocumentSymbol::new(
        symbol.name,
        SymbolKind::from_lsp(symbol.kind),
        convert_range(symbol.range),
    )
    .with_selection_range(convert_range(symbol.selection_range))
    .with_children(children)
}

/// Rebuilds nesting for a flat outline from range containment.
fn nest_flat(symbols: &[SymbolInformation]) -> Vec<DocumentSymbol> {
    let mut converted: Vec<DocumentSymbol> = symbols
        .iter()
        .map(|info| {
            DocumentSymbol::new(
                info.name.clone(),
                SymbolKind::from_lsp(info.kind),
                convert_range(info.location.range),
            )
        })
        .collect();
    converted.sort_by(|left, right| {
        left.range
            .start
            .cmp(&right.range.start)
            .then_with(|| right.range.end.cmp(&left.range.end))
    });

    let mut roots = Vec::new();
    for symbol in converted {
        insert_nested(&mut roots, symbol);
    }
    roots
}

fn insert_nested(siblings: &mut Vec<DocumentSymbol>, symbol: DocumentSymbol) {
    match siblings.last_mut() {
        Some(last) if last.range.encloses(&symbol.range) && last.range != symbol.range => {
            insert_nested(&mut last.children, symbol);
        }
        _ => siblings.push(symbol),
    }
}
