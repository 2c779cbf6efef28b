//! Symbol resolution service abstraction.
//!
//! The engine never parses source itself. Symbol outlines and
//! go-to-definition answers come from a [`SymbolResolver`], which may be a
//! language server ([`crate::LspSymbolResolver`]), a native parser backend, or
//! an in-memory fake in tests. Requests are issued one at a time in program
//! order; call-order simulation depends on that ordering.

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::GraphError;
use crate::node::{Position, SourceRange, SymbolKind};

/// One entry of a document outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSymbol {
    /// Symbol name as reported by the resolver, possibly receiver-qualified.
    pub name: String,
    /// Kind of symbol.
    pub kind: SymbolKind,
    /// Full extent of the symbol, including its body.
    pub range: SourceRange,
    /// Extent of the symbol's name.
    pub selection_range: SourceRange,
    /// Symbols lexically nested inside this one.
    pub children: Vec<DocumentSymbol>,
}

impl DocumentSymbol {
    /// Creates a symbol without children whose name spans the first line.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: SymbolKind, range: SourceRange) -> Self {
        Self {
            name: name.into(),
            kind,
            range,
            selection_range: range,
            children: Vec::new(),
        }
    }

    /// Sets the selection range.
    #[must_use]
    pub const fn with_selection_range(mut self, selection_range: SourceRange) -> Self {
        self.selection_range = selection_range;
        self
    }

    /// Appends nested symbols.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children.extend(children);
        self
    }
}

/// A resolved source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// File containing the definition.
    pub path: Utf8PathBuf,
    /// Extent of the definition (or of its name).
    pub range: SourceRange,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, range: SourceRange) -> Self {
        Self {
            path: path.into(),
            range,
        }
    }
}

/// Backend answering outline and go-to-definition queries.
pub trait SymbolResolver {
    /// Returns the document-level symbol outline for `path`.
    ///
    /// # Errors
    /// Returns an error if the document cannot be opened or analysed.
    fn list_symbols(&mut self, path: &Utf8Path) -> Result<Vec<DocumentSymbol>, GraphError>;

    /// Resolves the definition of the identifier at `position` in `path`.
    ///
    /// # Errors
    /// Returns an error if the resolver fails; an unresolvable identifier is
    /// `Ok(None)`.
    fn resolve_definition(
        &mut self,
        path: &Utf8Path,
        position: Position,
    ) -> Result<Option<Location>, GraphError>;

    /// Returns the full source text of `path`.
    ///
    /// # Errors
    /// Returns an error if the document cannot be read.
    fn open_document(&mut self, path: &Utf8Path) -> Result<String, GraphError>;
}

impl<R: SymbolResolver + ?Sized> SymbolResolver for &mut R {
    fn list_symbols(&mut self, path: &Utf8Path) -> Result<Vec<DocumentSymbol>, GraphError> {
        (**self).list_symbols(path)
    }

    fn resolve_definition(
        &mut self,
        path: &Utf8Path,
        position: Position,
    ) -> Result<Option<Location>, GraphError> {
        (**self).resolve_definition(path, position)
    }

    fn open_document(&mut self, path: &Utf8Path) -> Result<String, GraphError> {
        (**self).open_document(path)
    }
}

/// A symbol paired with the file that declares it and its lexical context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSymbol {
    /// The outline entry.
    pub symbol: DocumentSymbol,
    /// File declaring the symbol.
    pub path: Utf8PathBuf,
    /// Enclosing callable, when the symbol is nested inside one.
    pub parent: Option<DocumentSymbol>,
    /// Enclosing non-callable container (class, impl target), if any.
    pub container: Option<String>,
}

impl ResolvedSymbol {
    /// Returns the symbol name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.symbol.name
    }

    /// Returns the symbol kind.
    #[must_use]
    pub const fn kind(&self) -> SymbolKind {
        self.symbol.kind
    }
}

/// Per-traversal cache of document outlines and source text.
///
/// A traversal asks for the same outline once per call site that lands in a
/// file, so caching here keeps resolver traffic proportional to the number of
/// distinct files rather than call sites.
#[derive(Debug, Default)]
pub(crate) struct DocumentCache {
    outlines: HashMap<Utf8PathBuf, Vec<DocumentSymbol>>,
    sources: HashMap<Utf8PathBuf, String>,
}

impl DocumentCache {
    pub(crate) fn outline<R: SymbolResolver>(
        &mut self,
        resolver: &mut R,
        path: &Utf8Path,
    ) -> Result<&[DocumentSymbol], GraphError> {
        if !self.outlines.contains_key(path) {
            let symbols = resolver.list_symbols(path)?;
            self.outlines.insert(path.to_owned(), symbols);
        }
        Ok(self.outlines.get(path).map(Vec::as_slice).unwrap_or_default())
    }

    pub(crate) fn source<R: SymbolResolver>(
        &mut self,
        resolver: &mut R,
        path: &Utf8Path,
    ) -> Result<&str, GraphError> {
        if !self.sources.contains_key(path) {
            let text = resolver.open_document(path)?;
            self.sources.insert(path.to_owned(), text);
        }
        Ok(self.sources.get(path).map(String::as_str).unwrap_or_default())
    }

    /// Finds the innermost symbol of an accepted kind enclosing `location`.
    pub(crate) fn symbol_at<R: SymbolResolver>(
        &mut self,
        resolver: &mut R,
        location: &Location,
        accept: impl Fn(SymbolKind) -> bool,
    ) -> Result<Option<ResolvedSymbol>, GraphError> {
        let outline = self.outline(resolver, &location.path)?;
        let mut found = None;
        find_enclosing(
            outline,
            location.range.start,
            &accept,
            &Context::default(),
            &mut found,
        );
        Ok(found.map(|(symbol, context)| ResolvedSymbol {
            symbol: symbol.clone(),
            path: location.path.clone(),
            parent: context.parent.cloned(),
            container: context.container,
        }))
    }
}

#[derive(Debug, Default, Clone)]
struct Context<'a> {
    parent: Option<&'a DocumentSymbol>,
    container: Option<String>,
}

fn find_enclosing<'a>(
    symbols: &'a [DocumentSymbol],
    position: Position,
    accept: &impl Fn(SymbolKind) -> bool,
    context: &Context<'a>,
    found: &mut Option<(&'a DocumentSymbol, Context<'a>)>,
) {
    for symbol in symbols {
        if !symbol.range.contains(position) && !symbol.selection_range.contains(position) {
            continue;
        }
        if accept(symbol.kind) {
            *found = Some((symbol, context.clone()));
        }
        let mut nested = context.clone();
        if symbol.kind.is_callable() {
            nested.parent = Some(symbol);
        } else {
            nested.container = Some(symbol.name.clone());
        }
        find_enclosing(&symbol.children, position, accept, &nested, found);
    }
}

/// Walks an outline depth-first and reports every symbol with its context.
pub(crate) fn flatten_outline(path: &Utf8Path, symbols: &[DocumentSymbol]) -> Vec<ResolvedSymbol> {
    let mut out = Vec::new();
    flatten_into(path, symbols, None, None, &mut out);
    out
}

fn flatten_into(
    path: &Utf8Path,
    symbols: &[DocumentSymbol],
    parent: Option<&DocumentSymbol>,
    container: Option<&str>,
    out: &mut Vec<ResolvedSymbol>,
) {
    for symbol in symbols {
        out.push(ResolvedSymbol {
            symbol: symbol.clone(),
            path: path.to_owned(),
            parent: parent.cloned(),
            container: container.map(str::to_owned),
        });
        if symbol.kind.is_callable() {
            flatten_into(path, &symbol.children, Some(symbol), container, out);
        } else {
            flatten_into(path, &symbol.children, parent, Some(&symbol.name), out);
        }
    }
}
