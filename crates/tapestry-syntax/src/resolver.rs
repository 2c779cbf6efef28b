//! Workspace-wide symbol resolution over Tree-sitter outlines.
//!
//! [`TreeSitterResolver`] answers the engine's outline and go-to-definition
//! queries without a language server. Definitions are found by name: the
//! identifier under the requested position is looked up first in the
//! requesting file and then in every file of the same language below the
//! workspace root. Positions inside string literals and comments never
//! resolve.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use camino::{Utf8Path, Utf8PathBuf};
use tapestry_graph::{DocumentSymbol, GraphError, Location, Position, SymbolResolver, clean_name};
use tracing::debug;

use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::outline::outline;
use crate::parser::{ParseResult, Parser};
use crate::position::position_to_point;

/// Symbol resolver backed by Tree-sitter parses of the workspace.
///
/// Sources, syntax trees, outlines and the workspace file index are cached
/// for the lifetime of the resolver.
pub struct TreeSitterResolver {
    root: Utf8PathBuf,
    parsers: HashMap<SupportedLanguage, Parser>,
    sources: HashMap<Utf8PathBuf, String>,
    parsed: HashMap<Utf8PathBuf, ParsedFile>,
    index: Option<Vec<Utf8PathBuf>>,
    absent: HashSet<(SupportedLanguage, String)>,
}

impl TreeSitterResolver {
    /// Creates a resolver searching for definitions below `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            parsers: HashMap::new(),
            sources: HashMap::new(),
            parsed: HashMap::new(),
            index: None,
            absent: HashSet::new(),
        }
    }

    /// Returns the workspace root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns every supported source file below the root, sorted by path.
    ///
    /// The walk honours `.gitignore` and skips hidden entries. It runs once;
    /// later calls reuse the index.
    pub fn workspace_files(&mut self) -> &[Utf8PathBuf] {
        let root = &self.root;
        self.index.get_or_insert_with(|| scan_workspace(root))
    }

    fn source_of(&mut self, path: &Utf8Path) -> Result<&str, SyntaxError> {
        if !self.sources.contains_key(path) {
            let text =
                std::fs::read_to_string(path).map_err(|error| SyntaxError::read(path, error))?;
            self.sources.insert(path.to_owned(), text);
        }
        Ok(self.sources.get(path).map(String::as_str).unwrap_or_default())
    }

    fn parsed_of(&mut self, path: &Utf8Path) -> Result<&ParsedFile, SyntaxError> {
        if !self.parsed.contains_key(path) {
            let language = SupportedLanguage::from_path(path)
                .ok_or_else(|| SyntaxError::unknown_language(path))?;
            let source = self.source_of(path)?.to_owned();
            let parser = match self.parsers.entry(language) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(Parser::new(language)?),
            };
            let tree = parser.parse(source)?;
            if tree.has_errors() {
                debug!(%path, errors = tree.errors().len(), "parsed with syntax errors");
            }
            let symbols = outline(&tree);
            self.parsed
                .insert(path.to_owned(), ParsedFile { tree, symbols });
        }
        self.parsed
            .get(path)
            .ok_or_else(|| SyntaxError::unknown_language(path))
    }

    fn outline_of(&mut self, path: &Utf8Path) -> Result<&[DocumentSymbol], SyntaxError> {
        Ok(self.parsed_of(path)?.symbols.as_slice())
    }

    fn find_in_file(
        &mut self,
        path: &Utf8Path,
        name: &str,
    ) -> Result<Option<Location>, SyntaxError> {
        let symbols = self.outline_of(path)?;
        Ok(deepest_named(symbols, name).map(|symbol| Location::new(path, symbol.selection_range)))
    }

    fn find_in_workspace(
        &mut self,
        requester: &Utf8Path,
        language: SupportedLanguage,
        name: &str,
    ) -> Option<Location> {
        let files = match self.index.take() {
            Some(files) => files,
            None => scan_workspace(&self.root),
        };
        let found = files
            .iter()
            .filter(|file| file.as_path() != requester)
            .filter(|file| SupportedLanguage::from_path(file) == Some(language))
            .find_map(|file| match self.find_in_file(file, name) {
                Ok(found) => found,
                Err(error) => {
                    debug!(%file, %error, "skipping workspace file");
                    None
                }
            });
        self.index = Some(files);
        found
    }
}

impl SymbolResolver for TreeSitterResolver {
    fn list_symbols(&mut self, path: &Utf8Path) -> Result<Vec<DocumentSymbol>, GraphError> {
        Ok(self.outline_of(path)?.to_vec())
    }

    fn resolve_definition(
        &mut self,
        path: &Utf8Path,
        position: Position,
    ) -> Result<Option<Location>, GraphError> {
        let language = SupportedLanguage::from_path(path)
            .ok_or_else(|| SyntaxError::unknown_language(path))?;
        let parsed = self.parsed_of(path)?;
        if parsed.tree.is_literal_or_comment(position_to_point(position)) {
            debug!(%path, line = position.line, column = position.column, "position is inside a literal or comment");
            return Ok(None);
        }
        let Some(name) = identifier_at(parsed.tree.source(), position).map(str::to_owned) else {
            return Ok(None);
        };
        let key = (language, name);
        if self.absent.contains(&key) {
            return Ok(None);
        }
        if let Some(found) = self.find_in_file(path, &key.1)? {
            return Ok(Some(found));
        }
        let found = self.find_in_workspace(path, language, &key.1);
        if found.is_none() {
            debug!(name = %key.1, %path, "no definition in workspace");
            self.absent.insert(key);
        }
        Ok(found)
    }

    fn open_document(&mut self, path: &Utf8Path) -> Result<String, GraphError> {
        Ok(self.source_of(path)?.to_owned())
    }
}

/// A parsed workspace file and its outline.
struct ParsedFile {
    tree: ParseResult,
    symbols: Vec<DocumentSymbol>,
}

fn scan_workspace(root: &Utf8Path) -> Vec<Utf8PathBuf> {
    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(true)
        .require_git(false)
        .build();

    let mut files: Vec<Utf8PathBuf> = walker
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(error) => {
                debug!(%error, "skipping workspace entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|kind| kind.is_file()))
        .filter_map(|entry| Utf8PathBuf::from_path_buf(entry.into_path()).ok())
        .filter(|path| SupportedLanguage::from_path(path).is_some())
        .collect();
    files.sort();
    debug!(%root, files = files.len(), "indexed workspace");
    files
}

/// Finds a symbol by bare name; nested declarations win over their parents.
fn deepest_named<'a>(symbols: &'a [DocumentSymbol], name: &str) -> Option<&'a DocumentSymbol> {
    symbols.iter().find_map(|symbol| {
        deepest_named(&symbol.children, name)
            .or_else(|| (clean_name(&symbol.name).name == name).then_some(symbol))
    })
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Returns the identifier touching `position`, if any.
fn identifier_at(source: &str, position: Position) -> Option<&str> {
    let line = source.lines().nth(usize::try_from(position.line).ok()?)?;
    let column = usize::try_from(position.column).ok()?;
    let head = line.get(..column)?;
    let tail = line.get(column..)?;
    let start = head
        .char_indices()
        .rev()
        .take_while(|(_, ch)| is_identifier_char(*ch))
        .last()
        .map_or(column, |(index, _)| index);
    let end = tail
        .char_indices()
        .find(|(_, ch)| !is_identifier_char(*ch))
        .map_or(line.len(), |(index, _)| column + index);
    line.get(start..end)
        .filter(|name| name.starts_with(|ch: char| ch.is_alphabetic() || ch == '_'))
}
