//! Call graph node representation.

use camino::Utf8PathBuf;
use serde::Serialize;

/// Unique identifier for a node in the call graph.
///
/// Callable and declaration identities take the form `{kind}_{name}`, where
/// `name` has any receiver qualifier removed. Usage-scoped declaration nodes
/// append `_usage_{index}` to the identity of the declaration they stand for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a node ID from a symbol kind and its clean name.
    #[must_use]
    pub fn new(kind: SymbolKind, clean_name: &str) -> Self {
        Self(format!("{}_{clean_name}", kind.as_str()))
    }

    /// Creates the identity of the `index`th usage of a declaration.
    #[must_use]
    pub fn usage(base: &Self, index: usize) -> Self {
        Self(format!("{}_usage_{index}", base.0))
    }

    /// Returns the string representation of this node ID.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Position in source code (line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    /// Zero-based line number.
    pub line: u32,
    /// Zero-based column number.
    pub column: u32,
}

impl Position {
    /// Creates a new source position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Half-open span of source text between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceRange {
    /// First position covered by the range.
    pub start: Position,
    /// Position just past the end of the range.
    pub end: Position,
}

impl SourceRange {
    /// Creates a new range.
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Returns whether `position` falls inside the range.
    ///
    /// The end position is treated as inclusive so that a definition whose
    /// range ends on the closing brace still contains that brace.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    /// Returns whether `other` lies entirely within this range.
    #[must_use]
    pub fn encloses(&self, other: &Self) -> bool {
        self.contains(other.start) && self.contains(other.end)
    }

    /// Number of lines spanned, used to order nested candidates.
    #[must_use]
    pub const fn line_span(&self) -> u32 {
        self.end.line.saturating_sub(self.start.line)
    }
}

/// Kind of symbol represented by a graph node.
///
/// Callables (`Function`, `Method`) participate in call edges; declarations
/// (`Class`, `Struct`, `Interface`, `Enum`) are the targets of type usages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// A free function definition.
    Function,
    /// A method on a class, struct, or receiver type.
    Method,
    /// A class declaration.
    Class,
    /// A struct declaration.
    Struct,
    /// An interface or trait declaration.
    Interface,
    /// An enumeration declaration.
    Enum,
    /// A type alias or other named type.
    Type,
    /// Unknown or unclassified symbol.
    Unknown,
}

impl SymbolKind {
    /// Converts from LSP `SymbolKind` to our domain type.
    #[must_use]
    pub const fn from_lsp(kind: lsp_types::SymbolKind) -> Self {
        match kind {
            lsp_types::SymbolKind::FUNCTION => Self::Function,
            lsp_types::SymbolKind::METHOD | lsp_types::SymbolKind::CONSTRUCTOR => Self::Method,
            lsp_types::SymbolKind::CLASS => Self::Class,
            lsp_types::SymbolKind::STRUCT => Self::Struct,
            lsp_types::SymbolKind::INTERFACE => Self::Interface,
            lsp_types::SymbolKind::ENUM => Self::Enum,
            lsp_types::SymbolKind::TYPE_PARAMETER => Self::Type,
            _ => Self::Unknown,
        }
    }

    /// Returns the lower-case label used in node identities.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Type => "type",
            Self::Unknown => "unknown",
        }
    }

    /// Whether symbols of this kind can be the source or target of a call.
    #[must_use]
    pub const fn is_callable(self) -> bool {
        matches!(self, Self::Function | Self::Method)
    }

    /// Whether symbols of this kind count as user-defined declarations.
    #[must_use]
    pub const fn is_declaration(self) -> bool {
        matches!(
            self,
            Self::Class | Self::Struct | Self::Interface | Self::Enum
        )
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in the call graph representing a callable or a declaration usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Unique identifier for this node.
    id: NodeId,
    /// Human-readable name of the symbol, receiver qualifier removed.
    label: String,
    /// Kind of symbol (function, method, struct, etc.).
    kind: SymbolKind,
    /// Path to the file containing this symbol.
    file: Utf8PathBuf,
    /// First line of the symbol (1-based).
    line: u32,
    /// Last line of the symbol (1-based).
    end_line: u32,
    /// Source text of the symbol's span.
    code: String,
    /// Language inferred from the file extension.
    language: String,
    /// Best-effort return type signature.
    return_type: String,
    /// Whether the symbol appears to produce a usable value.
    has_return_value: bool,
    /// Whether the symbol is lexically nested inside another callable.
    is_nested: bool,
    /// Identity of the enclosing callable for nested symbols.
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_node_id: Option<NodeId>,
    /// Receiver or container type, if the symbol had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    container: Option<String>,
    /// Referencing function for usage-scoped declaration nodes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    used_by: Vec<NodeId>,
    /// Canonical identity of the declaration before usage duplication.
    #[serde(skip_serializing_if = "Option::is_none")]
    base_declaration_id: Option<NodeId>,
    /// Number of references from `used_by` to the declaration.
    #[serde(skip_serializing_if = "Option::is_none")]
    usage_count: Option<usize>,
}

/// Source provenance for a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSource {
    /// Path to the file containing the symbol.
    pub file: Utf8PathBuf,
    /// First line of the symbol (1-based).
    pub line: u32,
    /// Last line of the symbol (1-based).
    pub end_line: u32,
    /// Source text of the symbol's span.
    pub code: String,
}

impl GraphNode {
    /// Creates a new graph node.
    #[must_use]
    pub fn new(id: NodeId, label: impl Into<String>, kind: SymbolKind, source: NodeSource) -> Self {
        Self {
            id,
            label: label.into(),
            kind,
            file: source.file,
            line: source.line,
            end_line: source.end_line,
            code: source.code,
            language: String::from("unknown"),
            return_type: String::from("unknown"),
            has_return_value: false,
            is_nested: false,
            parent_node_id: None,
            container: None,
            used_by: Vec::new(),
            base_declaration_id: None,
            usage_count: None,
        }
    }

    /// Sets the detected language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the return signature.
    #[must_use]
    pub fn with_return(mut self, return_type: impl Into<String>, has_return_value: bool) -> Self {
        self.return_type = return_type.into();
        self.has_return_value = has_return_value;
        self
    }

    /// Creates a new call node with a container.
    #[must_use]
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    /// Marks the node as lexically nested inside `parent`.
    #[must_use]
    pub fn nested_in(mut self, parent: NodeId) -> Self {
        self.is_nested = true;
        self.parent_node_id = Some(parent);
        self
    }

    /// Re-identifies a declaration node as the usage by `user`, which
    /// references it `count` times.
    #[must_use]
    pub fn into_usage(mut self, usage_id: NodeId, user: NodeId, count: usize) -> Self {
        let base = std::mem::replace(&mut self.id, usage_id);
        self.base_declaration_id = Some(base);
        self.used_by = vec![user];
        self.usage_count = Some(count);
        self
    }

    /// Returns the unique identifier for this node.
    #[must_use]
    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns the name of the symbol.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.label
    }

    /// Returns the kind of symbol.
    #[must_use]
    pub const fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// Returns the path to the file containing this symbol.
    #[must_use]
    pub const fn path(&self) -> &Utf8PathBuf {
        &self.file
    }

    /// Returns the first line of the symbol (1-based).
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Returns the last line of the symbol (1-based).
    #[must_use]
    pub const fn end_line(&self) -> u32 {
        self.end_line
    }

    /// Returns the source text of the symbol.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the detected language label.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the best-effort return type.
    #[must_use]
    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    /// Returns whether the symbol appears to produce a value.
    #[must_use]
    pub const fn has_return_value(&self) -> bool {
        self.has_return_value
    }

    /// Returns whether the symbol is nested inside another callable.
    #[must_use]
    pub const fn is_nested(&self) -> bool {
        self.is_nested
    }

    /// Returns the enclosing callable for nested symbols.
    #[must_use]
    pub const fn parent_node_id(&self) -> Option<&NodeId> {
        self.parent_node_id.as_ref()
    }

    /// Returns the container name if present.
    #[must_use]
    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    /// Returns the referencing functions of a usage-scoped declaration.
    #[must_use]
    pub fn used_by(&self) -> &[NodeId] {
        &self.used_by
    }

    /// Returns the canonical declaration identity of a usage node.
    #[must_use]
    pub const fn base_declaration_id(&self) -> Option<&NodeId> {
        self.base_declaration_id.as_ref()
    }

    /// Returns how often the referencing function mentions the declaration.
    #[must_use]
    pub const fn usage_count(&self) -> Option<usize> {
        self.usage_count
    }

    /// Returns the fully qualified name including the container.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        self.container.as_ref().map_or_else(
            || self.label.clone(),
            |container| format!("{container}.{}", self.label),
        )
    }
}
