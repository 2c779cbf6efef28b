//! Node construction from resolved symbols.

use crate::node::{GraphNode, NodeId, NodeSource, SymbolKind};
use crate::resolver::ResolvedSymbol;
use crate::signature::{SourceLanguage, return_signature};
use crate::text::span_text;

/// How node identities treat methods that share a name.
///
/// `{kind}_{name}` identities fold methods with the same name on different
/// receivers into one node. Qualifying with the receiver keeps them apart at
/// the cost of a different identity format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentityScheme {
    /// `{kind}_{cleanName}`.
    #[default]
    Name,
    /// `{kind}_{Receiver}.{cleanName}` for methods with a known receiver.
    Receiver,
}

/// A symbol name split into its receiver qualifier and bare name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanName {
    /// Receiver or owning type, without pointer or reference markers.
    pub receiver: Option<String>,
    /// Name with any qualifier removed.
    pub name: String,
}

/// Splits a possibly receiver-qualified symbol name.
///
/// Handles the Go outline form `(*Type).Method`, dotted `Type.method`, and
/// path-qualified `Type::method`.
///
/// # Examples
///
/// ```
/// use tapestry_graph::clean_name;
///
/// let clean = clean_name("(*Server).Start");
/// assert_eq!(clean.name, "Start");
/// assert_eq!(clean.receiver.as_deref(), Some("Server"));
/// assert_eq!(clean_name("main").receiver, None);
/// ```
#[must_use]
pub fn clean_name(raw: &str) -> CleanName {
    let trimmed = raw.trim();
    let split = trimmed
        .rfind("::")
        .map(|at| (at, 2))
        .or_else(|| trimmed.rfind('.').map(|at| (at, 1)));

    let Some((at, width)) = split else {
        return CleanName {
            receiver: None,
            name: trimmed.to_owned(),
        };
    };

    let head = trimmed.get(..at).unwrap_or_default();
    let tail = trimmed.get(at.saturating_add(width)..).unwrap_or_default();
    let receiver = head
        .trim_matches(|ch: char| matches!(ch, '(' | ')' | '*' | '&' | ' '))
        .trim_start_matches("mut ");
    if tail.is_empty() {
        return CleanName {
            receiver: None,
            name: trimmed.to_owned(),
        };
    }
    CleanName {
        receiver: (!receiver.is_empty()).then(|| receiver.to_owned()),
        name: tail.to_owned(),
    }
}

/// Builds graph nodes and their identities from resolved symbols.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeFactory {
    identity: IdentityScheme,
}

impl NodeFactory {
    /// Creates a factory using the given identity scheme.
    #[must_use]
    pub const fn new(identity: IdentityScheme) -> Self {
        Self { identity }
    }

    /// Returns the identity scheme in use.
    #[must_use]
    pub const fn identity_scheme(&self) -> IdentityScheme {
        self.identity
    }

    /// Derives the stable identity of a symbol.
    #[must_use]
    pub fn identity(&self, symbol: &ResolvedSymbol) -> NodeId {
        let clean = clean_name(symbol.name());
        let kind = effective_kind(symbol, &clean);
        match (self.identity, receiver_of(symbol, &clean)) {
            (IdentityScheme::Receiver, Some(receiver)) if kind == SymbolKind::Method => {
                NodeId::new(kind, &format!("{receiver}.{}", clean.name))
            }
            _ => NodeId::new(kind, &clean.name),
        }
    }

    /// Builds a node for `symbol` using the full text of its file.
    ///
    /// Never fails: signature analysis degrades to `"unknown"`.
    #[must_use]
    pub fn create_node(&self, symbol: &ResolvedSymbol, file_source: &str) -> GraphNode {
        let clean = clean_name(symbol.name());
        let kind = effective_kind(symbol, &clean);
        let code = span_text(file_source, &symbol.symbol.range);
        let language = SourceLanguage::from_path(&symbol.path);
        let end_line = if symbol.symbol.range.end.column == 0
            && symbol.symbol.range.end.line > symbol.symbol.range.start.line
        {
            symbol.symbol.range.end.line
        } else {
            symbol.symbol.range.end.line.saturating_add(1)
        };
        let source = NodeSource {
            file: symbol.path.clone(),
            line: symbol.symbol.range.start.line.saturating_add(1),
            end_line,
            code,
        };

        let mut node = GraphNode::new(self.identity(symbol), clean.name.as_str(), kind, source)
            .with_language(language.as_str());

        if kind.is_callable() {
            let signature = return_signature(language, &clean.name, node.code());
            node = node.with_return(signature.return_type, signature.has_return_value);
        }
        if let Some(receiver) = receiver_of(symbol, &clean) {
            node = node.with_container(receiver);
        }
        if let Some(parent) = &symbol.parent {
            let enclosing = ResolvedSymbol {
                symbol: parent.clone(),
                path: symbol.path.clone(),
                parent: None,
                container: symbol.container.clone(),
            };
            node = node.nested_in(self.identity(&enclosing));
        }
        node
    }
}

/// Methods reported as functions with a receiver qualifier become methods.
fn effective_kind(symbol: &ResolvedSymbol, clean: &CleanName) -> SymbolKind {
    if symbol.kind() == SymbolKind::Function && clean.receiver.is_some() {
        SymbolKind::Method
    } else {
        symbol.kind()
    }
}

fn receiver_of(symbol: &ResolvedSymbol, clean: &CleanName) -> Option<String> {
    clean.receiver.clone().or_else(|| {
        symbol
            .kind()
            .is_callable()
            .then(|| symbol.container.clone())
            .flatten()
    })
}
