//! Detection of user-defined type references inside functions.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::GraphError;
use crate::factory::{NodeFactory, clean_name};
use crate::node::{NodeId, Position};
use crate::resolver::{DocumentCache, ResolvedSymbol, SymbolResolver};
use crate::scope::ScopeFilter;
use crate::signature::SourceLanguage;
use crate::text::{code_lines, column, span_lines};

static TYPE_NAME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\b[A-Z][A-Za-z0-9_]*\b").ok());

/// A declaration referenced by a function.
#[derive(Debug, Clone)]
pub(crate) struct TypeUsage {
    pub(crate) declaration: ResolvedSymbol,
    pub(crate) declaration_id: NodeId,
    pub(crate) count: usize,
}

/// An occurrence of a type-shaped identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TypeReference {
    pub(crate) name: String,
    /// Position of the first occurrence.
    pub(crate) position: Position,
    pub(crate) count: usize,
}

/// Collects capitalised identifiers in a symbol's span, in order of first
/// occurrence.
///
/// The symbol's own name, `receiver` and `Self` are skipped, as is any
/// identifier directly followed by a single `:` (a field name in a composite
/// literal). String literals and comments are not scanned.
pub(crate) fn scan_type_references(
    source: &str,
    symbol: &ResolvedSymbol,
    receiver: Option<&str>,
) -> Vec<TypeReference> {
    let Some(pattern) = TYPE_NAME.as_ref() else {
        return Vec::new();
    };

    let own_name = clean_name(symbol.name()).name;
    let mut references: Vec<TypeReference> = Vec::new();
    let language = SourceLanguage::from_path(&symbol.path);
    for line in code_lines(&span_lines(source, &symbol.symbol.range), language) {
        let code = line.code.as_str();
        for found in pattern.find_iter(code) {
            let name = found.as_str();
            let after = code.get(found.end()..).unwrap_or_default().trim_start();
            let is_field = after.starts_with(':') && !after.starts_with("::");
            if is_field || name == "Self" || name == own_name || receiver == Some(name) {
                continue;
            }
            if let Some(existing) = references.iter_mut().find(|entry| entry.name == name) {
                existing.count = existing.count.saturating_add(1);
            } else {
                references.push(TypeReference {
                    name: name.to_owned(),
                    position: Position::new(line.number, column(line.offset.saturating_add(found.start()))),
                    count: 1,
                });
            }
        }
    }
    references
}

/// Resolves type references of a function to in-scope declarations.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DeclarationDetector<'a> {
    pub(crate) factory: &'a NodeFactory,
    pub(crate) scope: &'a ScopeFilter,
}

impl DeclarationDetector<'_> {
    /// Finds declarations used by `function`.
    ///
    /// When `candidates` is given, only declarations with one of those names
    /// are kept. Each distinct name is resolved once, at its first
    /// occurrence; misses are logged and skipped.
    pub(crate) fn find_type_usages<R: SymbolResolver>(
        &self,
        resolver: &mut R,
        cache: &mut DocumentCache,
        function: &ResolvedSymbol,
        candidates: Option<&BTreeSet<String>>,
    ) -> Result<Vec<TypeUsage>, GraphError> {
        let receiver = clean_name(function.name())
            .receiver
            .or_else(|| function.container.clone());
        let references = scan_type_references(
            cache.source(resolver, &function.path)?,
            function,
            receiver.as_deref(),
        );

        let mut usages: Vec<TypeUsage> = Vec::new();
        for reference in references {
            if candidates.is_some_and(|names| !names.contains(&reference.name)) {
                continue;
            }
            let Some(declaration) = self.resolve_reference(resolver, cache, function, &reference)
            else {
                continue;
            };
            let declaration_id = self.factory.identity(&declaration);
            if let Some(existing) = usages
                .iter_mut()
                .find(|usage| usage.declaration_id == declaration_id)
            {
                existing.count = existing.count.saturating_add(reference.count);
            } else {
                usages.push(TypeUsage {
                    declaration,
                    declaration_id,
                    count: reference.count,
                });
            }
        }
        Ok(usages)
    }

    fn resolve_reference<R: SymbolResolver>(
        &self,
        resolver: &mut R,
        cache: &mut DocumentCache,
        function: &ResolvedSymbol,
        reference: &TypeReference,
    ) -> Option<ResolvedSymbol> {
        let location = resolver
            .resolve_definition(&function.path, reference.position)
            .inspect_err(|error| {
                debug!(name = %reference.name, path = %function.path, %error, "type lookup failed");
            })
            .ok()
            .flatten()?;

        if self.scope.is_external(&location.path) {
            debug!(name = %reference.name, target = %location.path, "skipping external type");
            return None;
        }

        cache
            .symbol_at(resolver, &location, |kind| kind.is_declaration())
            .inspect_err(|error| {
                debug!(name = %reference.name, target = %location.path, %error, "outline lookup failed");
            })
            .ok()
            .flatten()
    }
}
