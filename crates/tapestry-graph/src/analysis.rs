//! Traversal orchestration.
//!
//! [`CallGraphAnalyzer`] composes node construction, call and declaration
//! detection, and call-order assignment into the two analysis modes:
//! whole-file analysis and breadth-first expansion from a root function.
//! Every invocation recomputes the graph from the current sources.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

use crate::call_order::{CallSequence, OrderedCall, TraversalState};
use crate::calls::{CallCandidate, EdgeDetector};
use crate::declarations::DeclarationDetector;
use crate::edge::GraphEdge;
use crate::error::GraphError;
use crate::factory::{IdentityScheme, NodeFactory, clean_name};
use crate::graph::{CallGraph, GraphData};
use crate::node::{NodeId, Position, SourceRange};
use crate::resolver::{DocumentCache, Location, ResolvedSymbol, SymbolResolver, flatten_outline};
use crate::scope::ScopeFilter;

/// Default bound on call-order recursion depth.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 50;

/// Tuning for an analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    max_depth: usize,
    scope: ScopeFilter,
    identity: IdentityScheme,
    max_nodes: Option<usize>,
    declaration_names: Option<BTreeSet<String>>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_CALL_DEPTH,
            scope: ScopeFilter::default(),
            identity: IdentityScheme::default(),
            max_nodes: None,
            declaration_names: None,
        }
    }
}

impl AnalysisOptions {
    /// Creates options with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the call-order recursion bound.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the scope filter deciding which definitions are external.
    #[must_use]
    pub fn with_scope(mut self, scope: ScopeFilter) -> Self {
        self.scope = scope;
        self
    }

    /// Sets the node identity scheme.
    #[must_use]
    pub const fn with_identity(mut self, identity: IdentityScheme) -> Self {
        self.identity = identity;
        self
    }

    /// Caps the number of nodes in the result.
    #[must_use]
    pub const fn with_max_nodes(mut self, max_nodes: Option<usize>) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Restricts declaration detection to the named types.
    #[must_use]
    pub fn with_declaration_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declaration_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the call-order recursion bound.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the scope filter.
    #[must_use]
    pub const fn scope(&self) -> &ScopeFilter {
        &self.scope
    }

    /// Returns the identity scheme.
    #[must_use]
    pub const fn identity(&self) -> IdentityScheme {
        self.identity
    }

    /// Returns the node cap, if any.
    #[must_use]
    pub const fn max_nodes(&self) -> Option<usize> {
        self.max_nodes
    }
}

/// A position in a source file used to select a root symbol.
#[derive(Debug, Clone)]
pub struct SourcePosition {
    /// Path to the source file.
    pub path: Utf8PathBuf,
    /// Line number (0-based).
    pub line: u32,
    /// Column number (0-based).
    pub column: u32,
}

impl SourcePosition {
    /// Creates a new source position.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, line: u32, column: u32) -> Self {
        Self {
            path: path.into(),
            line,
            column,
        }
    }
}

/// Builds call/usage graphs over a [`SymbolResolver`].
///
/// # Example
///
/// ```ignore
/// use camino::Utf8Path;
/// use tapestry_graph::{AnalysisOptions, CallGraphAnalyzer};
///
/// let mut analyzer = CallGraphAnalyzer::new(resolver, AnalysisOptions::default());
/// let graph = analyzer.analyze_from_name(Utf8Path::new("src/main.go"), "main")?;
/// println!("{}", graph.to_json(true)?);
/// ```
pub struct CallGraphAnalyzer<R> {
    resolver: R,
    options: AnalysisOptions,
}

impl<R: SymbolResolver> CallGraphAnalyzer<R> {
    /// Creates an analyzer.
    #[must_use]
    pub const fn new(resolver: R, options: AnalysisOptions) -> Self {
        Self { resolver, options }
    }

    /// Returns the analysis options.
    #[must_use]
    pub const fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Returns the wrapped resolver.
    #[must_use]
    pub fn into_resolver(self) -> R {
        self.resolver
    }

    /// Builds the graph of every top-level function and method in `path`.
    ///
    /// # Errors
    /// Returns [`GraphError::Traversal`] when the file cannot be listed or
    /// read.
    pub fn analyze_file(&mut self, path: &Utf8Path) -> Result<GraphData, GraphError> {
        info!(%path, "analysing file");
        let mut traversal = Traversal::new(&self.options);
        traversal
            .single_file(&mut self.resolver, path)
            .map_err(|error| GraphError::traversal(path.as_str(), error))?;
        Ok(traversal.finish(None, path))
    }

    /// Expands the graph reachable from the callable named `name` in `path`.
    ///
    /// `name` may be the symbol's outline name, its bare name, or a
    /// `Container.name` path.
    ///
    /// # Errors
    /// Returns [`GraphError::RootNotFound`] when no callable matches, or
    /// [`GraphError::Traversal`] when the traversal aborts.
    pub fn analyze_from_name(&mut self, path: &Utf8Path, name: &str) -> Result<GraphData, GraphError> {
        let mut traversal = Traversal::new(&self.options);
        let symbols = traversal
            .cache
            .outline(&mut self.resolver, path)
            .map(|outline| flatten_outline(path, outline))
            .map_err(|error| GraphError::traversal(name, error))?;
        let root = symbols
            .into_iter()
            .filter(|symbol| symbol.kind().is_callable())
            .find(|symbol| matches_root_name(symbol, name))
            .ok_or_else(|| GraphError::root_not_found(path, name))?;
        traversal.expand_and_finish(&mut self.resolver, root)
    }

    /// Expands the graph reachable from the callable enclosing `position`.
    ///
    /// # Errors
    /// Returns [`GraphError::SymbolNotFound`] when no callable encloses the
    /// position, or [`GraphError::Traversal`] when the traversal aborts.
    pub fn analyze_from_position(
        &mut self,
        position: &SourcePosition,
    ) -> Result<GraphData, GraphError> {
        let mut traversal = Traversal::new(&self.options);
        let point = Position::new(position.line, position.column);
        let location = Location::new(position.path.clone(), SourceRange::new(point, point));
        let root = traversal
            .cache
            .symbol_at(&mut self.resolver, &location, |kind| kind.is_callable())
            .map_err(|error| GraphError::traversal(position.path.as_str(), error))?
            .ok_or_else(|| {
                GraphError::symbol_not_found(&position.path, position.line, position.column)
            })?;
        traversal.expand_and_finish(&mut self.resolver, root)
    }
}

fn matches_root_name(symbol: &ResolvedSymbol, name: &str) -> bool {
    let clean = clean_name(symbol.name());
    if symbol.name() == name || clean.name == name {
        return true;
    }
    clean
        .receiver
        .as_deref()
        .or(symbol.container.as_deref())
        .is_some_and(|receiver| {
            name.strip_prefix(receiver)
                .and_then(|rest| rest.strip_prefix('.'))
                .is_some_and(|rest| rest == clean.name)
        })
}

/// Functions referencing one declaration, with their reference counts.
#[derive(Debug)]
struct DeclarationUsers {
    declaration: ResolvedSymbol,
    users: Vec<(NodeId, usize)>,
}

/// State owned by a single analysis invocation.
struct Traversal<'o> {
    options: &'o AnalysisOptions,
    factory: NodeFactory,
    cache: DocumentCache,
    graph: CallGraph,
    calls: CallSequence,
    declarations: BTreeMap<NodeId, DeclarationUsers>,
}

impl<'o> Traversal<'o> {
    fn new(options: &'o AnalysisOptions) -> Self {
        Self {
            options,
            factory: NodeFactory::new(options.identity),
            cache: DocumentCache::default(),
            graph: CallGraph::new(),
            calls: CallSequence::new(),
            declarations: BTreeMap::new(),
        }
    }

    fn single_file<R: SymbolResolver>(
        &mut self,
        resolver: &mut R,
        path: &Utf8Path,
    ) -> Result<(), GraphError> {
        let symbols = flatten_outline(path, self.cache.outline(resolver, path)?);
        self.cache.source(resolver, path)?;

        let callables: Vec<ResolvedSymbol> = symbols
            .into_iter()
            .filter(|symbol| symbol.kind().is_callable())
            .collect();
        for symbol in &callables {
            self.add_symbol_node(resolver, symbol);
        }

        for symbol in callables.iter().filter(|symbol| symbol.parent.is_none()) {
            let id = self.factory.identity(symbol);
            let candidates = self.detect_calls(resolver, symbol, &id)?;
            for candidate in candidates {
                if !self.graph.contains_node(&candidate.target_id) {
                    self.add_symbol_node(resolver, &candidate.target);
                }
            }
            self.detect_declarations(resolver, symbol, &id);
        }

        self.materialize_declarations(resolver);
        Ok(())
    }

    fn expand_and_finish<R: SymbolResolver>(
        mut self,
        resolver: &mut R,
        root: ResolvedSymbol,
    ) -> Result<GraphData, GraphError> {
        let root_id = self.factory.identity(&root);
        let path = root.path.clone();
        info!(root = %root_id, %path, "expanding from root");
        self.expand(resolver, root, &root_id)?;
        Ok(self.finish(Some(&root_id), &path))
    }

    /// Breadth-first expansion followed by one call-order pass from the root.
    fn expand<R: SymbolResolver>(
        &mut self,
        resolver: &mut R,
        root: ResolvedSymbol,
        root_id: &NodeId,
    ) -> Result<(), GraphError> {
        self.add_symbol_node(resolver, &root);
        let mut enqueued = HashSet::from([root_id.clone()]);
        let mut queue = VecDeque::from([root]);

        while let Some(symbol) = queue.pop_front() {
            let id = self.factory.identity(&symbol);
            let candidates = match self.detect_calls(resolver, &symbol, &id) {
                Ok(candidates) => candidates,
                Err(error) if &id != root_id => {
                    debug!(symbol = %id, %error, "skipping symbol whose source is unavailable");
                    Vec::new()
                }
                Err(error) => return Err(GraphError::traversal(symbol.name(), error)),
            };
            for candidate in candidates {
                if enqueued.insert(candidate.target_id.clone()) {
                    self.add_symbol_node(resolver, &candidate.target);
                    queue.push_back(candidate.target);
                }
            }
            self.detect_declarations(resolver, &symbol, &id);
        }

        let mut state = TraversalState::new(self.options.max_depth);
        state.assign(&mut self.graph, &self.calls, root_id);
        debug!(root = %root_id, orders = state.last_order(), "assigned call order");

        self.materialize_declarations(resolver);
        Ok(())
    }

    /// Adds a node for `symbol`; a missing source leaves the node out.
    fn add_symbol_node<R: SymbolResolver>(&mut self, resolver: &mut R, symbol: &ResolvedSymbol) {
        match self.cache.source(resolver, &symbol.path) {
            Ok(source) => {
                let node = self.factory.create_node(symbol, source);
                self.graph.add_node(node);
            }
            Err(error) => {
                debug!(symbol = symbol.name(), path = %symbol.path, %error, "cannot create node");
            }
        }
    }

    /// Records the outgoing calls of `caller` as edges and call sequence.
    fn detect_calls<R: SymbolResolver>(
        &mut self,
        resolver: &mut R,
        caller: &ResolvedSymbol,
        caller_id: &NodeId,
    ) -> Result<Vec<CallCandidate>, GraphError> {
        let detector = EdgeDetector {
            factory: &self.factory,
            scope: &self.options.scope,
        };
        let candidates = detector.find_calls(resolver, &mut self.cache, caller)?;

        let sequence = self.calls.entry(caller_id.clone()).or_default();
        for candidate in &candidates {
            self.graph.add_edge(
                GraphEdge::calls(
                    caller_id.clone(),
                    candidate.target_id.clone(),
                    candidate.site.consumes_result,
                )
                .with_call_site(candidate.site.position),
            );
            sequence.push(OrderedCall {
                target: candidate.target_id.clone(),
                consumes_result: candidate.site.consumes_result,
            });
        }
        debug!(caller = %caller_id, calls = candidates.len(), "detected calls");
        Ok(candidates)
    }

    /// Accumulates the declarations `function` references.
    fn detect_declarations<R: SymbolResolver>(
        &mut self,
        resolver: &mut R,
        function: &ResolvedSymbol,
        function_id: &NodeId,
    ) {
        let detector = DeclarationDetector {
            factory: &self.factory,
            scope: &self.options.scope,
        };
        let usages = match detector.find_type_usages(
            resolver,
            &mut self.cache,
            function,
            self.options.declaration_names.as_ref(),
        ) {
            Ok(usages) => usages,
            Err(error) => {
                debug!(symbol = %function_id, %error, "declaration detection failed");
                return;
            }
        };

        for usage in usages {
            let entry = self
                .declarations
                .entry(usage.declaration_id)
                .or_insert_with(|| DeclarationUsers {
                    declaration: usage.declaration,
                    users: Vec::new(),
                });
            if !entry.users.iter().any(|(user, _)| user == function_id) {
                entry.users.push((function_id.clone(), usage.count));
            }
        }
    }

    /// Creates one usage-scoped node per (declaration, user) pair.
    fn materialize_declarations<R: SymbolResolver>(&mut self, resolver: &mut R) {
        let declarations = std::mem::take(&mut self.declarations);
        for (base_id, entry) in declarations {
            let base_node = match self.cache.source(resolver, &entry.declaration.path) {
                Ok(source) => self.factory.create_node(&entry.declaration, source),
                Err(error) => {
                    debug!(declaration = %base_id, %error, "cannot create declaration node");
                    continue;
                }
            };
            for (index, (user, count)) in entry.users.into_iter().enumerate() {
                let usage_id = NodeId::usage(&base_id, index);
                self.graph
                    .add_node(base_node.clone().into_usage(usage_id.clone(), user.clone(), count));
                self.graph.add_edge(GraphEdge::uses(user, usage_id));
            }
        }
    }

    fn finish(mut self, root: Option<&NodeId>, path: &Utf8Path) -> GraphData {
        self.graph.remove_orphan_edges();
        if let Some(max_nodes) = self.options.max_nodes {
            let removed = self.graph.limit_nodes(max_nodes, root);
            if removed > 0 {
                info!(removed, max_nodes, "truncated graph");
            }
        }
        info!(
            %path,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "analysis complete"
        );
        self.graph
            .into_graph_data(path.file_name().unwrap_or(path.as_str()))
    }
}
