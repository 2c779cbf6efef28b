//! Call graph edge representation.

use serde::Serialize;

use crate::node::{NodeId, Position};

/// Relationship carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// The source function calls the target function.
    Calls,
    /// The source function references the target declaration.
    Uses,
    /// The source type implements the target interface.
    Implements,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Calls => "calls",
            Self::Uses => "uses",
            Self::Implements => "implements",
        };
        f.write_str(label)
    }
}

/// An edge in the call graph.
///
/// Edges are directed from caller to callee (or from user to declaration).
/// `call_order` and `return_order` stay empty until the call-order pass
/// visits the edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// Node ID of the caller.
    source: NodeId,
    /// Node ID of the callee.
    target: NodeId,
    /// Relationship type.
    #[serde(rename = "type")]
    kind: EdgeKind,
    /// Whether the caller consumes the call's result (calls only).
    #[serde(skip_serializing_if = "Option::is_none")]
    has_return_value: Option<bool>,
    /// Simulated execution step at which the call happens.
    #[serde(skip_serializing_if = "Option::is_none")]
    call_order: Option<u32>,
    /// Simulated execution step at which the result is consumed.
    #[serde(skip_serializing_if = "Option::is_none")]
    return_order: Option<u32>,
    /// Position in the caller where the call occurs (if known).
    #[serde(skip)]
    call_site: Option<Position>,
}

impl GraphEdge {
    /// Creates a `calls` edge.
    #[must_use]
    pub const fn calls(from_caller: NodeId, to_callee: NodeId, has_return_value: bool) -> Self {
        Self {
            source: from_caller,
            target: to_callee,
            kind: EdgeKind::Calls,
            has_return_value: Some(has_return_value),
            call_order: None,
            return_order: None,
            call_site: None,
        }
    }

    /// Creates a `uses` edge from a function to a declaration node.
    #[must_use]
    pub const fn uses(from_user: NodeId, to_declaration: NodeId) -> Self {
        Self::untyped(from_user, to_declaration, EdgeKind::Uses)
    }

    /// Creates an `implements` edge.
    #[must_use]
    pub const fn implements(from_type: NodeId, to_interface: NodeId) -> Self {
        Self::untyped(from_type, to_interface, EdgeKind::Implements)
    }

    const fn untyped(source: NodeId, target: NodeId, kind: EdgeKind) -> Self {
        Self {
            source,
            target,
            kind,
            has_return_value: None,
            call_order: None,
            return_order: None,
            call_site: None,
        }
    }

    /// Sets the call site location.
    #[must_use]
    pub const fn with_call_site(mut self, position: Position) -> Self {
        self.call_site = Some(position);
        self
    }

    /// Returns the source node ID.
    #[must_use]
    pub const fn source(&self) -> &NodeId {
        &self.source
    }

    /// Returns the target node ID.
    #[must_use]
    pub const fn target(&self) -> &NodeId {
        &self.target
    }

    /// Returns the relationship type.
    #[must_use]
    pub const fn kind(&self) -> EdgeKind {
        self.kind
    }

    /// Returns whether the call's result is consumed, for `calls` edges.
    #[must_use]
    pub const fn has_return_value(&self) -> Option<bool> {
        self.has_return_value
    }

    /// Returns the assigned call order, if any.
    #[must_use]
    pub const fn call_order(&self) -> Option<u32> {
        self.call_order
    }

    /// Returns the assigned return order, if any.
    #[must_use]
    pub const fn return_order(&self) -> Option<u32> {
        self.return_order
    }

    /// Returns the call site position if known.
    #[must_use]
    pub const fn call_site(&self) -> Option<Position> {
        self.call_site
    }

    /// Returns whether this edge connects `source` to `target` with `kind`.
    #[must_use]
    pub fn matches(&self, source: &NodeId, target: &NodeId, kind: EdgeKind) -> bool {
        self.kind == kind && &self.source == source && &self.target == target
    }

    pub(crate) const fn set_call_order(&mut self, order: u32) {
        self.call_order = Some(order);
    }

    pub(crate) const fn set_return_order(&mut self, order: u32) {
        self.return_order = Some(order);
    }
}
