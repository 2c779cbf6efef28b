//! Simulated execution ordering of call edges.
//!
//! A single depth-first walk from the root assigns each `calls` edge the step
//! at which the call happens and, when the caller consumes the result, the
//! step at which the value comes back.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::edge::EdgeKind;
use crate::graph::CallGraph;
use crate::node::NodeId;

/// A resolved call site, kept in source order per caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OrderedCall {
    pub(crate) target: NodeId,
    pub(crate) consumes_result: bool,
}

/// Call sites of every expanded function, keyed by caller.
pub(crate) type CallSequence = HashMap<NodeId, Vec<OrderedCall>>;

/// State of one call-order pass.
///
/// Each traversal owns its own state, so independent traversals never share
/// counters or visited sets.
#[derive(Debug)]
pub(crate) struct TraversalState {
    visiting: HashSet<NodeId>,
    visited: HashSet<NodeId>,
    counter: u32,
    max_depth: usize,
}

impl TraversalState {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            visiting: HashSet::new(),
            visited: HashSet::new(),
            counter: 0,
            max_depth,
        }
    }

    /// Returns the last order value handed out.
    pub(crate) const fn last_order(&self) -> u32 {
        self.counter
    }

    /// Assigns call and return orders to edges reachable from `root`.
    ///
    /// An edge called from several sites keeps the order of the first site
    /// that reaches it.
    pub(crate) fn assign(&mut self, graph: &mut CallGraph, calls: &CallSequence, root: &NodeId) {
        self.visit(graph, calls, root, 0);
    }

    fn next_order(&mut self) -> u32 {
        self.counter = self.counter.saturating_add(1);
        self.counter
    }

    fn visit(&mut self, graph: &mut CallGraph, calls: &CallSequence, node: &NodeId, depth: usize) {
        self.visiting.insert(node.clone());

        for call in calls.get(node).map(Vec::as_slice).unwrap_or_default() {
            let assigned_here = match graph.edge_mut(node, &call.target, EdgeKind::Calls) {
                Some(edge) if edge.call_order().is_none() => {
                    let order = self.next_order();
                    edge.set_call_order(order);
                    true
                }
                _ => false,
            };

            let already_seen =
                self.visiting.contains(&call.target) || self.visited.contains(&call.target);
            if already_seen {
                debug!(caller = %node, callee = %call.target, "callee already expanded");
            } else if depth <= self.max_depth {
                self.visit(graph, calls, &call.target, depth.saturating_add(1));
            } else {
                debug!(caller = %node, callee = %call.target, depth, "call depth limit reached");
            }

            if assigned_here && call.consumes_result {
                let order = self.next_order();
                if let Some(edge) = graph.edge_mut(node, &call.target, EdgeKind::Calls) {
                    edge.set_return_order(order);
                }
            }
        }

        self.visiting.remove(node);
        self.visited.insert(node.clone());
    }
}
