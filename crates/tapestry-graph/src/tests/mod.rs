//! Unit tests for the tapestry-graph crate.

// Tests use caller/callee terminology which triggers similar_names lint
#![expect(
    clippy::similar_names,
    reason = "caller/callee are domain terms for tests"
)]

mod graph_tests {
    use crate::edge::{EdgeKind, GraphEdge};
    use crate::graph::CallGraph;
    use crate::node::{GraphNode, NodeId, NodeSource, SymbolKind};

    pub(super) fn node(name: &str, kind: SymbolKind) -> GraphNode {
        GraphNode::new(
            NodeId::new(kind, name),
            name,
            kind,
            NodeSource {
                file: "/src/lib.go".into(),
                line: 1,
                end_line: 3,
                code: String::new(),
            },
        )
    }

    fn id(name: &str) -> NodeId {
        NodeId::new(SymbolKind::Function, name)
    }

    fn chain() -> CallGraph {
        let mut graph = CallGraph::new();
        for name in ["main", "parse", "emit"] {
            graph.add_node(node(name, SymbolKind::Function));
        }
        graph.add_edge(GraphEdge::calls(id("main"), id("parse"), true));
        graph.add_edge(GraphEdge::calls(id("main"), id("emit"), false));
        graph.add_edge(GraphEdge::calls(id("parse"), id("emit"), false));
        graph
    }

    #[test]
    fn empty_graph_has_no_nodes() {
        let graph = CallGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn node_insertion_is_insert_if_absent() {
        let mut graph = CallGraph::new();
        assert!(graph.add_node(node("main", SymbolKind::Function)));
        assert!(!graph.add_node(node("main", SymbolKind::Function)));
        assert_eq!(graph.node_count(), 1);
        assert!(graph.contains_node(&id("main")));
    }

    #[test]
    fn duplicate_edges_are_suppressed() {
        let mut graph = chain();
        assert!(!graph.add_edge(GraphEdge::calls(id("main"), id("parse"), false)));
        assert!(graph.add_edge(GraphEdge::uses(id("main"), id("parse"))));
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn can_query_callers_and_callees() {
        let graph = chain();

        let callers: Vec<_> = graph.callers_of(&id("emit")).map(GraphNode::name).collect();
        assert_eq!(callers, ["main", "parse"]);

        let callees: Vec<_> = graph.callees_of(&id("main")).map(GraphNode::name).collect();
        assert_eq!(callees, ["parse", "emit"]);
    }

    #[test]
    fn degrees_count_both_directions() {
        let graph = chain();
        let degree = graph.degree(&id("parse"));
        assert_eq!((degree.incoming, degree.outgoing), (1, 1));
        assert_eq!(graph.degree(&id("emit")).total(), 2);
        assert_eq!(graph.degrees().len(), 3);
    }

    #[test]
    fn orphan_edges_are_removed() {
        let mut graph = chain();
        graph.add_edge(GraphEdge::calls(id("emit"), id("missing"), false));
        assert_eq!(graph.remove_orphan_edges(), 1);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.outgoing_edges(&id("emit")).next().is_none());
    }

    #[test]
    fn limit_nodes_keeps_root_then_callables_then_degree() {
        let mut graph = chain();
        graph.add_node(node("Config", SymbolKind::Struct));
        graph.add_edge(GraphEdge::uses(id("emit"), NodeId::new(SymbolKind::Struct, "Config")));

        let removed = graph.limit_nodes(2, Some(&id("parse")));

        assert_eq!(removed, 2);
        let kept: Vec<_> = graph.nodes().map(GraphNode::name).collect();
        assert_eq!(kept, ["parse", "emit"]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn find_by_name_works() {
        let graph = chain();
        assert!(graph.find_by_name("parse").is_some());
        assert!(graph.find_by_name("other_function").is_none());
        assert!(graph.get_node(&id("other_function")).is_err());
    }

    #[test]
    fn graph_data_reports_integrity_and_summary() {
        let mut graph = chain();
        graph.add_node(node("Config", SymbolKind::Struct));
        let data = graph.into_graph_data("lib.go");

        assert!(data.has_unique_ids());
        assert!(data.has_referential_integrity());
        assert!(!data.has_duplicate_edges());
        assert!(data.edge("function_main", "function_parse", EdgeKind::Calls).is_some());

        let summary = data.summary();
        assert_eq!(summary.nodes, 4);
        assert_eq!(summary.edges, 3);
        assert_eq!(summary.nodes_by_kind.get("function"), Some(&3));
        assert_eq!(summary.nodes_by_kind.get("struct"), Some(&1));
        assert_eq!(summary.edges_by_kind.get("calls"), Some(&3));
    }

    #[test]
    fn merge_combines_nodes_and_edges() {
        let mut left = chain();
        let mut right = CallGraph::new();
        right.add_node(node("emit", SymbolKind::Function));
        right.add_node(node("flush", SymbolKind::Function));
        right.add_edge(GraphEdge::calls(id("emit"), id("flush"), false));

        left.merge(right);

        assert_eq!(left.node_count(), 4);
        assert_eq!(left.edge_count(), 4);
    }
}

mod node_tests {
    use crate::node::{GraphNode, NodeId, NodeSource, SymbolKind};

    #[test]
    fn node_id_format_is_correct() {
        let id = NodeId::new(SymbolKind::Method, "Start");
        assert_eq!(id.as_str(), "method_Start");
        assert_eq!(NodeId::usage(&id, 2).as_str(), "method_Start_usage_2");
    }

    #[test]
    fn usage_nodes_keep_their_base_identity() {
        let base = NodeId::new(SymbolKind::Struct, "T");
        let node = GraphNode::new(
            base.clone(),
            "T",
            SymbolKind::Struct,
            NodeSource {
                file: "/src/t.go".into(),
                line: 3,
                end_line: 5,
                code: "type T struct {}".to_owned(),
            },
        )
        .into_usage(NodeId::usage(&base, 0), NodeId::from("function_F"), 2);

        assert_eq!(node.id().as_str(), "struct_T_usage_0");
        assert_eq!(node.base_declaration_id(), Some(&base));
        assert_eq!(node.used_by(), [NodeId::from("function_F")]);
        assert_eq!(node.usage_count(), Some(2));
    }

    #[test]
    fn qualified_name_includes_container() {
        let node = super::graph_tests::node("save", SymbolKind::Method).with_container("Repo");
        assert_eq!(node.qualified_name(), "Repo.save");
    }

    #[test]
    fn node_serialises_camel_case_fields() {
        let node = super::graph_tests::node("run", SymbolKind::Function)
            .with_language("go")
            .with_return("int", true);
        let json = serde_json::to_value(&node).expect("serialise node");
        assert_eq!(json["id"], "function_run");
        assert_eq!(json["kind"], "function");
        assert_eq!(json["endLine"], 3);
        assert_eq!(json["returnType"], "int");
        assert_eq!(json["hasReturnValue"], true);
        assert_eq!(json["isNested"], false);
        assert!(json.get("usedBy").is_none());
    }
}

mod edge_tests {
    use crate::edge::{EdgeKind, GraphEdge};
    use crate::node::{NodeId, Position};

    #[test]
    fn edge_accessors_return_correct_values() {
        let caller_id = NodeId::from("function_caller");
        let callee_id = NodeId::from("function_callee");

        let edge = GraphEdge::calls(caller_id.clone(), callee_id.clone(), true)
            .with_call_site(Position::new(15, 4));

        assert_eq!(edge.source(), &caller_id);
        assert_eq!(edge.target(), &callee_id);
        assert_eq!(edge.kind(), EdgeKind::Calls);
        assert_eq!(edge.has_return_value(), Some(true));
        assert_eq!(edge.call_site(), Some(Position::new(15, 4)));
        assert_eq!(edge.call_order(), None);
    }

    #[test]
    fn uses_edges_carry_no_return_flag() {
        let edge = GraphEdge::uses(NodeId::from("function_F"), NodeId::from("struct_T_usage_0"));
        let json = serde_json::to_value(&edge).expect("serialise edge");
        assert_eq!(json["type"], "uses");
        assert!(json.get("hasReturnValue").is_none());
        assert!(json.get("callOrder").is_none());
    }
}

mod support;
