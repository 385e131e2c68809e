use crate::*;
use serde_json::json;

#[test]
fn parse_graph_ignores_unknown_fields() {
    let graph = parse_graph_json(
        r##"{
            "nodes": [
                {"id": "node_1", "label": "Log Start", "type": "start", "level": 0},
                {"id": "node_2", "label": "search_files", "type": "action",
                 "details": {"full_content": "[ACTION] search_files: x", "line_number": 3,
                             "style": {"color": "#2196F3", "shape": "box"}}}
            ],
            "edges": [
                {"id": "edge_1", "source": "node_1", "target": "node_2", "type": "hierarchy",
                 "weight": 3}
            ],
            "metadata": {"total_lines": 15, "parsed_nodes": 2, "detected_framework": "generic",
                         "elapsed_ms": 4}
        }"##,
    )
    .unwrap();

    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.nodes[0].node_type, NodeType::Start);
    let details = graph.nodes[1].details.as_ref().unwrap();
    assert_eq!(details.line_number, Some(3));
    assert_eq!(graph.edges[0].kind(), EdgeKind::Hierarchy);
    let meta = graph.metadata.as_ref().unwrap();
    assert_eq!(meta.detected_framework.as_deref(), Some("generic"));
}

#[test]
fn unknown_node_types_keep_their_class_name() {
    let graph = FlowGraph::from_json_value(json!({
        "nodes": [
            {"id": "a", "label": "x", "type": "observation"},
            {"id": "b", "label": "y"}
        ],
        "edges": []
    }))
    .unwrap();

    assert_eq!(
        graph.nodes[0].node_type,
        NodeType::Unknown("observation".to_string())
    );
    assert_eq!(graph.nodes[0].node_type.as_str(), "observation");
    assert_eq!(graph.nodes[1].node_type.as_str(), "default");

    let back = serde_json::to_value(&graph.nodes[0]).unwrap();
    assert_eq!(back["type"], json!("observation"));
}

#[test]
fn every_node_type_maps_to_one_style() {
    let cases = [
        ("start", NodeShape::RoundRectangle),
        ("end", NodeShape::RoundRectangle),
        ("action", NodeShape::Rectangle),
        ("decision", NodeShape::Diamond),
        ("thinking", NodeShape::Diamond),
        ("result", NodeShape::Rectangle),
        ("error", NodeShape::Octagon),
        ("tool", NodeShape::Hexagon),
        ("info", NodeShape::Ellipse),
        ("data", NodeShape::Ellipse),
        ("metric", NodeShape::Ellipse),
        ("other", NodeShape::Ellipse),
        ("mystery", NodeShape::Ellipse),
    ];
    for (raw, shape) in cases {
        let t = NodeType::parse(raw);
        assert_eq!(t.style().shape, shape, "{raw}");
        assert_eq!(t.as_str(), raw);
    }
    assert_eq!(NodeType::Action.style().font_size, 12.0);
    assert_eq!(NodeType::Tool.style().font_size, 11.0);
}

#[test]
fn dangling_edges_are_reported_not_rejected() {
    let mut graph = FlowGraph::default();
    graph.nodes.push(FlowNode::new("a", "A", NodeType::Start));
    graph.nodes.push(FlowNode::new("b", "B", NodeType::End));
    graph.edges.push(FlowEdge::new("e1", "a", "b"));
    graph.edges.push(FlowEdge::new("e2", "a", "missing"));
    graph.edges.push(FlowEdge::new("e3", "ghost", "b"));

    let (resolved, dangling) = graph.resolve_edges();
    assert_eq!(resolved.len(), 1);
    assert_eq!((resolved[0].source, resolved[0].target), (0, 1));
    let ids = dangling.iter().map(|e| e.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["e2", "e3"]);
    assert_eq!(graph.dangling_edges().len(), 2);
}

#[test]
fn duplicate_ids_resolve_to_first_occurrence() {
    let mut graph = FlowGraph::default();
    graph.nodes.push(FlowNode::new("a", "first", NodeType::Action));
    graph.nodes.push(FlowNode::new("b", "B", NodeType::Action));
    graph.nodes.push(FlowNode::new("a", "second", NodeType::Action));

    assert_eq!(graph.duplicate_node_ids(), vec!["a"]);
    assert_eq!(graph.node_index()["a"], 0);
    assert_eq!(graph.node("a").unwrap().label, "first");
}

#[test]
fn edge_type_alias_and_unknown_kinds() {
    let edge: FlowEdge = serde_json::from_value(json!({
        "id": "e", "source": "a", "target": "b", "edgeType": "hierarchy"
    }))
    .unwrap();
    assert_eq!(edge.kind(), EdgeKind::Hierarchy);
    assert!(edge.style().dashed);

    let edge: FlowEdge = serde_json::from_value(json!({
        "id": "e", "source": "a", "target": "b", "type": "success"
    }))
    .unwrap();
    assert_eq!(edge.kind(), EdgeKind::Default);
    assert_eq!(edge.edge_type.as_deref(), Some("success"));
}

#[test]
fn layout_modes_parse_case_insensitively() {
    assert_eq!("zigzag".parse::<LayoutMode>().unwrap(), LayoutMode::Zigzag);
    assert_eq!("Smart".parse::<LayoutMode>().unwrap(), LayoutMode::Smart);
    assert_eq!(
        " cose-bilkent ".parse::<LayoutMode>().unwrap(),
        LayoutMode::CoseBilkent
    );
    assert!(LayoutMode::Smart.is_snake());
    assert!(!LayoutMode::Dagre.is_snake());

    let err = "spiral".parse::<LayoutMode>().unwrap_err();
    assert_eq!(err.to_string(), "Unknown layout mode: spiral");
}
