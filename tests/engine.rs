//! End-to-end scenarios through the engine facade.

#![allow(unused_crate_dependencies)]

use medbrain_graph::components::force_graph::{
	ChartConfig, Error, ForceGraphState, Graph, GraphDocument, GraphIntegrityError, GraphUpdate, LinkSpec,
	Node, Outcome, PointerEvent, SceneRenderer, StyleMap,
};
use pretty_assertions::assert_eq;

const DOC: &str = r#"{
	"vertexes": [
		{"id": "A", "label": "Diabetes", "type": "Disease"},
		{"id": "B", "label": "Polyuria", "type": "Symptom"},
		{"id": "C", "label": "Obesity", "type": "HistoryDisease"}
	],
	"edges": [
		{"id": "ab", "from": "A", "to": "B", "label": "HasSymptom"},
		{"id": "bc", "from": "B", "to": "C", "label": "HasDiseaseHistory"}
	]
}"#;

fn engine() -> ForceGraphState {
	let doc = GraphDocument::from_json(DOC).unwrap();
	ForceGraphState::from_document(&doc, ChartConfig::default(), StyleMap::medical(), 800.0, 600.0).unwrap()
}

fn screen_pos(state: &ForceGraphState, id: &str) -> (f64, f64) {
	let node = state.graph().node(state.graph().find_id(id).unwrap());
	state.view().apply(node.x, node.y)
}

#[test]
fn drag_then_release() {
	let mut state = engine();
	for t in 0..50 {
		state.frame(t as f64 * 16.0);
	}
	let (sx, sy) = screen_pos(&state, "B");
	let b = state.graph().find_id("B").unwrap();

	assert_eq!(state.pointer_down(PointerEvent::new(1, sx, sy)), Outcome::DragStarted(b));
	assert_eq!(state.simulation().alpha_target(), 0.3);

	state.pointer_move(PointerEvent::new(1, 100.0, 200.0));
	state.frame(1_000.0);
	assert_eq!(state.graph().node(b).position(), (100.0, 200.0));

	assert_eq!(state.pointer_up(PointerEvent::new(1, 100.0, 200.0)), Outcome::DragEnded(b));
	let node = state.graph().node(b);
	assert_eq!((node.fx, node.fy), (None, None));
	assert_eq!(state.simulation().alpha_target(), 0.0);
}

#[test]
fn dragged_node_tracks_pointer_under_zoom() {
	let mut state = engine();
	state.wheel(300.0, 200.0, -250.0);
	state.pointer_down(PointerEvent::new(3, 0.0, 0.0));
	state.pointer_move(PointerEvent::new(3, 40.0, 25.0));
	assert_eq!(state.pointer_up(PointerEvent::new(3, 40.0, 25.0)), Outcome::PanEnded);

	let (sx, sy) = screen_pos(&state, "C");
	let c = state.graph().find_id("C").unwrap();
	state.pointer_down(PointerEvent::new(1, sx, sy));

	let path = [(120.0, 80.0), (130.5, 95.25), (400.0, 10.0), (12.0, 590.0)];
	for (i, &(px, py)) in path.iter().enumerate() {
		state.pointer_move(PointerEvent::new(1, px, py));
		let expected = state.view().invert(px, py);
		for tick in 0..3 {
			state.frame(2_000.0 + (i * 3 + tick) as f64 * 16.0);
			assert_eq!(state.graph().node(c).position(), expected);
		}
	}
}

#[test]
fn hover_dims_non_neighbors() {
	let graph = Graph::new(
		vec![
			Node::new("A", "A").with_position(100.0, 100.0),
			Node::new("B", "B").with_position(200.0, 100.0),
			Node::new("C", "C").with_position(300.0, 100.0),
		],
		vec![LinkSpec::new("ab", "A", "B"), LinkSpec::new("bc", "B", "C")],
	)
	.unwrap();
	let mut state = ForceGraphState::new(graph, ChartConfig::default(), StyleMap::medical(), 400.0, 200.0);
	state.stop();

	let scene = |state: &ForceGraphState| {
		let mut scene = SceneRenderer::new();
		state.render(&mut scene);
		scene
	};
	let opacity = |state: &ForceGraphState, id: &str| {
		let idx = state.graph().find_id(id).unwrap();
		scene(state).nodes()[idx.index()].fill.a
	};
	let link_opacity = |state: &ForceGraphState, id: &str| {
		let scene = scene(state);
		scene.links().iter().find(|l| l.key == id).unwrap().color.a
	};

	state.pointer_move(PointerEvent::new(1, 100.0, 100.0));
	assert_eq!(opacity(&state, "A"), 1.0);
	assert_eq!(opacity(&state, "B"), 1.0);
	assert_eq!(opacity(&state, "C"), 0.15);
	assert_eq!(link_opacity(&state, "ab"), 1.0);
	assert_eq!(link_opacity(&state, "bc"), 0.15);

	state.pointer_move(PointerEvent::new(1, 200.0, 100.0));
	for id in ["A", "B", "C"] {
		assert_eq!(opacity(&state, id), 1.0);
	}
	assert_eq!(link_opacity(&state, "ab"), 1.0);
	assert_eq!(link_opacity(&state, "bc"), 1.0);

	state.pointer_leave(PointerEvent::new(1, 200.0, 100.0));
	assert_eq!(opacity(&state, "C"), 1.0);
	assert_eq!(link_opacity(&state, "bc"), 1.0);
}

#[test]
fn lifting_one_finger_keeps_the_other_drag() {
	let graph = Graph::new(
		vec![
			Node::new("A", "A").with_position(100.0, 100.0),
			Node::new("B", "B").with_position(300.0, 100.0),
		],
		vec![],
	)
	.unwrap();
	let mut state = ForceGraphState::new(graph, ChartConfig::default(), StyleMap::medical(), 400.0, 200.0);
	let b = state.graph().find_id("B").unwrap();
	state.pointer_down(PointerEvent::new(1, 100.0, 100.0));
	assert_eq!(state.pointer_down(PointerEvent::new(2, 300.0, 100.0)), Outcome::DragStarted(b));

	// Touch delivers pointerleave right after each pointerup.
	state.pointer_up(PointerEvent::new(1, 100.0, 100.0));
	assert_eq!(state.pointer_leave(PointerEvent::new(1, 100.0, 100.0)), Outcome::Ignored);
	assert!(state.graph().node(b).is_pinned());
	assert_eq!(state.simulation().alpha_target(), 0.3);

	assert_eq!(state.pointer_move(PointerEvent::new(2, 350.0, 150.0)), Outcome::Dragged(b));
	state.frame(0.0);
	assert_eq!(state.graph().node(b).position(), (350.0, 150.0));

	assert_eq!(state.pointer_leave(PointerEvent::new(2, 350.0, 150.0)), Outcome::DragEnded(b));
	assert!(!state.graph().node(b).is_pinned());
	assert_eq!(state.simulation().alpha_target(), 0.0);
}

#[test]
fn settled_layout_has_no_overlaps() {
	let nodes = (0..12).map(|i| Node::new(format!("n{i}"), "")).collect();
	let links = (1..12)
		.map(|i| LinkSpec::new(format!("l{i}"), "n0", format!("n{i}")))
		.collect();
	let graph = Graph::new(nodes, links).unwrap();
	let mut state = ForceGraphState::new(graph, ChartConfig::default(), StyleMap::medical(), 800.0, 600.0);

	let mut now = 0.0;
	while state.simulation().is_running() {
		state.frame(now);
		now += 16.0;
		assert!(now < 16.0 * 1_000.0, "layout did not settle");
	}

	let nodes = state.graph().nodes();
	for (i, a) in nodes.iter().enumerate() {
		assert!(a.x.is_finite() && a.y.is_finite());
		for b in &nodes[i + 1..] {
			let d = (a.x - b.x).hypot(a.y - b.y);
			assert!(d >= (a.radius + b.radius) * 0.95, "{} and {} overlap ({d})", a.id, b.id);
		}
	}
}

#[test]
fn coincident_nodes_stay_finite() {
	let nodes = (0..5).map(|i| Node::new(format!("n{i}"), "").with_position(10.0, 10.0)).collect();
	let graph = Graph::new(nodes, vec![]).unwrap();
	let mut state = ForceGraphState::new(graph, ChartConfig::default(), StyleMap::medical(), 800.0, 600.0);
	for t in 0..100 {
		state.frame(t as f64);
	}
	assert!(state.graph().nodes().iter().all(|n| n.x.is_finite() && n.y.is_finite()));
}

#[test]
fn new_topology_replaces_the_simulation() {
	let mut state = engine();
	let doc = GraphDocument::from_json(r#"{"vertexes": [{"id": "X", "label": "Flu", "type": "Disease"}]}"#).unwrap();
	assert_eq!(state.load_document(&doc).unwrap(), GraphUpdate::Replaced);
	assert_eq!(state.generation(), 1);
	assert_eq!(state.graph().len(), 1);

	let same = GraphDocument::from_json(r#"{"vertexes": [{"id": "X", "label": "Influenza", "type": "Disease"}]}"#)
		.unwrap();
	assert_eq!(state.load_document(&same).unwrap(), GraphUpdate::Restyled);
	assert_eq!(state.generation(), 1);
	assert_eq!(state.graph().nodes()[0].label, "Influenza");
}

#[test]
fn empty_document_renders_nothing() {
	let doc = GraphDocument::from_json("{}").unwrap();
	let mut state =
		ForceGraphState::from_document(&doc, ChartConfig::default(), StyleMap::medical(), 800.0, 600.0).unwrap();
	assert!(!state.simulation().is_running());
	assert!(state.frame(0.0));

	let mut scene = SceneRenderer::new();
	state.render(&mut scene);
	assert!(scene.nodes().is_empty() && scene.links().is_empty());
	assert_eq!(state.pointer_down(PointerEvent::new(1, 400.0, 300.0)), Outcome::PanStarted);
}

#[test]
fn dangling_edge_fails_construction() {
	let doc = GraphDocument::from_json(
		r#"{"vertexes": [{"id": "A", "type": "Disease"}], "edges": [{"id": "e", "from": "A", "to": "Z"}]}"#,
	)
	.unwrap();
	let err = ForceGraphState::from_document(&doc, ChartConfig::default(), StyleMap::medical(), 800.0, 600.0)
		.unwrap_err();
	assert!(matches!(
		err,
		Error::Integrity(GraphIntegrityError::UnknownEndpoint { ref link, ref node }) if link == "e" && node == "Z"
	));
}

#[test]
fn svg_export_of_a_settled_chart() {
	let mut state = engine();
	let mut now = 0.0;
	while state.simulation().is_running() {
		state.frame(now);
		now += 16.0;
	}
	let mut scene = SceneRenderer::new();
	state.render(&mut scene);
	let svg = scene.to_svg();
	assert_eq!(svg.matches("<circle").count(), 3);
	assert!(svg.contains(">Dia...</text>"));
	assert!(svg.contains("Symptoms &amp; signs"));
}
