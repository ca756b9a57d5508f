//! Property tests for the viewport, adjacency and label helpers.

#![allow(unused_crate_dependencies)]

use medbrain_graph::components::force_graph::{
	AdjacencyIndex, Graph, LinkSpec, Node, ScaleExtent, ViewTransform, truncate_label,
};
use proptest::prelude::*;

fn extent() -> impl Strategy<Value = ScaleExtent> {
	(0.05f64..1.0, 1.0f64..20.0).prop_map(|(min, max)| ScaleExtent::new(min, max))
}

fn transform() -> impl Strategy<Value = ViewTransform> {
	(-1e4f64..1e4, -1e4f64..1e4, 0.2f64..5.0)
		.prop_map(|(tx, ty, k)| ViewTransform::new(tx, ty, k, ScaleExtent::default()))
}

/// Small graphs given as (node count, endpoint index pairs).
fn graph() -> impl Strategy<Value = Graph> {
	(1usize..12).prop_flat_map(|n| {
		prop::collection::vec((0..n, 0..n), 0..30).prop_map(move |pairs| {
			let nodes = (0..n).map(|i| Node::new(format!("n{i}"), "")).collect();
			let links = pairs
				.iter()
				.enumerate()
				.map(|(k, &(a, b))| LinkSpec::new(format!("l{k}"), format!("n{a}"), format!("n{b}")))
				.collect();
			Graph::new(nodes, links).expect("endpoints are in range")
		})
	})
}

proptest! {
	#[test]
	fn apply_inverts_invert(t in transform(), sx in -2e3f64..2e3, sy in -2e3f64..2e3) {
		let (wx, wy) = t.invert(sx, sy);
		let (rx, ry) = t.apply(wx, wy);
		prop_assert!((rx - sx).abs() < 1e-6);
		prop_assert!((ry - sy).abs() < 1e-6);
	}

	#[test]
	fn scale_stays_in_extent(
		extent in extent(),
		steps in prop::collection::vec((-2_000f64..2_000.0, 0f64..800.0, 0f64..600.0), 0..64),
	) {
		let mut t = ViewTransform::identity(extent);
		for (delta, x, y) in steps {
			t.zoom_at(ViewTransform::wheel_factor(delta), (x, y));
			prop_assert!(t.scale() >= extent.min() && t.scale() <= extent.max());
		}
	}

	#[test]
	fn zoom_preserves_the_anchor(t in transform(), factor in 0.5f64..2.0, ax in 0f64..800.0, ay in 0f64..600.0) {
		let mut t = t;
		let before = t.invert(ax, ay);
		t.zoom_at(factor, (ax, ay));
		let after = t.invert(ax, ay);
		prop_assert!((before.0 - after.0).abs() < 1e-6 * before.0.abs().max(1.0));
		prop_assert!((before.1 - after.1).abs() < 1e-6 * before.1.abs().max(1.0));
	}

	#[test]
	fn adjacency_is_symmetric_and_irreflexive(graph in graph()) {
		let adjacency = AdjacencyIndex::new(&graph);
		for a in graph.indices() {
			prop_assert!(!adjacency.is_adjacent(a, a));
			for b in graph.indices() {
				prop_assert_eq!(adjacency.is_adjacent(a, b), adjacency.is_adjacent(b, a));
			}
		}
		for link in graph.links() {
			if link.source != link.target {
				prop_assert!(adjacency.is_adjacent(link.source, link.target));
			}
		}
	}

	#[test]
	fn truncated_labels_keep_at_most_max_chars(label in "\\PC{0,12}", max in 0usize..6) {
		let out = truncate_label(&label, max);
		if label.chars().count() <= max {
			prop_assert_eq!(out.as_ref(), label.as_str());
		} else {
			prop_assert!(out.ends_with("..."));
			prop_assert_eq!(out.chars().count(), max + 3);
			prop_assert!(label.starts_with(out.trim_end_matches("...")));
		}
	}
}
