//! Pointer picking.

use super::graph::{Graph, NodeIdx};
use super::transform::ViewTransform;

/// Resolves a screen point to the topmost node under it.
#[derive(Clone, Copy, Debug, Default)]
pub struct HitTester {
	/// Extra tolerance in screen pixels around each node, so small or far
	/// zoomed-out dots stay grabbable.
	pub slop_px: f64,
}

impl HitTester {
	/// Tester with `slop_px` screen pixels of extra tolerance; negative reads as zero.
	pub fn new(slop_px: f64) -> Self {
		Self {
			slop_px: slop_px.max(0.0),
		}
	}

	/// Later nodes paint on top, so they are tested first.
	pub fn node_at(&self, graph: &Graph, view: &ViewTransform, sx: f64, sy: f64) -> Option<NodeIdx> {
		let (wx, wy) = view.invert(sx, sy);
		let slop = self.slop_px / view.scale();
		graph.indices().rev().find(|&idx| {
			let node = graph.node(idx);
			let r = node.radius + slop;
			let (dx, dy) = (node.x - wx, node.y - wy);
			dx * dx + dy * dy <= r * r
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::config::ScaleExtent;
	use crate::components::force_graph::graph::Node;

	fn overlapping() -> Graph {
		Graph::new(
			vec![
				Node::new("under", "").with_radius(10.0).with_position(0.0, 0.0),
				Node::new("over", "").with_radius(10.0).with_position(5.0, 0.0),
			],
			vec![],
		)
		.unwrap()
	}

	#[test]
	fn topmost_node_wins() {
		let graph = overlapping();
		let view = ViewTransform::default();
		let hit = HitTester::default().node_at(&graph, &view, 2.0, 0.0);
		assert_eq!(hit.map(|i| graph.node(i).id.as_str()), Some("over"));
		let hit = HitTester::default().node_at(&graph, &view, -8.0, 0.0);
		assert_eq!(hit.map(|i| graph.node(i).id.as_str()), Some("under"));
	}

	#[test]
	fn uses_inverse_transform() {
		let graph = overlapping();
		let view = ViewTransform::new(100.0, 100.0, 2.0, ScaleExtent::default());
		// World (-8, 0) sits at screen (84, 100).
		let hit = HitTester::default().node_at(&graph, &view, 84.0, 100.0);
		assert_eq!(hit.map(NodeIdx::index), Some(0));
	}

	#[test]
	fn miss_is_none() {
		let graph = overlapping();
		let view = ViewTransform::default();
		assert_eq!(HitTester::default().node_at(&graph, &view, 100.0, 100.0), None);
		assert_eq!(HitTester::default().node_at(&Graph::default(), &view, 0.0, 0.0), None);
	}

	#[test]
	fn slop_is_in_screen_pixels() {
		let graph = overlapping();
		let view = ViewTransform::new(0.0, 0.0, 0.5, ScaleExtent::default());
		// Node "over" reaches world x=15, i.e. screen 7.5; slop adds 4px.
		assert_eq!(HitTester::new(0.0).node_at(&graph, &view, 10.0, 0.0), None);
		assert!(HitTester::new(4.0).node_at(&graph, &view, 10.0, 0.0).is_some());
	}
}
