//! Neighbor lookup and hover focus.

use std::collections::HashSet;

use super::graph::{Graph, Link, NodeIdx};

/// Symmetric "are these two nodes linked" relation, built once per graph.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyIndex {
	pairs: HashSet<(NodeIdx, NodeIdx)>,
}

impl AdjacencyIndex {
	/// Index every link of `graph`; self-loops are skipped.
	pub fn new(graph: &Graph) -> Self {
		let pairs = graph
			.links()
			.iter()
			.filter(|link| link.source != link.target)
			.flat_map(|link| [(link.source, link.target), (link.target, link.source)])
			.collect();
		Self { pairs }
	}

	/// A node is never adjacent to itself.
	pub fn is_adjacent(&self, a: NodeIdx, b: NodeIdx) -> bool {
		self.pairs.contains(&(a, b))
	}

	/// Number of distinct undirected neighbor pairs.
	pub fn len(&self) -> usize {
		self.pairs.len() / 2
	}

	/// True for a graph without links between distinct nodes.
	pub fn is_empty(&self) -> bool {
		self.pairs.is_empty()
	}
}

/// Hover focus: the hovered node and its neighbors stay opaque, everything
/// else is dimmed.
#[derive(Clone, Debug)]
pub struct Focus {
	hovered: Option<NodeIdx>,
	dim_opacity: f64,
}

impl Focus {
	/// Focus with nothing hovered; `dim_opacity` is clamped to `0..=1`.
	pub fn new(dim_opacity: f64) -> Self {
		Self {
			hovered: None,
			dim_opacity: dim_opacity.clamp(0.0, 1.0),
		}
	}

	/// Node under the pointer, if any.
	pub fn hovered(&self) -> Option<NodeIdx> {
		self.hovered
	}

	/// Returns `true` when the hovered node changed.
	pub fn set_hover(&mut self, node: Option<NodeIdx>) -> bool {
		let changed = self.hovered != node;
		self.hovered = node;
		changed
	}

	/// Drop the hovered node. Returns `true` if there was one.
	pub fn clear(&mut self) -> bool {
		self.set_hover(None)
	}

	/// Opaque for the hovered node and its neighbors, `dim_opacity` otherwise.
	pub fn node_opacity(&self, adjacency: &AdjacencyIndex, idx: NodeIdx) -> f64 {
		match self.hovered {
			None => 1.0,
			Some(h) if h == idx || adjacency.is_adjacent(h, idx) => 1.0,
			Some(_) => self.dim_opacity,
		}
	}

	/// Opaque for links touching the hovered node, `dim_opacity` otherwise.
	pub fn link_opacity(&self, link: &Link) -> f64 {
		match self.hovered {
			None => 1.0,
			Some(h) if h == link.source || h == link.target => 1.0,
			Some(_) => self.dim_opacity,
		}
	}
}

impl Default for Focus {
	fn default() -> Self {
		Self::new(0.15)
	}
}
