//! Graph model: an arena of nodes plus links that refer to them by handle.
//!
//! Links are resolved from raw node ids exactly once, when the [`Graph`] is
//! built. After that every force, the hit-tester and the renderer work with
//! [`NodeIdx`] handles, so there is no shared mutable aliasing between links
//! and the nodes they connect.

use std::collections::HashMap;

use super::error::GraphIntegrityError;
use super::style::NodeStyle;

/// Handle to a node inside one [`Graph`]. Only meaningful for the graph that
/// produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(usize);

impl NodeIdx {
	/// Position of the node in insertion (and paint) order.
	pub fn index(self) -> usize {
		self.0
	}
}

/// A node with its simulation fields.
#[derive(Clone, Debug)]
pub struct Node {
	/// Unique key from the input document.
	pub id: String,
	/// Display text, truncated when drawn.
	pub label: String,
	/// Category key (`type` in the input document).
	pub group: String,
	/// Colors resolved from `group`.
	pub style: NodeStyle,
	/// Radius in world units, strictly positive.
	pub radius: f64,
	/// Position. NaN until the simulation seeds an initial layout.
	pub x: f64,
	/// Vertical position, same convention as `x`.
	pub y: f64,
	/// Horizontal velocity, damped every tick.
	pub vx: f64,
	/// Vertical velocity.
	pub vy: f64,
	/// Fixed x; `None` leaves the axis free.
	pub fx: Option<f64>,
	/// Fixed y, see `fx`.
	pub fy: Option<f64>,
	/// Locked nodes keep their pin after a drag ends.
	pub locked: bool,
}

impl Node {
	/// Unplaced node with the default radius and style.
	pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			group: String::new(),
			style: NodeStyle::default(),
			radius: 20.0,
			x: f64::NAN,
			y: f64::NAN,
			vx: 0.0,
			vy: 0.0,
			fx: None,
			fy: None,
			locked: false,
		}
	}

	/// Set the category key.
	pub fn with_group(mut self, group: impl Into<String>) -> Self {
		self.group = group.into();
		self
	}

	/// Set the resolved colors.
	pub fn with_style(mut self, style: NodeStyle) -> Self {
		self.style = style;
		self
	}

	/// Set the radius in world units.
	pub fn with_radius(mut self, radius: f64) -> Self {
		self.radius = radius;
		self
	}

	/// Place the node instead of leaving it to the seeded layout.
	pub fn with_position(mut self, x: f64, y: f64) -> Self {
		self.x = x;
		self.y = y;
		self
	}

	/// Current `(x, y)`.
	pub fn position(&self) -> (f64, f64) {
		(self.x, self.y)
	}

	/// Whether both coordinates are finite.
	pub fn is_placed(&self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}

	/// Whether either axis is fixed.
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}

	/// Fix the node at `(x, y)` until [`Node::unpin`] is called.
	pub fn pin(&mut self, x: f64, y: f64) {
		self.fx = Some(x);
		self.fy = Some(y);
	}

	/// Release both axes.
	pub fn unpin(&mut self) {
		self.fx = None;
		self.fy = None;
	}
}

/// An edge as it arrives from the input adapter, endpoints still raw ids.
#[derive(Clone, Debug, Default)]
pub struct LinkSpec {
	/// Unique key of the edge.
	pub id: String,
	/// Source node id.
	pub from: String,
	/// Target node id.
	pub to: String,
	/// Display label.
	pub label: String,
	/// Relation key from the input document.
	pub kind: String,
}

impl LinkSpec {
	/// Unlabeled link from `from` to `to`.
	pub fn new(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			from: from.into(),
			to: to.into(),
			..Self::default()
		}
	}

	/// Set the display label.
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = label.into();
		self
	}

	/// Set the relation key.
	pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
		self.kind = kind.into();
		self
	}
}

/// A resolved, directed link between two nodes of the same graph.
#[derive(Clone, Debug)]
pub struct Link {
	/// Unique key of the edge.
	pub id: String,
	/// Tail of the arrow.
	pub source: NodeIdx,
	/// Head of the arrow.
	pub target: NodeIdx,
	/// Display label.
	pub label: String,
	/// Relation key from the input document.
	pub kind: String,
}

/// Nodes and links of one data load.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	nodes: Vec<Node>,
	links: Vec<Link>,
	index: HashMap<String, NodeIdx>,
}

impl Graph {
	/// Build a graph, resolving every link endpoint against the node ids.
	pub fn new(nodes: Vec<Node>, links: Vec<LinkSpec>) -> Result<Self, GraphIntegrityError> {
		let mut index = HashMap::with_capacity(nodes.len());
		for (i, node) in nodes.iter().enumerate() {
			if !(node.radius > 0.0 && node.radius.is_finite()) {
				return Err(GraphIntegrityError::InvalidRadius {
					id: node.id.clone(),
					radius: node.radius,
				});
			}
			if index.insert(node.id.clone(), NodeIdx(i)).is_some() {
				return Err(GraphIntegrityError::DuplicateNode(node.id.clone()));
			}
		}

		let resolve = |link: &LinkSpec, id: &str| {
			index
				.get(id)
				.copied()
				.ok_or_else(|| GraphIntegrityError::UnknownEndpoint {
					link: link.id.clone(),
					node: id.to_string(),
				})
		};

		let links = links
			.iter()
			.map(|spec| {
				Ok(Link {
					source: resolve(spec, &spec.from)?,
					target: resolve(spec, &spec.to)?,
					id: spec.id.clone(),
					label: spec.label.clone(),
					kind: spec.kind.clone(),
				})
			})
			.collect::<Result<Vec<_>, GraphIntegrityError>>()?;

		Ok(Self {
			nodes,
			links,
			index,
		})
	}

	/// Nodes in insertion order, which is also paint order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Mutable nodes, for forces.
	pub fn nodes_mut(&mut self) -> &mut [Node] {
		&mut self.nodes
	}

	/// Resolved links in input order.
	pub fn links(&self) -> &[Link] {
		&self.links
	}

	/// Mutable nodes alongside read-only links, for forces that need both.
	pub fn parts_mut(&mut self) -> (&mut [Node], &[Link]) {
		(&mut self.nodes, &self.links)
	}

	/// Node behind `idx`. Panics on a handle from another graph.
	pub fn node(&self, idx: NodeIdx) -> &Node {
		&self.nodes[idx.0]
	}

	/// Mutable node behind `idx`.
	pub fn node_mut(&mut self, idx: NodeIdx) -> &mut Node {
		&mut self.nodes[idx.0]
	}

	/// Handle of the node with `id`.
	pub fn find_id(&self, id: &str) -> Option<NodeIdx> {
		self.index.get(id).copied()
	}

	/// Handles in insertion order.
	pub fn indices(&self) -> impl DoubleEndedIterator<Item = NodeIdx> + use<> {
		(0..self.nodes.len()).map(NodeIdx)
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// True when there are no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Number of links incident to each node, self-loops counted twice.
	pub fn degrees(&self) -> Vec<usize> {
		let mut degrees = vec![0; self.nodes.len()];
		for link in &self.links {
			degrees[link.source.0] += 1;
			degrees[link.target.0] += 1;
		}
		degrees
	}

	/// Same node ids in the same order and the same link endpoints.
	pub fn same_topology(&self, other: &Graph) -> bool {
		self.nodes.len() == other.nodes.len()
			&& self.links.len() == other.links.len()
			&& self.nodes.iter().zip(&other.nodes).all(|(a, b)| a.id == b.id)
			&& self
				.links
				.iter()
				.zip(&other.links)
				.all(|(a, b)| a.source == b.source && a.target == b.target)
	}

	/// Copy display fields (label, group, style, radius, link labels) from a
	/// graph with the same topology, keeping positions and pins.
	pub fn restyle_from(&mut self, other: &Graph) {
		for (node, fresh) in self.nodes.iter_mut().zip(&other.nodes) {
			node.label.clone_from(&fresh.label);
			node.group.clone_from(&fresh.group);
			node.style = fresh.style.clone();
			node.radius = fresh.radius;
		}
		for (link, fresh) in self.links.iter_mut().zip(&other.links) {
			link.id.clone_from(&fresh.id);
			link.label.clone_from(&fresh.label);
			link.kind.clone_from(&fresh.kind);
		}
	}
}
