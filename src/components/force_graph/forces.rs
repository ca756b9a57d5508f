//! Force contributions for the layout simulation.
//!
//! Every force reads current positions and adds velocity deltas scaled by the
//! simulation's `alpha`; integration happens afterwards in
//! [`Simulation::tick`](super::simulation::Simulation::tick). The one exception
//! is [`Center`], which translates positions directly.
//!
//! Exactly coincident nodes get a deterministic sub-micron nudge ("jiggle")
//! from a seeded LCG instead of dividing by zero, so repeated runs over the
//! same initial layout produce the same result.

use super::graph::Graph;
use super::quadtree::QuadTree;

/// A force that can be registered on a simulation.
pub trait Force {
	/// Called when the graph is attached, before the first tick. Forces that
	/// cache per-node or per-link data (degrees, radii) compute it here.
	fn initialize(&mut self, _graph: &Graph) {}

	/// Accumulate velocity (or position) changes for one tick.
	fn apply(&mut self, graph: &mut Graph, alpha: f64);
}

/// Seeded linear congruential generator used for jiggle.
#[derive(Clone, Debug)]
pub struct Lcg(u32);

impl Default for Lcg {
	fn default() -> Self {
		Self(1)
	}
}

impl Lcg {
	/// Uniform value in `[0, 1)`.
	pub fn next_f64(&mut self) -> f64 {
		self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		self.0 as f64 / 4_294_967_296.0
	}

	/// Tiny symmetric offset used to break exact coincidence.
	pub fn jiggle(&mut self) -> f64 {
		(self.next_f64() - 0.5) * 1e-6
	}
}

/// Spring pulling the endpoints of every link toward a rest distance.
///
/// The correction is split between the endpoints by degree (`bias`), so a hub
/// moves less than the leaf attached to it, and each link's stiffness is
/// `1 / min(degree)`.
#[derive(Clone, Debug)]
pub struct LinkForce {
	/// Rest length.
	pub distance: f64,
	/// Relaxation passes per tick.
	pub iterations: usize,
	strengths: Vec<f64>,
	bias: Vec<f64>,
	rng: Lcg,
}

impl LinkForce {
	/// Springs of rest length `distance`.
	pub fn new(distance: f64) -> Self {
		Self {
			distance,
			iterations: 1,
			strengths: Vec::new(),
			bias: Vec::new(),
			rng: Lcg::default(),
		}
	}
}

impl Force for LinkForce {
	fn initialize(&mut self, graph: &Graph) {
		let degrees = graph.degrees();
		(self.strengths, self.bias) = graph
			.links()
			.iter()
			.map(|link| {
				let (s, t) = (
					degrees[link.source.index()] as f64,
					degrees[link.target.index()] as f64,
				);
				(1.0 / s.min(t).max(1.0), s / (s + t))
			})
			.unzip();
	}

	fn apply(&mut self, graph: &mut Graph, alpha: f64) {
		let (nodes, links) = graph.parts_mut();
		for _ in 0..self.iterations {
			for (i, link) in links.iter().enumerate() {
				let (s, t) = (link.source.index(), link.target.index());
				if s == t {
					continue;
				}
				let (src, tgt) = (&nodes[s], &nodes[t]);
				let mut x = tgt.x + tgt.vx - src.x - src.vx;
				let mut y = tgt.y + tgt.vy - src.y - src.vy;
				if x == 0.0 {
					x = self.rng.jiggle();
				}
				if y == 0.0 {
					y = self.rng.jiggle();
				}
				let mut l = (x * x + y * y).sqrt();
				l = (l - self.distance) / l * alpha * self.strengths[i];
				x *= l;
				y *= l;

				let b = self.bias[i];
				nodes[t].vx -= x * b;
				nodes[t].vy -= y * b;
				nodes[s].vx += x * (1.0 - b);
				nodes[s].vy += y * (1.0 - b);
			}
		}
	}
}

/// Pairwise charge between all nodes, negative strength repels.
///
/// Distances are clamped below at `distance_min` (which keeps coincident
/// nodes finite) and pairs further apart than `distance_max` are ignored.
/// Above `barnes_hut_threshold` nodes, far-away groups are approximated by
/// their quadtree cell when `cell_size / distance < theta`.
#[derive(Clone, Debug)]
pub struct ManyBody {
	/// Negative repels, positive attracts.
	pub strength: f64,
	distance_min2: f64,
	distance_max2: f64,
	theta2: f64,
	/// Node count above which the quadtree approximation is used.
	pub barnes_hut_threshold: usize,
	rng: Lcg,
}

impl ManyBody {
	/// Charge of `strength` on every node.
	pub fn new(strength: f64) -> Self {
		Self {
			strength,
			distance_min2: 1.0,
			distance_max2: f64::INFINITY,
			theta2: 0.81,
			barnes_hut_threshold: 200,
			rng: Lcg::default(),
		}
	}

	/// Clamp pair distances below `min` and ignore pairs beyond `max`.
	pub fn distance_range(mut self, min: f64, max: f64) -> Self {
		self.distance_min2 = min * min;
		self.distance_max2 = max * max;
		self
	}

	/// Barnes-Hut opening criterion.
	pub fn theta(mut self, theta: f64) -> Self {
		self.theta2 = theta * theta;
		self
	}

	/// Switch to Barnes-Hut above `nodes` nodes.
	pub fn threshold(mut self, nodes: usize) -> Self {
		self.barnes_hut_threshold = nodes;
		self
	}

	/// Velocity change on a node from a point charge at offset `(x, y)`.
	fn pull(&mut self, mut x: f64, mut y: f64, strength: f64, alpha: f64) -> (f64, f64) {
		if x == 0.0 {
			x = self.rng.jiggle();
		}
		if y == 0.0 {
			y = self.rng.jiggle();
		}
		let mut l = x * x + y * y;
		if l >= self.distance_max2 {
			return (0.0, 0.0);
		}
		if l < self.distance_min2 {
			l = (self.distance_min2 * l).sqrt();
		}
		let w = strength * alpha / l;
		(x * w, y * w)
	}

	fn apply_exact(&mut self, graph: &mut Graph, positions: &[(f64, f64)], alpha: f64) {
		for (i, node) in graph.nodes_mut().iter_mut().enumerate() {
			let (xi, yi) = positions[i];
			for (j, &(xj, yj)) in positions.iter().enumerate() {
				if i == j {
					continue;
				}
				let (dvx, dvy) = self.pull(xj - xi, yj - yi, self.strength, alpha);
				node.vx += dvx;
				node.vy += dvy;
			}
		}
	}

	fn apply_barnes_hut(&mut self, graph: &mut Graph, positions: &[(f64, f64)], alpha: f64) {
		let mut tree = QuadTree::new(positions);
		if tree.is_empty() {
			return;
		}
		tree.accumulate_strength(&vec![self.strength; positions.len()]);

		for (i, node) in graph.nodes_mut().iter_mut().enumerate() {
			let (xi, yi) = positions[i];
			let (mut vx, mut vy) = (0.0, 0.0);
			tree.visit(|cell| {
				if cell.strength == 0.0 {
					return true;
				}
				let (x, y) = (cell.cx - xi, cell.cy - yi);
				let l = x * x + y * y;

				// Far enough: treat the whole cell as one charge.
				if cell.size * cell.size / self.theta2 < l {
					let (dvx, dvy) = self.pull(x, y, cell.strength, alpha);
					vx += dvx;
					vy += dvy;
					return true;
				}
				let Some(points) = cell.points else {
					return false;
				};
				for &j in points.iter().filter(|&&j| j != i) {
					let (xj, yj) = positions[j];
					let (dvx, dvy) = self.pull(xj - xi, yj - yi, self.strength, alpha);
					vx += dvx;
					vy += dvy;
				}
				true
			});
			node.vx += vx;
			node.vy += vy;
		}
	}
}

impl Force for ManyBody {
	fn apply(&mut self, graph: &mut Graph, alpha: f64) {
		let positions: Vec<(f64, f64)> = graph.nodes().iter().map(|n| (n.x, n.y)).collect();
		if positions.len() > self.barnes_hut_threshold {
			self.apply_barnes_hut(graph, &positions, alpha);
		} else {
			self.apply_exact(graph, &positions, alpha);
		}
	}
}

/// How collision radii are chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CollideRadius {
	/// Same radius for every node.
	Uniform(f64),
	/// Each node's own radius plus padding.
	NodeRadius { padding: f64 },
}

/// Positional relaxation that pushes overlapping circles apart.
///
/// Works on predicted positions `x + vx`, runs `iterations` relaxation passes
/// per tick, and splits each correction by the squared radii of the pair.
#[derive(Clone, Debug)]
pub struct Collide {
	/// Per-node collision radius.
	pub radius: CollideRadius,
	/// Fraction of each overlap resolved per pass.
	pub strength: f64,
	/// Relaxation passes per tick.
	pub iterations: usize,
	radii: Vec<f64>,
	rng: Lcg,
}

impl Collide {
	/// Full-strength collision, one pass per tick.
	pub fn new(radius: CollideRadius) -> Self {
		Self {
			radius,
			strength: 1.0,
			iterations: 1,
			radii: Vec::new(),
			rng: Lcg::default(),
		}
	}

	/// Relaxation passes per tick, at least one.
	pub fn iterations(mut self, iterations: usize) -> Self {
		self.iterations = iterations.max(1);
		self
	}
}

impl Force for Collide {
	fn initialize(&mut self, graph: &Graph) {
		self.radii = graph
			.nodes()
			.iter()
			.map(|node| match self.radius {
				CollideRadius::Uniform(r) => r,
				CollideRadius::NodeRadius { padding } => node.radius + padding,
			})
			.collect();
	}

	fn apply(&mut self, graph: &mut Graph, _alpha: f64) {
		let nodes = graph.nodes_mut();
		for _ in 0..self.iterations {
			let predicted: Vec<(f64, f64)> =
				nodes.iter().map(|n| (n.x + n.vx, n.y + n.vy)).collect();
			let mut tree = QuadTree::new(&predicted);
			if tree.is_empty() {
				break;
			}
			tree.accumulate_radius(&self.radii);

			for i in 0..nodes.len() {
				let ri = self.radii[i];
				let ri2 = ri * ri;
				let (xi, yi) = (nodes[i].x + nodes[i].vx, nodes[i].y + nodes[i].vy);

				tree.visit(|cell| {
					let Some(points) = cell.points else {
						let r = ri + cell.radius;
						return cell.x0 > xi + r
							|| cell.x1() < xi - r
							|| cell.y0 > yi + r
							|| cell.y1() < yi - r;
					};
					for &j in points.iter().filter(|&&j| j > i) {
						let rj = self.radii[j];
						let r = ri + rj;
						let mut x = xi - nodes[j].x - nodes[j].vx;
						let mut y = yi - nodes[j].y - nodes[j].vy;
						let mut l = x * x + y * y;
						if l >= r * r {
							continue;
						}
						if x == 0.0 {
							x = self.rng.jiggle();
							l += x * x;
						}
						if y == 0.0 {
							y = self.rng.jiggle();
							l += y * y;
						}
						let d = l.sqrt();
						let k = (r - d) / d * self.strength;
						x *= k;
						y *= k;
						let rj2 = rj * rj;
						let share = rj2 / (ri2 + rj2);
						nodes[i].vx += x * share;
						nodes[i].vy += y * share;
						nodes[j].vx -= x * (1.0 - share);
						nodes[j].vy -= y * (1.0 - share);
					}
					true
				});
			}
		}
	}
}

/// Translates all nodes so their centroid sits on `(x, y)`.
#[derive(Clone, Debug)]
pub struct Center {
	/// Target x.
	pub x: f64,
	/// Target y.
	pub y: f64,
	/// `1` recenters fully every tick.
	pub strength: f64,
}

impl Center {
	/// Center on `(x, y)` at full strength.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y, strength: 1.0 }
	}
}

impl Force for Center {
	fn apply(&mut self, graph: &mut Graph, _alpha: f64) {
		let nodes = graph.nodes_mut();
		if nodes.is_empty() {
			return;
		}
		let n = nodes.len() as f64;
		let (sx, sy) = nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let dx = (sx / n - self.x) * self.strength;
		let dy = (sy / n - self.y) * self.strength;
		for node in nodes {
			node.x -= dx;
			node.y -= dy;
		}
	}
}

/// Which coordinate a [`Position`] force acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
	/// Horizontal.
	X,
	/// Vertical.
	Y,
}

/// Weak pull of one axis toward a target coordinate.
#[derive(Clone, Debug)]
pub struct Position {
	/// Coordinate the force acts on.
	pub axis: Axis,
	/// Coordinate to pull toward.
	pub target: f64,
	/// Fraction of the gap closed per tick, scaled by alpha.
	pub strength: f64,
}

impl Position {
	/// Pull toward `x = target`.
	pub fn x(target: f64, strength: f64) -> Self {
		Self {
			axis: Axis::X,
			target,
			strength,
		}
	}

	/// Pull toward `y = target`.
	pub fn y(target: f64, strength: f64) -> Self {
		Self {
			axis: Axis::Y,
			target,
			strength,
		}
	}
}

impl Force for Position {
	fn apply(&mut self, graph: &mut Graph, alpha: f64) {
		let k = self.strength * alpha;
		for node in graph.nodes_mut() {
			match self.axis {
				Axis::X => node.vx += (self.target - node.x) * k,
				Axis::Y => node.vy += (self.target - node.y) * k,
			}
		}
	}
}
