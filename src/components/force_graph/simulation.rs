//! Force simulation: owns the graph and advances it one tick per frame.
//!
//! Cooling follows the usual simulated-annealing schedule. `alpha` starts at
//! 1 and moves toward `alpha_target` by `alpha_decay` each tick; once it drops
//! below `alpha_min` the simulation stops scheduling itself. Dragging raises
//! `alpha_target` so the layout keeps reacting while a node is held.

use std::f64::consts::PI;

use log::{debug, info};

use super::config::{ALPHA_MIN, ChartConfig, default_alpha_decay};
use super::forces::{Center, Collide, CollideRadius, Force, LinkForce, ManyBody, Position};
use super::graph::{Graph, NodeIdx};

/// Spacing of the seeded layout (phyllotaxis spiral).
const INITIAL_RADIUS: f64 = 10.0;

/// Emitted after every tick with the updated graph.
#[derive(Clone, Copy, Debug)]
pub struct TickEvent<'a> {
	/// Graph after the tick.
	pub graph: &'a Graph,
	/// Alpha after the tick.
	pub alpha: f64,
	/// Ticks run since the graph was attached.
	pub tick: u64,
	/// This tick took alpha below `alpha_min`; no further ticks are scheduled.
	pub converged: bool,
}

/// Iterative layout over one graph.
pub struct Simulation {
	graph: Graph,
	forces: Vec<(String, Box<dyn Force>)>,
	alpha: f64,
	alpha_min: f64,
	alpha_decay: f64,
	alpha_target: f64,
	velocity_decay: f64,
	running: bool,
	ticks: u64,
}

impl std::fmt::Debug for Simulation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Simulation")
			.field("nodes", &self.graph.len())
			.field("forces", &self.forces.iter().map(|(n, _)| n).collect::<Vec<_>>())
			.field("alpha", &self.alpha)
			.field("alpha_target", &self.alpha_target)
			.field("running", &self.running)
			.finish()
	}
}

impl Simulation {
	/// A simulation without forces. Unplaced nodes are seeded on a spiral
	/// around the origin.
	pub fn new(graph: Graph) -> Self {
		Self::seeded(graph, (0.0, 0.0))
	}

	fn seeded(graph: Graph, (cx, cy): (f64, f64)) -> Self {
		let mut sim = Self {
			graph,
			forces: Vec::new(),
			alpha: 1.0,
			alpha_min: ALPHA_MIN,
			alpha_decay: default_alpha_decay(),
			alpha_target: 0.0,
			velocity_decay: 0.6,
			running: false,
			ticks: 0,
		};
		sim.seed_positions(cx, cy);
		sim.running = !sim.graph.is_empty();
		sim
	}

	/// The chart's standard force set: link, charge, collide, center, x, y.
	pub fn from_config(graph: Graph, config: &ChartConfig, center: (f64, f64)) -> Self {
		let (cx, cy) = center;
		let mut sim = Self::seeded(graph, center);
		sim.alpha_min = config.alpha_min;
		sim.alpha_decay = config.alpha_decay;
		sim.velocity_decay = config.velocity_decay;

		sim.with_force("link", LinkForce::new(config.link_distance))
			.with_force(
				"charge",
				ManyBody::new(config.charge_strength)
					.distance_range(config.distance_min, config.distance_max)
					.theta(config.theta)
					.threshold(config.barnes_hut_threshold),
			)
			.with_force(
				"collide",
				Collide::new(CollideRadius::Uniform(config.collision_radius()))
					.iterations(config.collide_iterations),
			)
			.with_force("center", Center::new(cx, cy))
			.with_force("x", Position::x(cx, config.x_strength))
			.with_force("y", Position::y(cy, config.y_strength))
	}

	/// Register (or replace) a named force.
	pub fn with_force(mut self, name: &str, force: impl Force + 'static) -> Self {
		self.set_force(name, Box::new(force));
		self
	}

	/// Boxed form of [`Simulation::with_force`].
	pub fn set_force(&mut self, name: &str, mut force: Box<dyn Force>) {
		force.initialize(&self.graph);
		match self.forces.iter_mut().find(|(n, _)| n == name) {
			Some((_, slot)) => *slot = force,
			None => self.forces.push((name.to_string(), force)),
		}
	}

	/// Unregister a force, handing it back.
	pub fn remove_force(&mut self, name: &str) -> Option<Box<dyn Force>> {
		let pos = self.forces.iter().position(|(n, _)| n == name)?;
		Some(self.forces.remove(pos).1)
	}

	fn seed_positions(&mut self, cx: f64, cy: f64) {
		let angle_step = PI * (3.0 - 5f64.sqrt());
		for (i, node) in self.graph.nodes_mut().iter_mut().enumerate() {
			if let (Some(fx), Some(fy)) = (node.fx, node.fy) {
				node.x = fx;
				node.y = fy;
			}
			if !node.is_placed() {
				let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
				let angle = i as f64 * angle_step;
				node.x = cx + radius * angle.cos();
				node.y = cy + radius * angle.sin();
			}
			if !node.vx.is_finite() || !node.vy.is_finite() {
				node.vx = 0.0;
				node.vy = 0.0;
			}
		}
	}

	/// Advance one tick if the simulation is running.
	pub fn step(&mut self) -> Option<TickEvent<'_>> {
		if !self.running || self.graph.is_empty() {
			return None;
		}
		self.tick();
		let converged = self.alpha < self.alpha_min;
		if converged {
			self.running = false;
			info!(
				"medbrain-graph: layout converged after {} ticks ({} nodes)",
				self.ticks,
				self.graph.len()
			);
		}
		Some(TickEvent {
			graph: &self.graph,
			alpha: self.alpha,
			tick: self.ticks,
			converged,
		})
	}

	/// Run forces, integrate, then cool. Runs regardless of the running flag.
	pub fn tick(&mut self) {
		if self.graph.is_empty() {
			return;
		}
		for node in self.graph.nodes_mut() {
			if let Some(fx) = node.fx {
				node.x = fx;
				node.vx = 0.0;
			}
			if let Some(fy) = node.fy {
				node.y = fy;
				node.vy = 0.0;
			}
		}

		for (_, force) in &mut self.forces {
			force.apply(&mut self.graph, self.alpha);
		}

		let decay = self.velocity_decay;
		for node in self.graph.nodes_mut() {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= decay;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= decay;
					node.y += node.vy;
				}
			}
		}

		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
		self.ticks += 1;
	}

	/// Resume automatic ticking.
	pub fn restart(&mut self) {
		if !self.running && !self.graph.is_empty() {
			debug!("medbrain-graph: simulation restarted at alpha {:.4}", self.alpha);
		}
		self.running = !self.graph.is_empty();
	}

	/// Halt automatic ticking; [`Simulation::restart`] resumes.
	pub fn stop(&mut self) {
		self.running = false;
	}

	/// Whether frames still tick.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Current cooling parameter.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Set alpha, clamped to `0..=1`.
	pub fn set_alpha(&mut self, alpha: f64) {
		self.alpha = alpha.clamp(0.0, 1.0);
	}

	/// Alpha the layout cools toward.
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Set the cooling target, clamped to `0..=1`. Drags raise it.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target.clamp(0.0, 1.0);
	}

	/// Alpha below which ticking stops.
	pub fn alpha_min(&self) -> f64 {
		self.alpha_min
	}

	/// Ticks run since the graph was attached.
	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	/// The graph being laid out.
	pub fn graph(&self) -> &Graph {
		&self.graph
	}

	/// Consume the simulation, handing the graph back.
	pub fn into_graph(self) -> Graph {
		self.graph
	}

	/// In-place display update for a graph with identical topology.
	pub fn restyle(&mut self, fresh: &Graph) {
		self.graph.restyle_from(fresh);
		for (_, force) in &mut self.forces {
			force.initialize(&self.graph);
		}
	}

	/// Fix a node at `(x, y)`.
	pub fn pin(&mut self, idx: NodeIdx, x: f64, y: f64) {
		self.graph.node_mut(idx).pin(x, y);
	}

	/// Clear the pin unless the node is locked. Returns whether it was cleared.
	pub fn unpin(&mut self, idx: NodeIdx) -> bool {
		let node = self.graph.node_mut(idx);
		if node.locked {
			return false;
		}
		node.unpin();
		true
	}

	/// Pin permanently at the current position (or existing pin).
	pub fn lock(&mut self, idx: NodeIdx) {
		let node = self.graph.node_mut(idx);
		let (x, y) = (node.fx.unwrap_or(node.x), node.fy.unwrap_or(node.y));
		node.pin(x, y);
		node.locked = true;
	}

	/// Release a locked node.
	pub fn unlock(&mut self, idx: NodeIdx) {
		let node = self.graph.node_mut(idx);
		node.locked = false;
		node.unpin();
	}

	/// Closest node to `(x, y)` within `radius` (world units).
	pub fn find(&self, x: f64, y: f64, radius: f64) -> Option<NodeIdx> {
		let mut best = radius * radius;
		let mut found = None;
		for idx in self.graph.indices() {
			let node = self.graph.node(idx);
			let d2 = (node.x - x).powi(2) + (node.y - y).powi(2);
			if d2 < best {
				best = d2;
				found = Some(idx);
			}
		}
		found
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::graph::{LinkSpec, Node};

	fn chain() -> Graph {
		Graph::new(
			vec![Node::new("A", "Alpha"), Node::new("B", "Beta"), Node::new("C", "Gamma")],
			vec![LinkSpec::new("ab", "A", "B"), LinkSpec::new("bc", "B", "C")],
		)
		.unwrap()
	}

	#[test]
	fn empty_graph_never_ticks() {
		let mut sim = Simulation::from_config(Graph::default(), &ChartConfig::default(), (0.0, 0.0));
		assert!(!sim.is_running());
		assert!(sim.step().is_none());
		sim.restart();
		assert!(sim.step().is_none());
	}

	#[test]
	fn seeds_unplaced_nodes_around_center() {
		let sim = Simulation::from_config(chain(), &ChartConfig::default(), (400.0, 300.0));
		for node in sim.graph().nodes() {
			assert!(node.is_placed());
			assert!((node.x - 400.0).abs() < 50.0 && (node.y - 300.0).abs() < 50.0);
		}
	}

	#[test]
	fn alpha_decays_until_convergence() {
		let mut sim = Simulation::from_config(chain(), &ChartConfig::default(), (0.0, 0.0));
		let mut previous = sim.alpha();
		let mut ticks = 0;
		while let Some(event) = sim.step() {
			assert!(event.alpha < previous);
			previous = event.alpha;
			ticks += 1;
			assert!(ticks <= 400, "did not converge");
		}
		assert!(sim.alpha() < sim.alpha_min());
		assert!((290..=310).contains(&ticks));
		assert!(!sim.is_running());
	}

	#[test]
	fn pinned_node_stays_put() {
		let mut sim = Simulation::from_config(chain(), &ChartConfig::default(), (0.0, 0.0));
		let b = sim.graph().find_id("B").unwrap();
		sim.pin(b, 42.0, -7.0);
		for _ in 0..20 {
			sim.tick();
			assert_eq!(sim.graph().node(b).position(), (42.0, -7.0));
		}
		assert!(sim.unpin(b));
		assert!(!sim.graph().node(b).is_pinned());
	}

	#[test]
	fn locked_node_survives_release() {
		let mut sim = Simulation::new(chain());
		let a = sim.graph().find_id("A").unwrap();
		sim.lock(a);
		assert!(!sim.unpin(a));
		assert!(sim.graph().node(a).is_pinned());
		sim.unlock(a);
		assert!(!sim.graph().node(a).is_pinned());
	}

	#[test]
	fn alpha_target_reheats_a_converged_layout() {
		let mut sim = Simulation::new(chain());
		sim.set_alpha(0.0005);
		sim.set_alpha_target(0.3);
		sim.restart();
		let event = sim.step().unwrap();
		assert!(event.alpha > 0.0005);
		assert!(!event.converged);
	}

	#[test]
	fn find_returns_nearest_within_radius() {
		let graph = Graph::new(
			vec![
				Node::new("a", "").with_position(0.0, 0.0),
				Node::new("b", "").with_position(10.0, 0.0),
			],
			vec![],
		)
		.unwrap();
		let sim = Simulation::new(graph);
		assert_eq!(sim.find(8.0, 0.0, 5.0).map(NodeIdx::index), Some(1));
		assert_eq!(sim.find(50.0, 0.0, 5.0), None);
	}

	#[test]
	fn forces_can_be_replaced_and_removed() {
		let mut sim = Simulation::new(chain()).with_force("link", LinkForce::new(30.0));
		sim.set_force("link", Box::new(LinkForce::new(60.0)));
		assert!(sim.remove_force("link").is_some());
		assert!(sim.remove_force("link").is_none());
	}
}
