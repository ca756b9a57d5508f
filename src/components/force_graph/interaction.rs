//! Pointer gestures: node drags, background pan, wheel and pinch zoom.
//!
//! Every active pointer owns one gesture, so two fingers can drag two nodes
//! at once. Cooling is reheated by the first drag and relaxed by the last.

use std::collections::HashMap;

use log::debug;

use super::adjacency::Focus;
use super::config::ChartConfig;
use super::graph::{Graph, NodeIdx};
use super::hit::HitTester;
use super::simulation::Simulation;
use super::transform::ViewTransform;

/// A pointer sample in canvas-relative screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
	/// Browser pointer id; each finger or mouse has its own.
	pub pointer_id: i32,
	/// Horizontal position in canvas pixels.
	pub x: f64,
	/// Vertical position in canvas pixels.
	pub y: f64,
}

impl PointerEvent {
	/// Sample for `pointer_id` at `(x, y)`.
	pub fn new(pointer_id: i32, x: f64, y: f64) -> Self {
		Self { pointer_id, x, y }
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Gesture {
	Drag { node: NodeIdx },
	Pan { last: (f64, f64) },
}

/// What a handler did, so the caller knows whether to redraw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
	/// Nothing changed.
	Ignored,
	/// A pointer grabbed this node.
	DragStarted(NodeIdx),
	/// The grabbed node moved.
	Dragged(NodeIdx),
	/// The pointer released this node.
	DragEnded(NodeIdx),
	/// A pointer started panning the background.
	PanStarted,
	/// Translation or scale changed; only a redraw is needed.
	ViewChanged,
	/// A pan pointer was released.
	PanEnded,
	/// Hover focus moved to another node or to none.
	HoverChanged,
}

impl Outcome {
	/// Whether only the view transform changed.
	pub fn changes_view(self) -> bool {
		matches!(self, Self::ViewChanged)
	}
}

/// Drag / pan state machine keyed by pointer id.
#[derive(Clone, Debug)]
pub struct InteractionController {
	gestures: HashMap<i32, Gesture>,
	hit: HitTester,
	drag_alpha_target: f64,
	lock_on_release: bool,
}

impl Default for InteractionController {
	fn default() -> Self {
		Self::new(&ChartConfig::default())
	}
}

impl InteractionController {
	/// Idle controller using the drag and hit settings of `config`.
	pub fn new(config: &ChartConfig) -> Self {
		Self {
			gestures: HashMap::new(),
			hit: HitTester::new(config.hit_slop_px),
			drag_alpha_target: config.drag_alpha_target,
			lock_on_release: config.lock_on_release,
		}
	}

	/// Number of nodes currently held.
	pub fn active_drags(&self) -> usize {
		self.gestures
			.values()
			.filter(|g| matches!(g, Gesture::Drag { .. }))
			.count()
	}

	/// Whether any pointer holds a node.
	pub fn is_dragging(&self) -> bool {
		self.active_drags() > 0
	}

	/// Whether any pointer holds a drag or a pan.
	pub fn has_gestures(&self) -> bool {
		!self.gestures.is_empty()
	}

	/// Start a drag on the node under the pointer, or a pan on a miss.
	pub fn pointer_down(
		&mut self,
		event: PointerEvent,
		sim: &mut Simulation,
		view: &ViewTransform,
	) -> Outcome {
		if self.gestures.contains_key(&event.pointer_id) {
			return Outcome::Ignored;
		}
		let Some(node) = self.hit.node_at(sim.graph(), view, event.x, event.y) else {
			self.gestures
				.insert(event.pointer_id, Gesture::Pan { last: (event.x, event.y) });
			return Outcome::PanStarted;
		};

		// Held by another pointer already; let this one pan instead.
		if self.gestures.values().any(|g| *g == Gesture::Drag { node }) {
			self.gestures
				.insert(event.pointer_id, Gesture::Pan { last: (event.x, event.y) });
			return Outcome::PanStarted;
		}

		if !self.is_dragging() {
			sim.set_alpha_target(self.drag_alpha_target);
			sim.restart();
		}
		let (x, y) = sim.graph().node(node).position();
		sim.pin(node, x, y);
		self.gestures.insert(event.pointer_id, Gesture::Drag { node });
		debug!("medbrain-graph: drag start on {}", sim.graph().node(node).id);
		Outcome::DragStarted(node)
	}

	/// Continue the gesture owned by `event.pointer_id`.
	pub fn pointer_move(
		&mut self,
		event: PointerEvent,
		sim: &mut Simulation,
		view: &mut ViewTransform,
	) -> Outcome {
		match self.gestures.get(&event.pointer_id).copied() {
			Some(Gesture::Drag { node }) => {
				let (wx, wy) = view.invert(event.x, event.y);
				sim.pin(node, wx, wy);
				Outcome::Dragged(node)
			}
			Some(Gesture::Pan { last }) => {
				let anchor = self.other_pan(event.pointer_id);
				self.gestures
					.insert(event.pointer_id, Gesture::Pan { last: (event.x, event.y) });
				match anchor {
					// Two fingers on the background: pinch around the one that
					// did not move.
					Some(fixed) => {
						let before = distance(last, fixed);
						let after = distance((event.x, event.y), fixed);
						if before > f64::EPSILON && after > f64::EPSILON {
							view.zoom_at(after / before, fixed);
						}
					}
					None => view.pan_by(event.x - last.0, event.y - last.1),
				}
				Outcome::ViewChanged
			}
			None => Outcome::Ignored,
		}
	}

	/// End the gesture owned by `event.pointer_id`.
	pub fn pointer_up(&mut self, event: PointerEvent, sim: &mut Simulation) -> Outcome {
		match self.gestures.remove(&event.pointer_id) {
			Some(Gesture::Drag { node }) => {
				self.finish_drag(node, sim);
				Outcome::DragEnded(node)
			}
			Some(Gesture::Pan { .. }) => Outcome::PanEnded,
			None => Outcome::Ignored,
		}
	}

	fn finish_drag(&mut self, node: NodeIdx, sim: &mut Simulation) {
		if self.lock_on_release {
			sim.lock(node);
		} else {
			sim.unpin(node);
		}
		if !self.is_dragging() {
			sim.set_alpha_target(0.0);
		}
		debug!("medbrain-graph: drag end on {}", sim.graph().node(node).id);
	}

	/// Wheel zoom around the pointer.
	pub fn wheel(&self, view: &mut ViewTransform, x: f64, y: f64, delta_y: f64) -> Outcome {
		let before = view.scale();
		view.zoom_at(ViewTransform::wheel_factor(delta_y), (x, y));
		if view.scale() == before {
			return Outcome::Ignored;
		}
		debug!("medbrain-graph: zoom {:.3} -> {:.3}", before, view.scale());
		Outcome::ViewChanged
	}

	/// Update hover focus for a pointer that is not dragging anything.
	pub fn hover(
		&self,
		event: PointerEvent,
		graph: &Graph,
		view: &ViewTransform,
		focus: &mut Focus,
	) -> Outcome {
		if self.is_dragging() || self.gestures.contains_key(&event.pointer_id) {
			return Outcome::Ignored;
		}
		let under = self.hit.node_at(graph, view, event.x, event.y);
		if focus.set_hover(under) {
			Outcome::HoverChanged
		} else {
			Outcome::Ignored
		}
	}

	fn other_pan(&self, pointer_id: i32) -> Option<(f64, f64)> {
		self.gestures.iter().find_map(|(&id, g)| match g {
			Gesture::Pan { last } if id != pointer_id => Some(*last),
			_ => None,
		})
	}
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
	(a.0 - b.0).hypot(a.1 - b.1)
}
