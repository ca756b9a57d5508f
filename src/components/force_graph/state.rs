//! Engine state behind the chart component.
//!
//! One [`ForceGraphState`] lives for the lifetime of a mounted chart. It owns
//! the running simulation and everything the input handlers mutate (view,
//! gestures, hover focus), and decides once per animation frame whether the
//! surface has to be redrawn.

use log::info;

use super::adjacency::{AdjacencyIndex, Focus};
use super::config::ChartConfig;
use super::error::Result;
use super::graph::Graph;
use super::interaction::{InteractionController, Outcome, PointerEvent};
use super::limiter::FrameLimiter;
use super::render::{Frame, RenderOptions, Renderer};
use super::simulation::Simulation;
use super::style::StyleMap;
use super::transform::ViewTransform;
use super::types::{GraphDocument, build_graph};

/// How [`ForceGraphState::update_graph`] applied new data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphUpdate {
	/// Same nodes and links: display fields were copied, layout untouched.
	Restyled,
	/// Different topology: the previous simulation was stopped and replaced.
	Replaced,
}

/// Simulation, viewport and interaction state for one chart.
#[derive(Debug)]
pub struct ForceGraphState {
	simulation: Simulation,
	view: ViewTransform,
	controller: InteractionController,
	adjacency: AdjacencyIndex,
	focus: Focus,
	limiter: FrameLimiter,
	config: ChartConfig,
	styles: StyleMap,
	options: RenderOptions,
	width: f64,
	height: f64,
	pixel_ratio: f64,
	generation: u64,
	/// Redraw on the next frame regardless of the limiter (hover changes).
	dirty: bool,
}

impl ForceGraphState {
	/// Start laying out `graph` on a `width` x `height` surface.
	pub fn new(graph: Graph, config: ChartConfig, styles: StyleMap, width: f64, height: f64) -> Self {
		let center = config.center(width, height);
		let adjacency = AdjacencyIndex::new(&graph);
		info!(
			"medbrain-graph: starting layout for {} nodes, {} links",
			graph.len(),
			graph.links().len()
		);
		Self {
			simulation: Simulation::from_config(graph, &config, center),
			view: ViewTransform::identity(config.zoom_scale_extent),
			controller: InteractionController::new(&config),
			adjacency,
			focus: Focus::new(config.dim_opacity),
			limiter: FrameLimiter::new(f64::from(config.debounce_ms)),
			options: RenderOptions::from(&config),
			config,
			styles,
			width,
			height,
			pixel_ratio: 1.0,
			generation: 0,
			dirty: true,
		}
	}

	/// Build from an input document.
	pub fn from_document(
		doc: &GraphDocument,
		config: ChartConfig,
		styles: StyleMap,
		width: f64,
		height: f64,
	) -> Result<Self> {
		let graph = build_graph(doc, &styles, &config)?;
		Ok(Self::new(graph, config, styles, width, height))
	}

	/// Bumped every time the simulation is replaced. Frame callbacks
	/// scheduled for an older generation must do nothing.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// The graph being laid out.
	pub fn graph(&self) -> &Graph {
		self.simulation.graph()
	}

	/// The running simulation.
	pub fn simulation(&self) -> &Simulation {
		&self.simulation
	}

	/// Mutable simulation, e.g. to pin or lock nodes.
	pub fn simulation_mut(&mut self) -> &mut Simulation {
		&mut self.simulation
	}

	/// Current pan and zoom.
	pub fn view(&self) -> &ViewTransform {
		&self.view
	}

	/// Current hover focus.
	pub fn focus(&self) -> &Focus {
		&self.focus
	}

	/// Configuration the chart was built with.
	pub fn config(&self) -> &ChartConfig {
		&self.config
	}

	/// Surface size in CSS pixels.
	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	/// Device pixels per CSS pixel of the drawing surface.
	pub fn pixel_ratio(&self) -> f64 {
		self.pixel_ratio
	}

	/// Non-finite or non-positive ratios read as 1.
	pub fn set_pixel_ratio(&mut self, ratio: f64) {
		let ratio = if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 };
		if ratio != self.pixel_ratio {
			self.pixel_ratio = ratio;
			self.dirty = true;
		}
	}

	/// Apply new data. Same topology restyles in place; anything else stops
	/// the running simulation and starts a fresh one.
	pub fn update_graph(&mut self, graph: Graph) -> GraphUpdate {
		self.dirty = true;
		if self.graph().same_topology(&graph) {
			self.simulation.restyle(&graph);
			return GraphUpdate::Restyled;
		}

		self.simulation.stop();
		self.generation += 1;
		info!(
			"medbrain-graph: replacing graph (generation {}): {} nodes, {} links",
			self.generation,
			graph.len(),
			graph.links().len()
		);
		let center = self.config.center(self.width, self.height);
		self.adjacency = AdjacencyIndex::new(&graph);
		self.simulation = Simulation::from_config(graph, &self.config, center);
		self.controller = InteractionController::new(&self.config);
		self.focus.clear();
		GraphUpdate::Replaced
	}

	/// [`Self::update_graph`] from an input document.
	pub fn load_document(&mut self, doc: &GraphDocument) -> Result<GraphUpdate> {
		let graph = build_graph(doc, &self.styles, &self.config)?;
		Ok(self.update_graph(graph))
	}

	/// Advance one animation frame. Returns whether the caller should draw.
	pub fn frame(&mut self, now_ms: f64) -> bool {
		if self.simulation.step().is_some() || self.dirty {
			self.dirty = false;
			self.limiter.drawn(now_ms);
			return true;
		}
		self.limiter.poll(now_ms)
	}

	/// Whether frames still have work to do.
	pub fn is_animating(&self) -> bool {
		self.simulation.is_running() || self.dirty || self.limiter.is_pending()
	}

	/// Forward a pointer press.
	pub fn pointer_down(&mut self, event: PointerEvent) -> Outcome {
		self.controller
			.pointer_down(event, &mut self.simulation, &self.view)
	}

	/// Forward a pointer move. Moves without a gesture update hover focus.
	pub fn pointer_move(&mut self, event: PointerEvent) -> Outcome {
		let outcome = self
			.controller
			.pointer_move(event, &mut self.simulation, &mut self.view);
		match outcome {
			Outcome::ViewChanged => {
				self.limiter.request();
				outcome
			}
			Outcome::Ignored => {
				let hover = self
					.controller
					.hover(event, self.simulation.graph(), &self.view, &mut self.focus);
				if hover == Outcome::HoverChanged {
					self.dirty = true;
				}
				hover
			}
			other => other,
		}
	}

	/// Forward a pointer release.
	pub fn pointer_up(&mut self, event: PointerEvent) -> Outcome {
		self.controller.pointer_up(event, &mut self.simulation)
	}

	/// A pointer left the surface. Only that pointer's gesture ends; hover
	/// focus is dropped once no pointer holds a gesture.
	pub fn pointer_leave(&mut self, event: PointerEvent) -> Outcome {
		let outcome = self.controller.pointer_up(event, &mut self.simulation);
		if outcome != Outcome::Ignored {
			self.dirty = true;
		}
		if !self.controller.has_gestures() && self.focus.clear() {
			self.dirty = true;
		}
		outcome
	}

	/// Wheel zoom around `(x, y)`.
	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> Outcome {
		let outcome = self.controller.wheel(&mut self.view, x, y, delta_y);
		if outcome.changes_view() {
			self.limiter.request();
		}
		outcome
	}

	/// New surface size in CSS pixels.
	pub fn resize(&mut self, width: f64, height: f64) {
		if (width, height) != (self.width, self.height) {
			self.width = width;
			self.height = height;
			self.dirty = true;
		}
	}

	/// Halt ticking. Handlers and redraws keep working.
	pub fn stop(&mut self) {
		self.simulation.stop();
	}

	/// Draw the current frame with `renderer`.
	pub fn render(&self, renderer: &mut dyn Renderer) {
		renderer.render(&Frame {
			graph: self.simulation.graph(),
			view: &self.view,
			adjacency: &self.adjacency,
			focus: &self.focus,
			theme: &self.styles.theme,
			options: &self.options,
			width: self.width,
			height: self.height,
			pixel_ratio: self.pixel_ratio,
		});
	}
}
