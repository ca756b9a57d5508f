//! Chart configuration shared by the simulation, the renderer and the
//! interaction layer.
//!
//! Every key is optional in JSON (`camelCase`), missing keys take the values
//! below. The defaults are tuned for the medical chart: 20px dots, a 70px
//! spring and strong repulsion so that labels inside the circles stay legible.

use serde::Deserialize;

use super::style::StylePolicy;

/// Default alpha below which the layout counts as converged.
pub const ALPHA_MIN: f64 = 0.001;

/// Decay rate that takes alpha from 1 to [`ALPHA_MIN`] in about 300 ticks.
pub fn default_alpha_decay() -> f64 {
	1.0 - ALPHA_MIN.powf(1.0 / 300.0)
}

/// Smallest zoom factor an extent accepts, so that `invert` stays finite.
pub const MIN_SCALE: f64 = 1e-3;

/// Min/max zoom factor. Always ordered and bounded below by [`MIN_SCALE`].
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(from = "(f64, f64)")]
pub struct ScaleExtent {
	min: f64,
	max: f64,
}

impl ScaleExtent {
	/// Bounds in either order. A lower bound under [`MIN_SCALE`] (zero,
	/// negative or NaN) is raised to it.
	pub fn new(min: f64, max: f64) -> Self {
		let (lo, hi) = (min.min(max), min.max(max));
		let lo = if lo >= MIN_SCALE { lo } else { MIN_SCALE };
		let hi = if hi >= lo { hi } else { lo };
		Self { min: lo, max: hi }
	}

	/// Lower bound.
	pub fn min(&self) -> f64 {
		self.min
	}

	/// Upper bound.
	pub fn max(&self) -> f64 {
		self.max
	}

	/// Clamp `k` into the extent; NaN reads as 1.
	pub fn clamp(&self, k: f64) -> f64 {
		let k = if k.is_nan() { 1.0 } else { k };
		k.clamp(self.min, self.max)
	}
}

impl Default for ScaleExtent {
	fn default() -> Self {
		Self::new(0.2, 5.0)
	}
}

impl From<(f64, f64)> for ScaleExtent {
	fn from((min, max): (f64, f64)) -> Self {
		Self::new(min, max)
	}
}

/// All tunables of the chart.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfig {
	/// Spring rest length.
	pub link_distance: f64,
	/// Many-body strength, negative for repulsion.
	pub charge_strength: f64,
	/// Many-body distances are floored at this.
	pub distance_min: f64,
	/// Pairs further apart than this do not repel.
	pub distance_max: f64,
	/// Collision radius; `None` uses `dot_radius + 2`.
	pub collision_radius: Option<f64>,
	/// Collision relaxation passes per tick.
	pub collide_iterations: usize,
	/// Layout center; `None` uses the middle of the viewport.
	pub center_x: Option<f64>,
	/// Layout center y; `None` uses the middle of the viewport.
	pub center_y: Option<f64>,
	/// Pull toward the center on the x axis.
	pub x_strength: f64,
	/// Pull toward the center on the y axis.
	pub y_strength: f64,
	/// Barnes-Hut opening criterion.
	pub theta: f64,
	/// Node count above which many-body switches to the quadtree.
	pub barnes_hut_threshold: usize,
	/// Alpha below which the layout stops ticking.
	pub alpha_min: f64,
	/// Fraction of the gap to `alpha_target` closed per tick.
	pub alpha_decay: f64,
	/// Velocity multiplier applied every tick.
	pub velocity_decay: f64,
	/// Alpha floor held while a drag is active.
	pub drag_alpha_target: f64,
	/// Zoom bounds, `[min, max]` in JSON.
	pub zoom_scale_extent: ScaleExtent,
	/// Node radius in world units.
	pub dot_radius: f64,
	/// Extra grab tolerance around nodes, in screen pixels.
	pub hit_slop_px: f64,
	/// Redraw coalescing window for continuous zoom/pan gestures.
	pub debounce_ms: u32,
	/// Draw arrowheads at link targets.
	pub show_arrows: bool,
	/// Draw relation labels at link midpoints.
	pub show_link_labels: bool,
	/// Node labels longer than this are cut and end in `...`.
	pub label_max_chars: usize,
	/// Node label size in world units.
	pub node_font_size: f64,
	/// Link label size in world units.
	pub link_font_size: f64,
	/// Opacity of unfocused nodes and links while hovering.
	pub dim_opacity: f64,
	/// What to do with node categories missing from the style map.
	pub style_policy: StylePolicy,
	/// Lock nodes in place when a drag ends instead of releasing them.
	pub lock_on_release: bool,
}

impl Default for ChartConfig {
	fn default() -> Self {
		Self {
			link_distance: 70.0,
			charge_strength: -300.0,
			distance_min: 60.0,
			distance_max: 1000.0,
			collision_radius: None,
			collide_iterations: 2,
			center_x: None,
			center_y: None,
			x_strength: 0.1,
			y_strength: 0.1,
			theta: 0.9,
			barnes_hut_threshold: 200,
			alpha_min: ALPHA_MIN,
			alpha_decay: default_alpha_decay(),
			velocity_decay: 0.6,
			drag_alpha_target: 0.3,
			zoom_scale_extent: ScaleExtent::default(),
			dot_radius: 20.0,
			hit_slop_px: 0.0,
			debounce_ms: 120,
			show_arrows: true,
			show_link_labels: true,
			label_max_chars: 3,
			node_font_size: 8.0,
			link_font_size: 6.0,
			dim_opacity: 0.15,
			style_policy: StylePolicy::Fallback,
			lock_on_release: false,
		}
	}
}

impl ChartConfig {
	/// Parse a JSON config; absent keys keep their defaults.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Effective collision radius.
	pub fn collision_radius(&self) -> f64 {
		self.collision_radius.unwrap_or(self.dot_radius + 2.0)
	}

	/// Layout center for a viewport of the given size.
	pub fn center(&self, width: f64, height: f64) -> (f64, f64) {
		(
			self.center_x.unwrap_or(width / 2.0),
			self.center_y.unwrap_or(height / 2.0),
		)
	}
}
