//! Drawing for the force graph.
//!
//! Styling decisions (focus dimming, truncated labels, link trimming and
//! arrowheads) are computed once per element in [`Frame`] and handed to a
//! backend. Two backends exist: [`RasterRenderer`] issues immediate-mode
//! calls against a [`DrawSurface`] such as a 2D canvas context, and
//! [`SceneRenderer`](super::scene::SceneRenderer) keeps a retained scene.
//!
//! Draw order: background, links (line, arrowhead, label), then nodes in
//! insertion order so later nodes paint on top.

use std::borrow::Cow;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::adjacency::{AdjacencyIndex, Focus};
use super::config::ChartConfig;
use super::graph::{Graph, Link, Node, NodeIdx};
use super::style::{ChartTheme, Color};
use super::transform::ViewTransform;

const ARROW_LENGTH: f64 = 8.0;
const ARROW_HALF_WIDTH: f64 = 3.5;
const LINK_WIDTH: f64 = 1.0;
const BORDER_WIDTH: f64 = 1.5;
const LOCKED_BORDER_WIDTH: f64 = 2.5;
pub(super) const HOVER_RING_GAP: f64 = 3.0;

/// Display switches taken from [`ChartConfig`].
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
	/// Draw arrowheads at link targets.
	pub show_arrows: bool,
	/// Draw relation labels at link midpoints.
	pub show_link_labels: bool,
	/// Node label cut-off in characters.
	pub label_max_chars: usize,
	/// Node label size in world units.
	pub node_font_size: f64,
	/// Link label size in world units.
	pub link_font_size: f64,
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self::from(&ChartConfig::default())
	}
}

impl From<&ChartConfig> for RenderOptions {
	fn from(config: &ChartConfig) -> Self {
		Self {
			show_arrows: config.show_arrows,
			show_link_labels: config.show_link_labels,
			label_max_chars: config.label_max_chars,
			node_font_size: config.node_font_size,
			link_font_size: config.link_font_size,
		}
	}
}

/// Shorten `label` to `max_chars` characters followed by `...`.
pub fn truncate_label(label: &str, max_chars: usize) -> Cow<'_, str> {
	match label.char_indices().nth(max_chars) {
		Some((cut, _)) => Cow::Owned(format!("{}...", &label[..cut])),
		None => Cow::Borrowed(label),
	}
}

/// Outline of a circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
	/// Stroke color.
	pub color: Color,
	/// Line width in world units.
	pub width: f64,
	/// Dashed outline.
	pub dashed: bool,
}

/// How one node is drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeAppearance<'a> {
	/// Center in world units.
	pub center: (f64, f64),
	/// Radius in world units.
	pub radius: f64,
	/// Fill, already dimmed.
	pub fill: Color,
	/// Outline.
	pub border: Stroke,
	/// Truncated label.
	pub label: Cow<'a, str>,
	/// Label color, already dimmed.
	pub label_color: Color,
	/// Extra ring around the hovered node.
	pub ring: Option<Stroke>,
	/// Focus opacity applied to the colors above.
	pub opacity: f64,
}

/// Endpoints of a link trimmed to the node outlines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkGeometry {
	/// Point on the source outline.
	pub start: (f64, f64),
	/// Point on the target outline, or the arrow base.
	pub end: (f64, f64),
	/// Tip first, then the two back corners.
	pub arrow: Option<[(f64, f64); 3]>,
	/// Anchor for the link label.
	pub midpoint: (f64, f64),
}

impl LinkGeometry {
	/// `None` for self-loops, coincident or unplaced endpoints.
	pub fn new(source: &Node, target: &Node, arrow: bool) -> Option<Self> {
		let (x1, y1) = source.position();
		let (x2, y2) = target.position();
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = dx.hypot(dy);
		if !dist.is_finite() || dist < 1e-3 {
			return None;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let midpoint = ((x1 + x2) / 2.0, (y1 + y2) / 2.0);

		let head = if arrow { ARROW_LENGTH } else { 0.0 };
		if dist <= source.radius + target.radius + head {
			// Overlapping circles hide the line; keep it center to center.
			return Some(Self {
				start: (x1, y1),
				end: (x2, y2),
				arrow: None,
				midpoint,
			});
		}

		let start = (x1 + ux * source.radius, y1 + uy * source.radius);
		let tip = (x2 - ux * target.radius, y2 - uy * target.radius);
		let end = (tip.0 - ux * head, tip.1 - uy * head);
		let arrow = arrow.then(|| {
			let (px, py) = (-uy * ARROW_HALF_WIDTH, ux * ARROW_HALF_WIDTH);
			[tip, (end.0 + px, end.1 + py), (end.0 - px, end.1 - py)]
		});
		Some(Self {
			start,
			end,
			arrow,
			midpoint,
		})
	}
}

/// How one link is drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkAppearance<'a> {
	/// Trimmed endpoints and arrowhead.
	pub geometry: LinkGeometry,
	/// Line and arrowhead color, already dimmed.
	pub color: Color,
	/// Line width in world units.
	pub width: f64,
	/// Label text and color, when labels are shown.
	pub label: Option<(&'a str, Color)>,
	/// Focus opacity applied to the colors above.
	pub opacity: f64,
}

/// Everything a backend needs to draw one frame. Read-only.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
	/// Graph to draw.
	pub graph: &'a Graph,
	/// Pan and zoom.
	pub view: &'a ViewTransform,
	/// Neighbor lookup for focus dimming.
	pub adjacency: &'a AdjacencyIndex,
	/// Hover focus.
	pub focus: &'a Focus,
	/// Chart-wide colors.
	pub theme: &'a ChartTheme,
	/// Display switches.
	pub options: &'a RenderOptions,
	/// Surface width in CSS pixels.
	pub width: f64,
	/// Surface height in CSS pixels.
	pub height: f64,
	/// Device pixels per CSS pixel of the backing store.
	pub pixel_ratio: f64,
}

impl<'a> Frame<'a> {
	/// Appearance of the node at `idx`.
	pub fn node(&self, idx: NodeIdx) -> NodeAppearance<'a> {
		let node = self.graph.node(idx);
		let opacity = self.focus.node_opacity(self.adjacency, idx);
		let border = if node.locked {
			Stroke {
				color: node.style.border.darken(0.25).fade(opacity),
				width: LOCKED_BORDER_WIDTH,
				dashed: true,
			}
		} else {
			Stroke {
				color: node.style.border.fade(opacity),
				width: BORDER_WIDTH,
				dashed: false,
			}
		};
		let ring = (self.focus.hovered() == Some(idx)).then_some(Stroke {
			color: self.theme.hover_ring,
			width: BORDER_WIDTH,
			dashed: false,
		});
		NodeAppearance {
			center: node.position(),
			radius: node.radius,
			fill: node.style.fill.fade(opacity),
			border,
			label: truncate_label(&node.label, self.options.label_max_chars),
			label_color: node.style.text.fade(opacity),
			ring,
			opacity,
		}
	}

	/// Appearance of `link`, `None` when its endpoints coincide.
	pub fn link(&self, link: &'a Link) -> Option<LinkAppearance<'a>> {
		let geometry = LinkGeometry::new(
			self.graph.node(link.source),
			self.graph.node(link.target),
			self.options.show_arrows,
		)?;
		let opacity = self.focus.link_opacity(link);
		let label = (self.options.show_link_labels && !link.label.is_empty())
			.then(|| (link.label.as_str(), self.theme.link_label.fade(opacity)));
		Some(LinkAppearance {
			geometry,
			color: self.theme.link.fade(opacity),
			width: LINK_WIDTH,
			label,
			opacity,
		})
	}
}

/// A drawing backend.
pub trait Renderer {
	/// Draw `frame` completely.
	fn render(&mut self, frame: &Frame<'_>);
}

/// Immediate-mode drawing primitives. Coordinates are world units once
/// [`DrawSurface::set_view`] has been called.
///
/// `width`, `height` and the view are in CSS pixels; `pixel_ratio` maps them
/// onto a backing store that is that many times larger.
pub trait DrawSurface {
	/// Reset to screen space and fill the whole surface.
	fn clear(&mut self, width: f64, height: f64, pixel_ratio: f64, color: Color);
	/// Switch to world coordinates under `view`.
	fn set_view(&mut self, view: &ViewTransform, pixel_ratio: f64);
	/// Solid line.
	fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64);
	/// Filled triangle.
	fn triangle(&mut self, points: [(f64, f64); 3], fill: Color);
	/// Circle with optional fill and outline.
	fn circle(&mut self, center: (f64, f64), radius: f64, fill: Option<Color>, stroke: Option<Stroke>);
	/// Text centered on `at`.
	fn text(&mut self, at: (f64, f64), text: &str, color: Color, size: f64);
}

/// Redraws everything onto a [`DrawSurface`] on every call.
#[derive(Clone, Debug)]
pub struct RasterRenderer<S> {
	surface: S,
}

impl<S: DrawSurface> RasterRenderer<S> {
	/// Renderer drawing onto `surface`.
	pub fn new(surface: S) -> Self {
		Self { surface }
	}

	/// The wrapped surface.
	pub fn surface(&self) -> &S {
		&self.surface
	}

	/// Unwrap the surface.
	pub fn into_surface(self) -> S {
		self.surface
	}
}

impl<S: DrawSurface> Renderer for RasterRenderer<S> {
	fn render(&mut self, frame: &Frame<'_>) {
		let surface = &mut self.surface;
		surface.clear(frame.width, frame.height, frame.pixel_ratio, frame.theme.background);
		surface.set_view(frame.view, frame.pixel_ratio);

		for link in frame.graph.links() {
			let Some(look) = frame.link(link) else {
				continue;
			};
			let g = look.geometry;
			surface.line(g.start, g.end, look.color, look.width);
			if let Some(arrow) = g.arrow {
				surface.triangle(arrow, look.color);
			}
			if let Some((text, color)) = look.label {
				surface.text(g.midpoint, text, color, frame.options.link_font_size);
			}
		}

		for idx in frame.graph.indices() {
			let look = frame.node(idx);
			if !look.center.0.is_finite() || !look.center.1.is_finite() {
				continue;
			}
			surface.circle(look.center, look.radius, Some(look.fill), Some(look.border));
			if let Some(ring) = look.ring {
				surface.circle(look.center, look.radius + HOVER_RING_GAP, None, Some(ring));
			}
			if !look.label.is_empty() {
				surface.text(look.center, &look.label, look.label_color, frame.options.node_font_size);
			}
		}
	}
}

impl DrawSurface for CanvasRenderingContext2d {
	fn clear(&mut self, width: f64, height: f64, pixel_ratio: f64, color: Color) {
		let _ = self.set_transform(pixel_ratio, 0.0, 0.0, pixel_ratio, 0.0, 0.0);
		self.set_fill_style_str(&color.to_css());
		self.fill_rect(0.0, 0.0, width, height);
	}

	fn set_view(&mut self, view: &ViewTransform, pixel_ratio: f64) {
		let k = view.scale() * pixel_ratio;
		let _ = self.set_transform(
			k,
			0.0,
			0.0,
			k,
			view.translate_x * pixel_ratio,
			view.translate_y * pixel_ratio,
		);
	}

	fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64) {
		let _ = self.set_line_dash(&js_sys::Array::new());
		self.set_stroke_style_str(&color.to_css());
		self.set_line_width(width);
		self.begin_path();
		self.move_to(from.0, from.1);
		self.line_to(to.0, to.1);
		self.stroke();
	}

	fn triangle(&mut self, [a, b, c]: [(f64, f64); 3], fill: Color) {
		self.set_fill_style_str(&fill.to_css());
		self.begin_path();
		self.move_to(a.0, a.1);
		self.line_to(b.0, b.1);
		self.line_to(c.0, c.1);
		self.close_path();
		self.fill();
	}

	fn circle(&mut self, center: (f64, f64), radius: f64, fill: Option<Color>, stroke: Option<Stroke>) {
		self.begin_path();
		let _ = self.arc(center.0, center.1, radius, 0.0, std::f64::consts::TAU);
		if let Some(fill) = fill {
			self.set_fill_style_str(&fill.to_css());
			self.fill();
		}
		if let Some(stroke) = stroke {
			let dash = if stroke.dashed {
				js_sys::Array::of2(&JsValue::from_f64(4.0), &JsValue::from_f64(3.0))
			} else {
				js_sys::Array::new()
			};
			let _ = self.set_line_dash(&dash);
			self.set_stroke_style_str(&stroke.color.to_css());
			self.set_line_width(stroke.width);
			self.stroke();
		}
	}

	fn text(&mut self, at: (f64, f64), text: &str, color: Color, size: f64) {
		self.set_font(&format!("{size}px sans-serif"));
		self.set_text_align("center");
		self.set_text_baseline("middle");
		self.set_fill_style_str(&color.to_css());
		let _ = self.fill_text(text, at.0, at.1);
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::force_graph::graph::LinkSpec;

	#[derive(Debug, Default)]
	struct Recorder {
		pixel_ratio: Option<f64>,
		lines: usize,
		triangles: usize,
		circles: Vec<(Option<Color>, Option<Stroke>)>,
		texts: Vec<String>,
	}

	impl DrawSurface for Recorder {
		fn clear(&mut self, _: f64, _: f64, pixel_ratio: f64, _: Color) {
			self.pixel_ratio = Some(pixel_ratio);
		}
		fn set_view(&mut self, _: &ViewTransform, pixel_ratio: f64) {
			assert_eq!(self.pixel_ratio, Some(pixel_ratio));
		}
		fn line(&mut self, _: (f64, f64), _: (f64, f64), _: Color, _: f64) {
			self.lines += 1;
		}
		fn triangle(&mut self, _: [(f64, f64); 3], _: Color) {
			self.triangles += 1;
		}
		fn circle(&mut self, _: (f64, f64), _: f64, fill: Option<Color>, stroke: Option<Stroke>) {
			self.circles.push((fill, stroke));
		}
		fn text(&mut self, _: (f64, f64), text: &str, _: Color, _: f64) {
			self.texts.push(text.to_string());
		}
	}

	fn pair() -> Graph {
		Graph::new(
			vec![
				Node::new("d", "Diabetes").with_position(0.0, 0.0),
				Node::new("s", "Thirst").with_position(200.0, 0.0),
			],
			vec![LinkSpec::new("l", "d", "s").with_label("Symptoms")],
		)
		.unwrap()
	}

	fn draw(graph: &Graph, focus: &Focus, options: &RenderOptions) -> Recorder {
		draw_at(graph, focus, options, 1.0)
	}

	fn draw_at(graph: &Graph, focus: &Focus, options: &RenderOptions, pixel_ratio: f64) -> Recorder {
		let adjacency = AdjacencyIndex::new(graph);
		let frame = Frame {
			graph,
			view: &ViewTransform::default(),
			adjacency: &adjacency,
			focus,
			theme: &ChartTheme::default(),
			options,
			width: 400.0,
			height: 300.0,
			pixel_ratio,
		};
		let mut renderer = RasterRenderer::new(Recorder::default());
		renderer.render(&frame);
		renderer.into_surface()
	}

	#[test]
	fn labels_are_truncated_by_characters() {
		assert_eq!(truncate_label("Diabetes", 3), "Dia...");
		assert_eq!(truncate_label("Flu", 3), "Flu");
		assert_eq!(truncate_label("糖尿病患者", 3), "糖尿病...");
		assert_eq!(truncate_label("", 3), "");
	}

	#[test]
	fn link_is_trimmed_to_outlines() {
		let graph = pair();
		let [d, s] = [0, 1].map(|i| &graph.nodes()[i]);
		let g = LinkGeometry::new(d, s, true).unwrap();
		assert_eq!(g.start, (20.0, 0.0));
		assert_eq!(g.arrow.unwrap()[0], (180.0, 0.0));
		assert_eq!(g.end, (172.0, 0.0));
		assert_eq!(g.midpoint, (100.0, 0.0));
		assert_eq!(LinkGeometry::new(d, d, true), None);
	}

	#[test]
	fn draws_links_then_nodes() {
		let rec = draw(&pair(), &Focus::default(), &RenderOptions::default());
		assert_eq!(rec.lines, 1);
		assert_eq!(rec.triangles, 1);
		assert_eq!(rec.circles.len(), 2);
		assert_eq!(rec.texts, vec!["Symptoms", "Dia...", "Thi..."]);
	}

	#[test]
	fn surface_receives_the_pixel_ratio() {
		let rec = draw_at(&pair(), &Focus::default(), &RenderOptions::default(), 2.0);
		assert_eq!(rec.pixel_ratio, Some(2.0));
		assert_eq!(rec.circles.len(), 2);
	}

	#[test]
	fn options_hide_arrows_and_link_labels() {
		let options = RenderOptions {
			show_arrows: false,
			show_link_labels: false,
			..RenderOptions::default()
		};
		let rec = draw(&pair(), &Focus::default(), &options);
		assert_eq!(rec.triangles, 0);
		assert_eq!(rec.texts, vec!["Dia...", "Thi..."]);
	}

	#[test]
	fn hover_dims_unrelated_nodes_and_rings_the_subject() {
		let graph = Graph::new(
			vec![
				Node::new("a", "A").with_position(0.0, 0.0),
				Node::new("b", "B").with_position(100.0, 0.0),
				Node::new("c", "C").with_position(0.0, 100.0),
			],
			vec![LinkSpec::new("ab", "a", "b")],
		)
		.unwrap();
		let mut focus = Focus::new(0.15);
		focus.set_hover(graph.find_id("a"));
		let rec = draw(&graph, &focus, &RenderOptions::default());

		// a, its ring, b, c.
		assert_eq!(rec.circles.len(), 4);
		let fill_alpha = |i: usize| rec.circles[i].0.map(|c| c.a);
		assert_eq!(fill_alpha(0), Some(1.0));
		assert_eq!(rec.circles[1].0, None);
		assert_eq!(fill_alpha(2), Some(1.0));
		assert_eq!(fill_alpha(3), Some(0.15));
	}

	#[test]
	fn locked_nodes_get_a_dashed_border() {
		let mut graph = pair();
		let d = graph.find_id("d").unwrap();
		graph.node_mut(d).locked = true;
		let rec = draw(&graph, &Focus::default(), &RenderOptions::default());
		assert!(rec.circles[0].1.unwrap().dashed);
		assert!(!rec.circles[1].1.unwrap().dashed);
	}
}
