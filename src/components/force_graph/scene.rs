//! Retained-mode backend: a keyed scene updated in place each frame.
//!
//! Elements are matched to graph entities by id. Matching elements keep
//! their slot and only have attributes rewritten; new ids enter and missing
//! ids exit, the way a data join over SVG elements behaves.

use std::collections::HashMap;
use std::fmt::Write as _;

use super::render::{Frame, HOVER_RING_GAP, LinkGeometry, Renderer, Stroke};
use super::style::Color;
use super::transform::ViewTransform;

/// One node element.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
	/// Node id.
	pub key: String,
	/// Center in world units.
	pub center: (f64, f64),
	/// Radius in world units.
	pub radius: f64,
	/// Fill color.
	pub fill: Color,
	/// Outline.
	pub border: Stroke,
	/// Hover ring, when focused.
	pub ring: Option<Stroke>,
	/// Truncated label; empty draws no text.
	pub label: String,
	/// Label color.
	pub label_color: Color,
}

/// One link element.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLink {
	/// Link id.
	pub key: String,
	/// `None` while the endpoints coincide; the element stays but is hidden.
	pub geometry: Option<LinkGeometry>,
	/// Line and arrowhead color.
	pub color: Color,
	/// Line width in world units.
	pub width: f64,
	/// Label text and color.
	pub label: Option<(String, Color)>,
}

/// Element counts of the last join.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoinStats {
	/// Elements created for new ids.
	pub entered: usize,
	/// Elements kept and rewritten.
	pub updated: usize,
	/// Elements removed for missing ids.
	pub exited: usize,
}

/// Retained scene of keyed node and link elements.
#[derive(Clone, Debug, Default)]
pub struct SceneRenderer {
	nodes: Vec<SceneNode>,
	links: Vec<SceneLink>,
	view: ViewTransform,
	size: (f64, f64),
	background: Option<Color>,
	last_join: JoinStats,
}

impl SceneRenderer {
	/// Empty scene.
	pub fn new() -> Self {
		Self::default()
	}

	/// Node elements in paint order.
	pub fn nodes(&self) -> &[SceneNode] {
		&self.nodes
	}

	/// Link elements in paint order.
	pub fn links(&self) -> &[SceneLink] {
		&self.links
	}

	/// Node element with id `key`.
	pub fn node(&self, key: &str) -> Option<&SceneNode> {
		self.nodes.iter().find(|n| n.key == key)
	}

	/// Counts from the most recent render.
	pub fn last_join(&self) -> JoinStats {
		self.last_join
	}

	/// Serialize the current scene as a standalone SVG document.
	pub fn to_svg(&self) -> String {
		let (w, h) = self.size;
		let mut svg = String::new();
		let _ = write!(
			svg,
			r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
		);
		if let Some(bg) = self.background {
			let _ = write!(svg, r#"<rect width="{w}" height="{h}" {}/>"#, paint("fill", bg));
		}
		let _ = write!(
			svg,
			r#"<g transform="translate({},{}) scale({})">"#,
			self.view.translate_x,
			self.view.translate_y,
			self.view.scale()
		);

		for link in &self.links {
			let Some(g) = link.geometry else {
				continue;
			};
			let _ = write!(
				svg,
				r#"<g class="link" data-id="{}"><line x1="{}" y1="{}" x2="{}" y2="{}" stroke-width="{}" {}/>"#,
				escape(&link.key),
				g.start.0,
				g.start.1,
				g.end.0,
				g.end.1,
				link.width,
				paint("stroke", link.color)
			);
			if let Some([a, b, c]) = g.arrow {
				let _ = write!(
					svg,
					r#"<polygon points="{},{} {},{} {},{}" {}/>"#,
					a.0,
					a.1,
					b.0,
					b.1,
					c.0,
					c.1,
					paint("fill", link.color)
				);
			}
			if let Some((text, color)) = &link.label {
				let _ = write!(svg, "{}", text_element(g.midpoint, text, *color));
			}
			svg.push_str("</g>");
		}

		for node in &self.nodes {
			let (x, y) = node.center;
			let _ = write!(
				svg,
				r#"<g class="node" data-id="{}"><circle cx="{x}" cy="{y}" r="{}" {} {}/>"#,
				escape(&node.key),
				node.radius,
				paint("fill", node.fill),
				stroke_attrs(&node.border)
			);
			if let Some(ring) = &node.ring {
				let _ = write!(
					svg,
					r#"<circle cx="{x}" cy="{y}" r="{}" fill="none" {}/>"#,
					node.radius + HOVER_RING_GAP,
					stroke_attrs(ring)
				);
			}
			if !node.label.is_empty() {
				let _ = write!(svg, "{}", text_element(node.center, &node.label, node.label_color));
			}
			svg.push_str("</g>");
		}

		svg.push_str("</g></svg>");
		svg
	}
}

impl Renderer for SceneRenderer {
	fn render(&mut self, frame: &Frame<'_>) {
		self.view = *frame.view;
		self.size = (frame.width, frame.height);
		self.background = Some(frame.theme.background);

		let mut stats = JoinStats::default();

		let mut old: HashMap<String, SceneNode> =
			self.nodes.drain(..).map(|n| (n.key.clone(), n)).collect();
		for idx in frame.graph.indices() {
			let look = frame.node(idx);
			let key = &frame.graph.node(idx).id;
			let mut element = match old.remove(key) {
				Some(existing) => {
					stats.updated += 1;
					existing
				}
				None => {
					stats.entered += 1;
					SceneNode {
						key: key.clone(),
						center: look.center,
						radius: look.radius,
						fill: look.fill,
						border: look.border,
						ring: None,
						label: String::new(),
						label_color: look.label_color,
					}
				}
			};
			element.center = look.center;
			element.radius = look.radius;
			element.fill = look.fill;
			element.border = look.border;
			element.ring = look.ring;
			if element.label != look.label {
				element.label = look.label.into_owned();
			}
			element.label_color = look.label_color;
			self.nodes.push(element);
		}
		stats.exited += old.len();

		let mut old: HashMap<String, SceneLink> =
			self.links.drain(..).map(|l| (l.key.clone(), l)).collect();
		for link in frame.graph.links() {
			let look = frame.link(link);
			let mut element = match old.remove(&link.id) {
				Some(existing) => {
					stats.updated += 1;
					existing
				}
				None => {
					stats.entered += 1;
					SceneLink {
						key: link.id.clone(),
						geometry: None,
						color: frame.theme.link,
						width: 1.0,
						label: None,
					}
				}
			};
			match look {
				Some(look) => {
					element.geometry = Some(look.geometry);
					element.color = look.color;
					element.width = look.width;
					element.label = look.label.map(|(text, color)| (text.to_string(), color));
				}
				None => element.geometry = None,
			}
			self.links.push(element);
		}
		stats.exited += old.len();

		self.last_join = stats;
	}
}

fn paint(attr: &str, color: Color) -> String {
	if (color.a - 1.0).abs() < 0.001 {
		format!(r#"{attr}="{}""#, color.to_css())
	} else {
		format!(
			r#"{attr}="{}" {attr}-opacity="{}""#,
			color.with_alpha(1.0).to_css(),
			color.a
		)
	}
}

fn stroke_attrs(stroke: &Stroke) -> String {
	let mut attrs = format!(r#"{} stroke-width="{}""#, paint("stroke", stroke.color), stroke.width);
	if stroke.dashed {
		attrs.push_str(r#" stroke-dasharray="4 3""#);
	}
	attrs
}

fn text_element(at: (f64, f64), text: &str, color: Color) -> String {
	format!(
		r#"<text x="{}" y="{}" text-anchor="middle" dominant-baseline="central" {}>{}</text>"#,
		at.0,
		at.1,
		paint("fill", color),
		escape(text)
	)
}

fn escape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&apos;"),
			c => out.push(c),
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::force_graph::adjacency::{AdjacencyIndex, Focus};
	use crate::components::force_graph::graph::{Graph, LinkSpec, Node};
	use crate::components::force_graph::render::RenderOptions;
	use crate::components::force_graph::style::ChartTheme;

	fn render_into(scene: &mut SceneRenderer, graph: &Graph) {
		let adjacency = AdjacencyIndex::new(graph);
		scene.render(&Frame {
			graph,
			view: &ViewTransform::default(),
			adjacency: &adjacency,
			focus: &Focus::default(),
			theme: &ChartTheme::default(),
			options: &RenderOptions::default(),
			width: 320.0,
			height: 200.0,
			pixel_ratio: 1.0,
		});
	}

	fn graph(ids: &[&str], x: f64) -> Graph {
		let nodes = ids
			.iter()
			.enumerate()
			.map(|(i, id)| Node::new(*id, "Fever & <chills>").with_position(x + 100.0 * i as f64, 0.0))
			.collect();
		let links = ids
			.windows(2)
			.map(|w| LinkSpec::new(format!("{}-{}", w[0], w[1]), w[0], w[1]))
			.collect();
		Graph::new(nodes, links).unwrap()
	}

	#[test]
	fn updates_elements_in_place() {
		let mut scene = SceneRenderer::new();
		render_into(&mut scene, &graph(&["a", "b"], 0.0));
		assert_eq!(scene.last_join(), JoinStats { entered: 3, updated: 0, exited: 0 });

		render_into(&mut scene, &graph(&["a", "b"], 50.0));
		assert_eq!(scene.last_join(), JoinStats { entered: 0, updated: 3, exited: 0 });
		assert_eq!(scene.node("a").unwrap().center, (50.0, 0.0));
	}

	#[test]
	fn joins_by_key() {
		let mut scene = SceneRenderer::new();
		render_into(&mut scene, &graph(&["a", "b"], 0.0));
		render_into(&mut scene, &graph(&["b", "c"], 0.0));
		// b stays; a, a-b exit; c, b-c enter.
		assert_eq!(scene.last_join(), JoinStats { entered: 2, updated: 1, exited: 2 });
		assert!(scene.node("a").is_none());
	}

	#[test]
	fn svg_export_escapes_text() {
		let mut scene = SceneRenderer::new();
		render_into(&mut scene, &graph(&["a", "b"], 0.0));
		let svg = scene.to_svg();
		assert!(svg.starts_with("<svg "));
		assert!(svg.ends_with("</g></svg>"));
		assert_eq!(svg.matches(r#"class="node""#).count(), 2);
		assert_eq!(svg.matches("<polygon").count(), 1);
		assert!(svg.contains(">Fev...</text>"));
		assert!(!svg.contains("<chills>"));
	}

	#[test]
	fn empty_scene_is_valid_svg() {
		let svg = SceneRenderer::new().to_svg();
		assert!(svg.contains("<g transform=\"translate(0,0) scale(1)\">"));
	}
}
