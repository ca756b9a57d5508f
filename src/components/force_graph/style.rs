//! Visual styling for the chart.
//!
//! The core never looks styles up by category while drawing: the input
//! adapter resolves each node's [`NodeStyle`] once through a [`StyleMap`] and
//! the renderer reads it straight off the node.

use std::collections::HashMap;

use log::warn;
use serde::Deserialize;

use super::error::StyleResolutionError;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
	/// Alpha in `0..=1`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color, alpha replaced.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Multiply the alpha channel, used for focus dimming.
	pub fn fade(self, opacity: f64) -> Self {
		Self {
			a: self.a * opacity.clamp(0.0, 1.0),
			..self
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	/// Parse `#rgb` or `#rrggbb`.
	pub fn from_hex(hex: &str) -> Option<Self> {
		let digits = hex.strip_prefix('#')?;
		let channel = |s: &str| u8::from_str_radix(s, 16).ok();
		match digits.len() {
			3 => {
				let mut it = digits.chars().map(|c| channel(&format!("{c}{c}")));
				Some(Self::rgb(it.next()??, it.next()??, it.next()??))
			}
			6 => Some(Self::rgb(
				channel(digits.get(0..2)?)?,
				channel(digits.get(2..4)?)?,
				channel(digits.get(4..6)?)?,
			)),
			_ => None,
		}
	}

	/// CSS `rgba()` string.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

impl TryFrom<String> for Color {
	type Error = String;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::from_hex(&value).ok_or_else(|| format!("invalid hex color `{value}`"))
	}
}

/// Per-node colors, resolved from the node's category.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NodeStyle {
	/// Circle fill.
	#[serde(alias = "background")]
	pub fill: Color,
	/// Circle outline.
	#[serde(alias = "borderColor")]
	pub border: Color,
	/// Label color.
	#[serde(alias = "color")]
	pub text: Color,
}

impl Default for NodeStyle {
	fn default() -> Self {
		Self {
			fill: Color::rgb(0xb0, 0xbe, 0xc5),
			border: Color::rgb(0x78, 0x90, 0x9c),
			text: Color::rgb(0x33, 0x33, 0x33),
		}
	}
}

impl NodeStyle {
	fn from_hex(fill: &str, text: &str, border: &str) -> Self {
		let parse = |hex| Color::from_hex(hex).unwrap_or(Color::rgb(128, 128, 128));
		Self {
			fill: parse(fill),
			border: parse(border),
			text: parse(text),
		}
	}
}

/// What to do when a node category has no style entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePolicy {
	/// Use [`StyleMap::fallback`] and log a warning.
	#[default]
	Fallback,
	/// Fail graph construction with [`StyleResolutionError`].
	Strict,
}

/// Chart-wide colors that do not depend on a node category.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ChartTheme {
	/// Surface fill.
	pub background: Color,
	/// Link line and arrowhead color.
	pub link: Color,
	/// Link label color.
	pub link_label: Color,
	/// Ring drawn around the hovered node.
	pub hover_ring: Color,
}

impl Default for ChartTheme {
	fn default() -> Self {
		Self {
			background: Color::rgb(255, 255, 255),
			link: Color::rgb(0xcc, 0xcc, 0xcc),
			link_label: Color::rgb(0x99, 0x99, 0x99),
			hover_ring: Color::rgba(0x33, 0x33, 0x33, 0.6),
		}
	}
}

/// Immutable category lookup supplied by the input adapter.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct StyleMap {
	/// Styles by node category.
	pub nodes: HashMap<String, NodeStyle>,
	/// Display text for link types/labels (e.g. `HasSymptom`).
	pub link_labels: HashMap<String, String>,
	/// Style for categories missing from `nodes`.
	pub fallback: NodeStyle,
	/// Chart-wide colors.
	pub theme: ChartTheme,
}

impl StyleMap {
	/// Vertex categories and relation labels of the medical knowledge graph.
	pub fn medical() -> Self {
		let nodes = [
			("Disease", NodeStyle::from_hex("#f16667", "#fff", "#ec2f31")),
			("Symptom", NodeStyle::from_hex("#ffc454", "#333", "#d8a014")),
			("HistoryDisease", NodeStyle::from_hex("#d9c8ae", "#333", "#c0a378")),
			("FamilyHistory", NodeStyle::from_hex("#8dcc93", "#333", "#5eb665")),
			("HistoryProduct", NodeStyle::from_hex("#4c8eda", "#fff", "#2870c2")),
			(
				"InspectionElementFactor",
				NodeStyle::from_hex("#ecb5c9", "#333", "#da7298"),
			),
		]
		.into_iter()
		.map(|(k, v)| (k.to_string(), v))
		.collect();

		let link_labels = [
			("HasDefined", "Diagnostic factor"),
			("HasSymptom", "Symptoms & signs"),
			("HasFactor", "Inspection factor"),
			("HasDiseaseHistory", "Disease history"),
			("HasFamilyHistory", "Family history"),
			("HasHistoryProduct", "Previous product"),
		]
		.into_iter()
		.map(|(k, v)| (k.to_string(), v.to_string()))
		.collect();

		Self {
			nodes,
			link_labels,
			fallback: NodeStyle::default(),
			theme: ChartTheme::default(),
		}
	}

	/// Look up the style for `kind`, failing if the category is unknown.
	pub fn resolve(&self, node: &str, kind: &str) -> Result<&NodeStyle, StyleResolutionError> {
		self.nodes.get(kind).ok_or_else(|| StyleResolutionError {
			node: node.to_string(),
			kind: kind.to_string(),
		})
	}

	/// Resolve under `policy`: strict propagates, fallback substitutes.
	pub fn resolve_with(
		&self,
		node: &str,
		kind: &str,
		policy: StylePolicy,
	) -> Result<NodeStyle, StyleResolutionError> {
		match (self.resolve(node, kind), policy) {
			(Ok(style), _) => Ok(style.clone()),
			(Err(e), StylePolicy::Strict) => Err(e),
			(Err(e), StylePolicy::Fallback) => {
				warn!("medbrain-graph: {e}, using fallback style");
				Ok(self.fallback.clone())
			}
		}
	}

	/// Display text for a link label key; unknown keys pass through verbatim.
	pub fn link_label<'a>(&'a self, key: &'a str) -> &'a str {
		self.link_labels.get(key).map(String::as_str).unwrap_or(key)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_short_and_long_hex() {
		assert_eq!(Color::from_hex("#fff"), Some(Color::rgb(255, 255, 255)));
		assert_eq!(Color::from_hex("#f16667"), Some(Color::rgb(0xf1, 0x66, 0x67)));
		assert_eq!(Color::from_hex("f16667"), None);
		assert_eq!(Color::from_hex("#zzzzzz"), None);
	}

	#[test]
	fn css_output_switches_on_alpha() {
		assert_eq!(Color::rgb(1, 2, 3).to_css(), "#010203");
		assert_eq!(Color::rgb(1, 2, 3).fade(0.5).to_css(), "rgba(1, 2, 3, 0.5)");
	}

	#[test]
	fn style_policy_controls_unknown_types() {
		let styles = StyleMap::medical();
		assert!(styles.resolve_with("n", "Disease", StylePolicy::Strict).is_ok());

		let err = styles
			.resolve_with("n", "Unknown", StylePolicy::Strict)
			.unwrap_err();
		assert_eq!(err.kind, "Unknown");

		let fallback = styles
			.resolve_with("n", "Unknown", StylePolicy::Fallback)
			.unwrap();
		assert_eq!(fallback, styles.fallback);
	}

	#[test]
	fn link_labels_pass_through_unknown_keys() {
		let styles = StyleMap::medical();
		assert_eq!(styles.link_label("HasSymptom"), "Symptoms & signs");
		assert_eq!(styles.link_label("treats"), "treats");
	}

	#[test]
	fn node_style_accepts_source_field_names() {
		let style: NodeStyle = serde_json::from_str(
			r##"{"background": "#f16667", "color": "#fff", "borderColor": "#ec2f31"}"##,
		)
		.unwrap();
		assert_eq!(style.text, Color::rgb(255, 255, 255));
	}
}
