//! Input document for the chart and its conversion into a [`Graph`].

use log::info;
use serde::Deserialize;
use serde_json::Value;

use super::config::ChartConfig;
use super::error::Result;
use super::graph::{Graph, LinkSpec, Node};
use super::style::StyleMap;

/// A vertex of the knowledge graph.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Vertex {
	/// Unique key.
	pub id: String,
	/// Display text.
	#[serde(default)]
	pub label: String,
	/// Category key, e.g. `Disease` or `Symptom`.
	#[serde(default, rename = "type")]
	pub kind: String,
	/// Opaque payload, passed through untouched.
	#[serde(default)]
	pub properties: Option<Value>,
}

/// A directed relation between two vertices.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Edge {
	/// Unique key.
	pub id: String,
	/// Source vertex id.
	pub from: String,
	/// Target vertex id.
	pub to: String,
	/// Relation key, e.g. `HasSymptom`; displayed through the style map.
	#[serde(default)]
	pub label: String,
	/// Relation type; used when `label` is empty.
	#[serde(default, rename = "type")]
	pub kind: String,
	/// Opaque payload, passed through untouched.
	#[serde(default)]
	pub properties: Option<Value>,
}

/// Complete input: `{ "vertexes": [...], "edges": [...] }`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphDocument {
	/// `None` when the key is absent, which reads as "no data yet". A present
	/// but empty array is real data and its edges are still validated.
	#[serde(default)]
	pub vertexes: Option<Vec<Vertex>>,
	/// Relations between vertices; absent reads as none.
	#[serde(default)]
	pub edges: Vec<Edge>,
}

impl GraphDocument {
	/// Parse a document. Missing arrays read as empty; malformed JSON is an
	/// error for the caller to downgrade.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// Vertices of the document, empty when the key was absent.
	pub fn vertices(&self) -> &[Vertex] {
		self.vertexes.as_deref().unwrap_or_default()
	}

	/// True when there is nothing to draw.
	pub fn is_empty(&self) -> bool {
		self.vertices().is_empty()
	}
}

/// Resolve a document into a graph: styles from `styles` under the
/// configured policy, radius from `dot_radius`, link endpoints to handles.
///
/// A document without a `vertexes` key becomes an empty graph and its edges
/// are ignored. An empty `vertexes` array does not: its edges must still
/// resolve, so any edge is an unknown-endpoint error.
pub fn build_graph(doc: &GraphDocument, styles: &StyleMap, config: &ChartConfig) -> Result<Graph> {
	let Some(vertexes) = &doc.vertexes else {
		return Ok(Graph::default());
	};

	let nodes = vertexes
		.iter()
		.map(|v| -> Result<Node> {
			let style = styles.resolve_with(&v.id, &v.kind, config.style_policy)?;
			Ok(Node::new(&v.id, &v.label)
				.with_group(&v.kind)
				.with_style(style)
				.with_radius(config.dot_radius))
		})
		.collect::<Result<Vec<_>>>()?;

	let links = doc
		.edges
		.iter()
		.map(|e| {
			let key = if e.label.is_empty() { &e.kind } else { &e.label };
			LinkSpec::new(&e.id, &e.from, &e.to)
				.with_label(styles.link_label(key))
				.with_kind(&e.kind)
		})
		.collect();

	let graph = Graph::new(nodes, links)?;
	info!(
		"medbrain-graph: built graph with {} nodes, {} links",
		graph.len(),
		graph.links().len()
	);
	Ok(graph)
}
