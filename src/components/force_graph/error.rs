//! Error types for graph construction and styling.

use thiserror::Error;

/// Raised while building a [`Graph`](super::graph::Graph) when the input does
/// not describe a consistent graph. The simulation never starts on such input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphIntegrityError {
	/// A link endpoint names a node id that is not part of the graph.
	#[error("link `{link}` references unknown node `{node}`")]
	UnknownEndpoint {
		/// Id of the offending link.
		link: String,
		/// The id it points at.
		node: String,
	},

	/// Two nodes share the same id.
	#[error("duplicate node id `{0}`")]
	DuplicateNode(String),

	/// Node radius must be strictly positive (and finite).
	#[error("node `{id}` has non-positive radius {radius}")]
	InvalidRadius {
		/// Node id.
		id: String,
		/// The rejected radius.
		radius: f64,
	},
}

/// A node category has no entry in the style map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no style registered for node type `{kind}` (node `{node}`)")]
pub struct StyleResolutionError {
	/// Id of the node that needed the style.
	pub node: String,
	/// Its category.
	pub kind: String,
}

/// Crate-level error for everything the input adapter can fail on.
#[derive(Debug, Error)]
pub enum Error {
	/// The document does not form a consistent graph.
	#[error(transparent)]
	Integrity(#[from] GraphIntegrityError),

	/// A category has no style under [`StylePolicy::Strict`](super::style::StylePolicy::Strict).
	#[error(transparent)]
	Style(#[from] StyleResolutionError),

	/// The document is not valid JSON for [`GraphDocument`](super::types::GraphDocument).
	#[error("invalid graph document: {0}")]
	Json(#[from] serde_json::Error),
}

/// Convenience alias used by the adapter functions.
pub type Result<T, E = Error> = std::result::Result<T, E>;
