//! Force-directed knowledge graph: layout engine and canvas component.
//!
//! The engine is plain Rust and runs anywhere:
//! - [`Graph`] arena of styled nodes and resolved links
//! - [`Simulation`] with link, many-body (exact or Barnes–Hut), collision,
//!   centering and positioning forces
//! - [`ViewTransform`], [`HitTester`] and [`InteractionController`] for
//!   pan, zoom and multi-pointer dragging
//! - [`AdjacencyIndex`] and [`Focus`] for hover highlighting
//! - [`Renderer`] backends: [`RasterRenderer`] over any [`DrawSurface`]
//!   (a 2D canvas context included) and the retained [`SceneRenderer`]
//!
//! [`ForceGraphCanvas`] mounts all of it on an HTML canvas.
//!
//! # Example
//!
//! ```ignore
//! use medbrain_graph::{ForceGraphCanvas, GraphDocument};
//!
//! let doc = GraphDocument::from_json(r#"{
//!     "vertexes": [
//!         {"id": "d1", "label": "Diabetes", "type": "Disease"},
//!         {"id": "s1", "label": "Thirst", "type": "Symptom"}
//!     ],
//!     "edges": [{"id": "e1", "from": "d1", "to": "s1", "label": "HasSymptom"}]
//! }"#)?;
//!
//! view! { <ForceGraphCanvas data=Signal::stored(doc) fullscreen=true /> }
//! ```

mod adjacency;
mod component;
mod config;
mod error;
mod forces;
mod graph;
mod hit;
mod interaction;
mod limiter;
mod quadtree;
mod render;
mod scene;
mod simulation;
mod state;
mod style;
mod transform;
mod types;

pub use adjacency::{AdjacencyIndex, Focus};
pub use component::ForceGraphCanvas;
pub use config::{ChartConfig, ScaleExtent};
pub use error::{Error, GraphIntegrityError, Result, StyleResolutionError};
pub use forces::{Axis, Center, Collide, CollideRadius, Force, LinkForce, ManyBody, Position};
pub use graph::{Graph, Link, LinkSpec, Node, NodeIdx};
pub use hit::HitTester;
pub use interaction::{InteractionController, Outcome, PointerEvent};
pub use limiter::FrameLimiter;
pub use render::{
	DrawSurface, Frame, LinkAppearance, LinkGeometry, NodeAppearance, RasterRenderer, RenderOptions,
	Renderer, Stroke, truncate_label,
};
pub use scene::{JoinStats, SceneLink, SceneNode, SceneRenderer};
pub use simulation::{Simulation, TickEvent};
pub use state::{ForceGraphState, GraphUpdate};
pub use style::{ChartTheme, Color, NodeStyle, StyleMap, StylePolicy};
pub use transform::ViewTransform;
pub use types::{Edge, GraphDocument, Vertex, build_graph};
