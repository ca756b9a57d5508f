//! medbrain-graph: interactive force-directed visualization of medical
//! knowledge graphs.
//!
//! The layout engine (graph model, forces, viewport, interaction, renderers)
//! lives in [`components::force_graph`] and is usable without a browser. The
//! [`App`] component mounts it as a WASM page that reads its data from the DOM.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::force_graph::{
	ChartConfig, Edge, ForceGraphCanvas, ForceGraphState, Graph, GraphDocument, StyleMap, Vertex,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("medbrain-graph: logging initialized");
}

/// Text content of `<script id="{id}">`, if present.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load the vertex/edge document from `<script id="graph-data">`.
fn load_graph_data() -> Option<GraphDocument> {
	let json_text = script_text("graph-data")?;
	match GraphDocument::from_json(&json_text) {
		Ok(doc) => {
			info!(
				"medbrain-graph: loaded {} vertexes, {} edges",
				doc.vertices().len(),
				doc.edges.len()
			);
			Some(doc)
		}
		Err(e) => {
			warn!("medbrain-graph: failed to parse graph data: {}", e);
			None
		}
	}
}

/// Load chart settings from `<script id="graph-config">`; absent means defaults.
fn load_chart_config() -> ChartConfig {
	let Some(json_text) = script_text("graph-config") else {
		return ChartConfig::default();
	};
	ChartConfig::from_json(&json_text).unwrap_or_else(|e| {
		warn!("medbrain-graph: failed to parse chart config, using defaults: {}", e);
		ChartConfig::default()
	})
}

/// Main application component.
/// Loads graph data and config from the DOM and renders the chart.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data().unwrap_or_default();
	let graph_signal = Signal::derive(move || graph_data.clone());
	let config = load_chart_config();

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="MedBrain Knowledge Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<ForceGraphCanvas data=graph_signal config=config fullscreen=true />
			<div class="graph-overlay">
				<h1>"MedBrain"</h1>
				<p class="subtitle">"Drag nodes to reposition. Scroll or pinch to zoom. Drag background to pan."</p>
			</div>
		</div>
	}
}
