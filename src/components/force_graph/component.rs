//! Leptos component wrapping the force-directed graph canvas.
//!
//! The component creates a canvas, builds a [`ForceGraphState`] from the
//! input document and forwards pointer/wheel events to it. Each simulation
//! generation gets its own `requestAnimationFrame` loop; a loop that finds
//! the state on a newer generation (new topology) or the canvas detached
//! drops its closure and ends.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, WheelEvent, Window};

use super::config::ChartConfig;
use super::graph::Graph;
use super::interaction::PointerEvent;
use super::render::RasterRenderer;
use super::state::{ForceGraphState, GraphUpdate};
use super::style::StyleMap;
use super::types::GraphDocument;

/// Engine plus the canvas backend it draws to.
struct ChartContext {
	state: ForceGraphState,
	renderer: RasterRenderer<CanvasRenderingContext2d>,
	canvas: HtmlCanvasElement,
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Renders an interactive force-directed graph on a canvas element.
///
/// Pass graph data via the reactive `data` signal. A change with the same
/// nodes and links restyles in place; anything else restarts the layout.
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize with the window.
/// Explicit `width`/`height` override automatic sizing.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphDocument>,
	#[prop(optional)] config: Option<ChartConfig>,
	#[prop(optional)] styles: Option<StyleMap>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<ChartContext>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (context_init, resize_cb_init) = (context.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let doc = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		// Later runs: new data for a live chart.
		let replaced = context_init.borrow_mut().as_mut().map(|c| {
			match c.state.load_document(&doc) {
				Ok(GraphUpdate::Replaced) => Some(c.state.generation()),
				Ok(GraphUpdate::Restyled) => None,
				Err(e) => {
					warn!("medbrain-graph: ignoring graph update: {e}");
					None
				}
			}
		});
		if let Some(update) = replaced {
			if let Some(generation) = update {
				start_frame_loop(context_init.clone(), generation);
			}
			return;
		}

		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = if fullscreen {
			viewport_size(&window)
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| parent.as_ref().map_or(800.0, |p| p.client_width() as f64)),
				height.unwrap_or_else(|| parent.as_ref().map_or(600.0, |p| p.client_height() as f64)),
			)
		};
		let ratio = pixel_ratio(&window);
		size_canvas(&canvas, w, h, ratio);

		let ctx = match canvas.get_context("2d") {
			Ok(Some(ctx)) => ctx.dyn_into::<CanvasRenderingContext2d>(),
			_ => {
				warn!("medbrain-graph: canvas has no 2d context");
				return;
			}
		};
		let Ok(ctx) = ctx else {
			return;
		};

		let config = config.clone().unwrap_or_default();
		let styles = styles.clone().unwrap_or_else(StyleMap::medical);
		let mut state = match ForceGraphState::from_document(&doc, config.clone(), styles.clone(), w, h) {
			Ok(state) => state,
			Err(e) => {
				warn!("medbrain-graph: {e}; showing an empty graph");
				ForceGraphState::new(Graph::default(), config, styles, w, h)
			}
		};
		state.set_pixel_ratio(ratio);
		info!("medbrain-graph: canvas {w}x{h} @{ratio}x, {} nodes", state.graph().len());
		let generation = state.generation();
		*context_init.borrow_mut() = Some(ChartContext {
			state,
			renderer: RasterRenderer::new(ctx),
			canvas: canvas.clone(),
		});

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = viewport_size(&win);
				let ratio = pixel_ratio(&win);
				size_canvas(&canvas_resize, nw, nh, ratio);
				if let Some(c) = context_resize.borrow_mut().as_mut() {
					c.state.resize(nw, nh);
					c.state.set_pixel_ratio(ratio);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		start_frame_loop(context_init.clone(), generation);
	});

	let context_pd = context.clone();
	let on_pointerdown = move |ev: web_sys::PointerEvent| {
		let Some(event) = pointer(&canvas_ref, &ev) else {
			return;
		};
		if let Some(c) = context_pd.borrow_mut().as_mut() {
			let _ = c.canvas.set_pointer_capture(ev.pointer_id());
			c.state.pointer_down(event);
		}
	};

	let context_pm = context.clone();
	let on_pointermove = move |ev: web_sys::PointerEvent| {
		let Some(event) = pointer(&canvas_ref, &ev) else {
			return;
		};
		if let Some(c) = context_pm.borrow_mut().as_mut() {
			c.state.pointer_move(event);
		}
	};

	let context_pu = context.clone();
	let on_pointerup = move |ev: web_sys::PointerEvent| {
		let Some(event) = pointer(&canvas_ref, &ev) else {
			return;
		};
		if let Some(c) = context_pu.borrow_mut().as_mut() {
			c.state.pointer_up(event);
		}
	};

	let context_pc = context.clone();
	let on_pointercancel = move |ev: web_sys::PointerEvent| {
		let Some(event) = pointer(&canvas_ref, &ev) else {
			return;
		};
		if let Some(c) = context_pc.borrow_mut().as_mut() {
			c.state.pointer_up(event);
		}
	};

	let context_pl = context.clone();
	let on_pointerleave = move |ev: web_sys::PointerEvent| {
		let Some(event) = pointer(&canvas_ref, &ev) else {
			return;
		};
		if let Some(c) = context_pl.borrow_mut().as_mut() {
			c.state.pointer_leave(event);
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(&canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(c) = context_wh.borrow_mut().as_mut() {
			c.state.wheel(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:pointerdown=on_pointerdown
			on:pointermove=on_pointermove
			on:pointerup=on_pointerup
			on:pointercancel=on_pointercancel
			on:pointerleave=on_pointerleave
			on:wheel=on_wheel
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}

/// Drive `state.frame` once per animation frame until the generation goes
/// stale or the canvas leaves the document.
fn start_frame_loop(context: Rc<RefCell<Option<ChartContext>>>, generation: u64) {
	let callback: FrameCallback = Rc::new(RefCell::new(None));
	let scheduled = callback.clone();

	*callback.borrow_mut() = Some(Closure::new(move |now: f64| {
		let live = match context.borrow_mut().as_mut() {
			Some(c) if c.state.generation() == generation && c.canvas.is_connected() => {
				if c.state.frame(now) {
					c.state.render(&mut c.renderer);
				}
				true
			}
			_ => false,
		};
		if !live {
			let _ = scheduled.borrow_mut().take();
			return;
		}
		request_frame(&scheduled);
	}));
	request_frame(&callback);
}

fn request_frame(callback: &FrameCallback) {
	let (Some(window), Some(cb)) = (web_sys::window(), callback.borrow().as_ref().map(|cb| cb.as_ref().clone()))
	else {
		return;
	};
	let _ = window.request_animation_frame(cb.unchecked_ref());
}

fn viewport_size(window: &Window) -> (f64, f64) {
	let read = |v: Result<JsValue, JsValue>, fallback| v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback);
	(read(window.inner_width(), 800.0), read(window.inner_height(), 600.0))
}

fn pixel_ratio(window: &Window) -> f64 {
	let ratio = window.device_pixel_ratio();
	if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 }
}

/// Backing store in device pixels, displayed at `w`x`h` CSS pixels.
fn size_canvas(canvas: &HtmlCanvasElement, w: f64, h: f64, ratio: f64) {
	canvas.set_width((w * ratio).round() as u32);
	canvas.set_height((h * ratio).round() as u32);
	let style = web_sys::HtmlElement::style(canvas);
	let _ = style.set_property("width", &format!("{w}px"));
	let _ = style.set_property("height", &format!("{h}px"));
}

/// Client coordinates to canvas-relative CSS pixels.
fn canvas_point(canvas_ref: &NodeRef<leptos::html::Canvas>, client_x: i32, client_y: i32) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((client_x as f64 - rect.left(), client_y as f64 - rect.top()))
}

fn pointer(canvas_ref: &NodeRef<leptos::html::Canvas>, ev: &web_sys::PointerEvent) -> Option<PointerEvent> {
	let (x, y) = canvas_point(canvas_ref, ev.client_x(), ev.client_y())?;
	Some(PointerEvent::new(ev.pointer_id(), x, y))
}
