//! Leptos components wrapping the graph canvas.
//!
//! [`ForceGraphCanvas`] creates an HTML canvas element and wires up mouse,
//! wheel and touch handlers for node dragging, panning, zooming and
//! click-to-select. An animation loop runs via `requestAnimationFrame`,
//! stepping the layout simulation and renderer each frame.
//!
//! [`SchemaGraphCanvas`] and [`DataGraphCanvas`] derive a [`Scene`] from their
//! domain inputs and hand it to the generic canvas.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent, Window,
};

use super::interaction::SelectionEvent;
use super::render;
use super::scale::ScaleConfig;
use super::scene::{CategoryScale, Scene};
use super::state::ForceGraphState;
use super::theme::Theme;
use super::types::{GraphSchema, HealthIssue, Ontology, SelectedElement, SimulatedGraph};

/// Bundles graph state with visual configuration (scaling, theme).
struct GraphContext {
	state: ForceGraphState,
	scale: ScaleConfig,
	theme: Theme,
}

type SharedContext = Rc<RefCell<Option<GraphContext>>>;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	let w = window.inner_width().ok()?.as_f64()?;
	let h = window.inner_height().ok()?.as_f64()?;
	Some((w, h))
}

/// Canvas-relative coordinates for a client position.
fn canvas_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(client_x as f64 - rect.left(), client_y as f64 - rect.top())
}

/// Client positions of the touches in `list`.
fn touch_points(list: &web_sys::TouchList) -> Vec<(i32, i32)> {
	(0..list.length())
		.filter_map(|i| list.get(i))
		.map(|t| (t.client_x(), t.client_y()))
		.collect()
}

/// Center and spread of a two-finger touch, canvas space.
fn pinch_geometry(canvas: &HtmlCanvasElement, points: &[(i32, i32)]) -> Option<((f64, f64), f64)> {
	let [a, b] = points else {
		return None;
	};
	let (ax, ay) = canvas_point(canvas, a.0, a.1);
	let (bx, by) = canvas_point(canvas, b.0, b.1);
	Some((((ax + bx) / 2.0, (ay + by) / 2.0), (bx - ax).hypot(by - ay)))
}

/// Renders an interactive force-directed graph of a [`Scene`] on a canvas.
///
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize automatically with
/// the window. Explicit `width`/`height` override automatic sizing.
///
/// `selected` mirrors the selection held by the caller, and `on_select` is
/// invoked with the new selection when the user clicks an element or the
/// background, or when a scene change drops the selected element.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] scene: Signal<Scene>,
	#[prop(into, default = Signal::stored(None))] selected: Signal<Option<SelectedElement>>,
	#[prop(into, default = None)] on_select: Option<Callback<Option<SelectedElement>>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: SharedContext = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	// `on_cleanup` requires Send + Sync, which rules out Rc<Cell<bool>>.
	let alive = Arc::new(AtomicBool::new(true));
	let (context_init, animate_init, resize_cb_init, alive_init) = (
		context.clone(),
		animate.clone(),
		resize_cb.clone(),
		alive.clone(),
	);

	let emit = move |event: Option<SelectionEvent>| {
		if let (Some(event), Some(cb)) = (event, on_select) {
			cb.run(event.into_selection());
		}
	};

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if context_init.borrow().is_some() {
			return;
		}
		let Some(window) = web_sys::window() else {
			warn!("graph: no window, canvas not started");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				warn!("graph: 2d context unavailable");
				return;
			}
		};

		let mut state = ForceGraphState::new(scene.get_untracked(), w, h);
		state.sync_selection(selected.get_untracked().as_ref());
		*context_init.borrow_mut() = Some(GraphContext {
			state,
			scale: ScaleConfig::default(),
			theme: Theme::default(),
		});

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.state.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner, resize_anim, alive_anim) = (
			context_init.clone(),
			animate_init.clone(),
			resize_cb_init.clone(),
			alive_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let Some(window) = web_sys::window() else {
				return;
			};
			if !alive_anim.load(Ordering::Relaxed) {
				if let Some(mut c) = context_anim.borrow_mut().take() {
					c.state.stop();
				}
				if let Some(cb) = resize_anim.borrow_mut().take() {
					let _ = window
						.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
				debug!("graph: view unmounted, animation stopped");
				return;
			}

			if let Some(ref mut c) = *context_anim.borrow_mut() {
				c.state.tick(0.016);
				render::render(&c.state, &ctx, &c.scale, &c.theme);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Scene changes swap the simulation in place.
	let context_scene = context.clone();
	Effect::new(move |_| {
		let next = scene.get();
		let event = match *context_scene.borrow_mut() {
			Some(ref mut c) if c.state.scene != next => c.state.replace_scene(next),
			_ => None,
		};
		emit(event);
	});

	let context_sel = context.clone();
	Effect::new(move |_| {
		let current = selected.get();
		if let Some(ref mut c) = *context_sel.borrow_mut() {
			c.state.sync_selection(current.as_ref());
		}
	});

	on_cleanup(move || alive.store(false, Ordering::Relaxed));

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = canvas_point(&canvas, ev.client_x(), ev.client_y());
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.state.pointer_down(x, y, &c.scale);
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = canvas_point(&canvas, ev.client_x(), ev.client_y());
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			c.state.pointer_move(x, y, &c.scale);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = canvas_point(&canvas, ev.client_x(), ev.client_y());
		let event = match *context_mu.borrow_mut() {
			Some(ref mut c) => c.state.pointer_up(x, y, &c.scale),
			None => None,
		};
		emit(event);
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.pointer_leave();
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = canvas_point(&canvas, ev.client_x(), ev.client_y());
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			c.state.controller.wheel((x, y), ev.delta_y());
		}
	};

	// Last two-finger spread while pinching.
	let pinch: Rc<Cell<Option<f64>>> = Rc::new(Cell::new(None));

	let (context_ts, pinch_ts) = (context.clone(), pinch.clone());
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let points = touch_points(&ev.touches());
		let mut guard = context_ts.borrow_mut();
		let Some(c) = guard.as_mut() else {
			return;
		};
		match points.as_slice() {
			[(cx, cy)] => {
				let (x, y) = canvas_point(&canvas, *cx, *cy);
				c.state.pointer_move(x, y, &c.scale);
				c.state.pointer_down(x, y, &c.scale);
			}
			_ => {
				// A second finger turns any single-finger gesture into a pinch.
				c.state.pointer_leave();
				pinch_ts.set(pinch_geometry(&canvas, &points).map(|(_, spread)| spread));
			}
		}
	};

	let (context_tm, pinch_tm) = (context.clone(), pinch.clone());
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let points = touch_points(&ev.touches());
		let mut guard = context_tm.borrow_mut();
		let Some(c) = guard.as_mut() else {
			return;
		};
		if let Some((center, spread)) = pinch_geometry(&canvas, &points) {
			if let Some(last) = pinch_tm.get() {
				c.state.controller.pinch(center, spread / last);
			}
			pinch_tm.set(Some(spread));
		} else if let [(cx, cy)] = points.as_slice() {
			let (x, y) = canvas_point(&canvas, *cx, *cy);
			c.state.pointer_move(x, y, &c.scale);
		}
	};

	let (context_te, pinch_te) = (context.clone(), pinch);
	let on_touchend = move |ev: TouchEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if pinch_te.get().is_some() {
			if ev.touches().length() < 2 {
				pinch_te.set(None);
			}
			return;
		}
		let Some((cx, cy)) = touch_points(&ev.changed_touches()).first().copied() else {
			return;
		};
		let (x, y) = canvas_point(&canvas, cx, cy);
		let event = match *context_te.borrow_mut() {
			Some(ref mut c) => {
				let event = c.state.pointer_up(x, y, &c.scale);
				c.state.pointer_leave();
				event
			}
			None => None,
		};
		emit(event);
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}

/// Schema view: labels as nodes, relationships as selectable links, the
/// ontology hierarchy as dashed overlays and health issues as badges.
#[component]
pub fn SchemaGraphCanvas(
	#[prop(into)] schema: Signal<GraphSchema>,
	#[prop(into, default = Signal::stored(Ontology::default()))] ontology: Signal<Ontology>,
	#[prop(into, default = Signal::stored(Vec::new()))] health_issues: Signal<Vec<HealthIssue>>,
	#[prop(into, default = Signal::stored(None))] selected: Signal<Option<SelectedElement>>,
	#[prop(into, default = None)] on_select: Option<Callback<Option<SelectedElement>>>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let scene = Memo::new(move |_| {
		schema.with(|s| {
			ontology.with(|o| health_issues.with(|issues| Scene::from_schema(s, o, issues)))
		})
	});

	view! {
		<ForceGraphCanvas
			scene=scene
			selected=selected
			on_select=on_select
			width=width
			height=height
		/>
	}
}

/// Data view: generated instances colored by label. Colors stay stable
/// across regenerations for labels seen before.
#[component]
pub fn DataGraphCanvas(
	#[prop(into)] data: Signal<SimulatedGraph>,
	#[prop(into, default = Signal::stored(None))] selected: Signal<Option<SelectedElement>>,
	#[prop(into, default = None)] on_select: Option<Callback<Option<SelectedElement>>>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let categories = StoredValue::new(CategoryScale::default());
	let scene = Memo::new(move |_| {
		data.with(|d| {
			categories
				.try_update_value(|scale| Scene::from_simulated(d, scale))
				.unwrap_or_default()
		})
	});

	view! {
		<ForceGraphCanvas
			scene=scene
			selected=selected
			on_select=on_select
			width=width
			height=height
		/>
	}
}
