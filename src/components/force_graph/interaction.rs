//! Pointer gesture state machine.
//!
//! Turns pointer, wheel and pinch input into node drags, canvas pans, zoom,
//! hover and click-to-select. Only one gesture is active at a time: a press
//! on a node starts a drag, a press anywhere else starts a pan.

use log::debug;

use super::scene::{ElementRef, Scene};
use super::simulation::Simulation;
use super::types::SelectedElement;

/// Presses that travel less than this many screen pixels count as clicks.
const CLICK_TOLERANCE: f64 = 3.0;

/// Zoom factor bounds.
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;

/// Pan and zoom transform applied to the entire graph view.
///
/// `screen = world * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	/// A transform placing the world origin at the center of a `width`×`height` canvas.
	pub fn centered(width: f64, height: f64) -> Self {
		Self {
			x: width / 2.0,
			y: height / 2.0,
			k: 1.0,
		}
	}

	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(wx * self.k + self.x, wy * self.k + self.y)
	}

	/// Scale by `factor` keeping the world point under `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}
}

/// What lies under the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerTarget {
	Node(usize),
	Link(usize),
	Background,
}

/// The active gesture.
#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
	Idle,
	Hovering(usize),
	Dragging {
		node: usize,
		/// Pointer position at press, screen space.
		origin: (f64, f64),
		/// Node position minus pointer position at press, world space.
		grab_offset: (f64, f64),
		moved: bool,
	},
	Panning {
		/// Pointer position at press, screen space.
		origin: (f64, f64),
		start: ViewTransform,
		pressed: PointerTarget,
		moved: bool,
	},
}

/// Selection change emitted towards the editor/inspector.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectionEvent {
	Selected(SelectedElement),
	Cleared,
}

impl SelectionEvent {
	/// The value handed to the `on_select` callback.
	pub fn into_selection(self) -> Option<SelectedElement> {
		match self {
			SelectionEvent::Selected(element) => Some(element),
			SelectionEvent::Cleared => None,
		}
	}
}

/// Gesture, transform and selection state for one view instance.
#[derive(Clone, Debug)]
pub struct InteractionController {
	gesture: Gesture,
	pub transform: ViewTransform,
	selected: Option<ElementRef>,
}

fn travelled(from: (f64, f64), to: (f64, f64)) -> f64 {
	((to.0 - from.0).powi(2) + (to.1 - from.1).powi(2)).sqrt()
}

impl InteractionController {
	pub fn new(transform: ViewTransform) -> Self {
		Self {
			gesture: Gesture::Idle,
			transform,
			selected: None,
		}
	}

	pub fn gesture(&self) -> &Gesture {
		&self.gesture
	}

	/// Node that drives hover highlighting: the hovered or dragged node.
	pub fn hovered(&self) -> Option<usize> {
		match self.gesture {
			Gesture::Hovering(node) | Gesture::Dragging { node, .. } => Some(node),
			_ => None,
		}
	}

	pub fn dragged(&self) -> Option<usize> {
		match self.gesture {
			Gesture::Dragging { node, .. } => Some(node),
			_ => None,
		}
	}

	pub fn is_panning(&self) -> bool {
		matches!(self.gesture, Gesture::Panning { .. })
	}

	pub fn selected(&self) -> Option<&ElementRef> {
		self.selected.as_ref()
	}

	/// Overwrite the highlighted selection with an externally held value.
	pub fn set_selected(&mut self, selected: Option<ElementRef>) {
		self.selected = selected;
	}

	/// Abandon any gesture, e.g. because the scene it referred to is gone.
	pub fn reset_gesture(&mut self) {
		self.gesture = Gesture::Idle;
	}

	pub fn pointer_down(
		&mut self,
		pos: (f64, f64),
		target: PointerTarget,
		simulation: &mut Simulation,
	) {
		if let Gesture::Dragging { node, .. } = self.gesture {
			simulation.release(node);
		}

		self.gesture = match target {
			PointerTarget::Node(node) => {
				let (wx, wy) = self.transform.screen_to_world(pos.0, pos.1);
				let (nx, ny) = simulation.position(node).unwrap_or((wx, wy));
				simulation.grab(node);
				Gesture::Dragging {
					node,
					origin: pos,
					grab_offset: (nx - wx, ny - wy),
					moved: false,
				}
			}
			pressed => Gesture::Panning {
				origin: pos,
				start: self.transform,
				pressed,
				moved: false,
			},
		};
	}

	pub fn pointer_move(
		&mut self,
		pos: (f64, f64),
		target: PointerTarget,
		simulation: &mut Simulation,
	) {
		match &mut self.gesture {
			Gesture::Dragging {
				node,
				origin,
				grab_offset,
				moved,
			} => {
				*moved |= travelled(*origin, pos) > CLICK_TOLERANCE;
				let (wx, wy) = self.transform.screen_to_world(pos.0, pos.1);
				simulation.pin(*node, wx + grab_offset.0, wy + grab_offset.1);
			}
			Gesture::Panning {
				origin,
				start,
				moved,
				..
			} => {
				*moved |= travelled(*origin, pos) > CLICK_TOLERANCE;
				self.transform.x = start.x + (pos.0 - origin.0);
				self.transform.y = start.y + (pos.1 - origin.1);
			}
			Gesture::Idle | Gesture::Hovering(_) => {
				self.gesture = match target {
					PointerTarget::Node(node) => Gesture::Hovering(node),
					_ => Gesture::Idle,
				};
			}
		}
	}

	/// End the active press. A press that barely moved is a click on what
	/// was pressed, which may emit a selection change.
	pub fn pointer_up(
		&mut self,
		target: PointerTarget,
		scene: &Scene,
		simulation: &mut Simulation,
	) -> Option<SelectionEvent> {
		let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
		let event = match gesture {
			Gesture::Dragging { node, moved, .. } => {
				simulation.release(node);
				if moved {
					None
				} else {
					self.click(PointerTarget::Node(node), scene)
				}
			}
			Gesture::Panning { pressed, moved, .. } => {
				if moved {
					None
				} else {
					self.click(pressed, scene)
				}
			}
			Gesture::Idle | Gesture::Hovering(_) => None,
		};

		if let PointerTarget::Node(node) = target {
			self.gesture = Gesture::Hovering(node);
		}
		event
	}

	/// Pointer left the canvas: drop any gesture and hover.
	pub fn pointer_leave(&mut self, simulation: &mut Simulation) {
		if let Gesture::Dragging { node, .. } = self.gesture {
			simulation.release(node);
		}
		self.gesture = Gesture::Idle;
	}

	/// Wheel zoom about the pointer.
	pub fn wheel(&mut self, pos: (f64, f64), delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.transform.zoom_at(pos.0, pos.1, factor);
	}

	/// Pinch zoom about `center` by the ratio of finger spreads.
	pub fn pinch(&mut self, center: (f64, f64), ratio: f64) {
		if ratio.is_finite() && ratio > 0.0 {
			self.transform.zoom_at(center.0, center.1, ratio);
		}
	}

	fn click(&mut self, target: PointerTarget, scene: &Scene) -> Option<SelectionEvent> {
		let event = match target {
			PointerTarget::Node(idx) => {
				let node = scene.nodes.get(idx)?;
				self.selected = Some(ElementRef::Node(node.id.clone()));
				SelectionEvent::Selected(node.selection.clone())
			}
			PointerTarget::Link(idx) => {
				let link = scene.links.get(idx)?;
				let selection = link.selection.clone()?;
				self.selected = Some(ElementRef::Link(link.id.clone()));
				SelectionEvent::Selected(selection)
			}
			PointerTarget::Background => {
				self.selected = None;
				SelectionEvent::Cleared
			}
		};
		debug!("interaction: {event:?}");
		Some(event)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphSchema, NodeLabel, Ontology, RelationshipType};

	fn scene() -> Scene {
		let schema = GraphSchema {
			nodes: vec![
				NodeLabel {
					label: "User".into(),
					..NodeLabel::default()
				},
				NodeLabel {
					label: "Post".into(),
					..NodeLabel::default()
				},
			],
			relationships: vec![RelationshipType {
				id: "User_WROTE_Post".into(),
				kind: "WROTE".into(),
				source: "User".into(),
				target: "Post".into(),
				..RelationshipType::default()
			}],
		};
		Scene::from_schema(&schema, &Ontology::default(), &[])
	}

	fn sim(scene: &Scene) -> Simulation {
		Simulation::new(
			scene.node_count(),
			scene.edges(),
			crate::components::force_graph::variant::ViewVariant::Schema
				.config()
				.simulation,
		)
	}

	#[test]
	fn transform_roundtrip_and_zoom_anchor() {
		let mut t = ViewTransform::centered(800.0, 600.0);
		assert_eq!(t.screen_to_world(400.0, 300.0), (0.0, 0.0));

		let anchor = t.screen_to_world(100.0, 50.0);
		t.zoom_at(100.0, 50.0, 2.0);
		let (ax, ay) = t.screen_to_world(100.0, 50.0);
		assert!((ax - anchor.0).abs() < 1e-9 && (ay - anchor.1).abs() < 1e-9);

		let (sx, sy) = t.world_to_screen(anchor.0, anchor.1);
		assert!((sx - 100.0).abs() < 1e-9 && (sy - 50.0).abs() < 1e-9);
	}

	#[test]
	fn zoom_is_clamped() {
		let mut t = ViewTransform::default();
		for _ in 0..100 {
			t.zoom_at(0.0, 0.0, 1.1);
		}
		assert_eq!(t.k, MAX_ZOOM);
		for _ in 0..200 {
			t.zoom_at(0.0, 0.0, 0.9);
		}
		assert_eq!(t.k, MIN_ZOOM);
	}

	#[test]
	fn hover_follows_pointer_only_when_idle() {
		let scene = scene();
		let mut sim = sim(&scene);
		let mut ctl = InteractionController::new(ViewTransform::default());

		ctl.pointer_move((0.0, 0.0), PointerTarget::Node(1), &mut sim);
		assert_eq!(ctl.gesture(), &Gesture::Hovering(1));
		ctl.pointer_move((5.0, 0.0), PointerTarget::Background, &mut sim);
		assert_eq!(ctl.gesture(), &Gesture::Idle);

		ctl.pointer_down((5.0, 0.0), PointerTarget::Background, &mut sim);
		ctl.pointer_move((50.0, 0.0), PointerTarget::Node(0), &mut sim);
		assert!(ctl.is_panning());
		assert_eq!(ctl.hovered(), None);
	}

	#[test]
	fn drag_pins_then_releases() {
		let scene = scene();
		let mut sim = sim(&scene);
		let mut ctl = InteractionController::new(ViewTransform::default());
		let (nx, ny) = sim.position(0).unwrap();

		ctl.pointer_down((nx, ny), PointerTarget::Node(0), &mut sim);
		assert_eq!(ctl.dragged(), Some(0));
		assert!(sim.alpha_target() > 0.0);

		ctl.pointer_move((nx + 40.0, ny + 10.0), PointerTarget::Node(0), &mut sim);
		sim.step();
		let (px, py) = sim.position(0).unwrap();
		assert!((px - (nx + 40.0)).abs() < 1e-9 && (py - (ny + 10.0)).abs() < 1e-9);

		let event = ctl.pointer_up(PointerTarget::Node(0), &scene, &mut sim);
		assert_eq!(event, None, "a real drag is not a click");
		assert!(!sim.bodies()[0].is_pinned());
		assert_eq!(sim.alpha_target(), 0.0);
		assert_eq!(ctl.gesture(), &Gesture::Hovering(0));
	}

	#[test]
	fn click_link_then_background() {
		let scene = scene();
		let mut sim = sim(&scene);
		let mut ctl = InteractionController::new(ViewTransform::default());

		ctl.pointer_down((10.0, 10.0), PointerTarget::Link(0), &mut sim);
		let event = ctl.pointer_up(PointerTarget::Link(0), &scene, &mut sim);
		assert_eq!(
			event,
			Some(SelectionEvent::Selected(SelectedElement::Relationship {
				id: "User_WROTE_Post".into()
			}))
		);
		assert_eq!(ctl.selected(), Some(&ElementRef::Link("User_WROTE_Post".into())));

		ctl.pointer_down((300.0, 300.0), PointerTarget::Background, &mut sim);
		let event = ctl.pointer_up(PointerTarget::Background, &scene, &mut sim);
		assert_eq!(event, Some(SelectionEvent::Cleared));
		assert_eq!(event.and_then(SelectionEvent::into_selection), None);
		assert_eq!(ctl.selected(), None);
	}

	#[test]
	fn background_pan_moves_transform_without_selecting() {
		let scene = scene();
		let mut sim = sim(&scene);
		let mut ctl = InteractionController::new(ViewTransform::default());

		ctl.pointer_down((10.0, 10.0), PointerTarget::Background, &mut sim);
		ctl.pointer_move((60.0, -20.0), PointerTarget::Background, &mut sim);
		assert_eq!(ctl.transform.x, 50.0);
		assert_eq!(ctl.transform.y, -30.0);
		assert_eq!(ctl.pointer_up(PointerTarget::Background, &scene, &mut sim), None);
	}

	#[test]
	fn leaving_mid_drag_unpins() {
		let scene = scene();
		let mut sim = sim(&scene);
		let mut ctl = InteractionController::new(ViewTransform::default());

		ctl.pointer_down((0.0, 0.0), PointerTarget::Node(1), &mut sim);
		ctl.pointer_leave(&mut sim);
		assert!(!sim.bodies()[1].is_pinned());
		assert_eq!(ctl.gesture(), &Gesture::Idle);
	}

	#[test]
	fn pinch_ignores_degenerate_ratio() {
		let mut ctl = InteractionController::new(ViewTransform::default());
		ctl.pinch((0.0, 0.0), f64::NAN);
		ctl.pinch((0.0, 0.0), 0.0);
		assert_eq!(ctl.transform.k, 1.0);
		ctl.pinch((0.0, 0.0), 2.0);
		assert_eq!(ctl.transform.k, 2.0);
	}
}
