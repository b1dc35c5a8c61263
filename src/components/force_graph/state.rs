//! Per-view graph state and hover highlight tracking.
//!
//! Bundles the scene, its layout simulation and the interaction controller,
//! and keeps highlight intensities for hover effects with smooth transitions.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::interaction::{
	Gesture, InteractionController, PointerTarget, SelectionEvent, ViewTransform,
};
use super::scale::{ScaleConfig, ScaledValues};
use super::scene::{ElementRef, Scene};
use super::simulation::Simulation;
use super::types::SelectedElement;
use super::variant::ViewConfig;

/// A node or link, by index into the current scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Element {
	Node(usize),
	Link(usize),
}

/// Manages smooth highlight transitions with per-element intensity tracking.
///
/// Each element has its own intensity value (0.0 to 1.0) that eases towards
/// 1.0 while it is in the hover neighborhood and back to 0.0 afterwards.
/// A short hold time prevents flashing when the pointer skirts a node edge.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	hovered_node: Option<usize>,
	/// Hovered node, its neighbors and its incident links.
	target_set: HashSet<Element>,
	intensity: HashMap<Element, f64>,
	hold_timer: HashMap<Element, f64>,
	/// Eased 0..1 level of "something is hovered", drives dimming.
	dim: f64,
}

/// Minimum time (seconds) a highlight must be held before it can fade out.
const MIN_HOLD_TIME: f64 = 0.12;

impl HighlightState {
	/// Update the hovered node and recompute the target highlight set.
	pub fn set_hover(&mut self, node: Option<usize>, scene: &Scene) {
		if self.hovered_node == node {
			return;
		}

		self.hovered_node = node;
		self.target_set.clear();

		if let Some(idx) = node {
			self.target_set
				.extend(scene.neighbors(idx).into_iter().map(Element::Node));
			self.target_set
				.extend(scene.incident_links(idx).into_iter().map(Element::Link));

			for &el in &self.target_set {
				self.hold_timer.insert(el, MIN_HOLD_TIME);
			}
		}
	}

	/// Drop all highlight state, e.g. after the scene was replaced.
	pub fn reset(&mut self) {
		*self = Self::default();
	}

	pub fn hovered(&self) -> Option<usize> {
		self.hovered_node
	}

	/// Elements drawn at full opacity while hovering.
	pub fn target_set(&self) -> &HashSet<Element> {
		&self.target_set
	}

	/// Animate intensities towards their targets using exponential smoothing:
	/// `value += (target - value) * (1 - e^(-speed * dt))`.
	pub fn tick(&mut self, dt: f64) {
		const FADE_IN_SPEED: f64 = 6.0;
		const FADE_OUT_SPEED: f64 = 4.0;

		let fade_in = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out = (-FADE_OUT_SPEED * dt).exp();

		for &el in &self.target_set {
			let value = self.intensity.entry(el).or_insert(0.0);
			*value += (1.0 - *value) * fade_in;
		}

		self.hold_timer.retain(|el, timer| {
			if self.target_set.contains(el) {
				true
			} else {
				*timer -= dt;
				*timer > 0.0
			}
		});

		self.intensity.retain(|el, value| {
			if self.target_set.contains(el) {
				return true;
			}
			if self.hold_timer.get(el).copied().unwrap_or(0.0) <= 0.0 {
				*value *= fade_out;
			}
			*value > 0.005
		});

		if self.hovered_node.is_some() {
			self.dim += (1.0 - self.dim) * fade_in;
		} else {
			self.dim *= fade_out;
			if self.dim < 0.005 {
				self.dim = 0.0;
			}
		}
	}

	pub fn intensity(&self, el: Element) -> f64 {
		self.intensity.get(&el).copied().unwrap_or(0.0)
	}

	/// Settled opacity: 1.0 with no hover or inside the neighborhood,
	/// `dimmed` otherwise.
	pub fn target_opacity(&self, el: Element, dimmed: f64) -> f64 {
		if self.hovered_node.is_none() || self.target_set.contains(&el) {
			1.0
		} else {
			dimmed
		}
	}

	/// Animated opacity converging on [`target_opacity`](Self::target_opacity).
	pub fn opacity(&self, el: Element, dimmed: f64) -> f64 {
		let t = self.intensity(el);
		1.0 - (1.0 - dimmed) * self.dim * (1.0 - t)
	}
}

/// Core graph state for one mounted view.
///
/// Created when the view mounts and mutated by pointer handlers and the
/// animation loop. Replacing the scene swaps in a fresh simulation.
pub struct ForceGraphState {
	pub scene: Scene,
	pub simulation: Simulation,
	pub controller: InteractionController,
	pub highlight: HighlightState,
	/// Link under an otherwise idle pointer, for its tooltip.
	pub hovered_link: Option<usize>,
	/// Last pointer position in screen space while over the canvas.
	pub pointer: Option<(f64, f64)>,
	pub config: ViewConfig,
	/// The selection this view currently shows, as emitted or synced.
	selection: Option<SelectedElement>,
	pub width: f64,
	pub height: f64,
	pub time: f64,
}

impl ForceGraphState {
	/// State for `scene` on a `width`×`height` canvas, world origin centered.
	pub fn new(scene: Scene, width: f64, height: f64) -> Self {
		let config = scene.variant.config();
		let simulation = Simulation::new(
			scene.node_count(),
			scene.edges(),
			config.simulation.clone(),
		);
		Self {
			scene,
			simulation,
			controller: InteractionController::new(ViewTransform::centered(width, height)),
			highlight: HighlightState::default(),
			hovered_link: None,
			pointer: None,
			config,
			selection: None,
			width,
			height,
			time: 0.0,
		}
	}

	/// Swap in a new scene. The previous simulation is stopped and dropped,
	/// any gesture is cancelled, and a selection that no longer resolves is
	/// cleared, which is reported back as a [`SelectionEvent::Cleared`].
	pub fn replace_scene(&mut self, scene: Scene) -> Option<SelectionEvent> {
		self.simulation.stop();
		self.config = scene.variant.config();
		self.simulation = Simulation::new(
			scene.node_count(),
			scene.edges(),
			self.config.simulation.clone(),
		);
		self.controller.reset_gesture();
		self.highlight.reset();
		self.hovered_link = None;
		debug!(
			"graph: scene replaced ({} nodes, {} links)",
			scene.node_count(),
			scene.link_count()
		);
		self.scene = scene;

		let resolved = self
			.selection
			.as_ref()
			.map(|sel| self.scene.resolve(sel));
		match resolved {
			Some(None) => {
				self.selection = None;
				self.controller.set_selected(None);
				Some(SelectionEvent::Cleared)
			}
			Some(element) => {
				self.controller.set_selected(element);
				None
			}
			None => None,
		}
	}

	/// Mirror the selection held outside the view. Selections that refer to
	/// nothing in this scene (e.g. an element of another view) clear the
	/// local highlight.
	pub fn sync_selection(&mut self, selected: Option<&SelectedElement>) {
		let resolved = selected.and_then(|sel| self.scene.resolve(sel));
		self.selection = resolved.as_ref().and(selected).cloned();
		self.controller.set_selected(resolved);
	}

	/// Index of the selected node, if a node is selected.
	pub fn selected_node(&self) -> Option<usize> {
		match self.controller.selected()? {
			ElementRef::Node(id) => self.scene.node_index(id),
			ElementRef::Link(_) => None,
		}
	}

	/// Index of the selected link, if a link is selected.
	pub fn selected_link(&self) -> Option<usize> {
		match self.controller.selected()? {
			ElementRef::Link(id) => self.scene.link_index(id),
			ElementRef::Node(_) => None,
		}
	}

	/// World position of node `idx`.
	pub fn position(&self, idx: usize) -> (f64, f64) {
		self.simulation.position(idx).unwrap_or_default()
	}

	/// Hit-test a screen position. Nodes win over links; the topmost
	/// (last drawn) node wins among nodes.
	pub fn target_at(&self, sx: f64, sy: f64, config: &ScaleConfig) -> PointerTarget {
		let transform = &self.controller.transform;
		let (gx, gy) = transform.screen_to_world(sx, sy);
		let scale = ScaledValues::new(config, transform.k);

		let radius = self.config.node_radius;
		for idx in (0..self.scene.node_count()).rev() {
			let (x, y) = self.position(idx);
			if (x - gx).hypot(y - gy) <= radius {
				return PointerTarget::Node(idx);
			}
		}

		let mut best: Option<(usize, f64)> = None;
		for (idx, link) in self.scene.links.iter().enumerate() {
			let d = distance_to_segment(
				(gx, gy),
				self.position(link.source),
				self.position(link.target),
			);
			if d <= scale.link_hit_tolerance && best.is_none_or(|(_, bd)| d < bd) {
				best = Some((idx, d));
			}
		}
		match best {
			Some((idx, _)) => PointerTarget::Link(idx),
			None => PointerTarget::Background,
		}
	}

	/// Press at a screen position.
	pub fn pointer_down(&mut self, sx: f64, sy: f64, config: &ScaleConfig) {
		let target = self.target_at(sx, sy, config);
		self.controller
			.pointer_down((sx, sy), target, &mut self.simulation);
		self.refresh_hover();
	}

	/// Pointer moved to a screen position.
	pub fn pointer_move(&mut self, sx: f64, sy: f64, config: &ScaleConfig) {
		let target = self.target_at(sx, sy, config);
		self.controller
			.pointer_move((sx, sy), target, &mut self.simulation);
		self.pointer = Some((sx, sy));
		self.hovered_link = match (target, self.controller.gesture()) {
			(PointerTarget::Link(idx), Gesture::Idle) => Some(idx),
			_ => None,
		};
		self.refresh_hover();
	}

	/// Release at a screen position. Returns the selection change, if any.
	pub fn pointer_up(&mut self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<SelectionEvent> {
		let target = self.target_at(sx, sy, config);
		let event = self
			.controller
			.pointer_up(target, &self.scene, &mut self.simulation);
		match &event {
			Some(SelectionEvent::Selected(element)) => self.selection = Some(element.clone()),
			Some(SelectionEvent::Cleared) => self.selection = None,
			None => {}
		}
		self.refresh_hover();
		event
	}

	/// Pointer left the canvas.
	pub fn pointer_leave(&mut self) {
		self.controller.pointer_leave(&mut self.simulation);
		self.pointer = None;
		self.hovered_link = None;
		self.refresh_hover();
	}

	fn refresh_hover(&mut self) {
		self.highlight
			.set_hover(self.controller.hovered(), &self.scene);
	}

	/// Advance one animation frame.
	pub fn tick(&mut self, dt: f64) {
		self.simulation.tick();
		self.time += dt;
		self.highlight.tick(dt);
	}

	/// Stop all background work. The state is about to be dropped.
	pub fn stop(&mut self) {
		self.simulation.stop();
	}

	/// Update canvas dimensions after a resize.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

/// Shortest distance from `p` to the segment `a`–`b`.
fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len2 = dx * dx + dy * dy;
	if len2 == 0.0 {
		return (p.0 - a.0).hypot(p.1 - a.1);
	}
	let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0);
	(p.0 - (a.0 + t * dx)).hypot(p.1 - (a.1 + t * dy))
}
