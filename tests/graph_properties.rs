//! Property-based invariant tests for the graph views.
//!
//! These hold for **any** schema, ontology and pointer sequence:
//!
//! 1. Structural links never outnumber relationships, with equality iff
//!    every endpoint exists.
//! 2. An overlay link exists iff both hierarchy endpoints exist.
//! 3. Hovering a node highlights exactly its closed neighborhood.
//! 4. Releasing a dragged node leaves it unpinned.
//! 5. Clicking a structural link selects it; overlays never select.
//! 6. Clicking background clears the selection.

// Test target links every lib dep, silence noisy lint.
#![allow(unused_crate_dependencies)]

use proptest::prelude::*;
use schema_graph_view::components::force_graph::interaction::{
	InteractionController, PointerTarget, SelectionEvent, ViewTransform,
};
use schema_graph_view::components::force_graph::scene::{LinkCategory, Scene};
use schema_graph_view::components::force_graph::simulation::Simulation;
use schema_graph_view::components::force_graph::state::{Element, HighlightState};
use schema_graph_view::components::force_graph::types::{
	GraphSchema, Hierarchy, NodeLabel, Ontology, RelationshipType, SelectedElement,
};
use schema_graph_view::parse_payload;

// ── Helpers ─────────────────────────────────────────────────────────────

const POOL: usize = 8;

fn name(i: usize) -> String {
	format!("L{i}")
}

/// Which pool labels exist, relationship endpoints and hierarchy pairs.
fn graph_strategy()
-> impl Strategy<Value = (Vec<bool>, Vec<(usize, usize)>, Vec<(usize, usize)>)> {
	(
		proptest::collection::vec(any::<bool>(), POOL),
		proptest::collection::vec((0..POOL, 0..POOL), 0..12),
		proptest::collection::vec((0..POOL, 0..POOL), 0..6),
	)
}

/// Relationship ids repeat once there are more than four relationships.
fn build(present: &[bool], rels: &[(usize, usize)], hier: &[(usize, usize)]) -> Scene {
	let schema = GraphSchema {
		nodes: (0..POOL)
			.filter(|&i| present[i])
			.map(|i| NodeLabel {
				label: name(i),
				..NodeLabel::default()
			})
			.collect(),
		relationships: rels
			.iter()
			.enumerate()
			.map(|(n, &(s, t))| RelationshipType {
				id: format!("R{}", n % 4),
				kind: "REL".into(),
				source: name(s),
				target: name(t),
				..RelationshipType::default()
			})
			.collect(),
	};
	let ontology = Ontology {
		hierarchies: hier
			.iter()
			.map(|&(a, b)| Hierarchy {
				subclass: name(a),
				superclass: name(b),
			})
			.collect(),
		axioms: Vec::new(),
	};
	Scene::from_schema(&schema, &ontology, &[])
}

fn simulation(scene: &Scene) -> Simulation {
	Simulation::new(
		scene.node_count(),
		scene.edges(),
		scene.variant.config().simulation,
	)
}

// ═════════════════════════════════════════════════════════════════════════
// 1–2. Link filtering
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn structural_links_bounded_by_relationships((present, rels, hier) in graph_strategy()) {
		let scene = build(&present, &rels, &hier);
		let structural = scene.structural_links().count();
		let resolvable = rels.iter().filter(|&&(s, t)| present[s] && present[t]).count();

		prop_assert!(structural <= rels.len());
		prop_assert_eq!(structural, resolvable);
		prop_assert_eq!(structural == rels.len(), resolvable == rels.len());
		prop_assert_eq!(scene.node_count(), present.iter().filter(|&&p| p).count());
	}

	#[test]
	fn overlay_iff_both_endpoints_exist((present, rels, hier) in graph_strategy()) {
		// Every hierarchy pair listed twice.
		let doubled: Vec<_> = hier.iter().chain(hier.iter()).copied().collect();
		let scene = build(&present, &rels, &doubled);
		for &(a, b) in &hier {
			let listed = doubled.iter().filter(|&&pair| pair == (a, b)).count();
			let rendered = scene
				.overlay_links()
				.filter(|l| scene.nodes[l.source].id == name(a) && scene.nodes[l.target].id == name(b))
				.count();
			let expected = if present[a] && present[b] { listed } else { 0 };
			prop_assert_eq!(rendered, expected, "{} is a {}", name(a), name(b));
		}
		for link in scene.overlay_links() {
			prop_assert!(link.selection.is_none());
		}
	}
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Hover neighborhood
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn hover_highlights_exact_neighborhood(
		(present, rels, hier) in graph_strategy(),
		pick in any::<prop::sample::Index>(),
	) {
		let scene = build(&present, &rels, &hier);
		prop_assume!(scene.node_count() > 0);
		let hovered = pick.index(scene.node_count());
		let dimmed = scene.variant.config().dimmed_opacity;

		let mut highlight = HighlightState::default();
		highlight.set_hover(Some(hovered), &scene);

		for idx in 0..scene.node_count() {
			let adjacent = idx == hovered
				|| scene.links.iter().any(|l| {
					(l.source == hovered && l.target == idx)
						|| (l.target == hovered && l.source == idx)
				});
			let expected = if adjacent { 1.0 } else { dimmed };
			prop_assert_eq!(highlight.target_opacity(Element::Node(idx), dimmed), expected);
		}
		for (idx, link) in scene.links.iter().enumerate() {
			let expected = if link.touches(hovered) { 1.0 } else { dimmed };
			prop_assert_eq!(highlight.target_opacity(Element::Link(idx), dimmed), expected);
		}

		highlight.set_hover(None, &scene);
		for idx in 0..scene.node_count() {
			prop_assert_eq!(highlight.target_opacity(Element::Node(idx), dimmed), 1.0);
		}
	}
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Drag release
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn released_node_is_unpinned(
		(present, rels, hier) in graph_strategy(),
		pick in any::<prop::sample::Index>(),
		to in (-500.0f64..500.0, -500.0f64..500.0),
	) {
		let scene = build(&present, &rels, &hier);
		prop_assume!(scene.node_count() > 0);
		let node = pick.index(scene.node_count());
		let mut sim = simulation(&scene);
		let mut ctl = InteractionController::new(ViewTransform::default());

		let (nx, ny) = sim.position(node).unwrap();
		ctl.pointer_down((nx, ny), PointerTarget::Node(node), &mut sim);
		ctl.pointer_move(to, PointerTarget::Background, &mut sim);
		sim.step();
		prop_assert!(sim.bodies()[node].is_pinned());

		ctl.pointer_up(PointerTarget::Background, &scene, &mut sim);
		prop_assert!(!sim.bodies()[node].is_pinned());
		prop_assert_eq!(sim.alpha_target(), 0.0);
		prop_assert_eq!(ctl.dragged(), None);
	}
}

// ═════════════════════════════════════════════════════════════════════════
// 5–6. Click selection
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn link_clicks_follow_category(
		(present, rels, hier) in graph_strategy(),
		pick in any::<prop::sample::Index>(),
	) {
		let scene = build(&present, &rels, &hier);
		prop_assume!(scene.link_count() > 0);
		let idx = pick.index(scene.link_count());
		let link = &scene.links[idx];
		let mut sim = simulation(&scene);
		let mut ctl = InteractionController::new(ViewTransform::default());

		ctl.pointer_down((0.0, 0.0), PointerTarget::Link(idx), &mut sim);
		let event = ctl.pointer_up(PointerTarget::Link(idx), &scene, &mut sim);

		match link.category {
			LinkCategory::Structural => prop_assert_eq!(
				event,
				Some(SelectionEvent::Selected(SelectedElement::Relationship {
					id: link.id.clone()
				}))
			),
			LinkCategory::Overlay => prop_assert_eq!(event, None),
		}

		ctl.pointer_down((0.0, 0.0), PointerTarget::Background, &mut sim);
		let event = ctl.pointer_up(PointerTarget::Background, &scene, &mut sim);
		prop_assert_eq!(event, Some(SelectionEvent::Cleared));
		prop_assert!(ctl.selected().is_none());
	}
}

// ═════════════════════════════════════════════════════════════════════════
// End-to-end from a JSON payload
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn payload_to_selection() {
	let payload = parse_payload(
		r#"{
			"schema": {
				"nodes": [{"label": "User"}, {"label": "Post"}],
				"relationships": [
					{"id": "User_WROTE_Post", "type": "WROTE", "source": "User", "target": "Post"},
					{"id": "User_LIKES_Comment", "type": "LIKES", "source": "User", "target": "Comment"}
				]
			},
			"healthIssues": [{"id": "User", "type": "node", "message": "No unique key"}]
		}"#,
	)
	.unwrap();
	let scene = Scene::from_schema(&payload.schema, &payload.ontology, &payload.health_issues);
	assert_eq!(scene.node_count(), 2);
	assert_eq!(scene.structural_links().count(), 1);
	assert_eq!(
		scene.nodes[0].annotation_text().as_deref(),
		Some("No unique key")
	);

	let mut sim = simulation(&scene);
	let mut ctl = InteractionController::new(ViewTransform::default());
	ctl.pointer_down((0.0, 0.0), PointerTarget::Link(0), &mut sim);
	let event = ctl
		.pointer_up(PointerTarget::Link(0), &scene, &mut sim)
		.and_then(SelectionEvent::into_selection);
	let json = serde_json::to_value(&event).unwrap();
	assert_eq!(
		json,
		serde_json::json!({"type": "relationship", "id": "User_WROTE_Post"})
	);

	ctl.pointer_down((0.0, 0.0), PointerTarget::Background, &mut sim);
	let event = ctl
		.pointer_up(PointerTarget::Background, &scene, &mut sim)
		.and_then(SelectionEvent::into_selection);
	assert_eq!(serde_json::to_value(&event).unwrap(), serde_json::Value::Null);
}
