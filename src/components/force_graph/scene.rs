//! Renderable scene derived from domain data.
//!
//! A [`Scene`] is rebuilt whenever its inputs change. It owns the node and
//! link sets the simulation and renderer index into, the annotation badges
//! joined from health issues, and the selection event each element emits
//! when clicked.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::theme::{Color, NodePalette};
use super::types::{
	GraphSchema, HealthIssue, IssueTarget, Ontology, SelectedElement, Severity, SimulatedGraph,
};
use super::variant::ViewVariant;

/// A marker attached to a node or link.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
	pub severity: Severity,
	pub message: String,
}

/// Whether a link is part of the domain graph or drawn on top of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkCategory {
	/// Relationship from the domain data. Solid and selectable.
	Structural,
	/// Informational edge such as an "is a" hierarchy. Dashed, never selectable.
	Overlay,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
	pub id: String,
	pub label: String,
	/// Category color. `None` uses the theme's node fill.
	pub color: Option<Color>,
	pub annotations: Vec<Annotation>,
	pub tooltip: Option<String>,
	/// Event emitted when the node is clicked.
	pub selection: SelectedElement,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneLink {
	pub id: String,
	/// Index into [`Scene::nodes`].
	pub source: usize,
	/// Index into [`Scene::nodes`].
	pub target: usize,
	pub label: Option<String>,
	pub category: LinkCategory,
	pub annotations: Vec<Annotation>,
	/// Event emitted when the link is clicked. Always `None` for overlays.
	pub selection: Option<SelectedElement>,
}

impl SceneNode {
	/// Annotation messages joined for display.
	pub fn annotation_text(&self) -> Option<String> {
		join_messages(&self.annotations)
	}

	/// Highest severity among the node's annotations.
	pub fn badge(&self) -> Option<Severity> {
		self.annotations.iter().map(|a| a.severity).max()
	}
}

impl SceneLink {
	pub fn is_selectable(&self) -> bool {
		self.selection.is_some()
	}

	pub fn badge(&self) -> Option<Severity> {
		self.annotations.iter().map(|a| a.severity).max()
	}

	/// Whether the link touches node `idx`.
	pub fn touches(&self, idx: usize) -> bool {
		self.source == idx || self.target == idx
	}
}

fn join_messages(annotations: &[Annotation]) -> Option<String> {
	if annotations.is_empty() {
		return None;
	}
	Some(
		annotations
			.iter()
			.map(|a| a.message.as_str())
			.collect::<Vec<_>>()
			.join("\n"),
	)
}

/// A reference to a rendered element by id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementRef {
	Node(String),
	Link(String),
}

/// Assigns palette colors to category labels in first-seen order.
///
/// Kept alive across regenerations so a label keeps its color.
#[derive(Clone, Debug, Default)]
pub struct CategoryScale {
	palette: NodePalette,
	domain: Vec<String>,
}

impl CategoryScale {
	pub fn new(palette: NodePalette) -> Self {
		Self {
			palette,
			domain: Vec::new(),
		}
	}

	/// Color for `label`, or `None` when the palette is empty.
	pub fn color(&mut self, label: &str) -> Option<Color> {
		let idx = match self.domain.iter().position(|l| l == label) {
			Some(idx) => idx,
			None => {
				self.domain.push(label.to_string());
				self.domain.len() - 1
			}
		};
		self.palette.get(idx)
	}
}

/// Renderable node and link sets for one graph snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	pub variant: ViewVariant,
	pub nodes: Vec<SceneNode>,
	pub links: Vec<SceneLink>,
	node_index: HashMap<String, usize>,
	link_index: HashMap<String, usize>,
}

impl Scene {
	fn empty(variant: ViewVariant) -> Self {
		Self {
			variant,
			..Self::default()
		}
	}

	/// Add a node unless one with the same id already exists.
	fn push_node(&mut self, node: SceneNode) -> bool {
		if self.node_index.contains_key(&node.id) {
			debug!("scene: duplicate node id {:?} dropped", node.id);
			return false;
		}
		self.node_index.insert(node.id.clone(), self.nodes.len());
		self.nodes.push(node);
		true
	}

	/// Add a link between two node ids. Links with a missing endpoint are
	/// dropped and `false` is returned. A repeated id is still drawn, but id
	/// lookups keep resolving to the first link that used it.
	fn push_link(
		&mut self,
		id: String,
		source: &str,
		target: &str,
		label: Option<String>,
		category: LinkCategory,
		selection: Option<SelectedElement>,
	) -> bool {
		let (Some(&source), Some(&target)) =
			(self.node_index.get(source), self.node_index.get(target))
		else {
			return false;
		};
		let next = self.links.len();
		self.link_index.entry(id.clone()).or_insert(next);
		self.links.push(SceneLink {
			id,
			source,
			target,
			label,
			category,
			annotations: Vec::new(),
			selection,
		});
		true
	}

	/// Build the schema view scene: one node per label, one structural link
	/// per relationship, one overlay link per hierarchy edge, and health
	/// issues joined as annotations.
	pub fn from_schema(schema: &GraphSchema, ontology: &Ontology, issues: &[HealthIssue]) -> Self {
		let mut scene = Self::empty(ViewVariant::Schema);

		for node in &schema.nodes {
			scene.push_node(SceneNode {
				id: node.label.clone(),
				label: node.label.clone(),
				color: None,
				annotations: Vec::new(),
				tooltip: None,
				selection: SelectedElement::Node {
					id: node.label.clone(),
				},
			});
		}

		let mut dropped = 0;
		for rel in &schema.relationships {
			let added = scene.push_link(
				rel.id.clone(),
				&rel.source,
				&rel.target,
				Some(rel.kind.clone()),
				LinkCategory::Structural,
				Some(SelectedElement::Relationship { id: rel.id.clone() }),
			);
			if !added {
				dropped += 1;
			}
		}

		for h in &ontology.hierarchies {
			let added = scene.push_link(
				format!("hierarchy_{}_{}", h.subclass, h.superclass),
				&h.subclass,
				&h.superclass,
				Some("is a".to_string()),
				LinkCategory::Overlay,
				None,
			);
			if !added {
				dropped += 1;
			}
		}

		if dropped > 0 {
			debug!("scene: dropped {dropped} link(s) with unresolved endpoints");
		}

		scene.annotate(issues);
		scene
	}

	/// Build the data view scene from generated instances, coloring nodes
	/// by label through `categories`.
	pub fn from_simulated(data: &SimulatedGraph, categories: &mut CategoryScale) -> Self {
		let mut scene = Self::empty(ViewVariant::Data);

		for node in &data.nodes {
			let props = serde_json::to_string_pretty(&node.properties).unwrap_or_default();
			scene.push_node(SceneNode {
				id: node.id.clone(),
				label: node.label.clone(),
				color: categories.color(&node.label),
				annotations: Vec::new(),
				tooltip: Some(format!("{} #{}\n{}", node.label, node.id, props)),
				selection: SelectedElement::SimulatedNode { data: node.clone() },
			});
		}

		let mut seen: HashMap<String, usize> = HashMap::new();
		let mut dropped = 0;
		for link in &data.links {
			let base = format!("{}_{}_{}", link.source, link.kind, link.target);
			let count = seen.entry(base.clone()).or_insert(0);
			let id = if *count == 0 {
				base
			} else {
				format!("{base}#{count}")
			};
			*count += 1;

			let added = scene.push_link(
				id,
				&link.source,
				&link.target,
				Some(link.kind.clone()),
				LinkCategory::Structural,
				Some(SelectedElement::SimulatedLink { data: link.clone() }),
			);
			if !added {
				dropped += 1;
			}
		}

		if dropped > 0 {
			debug!("scene: dropped {dropped} data link(s) with unresolved endpoints");
		}

		scene
	}

	fn annotate(&mut self, issues: &[HealthIssue]) {
		for issue in issues {
			let annotation = Annotation {
				severity: issue.severity,
				message: issue.message.clone(),
			};
			match issue.target {
				IssueTarget::Node => {
					if let Some(&idx) = self.node_index.get(&issue.id) {
						self.nodes[idx].annotations.push(annotation);
					}
				}
				IssueTarget::Relationship => {
					for link in self
						.links
						.iter_mut()
						.filter(|l| l.category == LinkCategory::Structural && l.id == issue.id)
					{
						link.annotations.push(annotation.clone());
					}
				}
			}
		}
	}

	pub fn node_index(&self, id: &str) -> Option<usize> {
		self.node_index.get(id).copied()
	}

	pub fn link_index(&self, id: &str) -> Option<usize> {
		self.link_index.get(id).copied()
	}

	pub fn structural_links(&self) -> impl Iterator<Item = &SceneLink> {
		self.links
			.iter()
			.filter(|l| l.category == LinkCategory::Structural)
	}

	pub fn overlay_links(&self) -> impl Iterator<Item = &SceneLink> {
		self.links
			.iter()
			.filter(|l| l.category == LinkCategory::Overlay)
	}

	/// Node index pairs for every link, in link order.
	pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
		self.links.iter().map(|l| (l.source, l.target))
	}

	/// Nodes sharing a link with `idx`, plus `idx` itself.
	pub fn neighbors(&self, idx: usize) -> HashSet<usize> {
		let mut set = HashSet::from([idx]);
		for link in &self.links {
			if link.source == idx {
				set.insert(link.target);
			} else if link.target == idx {
				set.insert(link.source);
			}
		}
		set
	}

	/// Indices of links with `idx` as an endpoint.
	pub fn incident_links(&self, idx: usize) -> HashSet<usize> {
		self.links
			.iter()
			.enumerate()
			.filter(|(_, l)| l.touches(idx))
			.map(|(i, _)| i)
			.collect()
	}

	/// Whether `element` is rendered in this scene.
	pub fn contains(&self, element: &ElementRef) -> bool {
		match element {
			ElementRef::Node(id) => self.node_index.contains_key(id),
			ElementRef::Link(id) => self.link_index.contains_key(id),
		}
	}

	/// Map an externally held selection to the element it refers to.
	pub fn resolve(&self, selection: &SelectedElement) -> Option<ElementRef> {
		match selection {
			SelectedElement::Node { id } => self
				.node_index(id)
				.filter(|&i| self.nodes[i].selection == *selection)
				.map(|_| ElementRef::Node(id.clone())),
			SelectedElement::Relationship { id } => self
				.link_index(id)
				.filter(|&i| self.links[i].selection.as_ref() == Some(selection))
				.map(|_| ElementRef::Link(id.clone())),
			SelectedElement::SimulatedNode { data } => self
				.node_index(&data.id)
				.filter(|&i| self.nodes[i].selection == *selection)
				.map(|_| ElementRef::Node(data.id.clone())),
			SelectedElement::SimulatedLink { .. } => self
				.links
				.iter()
				.find(|l| l.selection.as_ref() == Some(selection))
				.map(|l| ElementRef::Link(l.id.clone())),
		}
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn link_count(&self) -> usize {
		self.links.len()
	}
}
