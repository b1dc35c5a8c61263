//! Graph data structures consumed and emitted by the graph views.
//!
//! Inputs mirror the JSON produced by the schema inference and data
//! generation services. The only output is [`SelectedElement`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A typed property on a node label or relationship type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

/// A node type in the schema. The label doubles as the node id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeLabel {
	pub label: String,
	#[serde(default)]
	pub properties: Vec<Property>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

/// A directed relationship type between two node labels.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipType {
	/// Unique id, conventionally `Source_TYPE_Target`.
	pub id: String,
	#[serde(rename = "type")]
	pub kind: String,
	/// Source node label.
	pub source: String,
	/// Target node label.
	pub target: String,
	#[serde(default)]
	pub properties: Vec<Property>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

/// The editable domain schema.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSchema {
	#[serde(default)]
	pub nodes: Vec<NodeLabel>,
	#[serde(default)]
	pub relationships: Vec<RelationshipType>,
}

/// An "is a" edge from a subclass label to its superclass label.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hierarchy {
	pub subclass: String,
	pub superclass: String,
}

/// A domain rule. Carried with the ontology but never drawn.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Axiom {
	pub source: String,
	pub relationship: String,
	pub target: String,
}

/// Ontology overlay for the schema view.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ontology {
	#[serde(default)]
	pub hierarchies: Vec<Hierarchy>,
	#[serde(default)]
	pub axioms: Vec<Axiom>,
}

/// Which kind of schema element a health issue refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueTarget {
	Node,
	Relationship,
}

/// Severity of a health issue. Ordered from least to most severe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	Info,
	#[default]
	Warning,
	Error,
}

/// A health-check finding attached to a node or relationship by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthIssue {
	/// Node label or relationship id.
	pub id: String,
	#[serde(rename = "type")]
	pub target: IssueTarget,
	pub message: String,
	#[serde(default)]
	pub severity: Severity,
}

/// A generated data record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulatedNode {
	pub id: String,
	pub label: String,
	#[serde(default)]
	pub properties: Map<String, Value>,
}

/// A generated relationship instance between two data records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulatedLink {
	pub source: String,
	pub target: String,
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub properties: Map<String, Value>,
}

/// A generated instance graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulatedGraph {
	#[serde(default)]
	pub nodes: Vec<SimulatedNode>,
	#[serde(default)]
	pub links: Vec<SimulatedLink>,
}

/// Everything the demo page hands to the views.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPayload {
	#[serde(default)]
	pub schema: GraphSchema,
	#[serde(default)]
	pub ontology: Ontology,
	#[serde(default)]
	pub health_issues: Vec<HealthIssue>,
	#[serde(default)]
	pub simulated: Option<SimulatedGraph>,
}

/// The element a view reports as selected.
///
/// A selection event is `Option<SelectedElement>`; `None` clears the
/// selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SelectedElement {
	Node { id: String },
	Relationship { id: String },
	SimulatedNode { data: SimulatedNode },
	SimulatedLink { data: SimulatedLink },
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn selection_serializes_with_kebab_tag() {
		let sel = SelectedElement::Relationship {
			id: "User_WROTE_Post".into(),
		};
		let json = serde_json::to_value(&sel).unwrap();
		assert_eq!(
			json,
			serde_json::json!({ "type": "relationship", "id": "User_WROTE_Post" })
		);

		let node = SelectedElement::SimulatedNode {
			data: SimulatedNode {
				id: "3".into(),
				label: "User".into(),
				properties: Map::new(),
			},
		};
		let json = serde_json::to_value(&node).unwrap();
		assert_eq!(json["type"], "simulated-node");
		assert_eq!(json["data"]["label"], "User");
	}

	#[test]
	fn payload_defaults_missing_sections() {
		let payload: GraphPayload = serde_json::from_str(
			r#"{
				"schema": {
					"nodes": [{ "label": "User", "properties": [{ "name": "name", "type": "String" }] }],
					"relationships": []
				},
				"healthIssues": [{ "id": "User", "type": "node", "message": "No key" }]
			}"#,
		)
		.unwrap();

		assert_eq!(payload.schema.nodes.len(), 1);
		assert_eq!(payload.schema.nodes[0].properties[0].kind, "String");
		assert!(payload.ontology.hierarchies.is_empty());
		assert_eq!(payload.health_issues[0].target, IssueTarget::Node);
		assert_eq!(payload.health_issues[0].severity, Severity::Warning);
		assert!(payload.simulated.is_none());
	}
}
