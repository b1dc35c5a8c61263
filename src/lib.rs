//! schema-graph-view: Interactive force-directed views of a graph schema and
//! of generated instance data.
//!
//! This crate provides WASM-based canvas components that lay out typed nodes
//! and directed links with a physics simulation, and turn clicks, drags, pans
//! and zooms into selection and highlight state.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::force_graph::{
	DataGraphCanvas, ForceGraphCanvas, GraphPayload, GraphSchema, HealthIssue, Ontology,
	SchemaGraphCanvas, SelectedElement, SimulatedGraph,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("schema-graph: logging initialized");
}

/// Parse a graph payload. Missing sections default to empty.
pub fn parse_payload(json_text: &str) -> Result<GraphPayload, serde_json::Error> {
	serde_json::from_str(json_text)
}

/// Text of the script element with id="graph-data", if present.
fn graph_data_text() -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load the payload from the DOM, falling back to an empty one.
/// Expected format: JSON with { schema, ontology, healthIssues, simulated }.
fn load_graph_payload() -> GraphPayload {
	let Some(json_text) = graph_data_text() else {
		warn!("schema-graph: no #graph-data element, starting empty");
		return GraphPayload::default();
	};

	match parse_payload(&json_text) {
		Ok(payload) => {
			info!(
				"schema-graph: loaded {} labels, {} relationships, {} issues",
				payload.schema.nodes.len(),
				payload.schema.relationships.len(),
				payload.health_issues.len()
			);
			if let Some(data) = &payload.simulated {
				info!(
					"schema-graph: loaded {} instances, {} instance links",
					data.nodes.len(),
					data.links.len()
				);
			}
			payload
		}
		Err(e) => {
			warn!("schema-graph: failed to parse graph data: {}", e);
			GraphPayload::default()
		}
	}
}

/// Side panel showing the selected element as JSON.
#[component]
fn Inspector(selected: RwSignal<Option<SelectedElement>>) -> impl IntoView {
	let details = move || {
		selected.with(|sel| {
			sel.as_ref()
				.and_then(|sel| serde_json::to_string_pretty(sel).ok())
		})
	};

	view! {
		<Show when=move || selected.with(Option::is_some)>
			<aside class="inspector">
				<header>
					<h2>"Selection"</h2>
					<button class="close" on:click=move |_| selected.set(None)>"×"</button>
				</header>
				<pre>{details}</pre>
			</aside>
		</Show>
	}
}

/// Main application component.
/// Loads the payload from the DOM and renders the schema view, the data view
/// when instance data is present, and an inspector for the selection.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let payload = load_graph_payload();
	let has_data = payload.simulated.is_some();

	let schema = RwSignal::new(payload.schema);
	let ontology = RwSignal::new(payload.ontology);
	let health_issues = RwSignal::new(payload.health_issues);
	let simulated = RwSignal::new(payload.simulated.unwrap_or_default());
	let selected = RwSignal::new(None::<SelectedElement>);

	let on_select = Callback::new(move |sel: Option<SelectedElement>| selected.set(sel));

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Graph Schema" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="graph-layout">
			<section class="graph-pane">
				<SchemaGraphCanvas
					schema=schema
					ontology=ontology
					health_issues=health_issues
					selected=selected
					on_select=on_select
				/>
				<div class="graph-overlay">
					<h1>"Schema"</h1>
					<p class="subtitle">"Click to select. Drag nodes to reposition. Scroll to zoom. Drag background to pan."</p>
				</div>
			</section>
			<Show when=move || has_data>
				<section class="graph-pane">
					<DataGraphCanvas data=simulated selected=selected on_select=on_select />
					<div class="graph-overlay">
						<h1>"Simulated data"</h1>
					</div>
				</section>
			</Show>
			<Inspector selected=selected />
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn payload_sections_default_when_missing() {
		let payload = parse_payload(r#"{"schema": {"nodes": [{"label": "User"}]}}"#).unwrap();
		assert_eq!(payload.schema.nodes.len(), 1);
		assert!(payload.ontology.hierarchies.is_empty());
		assert!(payload.health_issues.is_empty());
		assert!(payload.simulated.is_none());
	}

	#[test]
	fn malformed_payload_is_an_error() {
		assert!(parse_payload("{ not json").is_err());
	}
}
