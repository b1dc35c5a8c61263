//! Force-directed graph views for graph schemas and generated instance data.
//!
//! Renders an interactive force-directed graph on an HTML canvas with:
//! - A d3-style layout simulation with alpha cooling and drag pinning
//! - Pan, zoom (wheel and pinch), node dragging and click-to-select
//! - Smooth hover highlighting of a node's neighborhood
//! - Hierarchy overlays, health-issue badges and hover tooltips
//!
//! # Example
//!
//! ```ignore
//! use schema_graph_view::{GraphSchema, SchemaGraphCanvas, SelectedElement};
//!
//! let (selected, set_selected) = signal(None::<SelectedElement>);
//! view! {
//!     <SchemaGraphCanvas
//!         schema=schema
//!         selected=selected
//!         on_select=Callback::new(move |sel| set_selected.set(sel))
//!     />
//! }
//! ```

mod component;
pub mod interaction;
mod render;
pub mod scale;
pub mod scene;
pub mod simulation;
pub mod state;
pub mod theme;
pub mod types;
pub mod variant;

pub use component::{DataGraphCanvas, ForceGraphCanvas, SchemaGraphCanvas};
pub use scene::{CategoryScale, Scene};
pub use theme::Theme;
pub use types::{
	GraphPayload, GraphSchema, HealthIssue, Ontology, SelectedElement, SimulatedGraph,
};
pub use variant::ViewVariant;
