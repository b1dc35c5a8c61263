//! Per-view tuning for the two graph views.
//!
//! The schema view shows a small, readable graph of editable schema elements
//! with hierarchy overlays and health badges. The data view shows a dense
//! read-only graph of generated instances colored by label.

use super::simulation::SimulationParams;

/// Which of the two graph views a scene belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewVariant {
	#[default]
	Schema,
	Data,
}

/// Layout and drawing switches for one view.
#[derive(Clone, Debug)]
pub struct ViewConfig {
	pub simulation: SimulationParams,
	/// Node radius in world units.
	pub node_radius: f64,
	/// Resting link opacity when nothing is hovered.
	pub link_opacity: f64,
	/// Opacity of elements outside the hover neighborhood.
	pub dimmed_opacity: f64,
	pub node_labels: bool,
	pub link_labels: bool,
	pub arrows: bool,
	pub badges: bool,
	/// Show each node's tooltip text while hovered.
	pub tooltips: bool,
	/// Structural link width override in world units.
	pub link_width: Option<f64>,
}

impl ViewVariant {
	pub fn config(self) -> ViewConfig {
		match self {
			ViewVariant::Schema => ViewConfig {
				simulation: SimulationParams {
					link_distance: 200.0,
					charge_strength: -600.0,
					..SimulationParams::default()
				},
				node_radius: 30.0,
				link_opacity: 0.8,
				dimmed_opacity: 0.3,
				node_labels: true,
				link_labels: true,
				arrows: true,
				badges: true,
				tooltips: true,
				link_width: None,
			},
			ViewVariant::Data => ViewConfig {
				simulation: SimulationParams {
					link_distance: 50.0,
					charge_strength: -60.0,
					..SimulationParams::default()
				},
				node_radius: 5.0,
				link_opacity: 0.4,
				dimmed_opacity: 0.3,
				node_labels: false,
				link_labels: false,
				arrows: false,
				badges: false,
				tooltips: true,
				link_width: Some(1.0),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn schema_view_spreads_wider_than_data_view() {
		let schema = ViewVariant::Schema.config();
		let data = ViewVariant::Data.config();
		assert!(schema.simulation.link_distance > data.simulation.link_distance);
		assert!(schema.simulation.charge_strength < data.simulation.charge_strength);
		assert!(schema.node_radius > data.node_radius);
		assert!(schema.badges && !data.badges);
	}
}
