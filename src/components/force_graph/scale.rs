//! Zoom-dependent scaling configuration for graph visuals.
//!
//! Node radii and link widths come from the view variant and live in world
//! space. Everything here decides how the remaining decorations (labels,
//! arrowheads, badges, hit tolerances) react to the zoom level `k`.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: The coordinate system of the graph. Values in world-space
//!   scale proportionally with zoom (appear larger when zoomed in).
//! - **Screen-space**: Pixel coordinates on the canvas. Values in screen-space
//!   remain constant regardless of zoom level.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	/// Use `f64::INFINITY` for an unbounded maximum.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// Compute the world-space value for a given base value and zoom level.
	///
	/// The returned value is used directly in world-space drawing commands
	/// (after the canvas transform has been applied).
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => {
				// screen_size = world_size * k
				base.clamp(min_screen / k, max_screen / k)
			}
		}
	}
}

/// Defines how alpha/opacity scales with zoom level.
#[derive(Clone, Debug)]
pub enum AlphaBehavior {
	/// Constant alpha regardless of zoom.
	Constant,
	/// Fully visible at `full_alpha_k`, fades to zero at `zero_alpha_k`.
	Fade {
		zero_alpha_k: f64,
		full_alpha_k: f64,
	},
}

impl AlphaBehavior {
	/// Compute alpha multiplier for a given zoom level.
	pub fn apply(&self, k: f64) -> f64 {
		match self {
			AlphaBehavior::Constant => 1.0,
			AlphaBehavior::Fade {
				zero_alpha_k,
				full_alpha_k,
			} => {
				if zero_alpha_k == full_alpha_k {
					return 1.0;
				}
				let t = (k - zero_alpha_k) / (full_alpha_k - zero_alpha_k);
				t.clamp(0.0, 1.0)
			}
		}
	}
}

/// Node and link label text.
#[derive(Clone, Debug)]
pub struct LabelScaleConfig {
	/// Node label font size in world units.
	pub node_size: f64,
	/// Link label font size in world units.
	pub link_size: f64,
	pub size_behavior: ScaleBehavior,
	/// Labels fade out when zoomed far out.
	pub alpha_behavior: AlphaBehavior,
	/// Padding around link label backgrounds in world units.
	pub padding: f64,
}

/// Link decorations and picking.
#[derive(Clone, Debug)]
pub struct LinkScaleConfig {
	/// Distance from a link within which the pointer hits it, in screen pixels.
	pub hit_tolerance: f64,
	pub hit_behavior: ScaleBehavior,
	/// Arrowhead length in world units.
	pub arrow_size: f64,
	pub arrow_behavior: ScaleBehavior,
	pub arrow_alpha: AlphaBehavior,
}

/// Annotation badges drawn at a node's upper right.
#[derive(Clone, Debug)]
pub struct BadgeScaleConfig {
	/// Badge radius in world units.
	pub radius: f64,
	pub radius_behavior: ScaleBehavior,
}

/// Hover tooltip box, always drawn in screen space.
#[derive(Clone, Debug)]
pub struct TooltipScaleConfig {
	/// Font size in screen pixels.
	pub font_size: f64,
	pub line_height: f64,
	pub padding: f64,
	/// Offset from the pointer anchor in screen pixels.
	pub offset: (f64, f64),
	pub max_width: f64,
}

/// Complete scale configuration for all graph decorations.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub label: LabelScaleConfig,
	pub link: LinkScaleConfig,
	pub badge: BadgeScaleConfig,
	pub tooltip: TooltipScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			label: LabelScaleConfig {
				node_size: 12.0,
				link_size: 10.0,
				size_behavior: ScaleBehavior::Clamped {
					min_screen: 8.0,
					max_screen: 24.0,
				},
				alpha_behavior: AlphaBehavior::Fade {
					zero_alpha_k: 0.25,
					full_alpha_k: 0.5,
				},
				padding: 2.0,
			},
			link: LinkScaleConfig {
				hit_tolerance: 6.0,
				hit_behavior: ScaleBehavior::Screen,
				arrow_size: 10.0,
				arrow_behavior: ScaleBehavior::World,
				arrow_alpha: AlphaBehavior::Constant,
			},
			badge: BadgeScaleConfig {
				radius: 10.0,
				radius_behavior: ScaleBehavior::Clamped {
					min_screen: 6.0,
					max_screen: f64::INFINITY,
				},
			},
			tooltip: TooltipScaleConfig {
				font_size: 12.0,
				line_height: 16.0,
				padding: 8.0,
				offset: (12.0, 12.0),
				max_width: 320.0,
			},
		}
	}
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame and pass it to rendering functions.
/// All sizes are in world-space (ready to use after canvas transform).
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Current zoom level.
	pub k: f64,
	/// Node label font string (e.g., "12px sans-serif").
	pub node_label_font: String,
	pub link_label_font: String,
	pub link_label_size: f64,
	pub label_padding: f64,
	/// Label alpha multiplier [0, 1].
	pub label_alpha: f64,
	/// Link picking tolerance in world-space.
	pub link_hit_tolerance: f64,
	pub arrow_size: f64,
	pub arrow_alpha: f64,
	pub badge_radius: f64,
}

impl ScaledValues {
	/// Compute scaled values from configuration and current zoom level.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let label = &config.label;
		let node_label_size = label.size_behavior.apply(label.node_size, k);
		let link_label_size = label.size_behavior.apply(label.link_size, k);

		Self {
			k,
			node_label_font: format!("{node_label_size}px sans-serif"),
			link_label_font: format!("{link_label_size}px sans-serif"),
			link_label_size,
			label_padding: label.padding,
			label_alpha: label.alpha_behavior.apply(k),
			link_hit_tolerance: config
				.link
				.hit_behavior
				.apply(config.link.hit_tolerance, k),
			arrow_size: config
				.link
				.arrow_behavior
				.apply(config.link.arrow_size, k),
			arrow_alpha: config.link.arrow_alpha.apply(k),
			badge_radius: config
				.badge
				.radius_behavior
				.apply(config.badge.radius, k),
		}
	}
}
