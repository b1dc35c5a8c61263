//! Visual theming for the graph views.
//!
//! Provides colors, the category palette for data graphs, and the style
//! tables the renderer reads from.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Scale the existing alpha by `factor`.
	pub fn fade(self, factor: f64) -> Self {
		Self {
			a: self.a * factor.clamp(0.0, 1.0),
			..self
		}
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// An ordinal color palette for categorical node coloring.
#[derive(Clone, Debug)]
pub struct NodePalette {
	colors: Vec<Color>,
}

impl NodePalette {
	pub fn new(colors: Vec<Color>) -> Self {
		Self { colors }
	}

	/// Tableau 10 categorical scheme.
	pub fn tableau10() -> Self {
		Self {
			colors: vec![
				Color::rgb(78, 121, 167),  // Blue
				Color::rgb(242, 142, 44),  // Orange
				Color::rgb(225, 87, 89),   // Red
				Color::rgb(118, 183, 178), // Teal
				Color::rgb(89, 161, 79),   // Green
				Color::rgb(237, 201, 73),  // Yellow
				Color::rgb(175, 122, 161), // Purple
				Color::rgb(255, 157, 167), // Pink
				Color::rgb(156, 117, 95),  // Brown
				Color::rgb(186, 176, 171), // Gray
			],
		}
	}

	/// Color for ordinal `index`, wrapping around. `None` for an empty palette.
	pub fn get(&self, index: usize) -> Option<Color> {
		if self.colors.is_empty() {
			return None;
		}
		Some(self.colors[index % self.colors.len()])
	}
}

impl Default for NodePalette {
	fn default() -> Self {
		Self::tableau10()
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Secondary color for gradients
	pub color_secondary: Color,
	/// Whether to use radial gradient
	pub use_gradient: bool,
}

/// Node visual style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Fill used when a node has no category color.
	pub fill: Color,
	/// Outline color.
	pub stroke: Color,
	/// Outline width in world units.
	pub stroke_width: f64,
	/// Whether category-colored nodes get a radial gradient.
	pub use_gradient: bool,
	pub label_color: Color,
}

/// Link visual style.
#[derive(Clone, Debug)]
pub struct LinkStyle {
	pub structural_color: Color,
	pub overlay_color: Color,
	/// Structural line width in world units.
	pub structural_width: f64,
	/// Overlay line width in world units.
	pub overlay_width: f64,
	/// Overlay dash pattern (dash, gap) in world units.
	pub overlay_dash: (f64, f64),
	pub label_color: Color,
	pub overlay_label_color: Color,
	pub label_background: Color,
}

/// Stroke used to mark the selected element.
#[derive(Clone, Debug)]
pub struct SelectionStyle {
	pub color: Color,
	/// Stroke width in world units.
	pub width: f64,
}

/// Annotation badge colors.
#[derive(Clone, Debug)]
pub struct BadgeStyle {
	pub info: Color,
	pub warning: Color,
	pub error: Color,
	pub glyph_color: Color,
}

/// Hover tooltip style.
#[derive(Clone, Debug)]
pub struct TooltipStyle {
	pub background: Color,
	pub border: Color,
	pub text: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: BackgroundStyle,
	pub node: NodeStyle,
	pub link: LinkStyle,
	pub selection: SelectionStyle,
	pub badge: BadgeStyle,
	pub tooltip: TooltipStyle,
	pub palette: NodePalette,
}

impl Theme {
	/// Dark slate theme (default)
	pub fn slate() -> Self {
		Self {
			name: "slate",
			background: BackgroundStyle {
				color: Color::rgb(15, 23, 42),
				color_secondary: Color::rgb(22, 32, 54),
				use_gradient: true,
			},
			node: NodeStyle {
				fill: Color::rgb(30, 41, 59),
				stroke: Color::rgb(56, 189, 248),
				stroke_width: 1.5,
				use_gradient: true,
				label_color: Color::rgb(226, 232, 240),
			},
			link: LinkStyle {
				structural_color: Color::rgb(71, 85, 105),
				overlay_color: Color::rgb(100, 116, 139),
				structural_width: 2.0,
				overlay_width: 1.5,
				overlay_dash: (6.0, 3.0),
				label_color: Color::rgb(148, 163, 184),
				overlay_label_color: Color::rgb(203, 213, 225),
				label_background: Color::rgb(15, 23, 42),
			},
			selection: SelectionStyle {
				color: Color::rgb(103, 232, 249),
				width: 4.0,
			},
			badge: BadgeStyle {
				info: Color::rgb(56, 189, 248),
				warning: Color::rgb(245, 158, 11),
				error: Color::rgb(239, 68, 68),
				glyph_color: Color::rgb(0, 0, 0),
			},
			tooltip: TooltipStyle {
				background: Color::rgba(2, 6, 23, 0.92),
				border: Color::rgb(51, 65, 85),
				text: Color::rgb(203, 213, 225),
			},
			palette: NodePalette::tableau10(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::slate()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn css_output_drops_alpha_when_opaque() {
		assert_eq!(Color::rgb(78, 121, 167).to_css(), "#4e79a7");
		assert_eq!(
			Color::rgb(78, 121, 167).with_alpha(0.5).to_css(),
			"rgba(78, 121, 167, 0.5)"
		);
	}

	#[test]
	fn palette_wraps_around() {
		let palette = NodePalette::tableau10();
		assert_eq!(palette.get(0), palette.get(10));
		assert_ne!(palette.get(0), palette.get(1));
	}

	#[test]
	fn empty_palette_has_no_colors() {
		let palette = NodePalette::new(Vec::new());
		assert_eq!(palette.get(0), None);
		assert_eq!(palette.get(7), None);
	}

	#[test]
	fn fade_multiplies_alpha() {
		let c = Color::rgba(1, 2, 3, 0.8).fade(0.5);
		assert!((c.a - 0.4).abs() < 1e-12);
		assert_eq!(Color::rgb(1, 2, 3).fade(2.0).a, 1.0);
	}
}
