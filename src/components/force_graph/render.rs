//! Canvas rendering for the graph views.
//!
//! Draws in passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Links, arrowheads and link labels (world space)
//! 3. Nodes, node labels and annotation badges (world space)
//! 4. Hover tooltip (screen space)

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaleConfig, ScaledValues};
use super::scene::{LinkCategory, SceneLink, SceneNode};
use super::state::{Element, ForceGraphState};
use super::theme::{Color, Theme};
use super::types::Severity;

/// Attempt to smooth values that would otherwise cause abrupt visual changes.
fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// Renders the complete graph to the canvas.
pub fn render(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let transform = state.controller.transform;
	let scale = ScaledValues::new(config, transform.k);

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);

	draw_links(state, ctx, &scale, theme);
	draw_nodes(state, ctx, &scale, theme);

	ctx.restore();

	draw_tooltip(state, ctx, config, theme);
}

fn draw_background(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (cx, cy) = (state.width / 2.0, state.height / 2.0);
	let gradient = theme
		.background
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, state.width.max(state.height) * 0.8)
				.ok()
		})
		.flatten();

	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&theme.background.color.to_css()),
	}

	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

/// Opacity of an element after hover dimming, eased.
fn element_opacity(state: &ForceGraphState, el: Element) -> f64 {
	let dimmed = state.config.dimmed_opacity;
	let raw = state.highlight.opacity(el, dimmed);
	// Ease between dimmed and full so transitions start and end softly.
	let t = ((raw - dimmed) / (1.0 - dimmed)).clamp(0.0, 1.0);
	dimmed + (1.0 - dimmed) * smooth_step(t)
}

fn draw_links(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let selected = state.selected_link();

	for (idx, link) in state.scene.links.iter().enumerate() {
		let opacity = state.config.link_opacity * element_opacity(state, Element::Link(idx));
		draw_link(state, ctx, scale, theme, link, opacity, selected == Some(idx));
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	if state.config.link_labels && scale.label_alpha > 0.01 {
		for (idx, link) in state.scene.links.iter().enumerate() {
			let opacity = element_opacity(state, Element::Link(idx)) * scale.label_alpha;
			draw_link_label(state, ctx, scale, theme, link, opacity);
		}
	}
}

fn draw_link(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	link: &SceneLink,
	opacity: f64,
	selected: bool,
) {
	let (x1, y1) = state.position(link.source);
	let (x2, y2) = state.position(link.target);
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = dx.hypot(dy);
	let radius = state.config.node_radius;
	if dist < radius * 2.0 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);

	let (color, width) = match link.category {
		LinkCategory::Structural => (
			theme.link.structural_color,
			state
				.config
				.link_width
				.unwrap_or(theme.link.structural_width),
		),
		LinkCategory::Overlay => (theme.link.overlay_color, theme.link.overlay_width),
	};

	let arrow = if state.config.arrows && link.category == LinkCategory::Structural {
		scale.arrow_size
	} else {
		0.0
	};

	if selected {
		ctx.set_stroke_style_str(&theme.selection.color.to_css());
		ctx.set_line_width(theme.selection.width);
	} else {
		ctx.set_stroke_style_str(&color.fade(opacity).to_css());
		ctx.set_line_width(width);
	}

	if link.category == LinkCategory::Overlay {
		let (dash, gap) = theme.link.overlay_dash;
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
	} else {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}

	ctx.begin_path();
	ctx.move_to(x1 + ux * radius, y1 + uy * radius);
	ctx.line_to(x2 - ux * (radius + arrow), y2 - uy * (radius + arrow));
	ctx.stroke();

	if arrow > 0.0 && scale.arrow_alpha > 0.0 {
		let fill = if selected {
			theme.selection.color
		} else {
			color.fade(opacity * scale.arrow_alpha)
		};
		ctx.set_fill_style_str(&fill.to_css());

		let (tip_x, tip_y) = (x2 - ux * radius, y2 - uy * radius);
		let (back_x, back_y) = (tip_x - ux * arrow, tip_y - uy * arrow);
		let (px, py) = (-uy * arrow * 0.5, ux * arrow * 0.5);

		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}

	if state.config.badges {
		if let Some(severity) = link.badge() {
			let (mx, my) = ((x1 + x2) / 2.0, (y1 + y2) / 2.0);
			let r = scale.badge_radius * 0.8;
			// Offset sideways so the badge clears the link label.
			let (bx, by) = (mx + uy * r * 2.0, my - ux * r * 2.0);
			draw_badge(ctx, theme, severity, bx, by, r, opacity);
		}
	}
}

fn draw_link_label(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	link: &SceneLink,
	opacity: f64,
) {
	let Some(label) = link.label.as_deref() else {
		return;
	};
	let (x1, y1) = state.position(link.source);
	let (x2, y2) = state.position(link.target);
	let (mx, my) = ((x1 + x2) / 2.0, (y1 + y2) / 2.0);

	ctx.set_font(&scale.link_label_font);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	let width = ctx
		.measure_text(label)
		.map(|m| m.width())
		.unwrap_or(label.len() as f64 * scale.link_label_size * 0.6);
	let pad = scale.label_padding;
	let height = scale.link_label_size;

	ctx.set_fill_style_str(&theme.link.label_background.fade(opacity * 0.85).to_css());
	ctx.fill_rect(
		mx - width / 2.0 - pad,
		my - height / 2.0 - pad,
		width + pad * 2.0,
		height + pad * 2.0,
	);

	let color = match link.category {
		LinkCategory::Structural => theme.link.label_color,
		LinkCategory::Overlay => theme.link.overlay_label_color,
	};
	ctx.set_fill_style_str(&color.fade(opacity).to_css());
	let _ = ctx.fill_text(label, mx, my);
}

fn draw_nodes(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let selected = state.selected_node();
	let radius = state.config.node_radius;

	for (idx, node) in state.scene.nodes.iter().enumerate() {
		let (x, y) = state.position(idx);
		let opacity = element_opacity(state, Element::Node(idx));

		draw_node(ctx, theme, node, x, y, radius, opacity);

		if selected == Some(idx) {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + theme.selection.width / 2.0, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&theme.selection.color.to_css());
			ctx.set_line_width(theme.selection.width);
			ctx.stroke();
		}

		if state.config.node_labels && scale.label_alpha > 0.01 {
			ctx.set_font(&scale.node_label_font);
			ctx.set_text_align("center");
			ctx.set_text_baseline("middle");
			ctx.set_fill_style_str(
				&theme
					.node
					.label_color
					.fade(opacity * scale.label_alpha)
					.to_css(),
			);
			let _ = ctx.fill_text(&node.label, x, y);
		}

		if state.config.badges {
			if let Some(severity) = node.badge() {
				let offset = radius * std::f64::consts::FRAC_1_SQRT_2;
				draw_badge(ctx, theme, severity, x + offset, y - offset, scale.badge_radius, opacity);
			}
		}
	}
}

fn draw_node(
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	node: &SceneNode,
	x: f64,
	y: f64,
	radius: f64,
	opacity: f64,
) {
	ctx.set_global_alpha(opacity);

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);

	let fill = node.color.unwrap_or(theme.node.fill);
	let gradient = (theme.node.use_gradient && node.color.is_some())
		.then(|| {
			ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius)
				.ok()
		})
		.flatten();
	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &fill.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(0.7, &fill.to_css());
			let _ = gradient.add_color_stop(1.0, &fill.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&fill.to_css()),
	}
	ctx.fill();

	if theme.node.stroke_width > 0.0 {
		let stroke = node.color.map_or(theme.node.stroke, |c| c.darken(0.3));
		ctx.set_stroke_style_str(&stroke.to_css());
		ctx.set_line_width(theme.node.stroke_width);
		ctx.stroke();
	}

	ctx.set_global_alpha(1.0);
}

fn badge_color(theme: &Theme, severity: Severity) -> Color {
	match severity {
		Severity::Info => theme.badge.info,
		Severity::Warning => theme.badge.warning,
		Severity::Error => theme.badge.error,
	}
}

fn draw_badge(
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	severity: Severity,
	x: f64,
	y: f64,
	r: f64,
	opacity: f64,
) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, r, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&badge_color(theme, severity).fade(opacity).to_css());
	ctx.fill();

	ctx.set_font(&format!("bold {}px sans-serif", r * 1.4));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str(&theme.badge.glyph_color.fade(opacity).to_css());
	let _ = ctx.fill_text("!", x, y + r * 0.05);
}

/// Text shown for the element under the pointer, if any.
fn tooltip_text(state: &ForceGraphState) -> Option<String> {
	if !state.config.tooltips || state.controller.is_panning() {
		return None;
	}
	if let Some(idx) = state.controller.hovered() {
		let node = state.scene.nodes.get(idx)?;
		return node.tooltip.clone().or_else(|| node.annotation_text());
	}
	let link = state.scene.links.get(state.hovered_link?)?;
	let text = link.annotations.iter().map(|a| a.message.as_str()).collect::<Vec<_>>();
	(!text.is_empty()).then(|| text.join("\n"))
}

fn draw_tooltip(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let (Some(text), Some((px, py))) = (tooltip_text(state), state.pointer) else {
		return;
	};
	let tooltip = &config.tooltip;

	ctx.set_font(&format!("{}px monospace", tooltip.font_size));
	ctx.set_text_align("left");
	ctx.set_text_baseline("top");

	let lines: Vec<&str> = text.lines().collect();
	let text_width = lines
		.iter()
		.map(|line| {
			ctx.measure_text(line)
				.map(|m| m.width())
				.unwrap_or(line.len() as f64 * tooltip.font_size * 0.6)
		})
		.fold(0.0, f64::max)
		.min(tooltip.max_width);

	let w = text_width + tooltip.padding * 2.0;
	let h = lines.len() as f64 * tooltip.line_height + tooltip.padding * 2.0;

	// Flip to the other side of the pointer near the canvas edges.
	let mut x = px + tooltip.offset.0;
	if x + w > state.width {
		x = (px - tooltip.offset.0 - w).max(0.0);
	}
	let mut y = py + tooltip.offset.1;
	if y + h > state.height {
		y = (py - tooltip.offset.1 - h).max(0.0);
	}

	ctx.set_fill_style_str(&theme.tooltip.background.to_css());
	ctx.fill_rect(x, y, w, h);
	ctx.set_stroke_style_str(&theme.tooltip.border.to_css());
	ctx.set_line_width(1.0);
	ctx.stroke_rect(x, y, w, h);

	ctx.set_fill_style_str(&theme.tooltip.text.to_css());
	for (i, line) in lines.iter().enumerate() {
		let _ = ctx.fill_text_with_max_width(
			line,
			x + tooltip.padding,
			y + tooltip.padding + i as f64 * tooltip.line_height,
			tooltip.max_width,
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn smooth_step_endpoints() {
		assert_eq!(smooth_step(0.0), 0.0);
		assert_eq!(smooth_step(1.0), 1.0);
		assert_eq!(smooth_step(0.5), 0.5);
	}
}
