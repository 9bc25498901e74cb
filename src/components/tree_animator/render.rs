//! Scene primitives for the SVG renderer.
//!
//! Maps node, edge and text box state to drawable shapes: positions, sizes,
//! resolved colors and entrance timing. Nothing here touches the DOM; the
//! component turns these shapes into SVG elements. Style resolution looks up
//! the element's type in the relevant [`TreeConfig`] map, falls back to the
//! map's `default`, and lets the highlighted color win over both.

use super::state::TextBoxState;
use super::theme::{Color, TreeConfig};
use super::types::{Tree, TreeNode, edge_key};

/// Scale applied to a highlighted node's circle.
const HIGHLIGHT_SCALE: f64 = 1.2;
/// Gap between the bottom of a circle and its label baseline.
const LABEL_GAP: f64 = 10.0;
/// Vertical advance between text box lines.
const LINE_HEIGHT: f64 = 12.0;
const TEXT_BOX_FONT_SIZE: f64 = 8.0;
const TEXT_BOX_RADIUS: f64 = 4.0;

/// When and how long an element takes to appear, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entrance {
	pub delay_ms: u32,
	pub duration_ms: u32,
}

/// Text drawn under a node's circle.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelShape {
	pub text: String,
	pub x: f64,
	pub y: f64,
	pub color: Color,
	pub font_size: f64,
	pub entrance: Entrance,
}

/// A node's circle, resolved against the config.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeShape {
	pub id: String,
	pub cx: f64,
	pub cy: f64,
	pub r: f64,
	pub fill: Color,
	/// Ring drawn around highlighted nodes.
	pub stroke: Option<(Color, f64)>,
	pub scale: f64,
	pub visible: bool,
	pub highlighted: bool,
	pub label: Option<LabelShape>,
	pub entrance: Entrance,
}

impl NodeShape {
	/// Inline style animating scale and opacity around the circle's center.
	pub fn style(&self) -> String {
		let (opacity, scale, delay) = if self.visible {
			(1.0, self.scale, self.entrance.delay_ms)
		} else {
			(0.0, 0.0, 0)
		};
		format!(
			"opacity: {opacity}; transform: scale({scale}); transform-box: fill-box; transform-origin: center; \
			 transition: transform {}ms cubic-bezier(0.34, 1.56, 0.64, 1) {delay}ms, opacity 300ms ease {delay}ms;",
			self.entrance.duration_ms
		)
	}

	/// Glow for highlighted nodes.
	pub fn filter(&self) -> Option<String> {
		self.highlighted.then(|| {
			format!(
				"drop-shadow(0 0 4px {})",
				self.stroke.map(|(c, _)| c).unwrap_or(self.fill).to_css()
			)
		})
	}
}

impl LabelShape {
	/// Rises into place after its node, sinks away when hidden.
	pub fn style(&self, visible: bool) -> String {
		if visible {
			format!(
				"opacity: 1; transform: translateY(0); transition: opacity 300ms ease {}ms, transform 300ms ease {}ms;",
				self.entrance.delay_ms, self.entrance.delay_ms
			)
		} else {
			"opacity: 0; transform: translateY(5px); transition: opacity 200ms ease, transform 200ms ease;"
				.to_string()
		}
	}
}

/// Font size used for a node label, by node type.
pub fn label_font_size(kind: Option<&str>) -> f64 {
	match kind {
		Some("root") => 9.0,
		Some("child") => 8.0,
		_ => 7.0,
	}
}

/// Shape of `node`; `index` is its position in the node list and drives stagger.
pub fn node_shape(
	node: &TreeNode,
	visible: bool,
	highlighted: bool,
	show_label: bool,
	config: &TreeConfig,
	index: usize,
) -> NodeShape {
	let kind = node.kind();
	let r = config.node_radius(kind);
	let stagger = config.animation.stagger_delay.saturating_mul(index as u32);
	let highlight = config.colors.nodes.highlighted;

	let label = node.label.as_ref().filter(|_| show_label).map(|text| LabelShape {
		text: text.clone(),
		x: node.x,
		y: node.y + r + LABEL_GAP,
		color: if highlighted {
			highlight
		} else {
			*config.colors.labels.resolve(kind)
		},
		font_size: label_font_size(kind),
		entrance: Entrance {
			delay_ms: 200 + stagger,
			duration_ms: 300,
		},
	});

	NodeShape {
		id: node.id.clone(),
		cx: node.x,
		cy: node.y,
		r,
		fill: config.colors.nodes.resolve(kind, highlighted),
		stroke: highlighted.then(|| (highlight.with_alpha(0.8), 2.0)),
		scale: if highlighted { HIGHLIGHT_SCALE } else { 1.0 },
		visible,
		highlighted,
		label,
		entrance: Entrance {
			delay_ms: 100 + stagger,
			duration_ms: config.animation.duration,
		},
	}
}

/// A parent to child connector.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeShape {
	pub key: String,
	/// SVG path data.
	pub d: String,
	pub stroke: Color,
	pub stroke_width: f64,
	/// Approximate arc length of `d`, used as the dash length for draw-on.
	pub length: f64,
	pub filter: Option<String>,
	pub visible: bool,
	pub entrance: Entrance,
}

impl EdgeShape {
	/// Draws the path on by sliding a single dash the length of the curve.
	pub fn style(&self) -> String {
		let length = self.length.ceil();
		if self.visible {
			format!(
				"stroke-dasharray: {length}; stroke-dashoffset: 0; opacity: 1; \
				 transition: stroke-dashoffset {}ms ease-in-out {}ms, opacity 200ms ease {}ms;{}",
				self.entrance.duration_ms,
				self.entrance.delay_ms,
				self.entrance.delay_ms,
				self.filter
					.as_ref()
					.map(|f| format!(" filter: {f};"))
					.unwrap_or_default()
			)
		} else {
			format!(
				"stroke-dasharray: {length}; stroke-dashoffset: {length}; opacity: 0; \
				 transition: stroke-dashoffset 300ms ease, opacity 300ms ease;"
			)
		}
	}
}

/// S-curve between two nodes: a cubic Bézier whose control points share the
/// horizontal midpoint, leaving the source and entering the target level.
pub fn edge_path(source: &TreeNode, target: &TreeNode) -> String {
	let mx = source.x + (target.x - source.x) * 0.5;
	format!(
		"M {} {} C {} {}, {} {}, {} {}",
		source.x, source.y, mx, source.y, mx, target.y, target.x, target.y
	)
}

/// Length of the [`edge_path`] curve, by summing chords over `segments` samples.
pub fn edge_length(source: &TreeNode, target: &TreeNode, segments: usize) -> f64 {
	let mx = source.x + (target.x - source.x) * 0.5;
	let points = [
		(source.x, source.y),
		(mx, source.y),
		(mx, target.y),
		(target.x, target.y),
	];
	let at = |t: f64| {
		let u = 1.0 - t;
		let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
		(
			a * points[0].0 + b * points[1].0 + c * points[2].0 + d * points[3].0,
			a * points[0].1 + b * points[1].1 + c * points[2].1 + d * points[3].1,
		)
	};
	let segments = segments.max(1);
	let mut prev = at(0.0);
	let mut length = 0.0;
	for i in 1..=segments {
		let next = at(i as f64 / segments as f64);
		length += (next.0 - prev.0).hypot(next.1 - prev.1);
		prev = next;
	}
	length
}

/// Stroke width by the child node's type.
pub fn edge_stroke_width(kind: Option<&str>) -> f64 {
	match kind {
		Some("root") => 2.0,
		Some("child") => 1.5,
		_ => 1.0,
	}
}

/// Shape of the edge into `target`, styled by the target's type.
pub fn edge_shape(
	source: &TreeNode,
	target: &TreeNode,
	visible: bool,
	config: &TreeConfig,
	index: usize,
) -> EdgeShape {
	let kind = target.kind();
	let stroke = *config.colors.lines.resolve(kind);
	let filter = match kind {
		Some("leaf") => Some(format!("drop-shadow(0 0 2px {})", stroke.with_alpha(0.5).to_css())),
		Some("child") => Some(format!("drop-shadow(0 0 1px {})", stroke.with_alpha(0.3).to_css())),
		_ => None,
	};

	EdgeShape {
		key: edge_key(&source.id, &target.id),
		d: edge_path(source, target),
		stroke,
		stroke_width: edge_stroke_width(kind),
		length: edge_length(source, target, 24),
		filter,
		visible,
		entrance: Entrance {
			delay_ms: config.animation.stagger_delay.saturating_mul(index as u32),
			duration_ms: config.animation.duration.saturating_mul(6) / 5,
		},
	}
}

/// A derived edge with both endpoints resolved.
#[derive(Clone, Debug)]
pub struct EdgeConnection<'a> {
	pub source: &'a TreeNode,
	pub target: &'a TreeNode,
	/// Position of the child node in the node list; drives stagger.
	pub index: usize,
}

/// Every parent/child pair whose parent exists, in node order.
pub fn edge_connections(tree: &Tree) -> Vec<EdgeConnection<'_>> {
	tree.nodes()
		.iter()
		.enumerate()
		.filter_map(|(index, target)| {
			let source = tree.node(target.parent_id.as_deref()?)?;
			Some(EdgeConnection {
				source,
				target,
				index,
			})
		})
		.collect()
}

/// One `<tspan>` of a text box.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
	pub text: String,
	pub x: f64,
	/// Offset from the previous line.
	pub dy: f64,
}

/// A caption box, centered on its state's position.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBoxShape {
	pub id: String,
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
	pub rx: f64,
	pub background: Color,
	pub border: Color,
	pub text_color: Color,
	pub text_x: f64,
	pub text_y: f64,
	pub font_size: f64,
	pub lines: Vec<TextLine>,
	pub visible: bool,
}

impl TextBoxShape {
	/// Pops in when shown and fades out when hidden.
	pub fn style(&self) -> String {
		text_box_style(self.visible)
	}
}

/// Transition style for a text box group; also used before a box first appears.
pub fn text_box_style(visible: bool) -> String {
	let (opacity, scale, ms, easing) = if visible {
		(1.0, 1.0, 400, "ease-out")
	} else {
		(0.0, 0.8, 300, "ease")
	};
	format!(
		"opacity: {opacity}; transform: scale({scale}); transform-box: fill-box; transform-origin: center; \
		 transition: opacity {ms}ms {easing}, transform {ms}ms {easing};"
	)
}

/// Rounded box centered on the text box position, one `tspan` per line.
pub fn text_box_shape(id: &str, state: &TextBoxState, config: &TreeConfig) -> TextBoxShape {
	let width = state.width.unwrap_or(config.defaults.text_box_width);
	let height = state.height.unwrap_or(config.defaults.text_box_height);
	let (cx, cy) = (state.position.x, state.position.y);
	let colors = &config.colors.text_boxes;

	TextBoxShape {
		id: id.to_string(),
		x: cx - width / 2.0,
		y: cy - height / 2.0,
		width,
		height,
		rx: TEXT_BOX_RADIUS,
		background: colors.background,
		border: colors.border,
		text_color: colors.text,
		text_x: cx,
		text_y: cy,
		font_size: TEXT_BOX_FONT_SIZE,
		lines: state
			.text
			.split('\n')
			.enumerate()
			.map(|(i, line)| TextLine {
				text: line.to_string(),
				x: cx,
				dy: if i == 0 { 0.0 } else { LINE_HEIGHT },
			})
			.collect(),
		visible: state.visible,
	}
}
