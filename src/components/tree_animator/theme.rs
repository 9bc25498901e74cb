//! Visual configuration for the tree animator.
//!
//! A [`TreeConfig`] is a read-only style lookup table: per-type node sizes and
//! colors with a mandatory `default` fallback, text box colors, animation
//! timing, and the scene defaults used when steps leave something unspecified.
//! Every section deserializes from camelCase JSON and may be omitted.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use super::types::Point;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity, 0.0 to 1.0.
	pub a: f64,
}

/// A color string that could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid color `{0}`")]
pub struct ColorError(pub String);

impl Color {
	/// An opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// A color with opacity `a`.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// The same color at opacity `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// `#rrggbb` when opaque, `rgba(...)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_css())
	}
}

/// Parses hex (`#RGB`, `#RRGGBB`) and `rgb()`/`rgba()` functional notation.
impl FromStr for Color {
	type Err = ColorError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let err = || ColorError(s.to_string());
		let s = s.trim();

		if let Some(hex) = s.strip_prefix('#') {
			// from_str_radix alone would let a leading `+` through.
			if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
				return Err(err());
			}
			let channel = |h: &str| u8::from_str_radix(h, 16).map_err(|_| err());
			return match hex.len() {
				6 => Ok(Color::rgb(
					channel(&hex[0..2])?,
					channel(&hex[2..4])?,
					channel(&hex[4..6])?,
				)),
				3 => {
					let short = |h: &str| channel(h).map(|v| v * 17);
					Ok(Color::rgb(
						short(&hex[0..1])?,
						short(&hex[1..2])?,
						short(&hex[2..3])?,
					))
				}
				_ => Err(err()),
			};
		}

		let body = s
			.strip_prefix("rgba(")
			.or_else(|| s.strip_prefix("rgb("))
			.and_then(|rest| rest.strip_suffix(')'))
			.ok_or_else(err)?;
		let parts: Vec<&str> = body.split(',').map(str::trim).collect();
		if !(3..=4).contains(&parts.len()) {
			return Err(err());
		}
		let channel = |p: &str| p.parse::<u8>().map_err(|_| err());
		let a = match parts.get(3) {
			Some(p) => p.parse::<f64>().map_err(|_| err())?.clamp(0.0, 1.0),
			None => 1.0,
		};
		Ok(Color::rgba(
			channel(parts[0])?,
			channel(parts[1])?,
			channel(parts[2])?,
			a,
		))
	}
}

impl TryFrom<String> for Color {
	type Error = ColorError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

/// Per-type lookup with a mandatory fallback.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TypeStyles<T> {
	/// Used for untyped nodes and types without an entry.
	pub default: T,
	/// Entries keyed by node type.
	#[serde(flatten)]
	pub by_type: HashMap<String, T>,
}

impl<T> TypeStyles<T> {
	/// Only the fallback.
	pub fn new(default: T) -> Self {
		Self {
			default,
			by_type: HashMap::new(),
		}
	}

	/// Adds or replaces the entry for `kind`.
	pub fn with(mut self, kind: &str, value: T) -> Self {
		self.by_type.insert(kind.to_string(), value);
		self
	}

	/// The entry for `kind`, falling back to `default` for unknown or missing types.
	pub fn resolve(&self, kind: Option<&str>) -> &T {
		kind.and_then(|k| self.by_type.get(k))
			.unwrap_or(&self.default)
	}
}

/// Node fill colors. `highlighted` overrides the type lookup.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NodeColors {
	/// Fill for untyped nodes and types without an entry.
	pub default: Color,
	/// Fill for any highlighted node.
	pub highlighted: Color,
	/// Fills keyed by node type.
	#[serde(flatten)]
	pub by_type: HashMap<String, Color>,
}

impl NodeColors {
	/// Fill for a node of type `kind`.
	pub fn resolve(&self, kind: Option<&str>, highlighted: bool) -> Color {
		if highlighted {
			return self.highlighted;
		}
		kind.and_then(|k| self.by_type.get(k))
			.copied()
			.unwrap_or(self.default)
	}
}

/// Caption box colors.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TextBoxColors {
	/// Box fill.
	pub background: Color,
	/// Caption text.
	pub text: Color,
	/// Box outline.
	pub border: Color,
}

/// All colors of a diagram.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorConfig {
	/// Node fills.
	pub nodes: NodeColors,
	/// Edge strokes, by the child node's type.
	pub lines: TypeStyles<Color>,
	/// Label text, by node type.
	pub labels: TypeStyles<Color>,
	/// Caption boxes.
	pub text_boxes: TextBoxColors,
}

/// Entrance animation timing, in milliseconds.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationTiming {
	/// Length of a node or edge entrance.
	pub duration: u32,
	/// Added per position in the node list.
	pub stagger_delay: u32,
}

/// Fallbacks for values a diagram's steps may leave out.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneDefaults {
	/// Initial SVG viewBox before any `zoom` step.
	pub view_box: String,
	/// Center of a text box shown without a position.
	pub text_box_position: Point,
	/// Width of a text box shown without one.
	pub text_box_width: f64,
	/// Height of a text box shown without one.
	pub text_box_height: f64,
	/// Auto-advance delay in milliseconds for steps without a `duration`.
	pub auto_play_delay: u64,
}

impl Default for SceneDefaults {
	fn default() -> Self {
		Self {
			view_box: "0 0 300 240".to_string(),
			text_box_position: Point::new(150.0, 120.0),
			text_box_width: 100.0,
			text_box_height: 40.0,
			auto_play_delay: 2000,
		}
	}
}

/// Complete visual configuration for one diagram.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeConfig {
	/// Circle radius by node type.
	pub node_size: TypeStyles<f64>,
	/// Fills, strokes and caption colors.
	pub colors: ColorConfig,
	/// Entrance timing.
	pub animation: AnimationTiming,
	/// Fallbacks for steps.
	pub defaults: SceneDefaults,
}

impl TreeConfig {
	/// White roots, blue children and magenta leaves on a black canvas.
	pub fn default_config() -> Self {
		let white = Color::rgb(255, 255, 255);
		let blue = Color::rgb(92, 124, 250);
		let magenta = Color::rgb(217, 70, 239);
		let typed = |default: Color, root: Color| {
			TypeStyles::new(default)
				.with("root", root)
				.with("child", blue)
				.with("leaf", magenta)
		};

		Self {
			node_size: TypeStyles::new(8.0)
				.with("root", 10.0)
				.with("child", 8.0)
				.with("leaf", 6.0),
			colors: ColorConfig {
				nodes: NodeColors {
					default: white,
					highlighted: Color::rgb(255, 85, 85),
					by_type: typed(white, white).by_type,
				},
				lines: typed(Color::rgb(221, 221, 221), Color::rgb(221, 221, 221)),
				labels: typed(white, white),
				text_boxes: TextBoxColors {
					background: Color::rgba(0, 0, 0, 0.7),
					text: white,
					border: blue,
				},
			},
			animation: AnimationTiming {
				duration: 800,
				stagger_delay: 100,
			},
			defaults: SceneDefaults::default(),
		}
	}

	/// Circle radius for a node of type `kind`.
	pub fn node_radius(&self, kind: Option<&str>) -> f64 {
		*self.node_size.resolve(kind)
	}
}

impl Default for TreeConfig {
	fn default() -> Self {
		Self::default_config()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_css_colors() {
		assert_eq!("#5c7cfa".parse::<Color>(), Ok(Color::rgb(92, 124, 250)));
		assert_eq!("#fff".parse::<Color>(), Ok(Color::rgb(255, 255, 255)));
		assert_eq!("rgba(0, 0, 0, 0.7)".parse::<Color>(), Ok(Color::rgba(0, 0, 0, 0.7)));
		assert_eq!("rgb(1,2,3)".parse::<Color>(), Ok(Color::rgb(1, 2, 3)));
		assert!("tomato".parse::<Color>().is_err());
		assert!("#12345".parse::<Color>().is_err());
	}

	#[test]
	fn hex_rejects_sign_characters() {
		assert!("#+f+f+f".parse::<Color>().is_err());
		assert!("#+ff".parse::<Color>().is_err());
		assert!("#-1-1-1".parse::<Color>().is_err());
		assert_eq!("#AbCdEf".parse::<Color>(), Ok(Color::rgb(0xab, 0xcd, 0xef)));
	}

	#[test]
	fn css_output_drops_opaque_alpha() {
		assert_eq!(Color::rgb(255, 85, 85).to_css(), "#ff5555");
		assert_eq!(
			Color::rgb(255, 85, 85).with_alpha(0.8).to_css(),
			"rgba(255, 85, 85, 0.8)"
		);
	}

	#[test]
	fn unknown_type_falls_back_to_default() {
		let config = TreeConfig::default();
		let nodes = &config.colors.nodes;
		assert_eq!(nodes.resolve(Some("mystery"), false), nodes.default);
		assert_eq!(nodes.resolve(None, false), nodes.default);
		assert_eq!(nodes.resolve(Some("leaf"), false), Color::rgb(217, 70, 239));
		assert_eq!(config.node_radius(Some("mystery")), 8.0);
		assert_eq!(config.node_radius(Some("root")), 10.0);
	}

	#[test]
	fn highlight_overrides_type() {
		let nodes = TreeConfig::default().colors.nodes;
		for kind in [Some("root"), Some("child"), Some("leaf"), Some("other"), None] {
			assert_eq!(nodes.resolve(kind, true), nodes.highlighted);
		}
	}

	#[test]
	fn partial_json_keeps_other_sections() {
		let config: TreeConfig = serde_json::from_value(serde_json::json!({
			"nodeSize": { "default": 5, "root": 12 },
			"animation": { "duration": 400, "staggerDelay": 50 },
			"defaults": { "viewBox": "0 0 600 400" }
		}))
		.unwrap();
		assert_eq!(config.node_radius(Some("root")), 12.0);
		assert_eq!(config.node_radius(Some("leaf")), 5.0);
		assert_eq!(config.animation.stagger_delay, 50);
		assert_eq!(config.defaults.view_box, "0 0 600 400");
		assert_eq!(config.defaults.text_box_position, Point::new(150.0, 120.0));
		assert_eq!(config.colors, TreeConfig::default().colors);
	}

	#[test]
	fn node_colors_from_json() {
		let colors: ColorConfig = serde_json::from_value(serde_json::json!({
			"nodes": { "default": "#ffffff", "highlighted": "#ff5555", "root": "#00ff00" },
			"lines": { "default": "#dddddd" },
			"labels": { "default": "#ffffff" },
			"textBoxes": { "background": "rgba(0, 0, 0, 0.7)", "text": "#fff", "border": "#5c7cfa" }
		}))
		.unwrap();
		assert_eq!(colors.nodes.resolve(Some("root"), false), Color::rgb(0, 255, 0));
		assert!(!colors.nodes.by_type.contains_key("highlighted"));
	}

	#[test]
	fn invalid_color_is_rejected() {
		let result: Result<TextBoxColors, _> = serde_json::from_value(serde_json::json!({
			"background": "nope", "text": "#fff", "border": "#fff"
		}));
		assert!(result.is_err());
	}
}
