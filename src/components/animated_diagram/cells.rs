//! Cell ids and reveal groups of a pre-drawn SVG diagram.
//!
//! Exported diagrams tag their elements with `data-cell-id="<kind>-<name>-<sequence>-<group>"`,
//! e.g. `edge-static-1-3`. Elements sharing the trailing group number appear
//! together; groups appear in ascending numeric order.

use std::collections::BTreeSet;

/// A parsed `data-cell-id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellId {
	/// Element kind, e.g. `node` or `edge`.
	pub kind: String,
	/// Free-form element name.
	pub name: String,
	/// Position of the element within its export.
	pub sequence: String,
	/// Reveal group, kept as written so it can be matched against the attribute.
	pub group: String,
}

impl CellId {
	/// Parses `<word>-<word>-<digits>-<digits>`; anything else is not a cell.
	pub fn parse(raw: &str) -> Option<Self> {
		let parts: Vec<&str> = raw.split('-').collect();
		let [kind, name, sequence, group] = parts.as_slice() else {
			return None;
		};
		let is_word = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_');
		let is_number = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
		if !(is_word(kind) && is_word(name) && is_number(sequence) && is_number(group)) {
			return None;
		}
		Some(Self {
			kind: kind.to_string(),
			name: name.to_string(),
			sequence: sequence.to_string(),
			group: group.to_string(),
		})
	}

	/// Edges draw on along their paths instead of fading in.
	pub fn is_edge(&self) -> bool {
		self.kind == "edge"
	}
}

/// A fetched diagram: its markup and the order its groups are revealed in.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgDiagram {
	/// Serialized `<svg>` element.
	pub markup: String,
	/// Distinct group labels, ascending by number.
	pub groups: Vec<String>,
}

impl SvgDiagram {
	/// Collects the reveal groups named by `cell_ids`; ids that are not cells are ignored.
	pub fn new<I, S>(markup: impl Into<String>, cell_ids: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut by_number = BTreeSet::new();
		for cell in cell_ids.into_iter().filter_map(|raw| CellId::parse(raw.as_ref())) {
			// Digit strings too long for u64 sort last.
			let number = cell.group.parse::<u64>().unwrap_or(u64::MAX);
			by_number.insert((number, cell.group));
		}
		Self {
			markup: markup.into(),
			groups: by_number.into_iter().map(|(_, group)| group).collect(),
		}
	}

	/// A diagram without groups is shown as-is, with no sequencing.
	pub fn is_static(&self) -> bool {
		self.groups.is_empty()
	}
}

/// One CSS property assignment.
pub type StyleProp = (&'static str, String);

/// Styles applied to every cell before playback starts.
pub fn hidden_cell() -> Vec<StyleProp> {
	vec![("opacity", "0".into())]
}

/// Parks an edge path fully "undrawn": one dash as long as the path, offset by
/// its whole length, with no transition so the reset is instant.
pub fn undrawn_path(length: f64) -> Vec<StyleProp> {
	vec![
		("stroke-dasharray", length.to_string()),
		("stroke-dashoffset", length.to_string()),
		("opacity", "1".into()),
		("transition", "none".into()),
	]
}

/// Slides the dash offset back to zero over `duration_ms`.
pub fn drawn_path(duration_ms: u32) -> Vec<StyleProp> {
	vec![
		("transition", format!("stroke-dashoffset {duration_ms}ms")),
		("stroke-dashoffset", "0".into()),
	]
}

/// Fades a cell (or one of its shapes) in over `duration_ms`.
pub fn faded_in(duration_ms: u32) -> Vec<StyleProp> {
	vec![
		("transition", format!("opacity {duration_ms}ms")),
		("opacity", "1".into()),
	]
}
