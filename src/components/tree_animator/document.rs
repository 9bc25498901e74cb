//! Page-level diagram description, as embedded in the host page.

use serde::Deserialize;
use thiserror::Error;

use super::steps::{StepIssue, StepSequence};
use super::theme::TreeConfig;
use super::types::{Tree, TreeNode};

/// Everything needed to render one narrated diagram.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagramDocument {
	/// Heading shown above the timeline.
	pub title: Option<String>,
	/// Lead paragraph under the title.
	pub description: Option<String>,
	/// Positioned nodes; edges follow from their parents.
	pub nodes: Vec<TreeNode>,
	/// What happens at each playback position.
	pub steps: StepSequence,
	/// Style overrides; [`TreeConfig::default`] when absent.
	pub config: Option<TreeConfig>,
	/// One entry per playback position; missing entries get a placeholder.
	pub step_descriptions: Vec<String>,
	/// Start playing as soon as the diagram scrolls into view.
	pub auto_play: bool,
	/// URL of a pre-drawn SVG to play below the tree, if any.
	pub svg_diagram: Option<String>,
}

/// Why a diagram could not be loaded.
#[derive(Debug, Error)]
pub enum DiagramError {
	/// Not running in a browser page.
	#[error("browser window or document is unavailable")]
	NoDocument,
	/// The data element is missing.
	#[error("no element with id `{0}`")]
	MissingElement(String),
	/// The data element exists but is not a `<script>`.
	#[error("element `{0}` is not a <script>")]
	NotAScript(String),
	/// The script element has no readable text.
	#[error("could not read the text of `{0}`")]
	Unreadable(String),
	/// The JSON does not describe a diagram.
	#[error("invalid diagram data: {0}")]
	Parse(#[from] serde_json::Error),
	/// The request itself failed, or its body could not be read.
	#[error("failed to load diagram: {0}")]
	Fetch(String),
	/// The server answered with a non-success status.
	#[error("failed to load SVG: {0}")]
	Http(String),
	/// The body parsed without an `<svg>` root.
	#[error("invalid SVG file")]
	InvalidSvg,
}

impl DiagramDocument {
	/// Parses a document from its JSON text.
	pub fn from_json(text: &str) -> Result<Self, DiagramError> {
		Ok(serde_json::from_str(text)?)
	}

	/// Authoring problems in the node list and step sequence.
	pub fn validate(&self) -> Vec<StepIssue> {
		self.steps.validate(&Tree::new(self.nodes.clone()))
	}
}
