//! Declarative animation steps and their grouping into playback positions.
//!
//! A diagram is narrated by a [`StepSequence`]: a flat list of
//! [`AnimationStep`]s plus an explicit grouping mode. In grouped mode every
//! step carries an integer `step` key and all steps sharing a key form one
//! atomic transition; in positional mode each array entry is its own
//! transition. Playback positions are 0-based in both modes.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use super::types::{Point, Tree, edge_key};

/// What a single step does to the scene.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StepAction {
	/// Make the listed nodes visible.
	ShowNode {
		/// Target node ids.
		node_ids: Vec<String>,
	},
	/// Hide the listed nodes.
	HideNode {
		/// Target node ids.
		node_ids: Vec<String>,
	},
	/// Emphasize the listed nodes.
	HighlightNode {
		/// Target node ids.
		node_ids: Vec<String>,
	},
	/// Drop the emphasis from the listed nodes.
	UnhighlightNode {
		/// Target node ids.
		node_ids: Vec<String>,
	},
	/// Show every node whose type is listed.
	ShowAllNodes {
		/// Node types to match.
		node_types: Vec<String>,
	},
	/// Hide every node whose type is listed.
	HideAllNodes {
		/// Node types to match.
		node_types: Vec<String>,
	},
	/// Draw the edge between two nodes.
	ShowEdge {
		/// Parent end.
		source_node_id: String,
		/// Child end.
		target_node_id: String,
	},
	/// Remove the edge between two nodes.
	HideEdge {
		/// Parent end.
		source_node_id: String,
		/// Child end.
		target_node_id: String,
	},
	/// Show every derived edge whose child node has one of the listed types.
	ShowAllEdges {
		/// Node types to match.
		node_types: Vec<String>,
	},
	/// Remove every derived edge whose child node has one of the listed types.
	HideAllEdges {
		/// Node types to match.
		node_types: Vec<String>,
	},
	/// Show the caption box `id`, replacing any earlier content under that id.
	ShowTextBox {
		/// Text box id.
		id: String,
		/// Caption; lines split on `\n`.
		#[serde(default)]
		text: Option<String>,
		/// Center in diagram space; the scene default when absent.
		#[serde(default)]
		position: Option<Point>,
		/// Box width.
		#[serde(default)]
		width: Option<f64>,
		/// Box height.
		#[serde(default)]
		height: Option<f64>,
	},
	/// Hide the caption box `id`, keeping its content.
	HideTextBox {
		/// Text box id.
		id: String,
	},
	/// Replace the SVG viewBox.
	Zoom {
		/// New `viewBox` value, `"minX minY width height"`.
		view_box: String,
	},
	/// Timing marker only; the step's `duration` holds the auto-advance.
	Pause,
}

fn ids<I, S>(ids: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	ids.into_iter().map(Into::into).collect()
}

impl StepAction {
	/// `showNode` for the given ids.
	pub fn show_nodes<I: IntoIterator<Item = S>, S: Into<String>>(node_ids: I) -> Self {
		Self::ShowNode {
			node_ids: ids(node_ids),
		}
	}

	/// `hideNode` for the given ids.
	pub fn hide_nodes<I: IntoIterator<Item = S>, S: Into<String>>(node_ids: I) -> Self {
		Self::HideNode {
			node_ids: ids(node_ids),
		}
	}

	/// `highlightNode` for the given ids.
	pub fn highlight<I: IntoIterator<Item = S>, S: Into<String>>(node_ids: I) -> Self {
		Self::HighlightNode {
			node_ids: ids(node_ids),
		}
	}

	/// `unhighlightNode` for the given ids.
	pub fn unhighlight<I: IntoIterator<Item = S>, S: Into<String>>(node_ids: I) -> Self {
		Self::UnhighlightNode {
			node_ids: ids(node_ids),
		}
	}

	/// `showEdge` from `source` to `target`.
	pub fn show_edge(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self::ShowEdge {
			source_node_id: source.into(),
			target_node_id: target.into(),
		}
	}

	/// `hideEdge` from `source` to `target`.
	pub fn hide_edge(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self::HideEdge {
			source_node_id: source.into(),
			target_node_id: target.into(),
		}
	}

	/// `showTextBox` with text only, placed at the scene default.
	pub fn show_text(id: impl Into<String>, text: impl Into<String>) -> Self {
		Self::ShowTextBox {
			id: id.into(),
			text: Some(text.into()),
			position: None,
			width: None,
			height: None,
		}
	}

	/// `zoom` to `view_box`.
	pub fn zoom(view_box: impl Into<String>) -> Self {
		Self::Zoom {
			view_box: view_box.into(),
		}
	}

	/// Wire name of the action, as used in JSON.
	pub fn name(&self) -> &'static str {
		match self {
			Self::ShowNode { .. } => "showNode",
			Self::HideNode { .. } => "hideNode",
			Self::HighlightNode { .. } => "highlightNode",
			Self::UnhighlightNode { .. } => "unhighlightNode",
			Self::ShowAllNodes { .. } => "showAllNodes",
			Self::HideAllNodes { .. } => "hideAllNodes",
			Self::ShowEdge { .. } => "showEdge",
			Self::HideEdge { .. } => "hideEdge",
			Self::ShowAllEdges { .. } => "showAllEdges",
			Self::HideAllEdges { .. } => "hideAllEdges",
			Self::ShowTextBox { .. } => "showTextBox",
			Self::HideTextBox { .. } => "hideTextBox",
			Self::Zoom { .. } => "zoom",
			Self::Pause => "pause",
		}
	}
}

/// One entry of a step sequence.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AnimationStep {
	/// What the step does.
	#[serde(flatten)]
	pub action: StepAction,
	/// How long this step holds before auto-advance, in milliseconds.
	#[serde(default)]
	pub duration: Option<u64>,
	/// Extra wait before the step's own animation starts, in milliseconds.
	#[serde(default)]
	pub delay: Option<u64>,
	/// Group key (1-based). Only meaningful in grouped sequences.
	#[serde(default)]
	pub step: Option<u32>,
}

impl AnimationStep {
	/// An ungrouped step with no timing of its own.
	pub fn new(action: StepAction) -> Self {
		Self {
			action,
			duration: None,
			delay: None,
			step: None,
		}
	}

	/// A `pause` holding for `duration_ms`.
	pub fn pause(duration_ms: u64) -> Self {
		Self::new(StepAction::Pause).lasting(duration_ms)
	}

	/// Sets the group key.
	pub fn in_group(mut self, step: u32) -> Self {
		self.step = Some(step);
		self
	}

	/// Sets the hold duration.
	pub fn lasting(mut self, duration_ms: u64) -> Self {
		self.duration = Some(duration_ms);
		self
	}
}

/// Steps together with how they are grouped into playback positions.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "mode", content = "steps", rename_all = "camelCase")]
pub enum StepSequence {
	/// Steps sharing a `step` key apply together, in ascending key order.
	Grouped(Vec<AnimationStep>),
	/// Each step is its own playback position, in array order.
	Positional(Vec<AnimationStep>),
}

impl Default for StepSequence {
	fn default() -> Self {
		Self::Grouped(Vec::new())
	}
}

impl StepSequence {
	/// All steps in authored order, regardless of mode.
	pub fn steps(&self) -> &[AnimationStep] {
		match self {
			Self::Grouped(steps) | Self::Positional(steps) => steps,
		}
	}

	/// No steps at all.
	pub fn is_empty(&self) -> bool {
		self.steps().is_empty()
	}

	/// Distinct group keys in ascending order. Positional sequences have none.
	pub fn group_keys(&self) -> Vec<u32> {
		match self {
			Self::Grouped(steps) => steps
				.iter()
				.filter_map(|s| s.step)
				.collect::<BTreeSet<_>>()
				.into_iter()
				.collect(),
			Self::Positional(_) => Vec::new(),
		}
	}

	/// Number of playback positions.
	pub fn group_count(&self) -> usize {
		match self {
			Self::Grouped(_) => self.group_keys().len(),
			Self::Positional(steps) => steps.len(),
		}
	}

	/// Steps applied at playback position `index`, in array order. Empty when
	/// `index` is out of range.
	pub fn group(&self, index: usize) -> Vec<&AnimationStep> {
		match self {
			Self::Grouped(steps) => match self.group_keys().get(index) {
				Some(&key) => steps.iter().filter(|s| s.step == Some(key)).collect(),
				None => Vec::new(),
			},
			Self::Positional(steps) => steps.get(index).into_iter().collect(),
		}
	}

	/// All groups in playback order.
	pub fn groups(&self) -> Vec<Vec<&AnimationStep>> {
		match self {
			Self::Grouped(steps) => self
				.group_keys()
				.into_iter()
				.map(|key| steps.iter().filter(|s| s.step == Some(key)).collect())
				.collect(),
			Self::Positional(steps) => steps.iter().map(|s| vec![s]).collect(),
		}
	}

	/// Ids of every text box some step shows, sorted.
	pub fn text_box_ids(&self) -> Vec<String> {
		self.steps()
			.iter()
			.filter_map(|s| match &s.action {
				StepAction::ShowTextBox { id, .. } => Some(id.clone()),
				_ => None,
			})
			.collect::<BTreeSet<_>>()
			.into_iter()
			.collect()
	}

	/// How long position `index` holds before auto-advancing: the longest
	/// `duration` in the group, with `default` standing in for steps that
	/// declare none. `None` when there is nothing to apply at `index`.
	pub fn advance_delay(&self, index: usize, default: Duration) -> Option<Duration> {
		self.group(index)
			.iter()
			.map(|s| s.duration.map(Duration::from_millis).unwrap_or(default))
			.max()
	}

	/// Reports authoring mistakes that would otherwise degrade silently to
	/// no-ops at playback time.
	pub fn validate(&self, tree: &Tree) -> Vec<StepIssue> {
		let mut issues = Vec::new();

		for id in tree.duplicate_ids() {
			issues.push(StepIssue::DuplicateNode(id.to_string()));
		}
		for (node, parent) in tree.dangling_parents() {
			issues.push(StepIssue::DanglingParent {
				node: node.id.clone(),
				parent: parent.to_string(),
			});
		}

		let derived: BTreeSet<String> = tree.edges().iter().map(|e| e.key()).collect();
		let grouped = matches!(self, Self::Grouped(_));

		for (index, step) in self.steps().iter().enumerate() {
			match (grouped, step.step) {
				(true, None) => issues.push(StepIssue::MissingGroup { index }),
				(true, Some(0)) => issues.push(StepIssue::ZeroGroup { index }),
				(false, Some(key)) => issues.push(StepIssue::UnexpectedGroup { index, key }),
				_ => {}
			}

			match &step.action {
				StepAction::ShowNode { node_ids }
				| StepAction::HideNode { node_ids }
				| StepAction::HighlightNode { node_ids }
				| StepAction::UnhighlightNode { node_ids } => {
					for id in node_ids.iter().filter(|id| !tree.contains(id)) {
						issues.push(StepIssue::UnknownNode {
							index,
							id: id.clone(),
						});
					}
				}
				StepAction::ShowAllNodes { node_types }
				| StepAction::HideAllNodes { node_types }
				| StepAction::ShowAllEdges { node_types }
				| StepAction::HideAllEdges { node_types } => {
					for kind in node_types
						.iter()
						.filter(|k| tree.nodes_of_kind(k).next().is_none())
					{
						issues.push(StepIssue::UnusedType {
							index,
							kind: kind.clone(),
						});
					}
				}
				StepAction::ShowEdge {
					source_node_id,
					target_node_id,
				}
				| StepAction::HideEdge {
					source_node_id,
					target_node_id,
				} => {
					for id in [source_node_id, target_node_id] {
						if !tree.contains(id) {
							issues.push(StepIssue::UnknownNode {
								index,
								id: id.clone(),
							});
						}
					}
					let key = edge_key(source_node_id, target_node_id);
					if tree.contains(source_node_id)
						&& tree.contains(target_node_id)
						&& !derived.contains(&key)
					{
						issues.push(StepIssue::UnderivedEdge { index, key });
					}
				}
				StepAction::Pause if step.duration.is_none() => {
					issues.push(StepIssue::PauseWithoutDuration { index });
				}
				_ => {}
			}
		}

		issues
	}
}

/// An authoring mistake found by [`StepSequence::validate`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StepIssue {
	/// Two nodes share an id.
	#[error("node id `{0}` is used by more than one node")]
	DuplicateNode(String),
	/// A node's `parentId` matches no node.
	#[error("node `{node}` names missing parent `{parent}`")]
	DanglingParent {
		/// The child.
		node: String,
		/// The id it names.
		parent: String,
	},
	/// A step names a node id that does not exist.
	#[error("step {index} references unknown node `{id}`")]
	UnknownNode {
		/// Position of the step in the authored list.
		index: usize,
		/// The unknown id.
		id: String,
	},
	/// A step names a node type no node has; it selects nothing.
	#[error("step {index} names node type `{kind}` that no node has")]
	UnusedType {
		/// Position of the step in the authored list.
		index: usize,
		/// The unmatched type.
		kind: String,
	},
	/// An edge step targets a pair that is not parent and child, so it never renders.
	#[error("step {index} targets edge `{key}` which is not a parent/child link")]
	UnderivedEdge {
		/// Position of the step in the authored list.
		index: usize,
		/// `"{source}-{target}"`.
		key: String,
	},
	/// A grouped sequence has a step without `step`; it never applies.
	#[error("step {index} has no group key in a grouped sequence")]
	MissingGroup {
		/// Position of the step in the authored list.
		index: usize,
	},
	/// Group keys are 1-based.
	#[error("step {index} uses group key 0; keys start at 1")]
	ZeroGroup {
		/// Position of the step in the authored list.
		index: usize,
	},
	/// A positional sequence carries a group key, which is ignored.
	#[error("step {index} has group key {key} in a positional sequence")]
	UnexpectedGroup {
		/// Position of the step in the authored list.
		index: usize,
		/// The ignored key.
		key: u32,
	},
	/// A `pause` with nothing to hold for.
	#[error("pause at step {index} has no duration")]
	PauseWithoutDuration {
		/// Position of the step in the authored list.
		index: usize,
	},
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::components::tree_animator::types::TreeNode;

	fn tree() -> Tree {
		Tree::new(vec![
			TreeNode::new("root", 0.0, 0.0).with_kind("root"),
			TreeNode::new("child1", 0.0, 0.0).with_parent("root").with_kind("child"),
			TreeNode::new("child2", 0.0, 0.0).with_parent("root").with_kind("child"),
		])
	}

	#[test]
	fn text_box_ids_are_distinct_and_sorted() {
		let seq = StepSequence::Positional(vec![
			AnimationStep::new(StepAction::show_text("note", "first")),
			AnimationStep::new(StepAction::HideTextBox { id: "note".into() }),
			AnimationStep::new(StepAction::show_text("intro", "hello")),
			AnimationStep::new(StepAction::show_text("note", "again")),
			AnimationStep::pause(100),
		]);
		assert_eq!(seq.text_box_ids(), ["intro", "note"]);
	}

	#[test]
	fn deserializes_tagged_steps() {
		let seq: StepSequence = serde_json::from_value(json!({
			"mode": "grouped",
			"steps": [
				{ "type": "zoom", "viewBox": "0 0 600 400", "step": 1 },
				{ "type": "showNode", "nodeIds": ["root"], "step": 1, "duration": 1500 },
				{ "type": "showEdge", "sourceNodeId": "root", "targetNodeId": "child1", "step": 2 },
				{ "type": "showTextBox", "id": "d1", "text": "hello", "position": { "x": 0, "y": 40 }, "width": 140, "step": 2 },
				{ "type": "hideTextBox", "id": "d1", "step": 3 },
				{ "type": "showAllEdges", "nodeTypes": ["child"], "step": 3 },
				{ "type": "pause", "duration": 500, "step": 4 }
			]
		}))
		.unwrap();

		let steps = seq.steps();
		assert_eq!(steps.len(), 7);
		assert_eq!(steps[0].action, StepAction::zoom("0 0 600 400"));
		assert_eq!(steps[1].duration, Some(1500));
		assert_eq!(steps[2].action, StepAction::show_edge("root", "child1"));
		match &steps[3].action {
			StepAction::ShowTextBox {
				position, width, height, ..
			} => {
				assert_eq!(*position, Some(Point::new(0.0, 40.0)));
				assert_eq!(*width, Some(140.0));
				assert_eq!(*height, None);
			}
			other => panic!("unexpected action {other:?}"),
		}
		assert_eq!(steps[6].action, StepAction::Pause);
		assert_eq!(seq.group_count(), 4);
	}

	#[test]
	fn unknown_step_type_is_rejected() {
		let result: Result<AnimationStep, _> =
			serde_json::from_value(json!({ "type": "explode", "step": 1 }));
		assert!(result.is_err());
	}

	#[test]
	fn groups_follow_ascending_keys_not_array_order() {
		let seq = StepSequence::Grouped(vec![
			AnimationStep::new(StepAction::show_nodes(["child1"])).in_group(3),
			AnimationStep::new(StepAction::show_nodes(["root"])).in_group(1),
			AnimationStep::new(StepAction::show_nodes(["child2"])).in_group(3),
		]);
		assert_eq!(seq.group_keys(), [1, 3]);
		assert_eq!(seq.group(0)[0].action, StepAction::show_nodes(["root"]));
		let second: Vec<_> = seq.group(1).iter().map(|s| s.action.clone()).collect();
		assert_eq!(
			second,
			[
				StepAction::show_nodes(["child1"]),
				StepAction::show_nodes(["child2"])
			]
		);
		assert!(seq.group(2).is_empty());
	}

	#[test]
	fn positional_groups_are_single_steps() {
		let seq = StepSequence::Positional(vec![
			AnimationStep::new(StepAction::show_nodes(["root"])),
			AnimationStep::new(StepAction::show_nodes(["child1"])),
		]);
		assert_eq!(seq.group_count(), 2);
		assert_eq!(seq.group(1).len(), 1);
		assert!(seq.group(2).is_empty());
		assert_eq!(seq.groups().len(), 2);
	}

	#[test]
	fn advance_delay_takes_longest_duration() {
		let default = Duration::from_millis(2000);
		let seq = StepSequence::Grouped(vec![
			AnimationStep::new(StepAction::show_nodes(["root"])).in_group(1).lasting(500),
			AnimationStep::new(StepAction::show_nodes(["child1"])).in_group(1),
			AnimationStep::pause(3000).in_group(2),
			AnimationStep::new(StepAction::show_nodes(["child2"])).in_group(2).lasting(100),
		]);
		assert_eq!(seq.advance_delay(0, default), Some(default));
		assert_eq!(seq.advance_delay(1, default), Some(Duration::from_millis(3000)));
		assert_eq!(seq.advance_delay(2, default), None);
	}

	#[test]
	fn validation_flags_authoring_mistakes() {
		let seq = StepSequence::Grouped(vec![
			AnimationStep::new(StepAction::show_nodes(["root", "typo"])).in_group(1),
			AnimationStep::new(StepAction::show_edge("child1", "child2")).in_group(1),
			AnimationStep::new(StepAction::ShowAllEdges {
				node_types: vec!["leaf".into()],
			})
			.in_group(2),
			AnimationStep::new(StepAction::Pause),
		]);
		let issues = seq.validate(&tree());
		assert!(issues.contains(&StepIssue::UnknownNode {
			index: 0,
			id: "typo".into()
		}));
		assert!(issues.contains(&StepIssue::UnderivedEdge {
			index: 1,
			key: "child1-child2".into()
		}));
		assert!(issues.contains(&StepIssue::UnusedType {
			index: 2,
			kind: "leaf".into()
		}));
		assert!(issues.contains(&StepIssue::MissingGroup { index: 3 }));
		assert!(issues.contains(&StepIssue::PauseWithoutDuration { index: 3 }));
		assert_eq!(issues.len(), 5);
	}

	#[test]
	fn clean_sequence_validates() {
		let seq = StepSequence::Grouped(vec![
			AnimationStep::new(StepAction::show_nodes(["root"])).in_group(1),
			AnimationStep::new(StepAction::show_nodes(["child1", "child2"])).in_group(2),
			AnimationStep::new(StepAction::show_edge("root", "child1")).in_group(2),
		]);
		assert!(seq.validate(&tree()).is_empty());
	}

	#[test]
	fn positional_sequence_rejects_group_keys() {
		let seq = StepSequence::Positional(vec![
			AnimationStep::new(StepAction::show_nodes(["root"])).in_group(1),
		]);
		assert_eq!(
			seq.validate(&tree()),
			[StepIssue::UnexpectedGroup { index: 0, key: 1 }]
		);
	}
}
