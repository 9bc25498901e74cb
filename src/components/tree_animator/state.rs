//! Playback state: what is visible, highlighted and framed after a prefix of
//! step groups has been applied.
//!
//! The state is never patched incrementally by the component. Every change of
//! the current step re-derives the [`Snapshot`] from scratch by folding the
//! groups up to that position, so jumping backwards needs no undo log.

use std::collections::{BTreeMap, HashMap};

use super::steps::{AnimationStep, StepAction, StepSequence};
use super::theme::SceneDefaults;
use super::types::{Point, Tree, edge_key};

/// A callout box shown by `showTextBox`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBoxState {
	/// Hidden boxes keep their content so they can fade out.
	pub visible: bool,
	/// Caption, `\n` separated.
	pub text: String,
	/// Center of the box in diagram space.
	pub position: Point,
	/// Overrides [`SceneDefaults::text_box_width`].
	pub width: Option<f64>,
	/// Overrides [`SceneDefaults::text_box_height`].
	pub height: Option<f64>,
}

/// The rendered state of a diagram at one point in playback.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
	/// Absent ids are hidden.
	pub visible_nodes: HashMap<String, bool>,
	/// Absent ids are not highlighted.
	pub highlighted_nodes: HashMap<String, bool>,
	/// Keyed by `"{source}-{target}"`.
	pub visible_edges: HashMap<String, bool>,
	/// Ordered by id so text boxes render in a stable order.
	pub text_boxes: BTreeMap<String, TextBoxState>,
	/// Current SVG `viewBox`.
	pub view_box: String,
}

impl Snapshot {
	/// Nothing shown, framed by `view_box`.
	pub fn initial(view_box: impl Into<String>) -> Self {
		Self {
			visible_nodes: HashMap::new(),
			highlighted_nodes: HashMap::new(),
			visible_edges: HashMap::new(),
			text_boxes: BTreeMap::new(),
			view_box: view_box.into(),
		}
	}

	/// Whether node `id` is shown.
	pub fn is_node_visible(&self, id: &str) -> bool {
		self.visible_nodes.get(id).copied().unwrap_or(false)
	}

	/// Whether node `id` is highlighted.
	pub fn is_highlighted(&self, id: &str) -> bool {
		self.highlighted_nodes.get(id).copied().unwrap_or(false)
	}

	/// Whether the edge from `source` to `target` is drawn.
	pub fn is_edge_visible(&self, source: &str, target: &str) -> bool {
		self.visible_edges
			.get(&edge_key(source, target))
			.copied()
			.unwrap_or(false)
	}

	/// Applies a single step in place. References to nodes missing from
	/// `tree` are skipped.
	pub fn apply(&mut self, step: &AnimationStep, tree: &Tree, defaults: &SceneDefaults) {
		match &step.action {
			StepAction::ShowNode { node_ids } => set_known(&mut self.visible_nodes, tree, node_ids, true),
			StepAction::HideNode { node_ids } => set_known(&mut self.visible_nodes, tree, node_ids, false),
			StepAction::HighlightNode { node_ids } => {
				set_known(&mut self.highlighted_nodes, tree, node_ids, true)
			}
			StepAction::UnhighlightNode { node_ids } => {
				set_known(&mut self.highlighted_nodes, tree, node_ids, false)
			}
			StepAction::ShowAllNodes { node_types } => self.set_nodes_of_kinds(tree, node_types, true),
			StepAction::HideAllNodes { node_types } => self.set_nodes_of_kinds(tree, node_types, false),
			StepAction::ShowEdge {
				source_node_id,
				target_node_id,
			} => self.set_edge(tree, source_node_id, target_node_id, true),
			StepAction::HideEdge {
				source_node_id,
				target_node_id,
			} => self.set_edge(tree, source_node_id, target_node_id, false),
			StepAction::ShowAllEdges { node_types } => self.set_edges_into_kinds(tree, node_types, true),
			StepAction::HideAllEdges { node_types } => self.set_edges_into_kinds(tree, node_types, false),
			StepAction::ShowTextBox {
				id,
				text,
				position,
				width,
				height,
			} => {
				self.text_boxes.insert(
					id.clone(),
					TextBoxState {
						visible: true,
						text: text.clone().unwrap_or_default(),
						position: position.unwrap_or(defaults.text_box_position),
						width: *width,
						height: *height,
					},
				);
			}
			StepAction::HideTextBox { id } => {
				if let Some(text_box) = self.text_boxes.get_mut(id) {
					text_box.visible = false;
				}
			}
			StepAction::Zoom { view_box } => self.view_box = view_box.clone(),
			StepAction::Pause => {}
		}
	}

	/// Folds one group over this snapshot in array order; later steps win.
	pub fn apply_group(&self, steps: &[&AnimationStep], tree: &Tree, defaults: &SceneDefaults) -> Self {
		let mut next = self.clone();
		for step in steps {
			next.apply(step, tree, defaults);
		}
		next
	}

	fn set_nodes_of_kinds(&mut self, tree: &Tree, kinds: &[String], value: bool) {
		for node in tree.nodes().iter().filter(|n| n.is_kind_in(kinds)) {
			self.visible_nodes.insert(node.id.clone(), value);
		}
	}

	fn set_edge(&mut self, tree: &Tree, source: &str, target: &str, value: bool) {
		if tree.contains(source) && tree.contains(target) {
			self.visible_edges.insert(edge_key(source, target), value);
		}
	}

	/// Edges are selected by the type of their child end.
	fn set_edges_into_kinds(&mut self, tree: &Tree, kinds: &[String], value: bool) {
		for edge in tree.edges() {
			let matches = tree
				.node(&edge.target)
				.is_some_and(|child| child.is_kind_in(kinds));
			if matches {
				self.visible_edges.insert(edge.key(), value);
			}
		}
	}
}

fn set_known(map: &mut HashMap<String, bool>, tree: &Tree, ids: &[String], value: bool) {
	for id in ids.iter().filter(|id| tree.contains(id)) {
		map.insert(id.clone(), value);
	}
}

impl StepSequence {
	/// The snapshot after applying every group up to and including playback
	/// position `through`. `None` means nothing has been applied yet; a
	/// position past the last group yields the fully played-out state.
	pub fn snapshot(&self, tree: &Tree, defaults: &SceneDefaults, through: Option<usize>) -> Snapshot {
		let initial = Snapshot::initial(defaults.view_box.clone());
		let Some(through) = through else {
			return initial;
		};
		self.groups()
			.iter()
			.take(through.saturating_add(1))
			.fold(initial, |acc, group| acc.apply_group(group, tree, defaults))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::tree_animator::types::TreeNode;

	fn step(action: StepAction, group: u32) -> AnimationStep {
		AnimationStep::new(action).in_group(group)
	}

	fn family() -> Tree {
		Tree::new(vec![
			TreeNode::new("root", 50.0, 120.0),
			TreeNode::new("child1", 150.0, 70.0).with_parent("root"),
			TreeNode::new("child2", 150.0, 170.0).with_parent("root"),
		])
	}

	fn typed() -> Tree {
		Tree::new(vec![
			TreeNode::new("root", 0.0, 0.0).with_kind("root"),
			TreeNode::new("a", 0.0, 0.0).with_parent("root").with_kind("child"),
			TreeNode::new("b", 0.0, 0.0).with_parent("root").with_kind("child"),
			TreeNode::new("a1", 0.0, 0.0).with_parent("a").with_kind("leaf"),
			TreeNode::new("plain", 0.0, 0.0).with_parent("root"),
		])
	}

	#[test]
	fn end_to_end_root_then_children() {
		let tree = family();
		let defaults = SceneDefaults::default();
		let seq = StepSequence::Grouped(vec![
			step(StepAction::show_nodes(["root"]), 1),
			step(StepAction::show_nodes(["child1", "child2"]), 2),
			step(StepAction::show_edge("root", "child1"), 2),
		]);

		let first = seq.snapshot(&tree, &defaults, Some(0));
		assert_eq!(first.visible_nodes, HashMap::from([("root".to_string(), true)]));
		assert!(!first.is_edge_visible("root", "child1"));
		assert!(!first.is_edge_visible("root", "child2"));

		let second = seq.snapshot(&tree, &defaults, Some(1));
		assert!(["root", "child1", "child2"].iter().all(|id| second.is_node_visible(id)));
		assert_eq!(second.visible_edges, HashMap::from([("root-child1".to_string(), true)]));
		assert!(!second.is_edge_visible("root", "child2"));
	}

	#[test]
	fn replay_is_idempotent() {
		let tree = typed();
		let defaults = SceneDefaults::default();
		let seq = StepSequence::Grouped(vec![
			step(StepAction::zoom("0 0 600 400"), 1),
			step(StepAction::show_nodes(["root", "a"]), 1),
			step(StepAction::highlight(["a"]), 2),
			step(StepAction::show_text("note", "hi"), 2),
			step(StepAction::hide_nodes(["root"]), 3),
		]);
		for k in 0..5 {
			assert_eq!(
				seq.snapshot(&tree, &defaults, Some(k)),
				seq.snapshot(&tree, &defaults, Some(k))
			);
		}
	}

	#[test]
	fn later_group_overrides_earlier() {
		let tree = family();
		let defaults = SceneDefaults::default();
		let seq = StepSequence::Grouped(vec![
			step(StepAction::show_nodes(["child1"]), 1),
			step(StepAction::show_nodes(["root"]), 2),
			step(StepAction::hide_nodes(["child1"]), 3),
		]);
		assert!(seq.snapshot(&tree, &defaults, Some(0)).is_node_visible("child1"));
		assert!(seq.snapshot(&tree, &defaults, Some(1)).is_node_visible("child1"));
		assert!(!seq.snapshot(&tree, &defaults, Some(2)).is_node_visible("child1"));
	}

	#[test]
	fn later_step_in_same_group_wins() {
		let tree = family();
		let seq = StepSequence::Grouped(vec![
			step(StepAction::show_nodes(["root"]), 1),
			step(StepAction::hide_nodes(["root"]), 1),
		]);
		let snap = seq.snapshot(&tree, &SceneDefaults::default(), Some(0));
		assert_eq!(snap.visible_nodes.get("root"), Some(&false));
	}

	#[test]
	fn unknown_ids_are_ignored() {
		let tree = family();
		let defaults = SceneDefaults::default();
		let mut snap = Snapshot::initial("0 0 10 10");
		snap.apply(&step(StepAction::show_nodes(["root"]), 1), &tree, &defaults);
		let before = snap.clone();

		snap.apply(&step(StepAction::show_nodes(["nonexistent"]), 1), &tree, &defaults);
		snap.apply(&step(StepAction::highlight(["ghost"]), 1), &tree, &defaults);
		snap.apply(&step(StepAction::show_edge("root", "ghost"), 1), &tree, &defaults);
		snap.apply(
			&step(StepAction::HideTextBox { id: "never".into() }, 1),
			&tree,
			&defaults,
		);
		assert_eq!(snap, before);
	}

	#[test]
	fn type_filters_resolve_to_nodes_and_child_edges() {
		let tree = typed();
		let defaults = SceneDefaults::default();
		let seq = StepSequence::Positional(vec![
			AnimationStep::new(StepAction::ShowAllNodes {
				node_types: vec!["child".into(), "leaf".into()],
			}),
			AnimationStep::new(StepAction::ShowAllEdges {
				node_types: vec!["child".into()],
			}),
			AnimationStep::new(StepAction::HideAllNodes {
				node_types: vec!["leaf".into()],
			}),
			AnimationStep::new(StepAction::HideAllEdges {
				node_types: vec!["child".into()],
			}),
		]);

		let shown = seq.snapshot(&tree, &defaults, Some(0));
		assert!(shown.is_node_visible("a") && shown.is_node_visible("b") && shown.is_node_visible("a1"));
		assert!(!shown.is_node_visible("root"));
		assert!(!shown.visible_nodes.contains_key("plain"));

		let edges = seq.snapshot(&tree, &defaults, Some(1));
		assert!(edges.is_edge_visible("root", "a"));
		assert!(edges.is_edge_visible("root", "b"));
		assert!(!edges.is_edge_visible("a", "a1"));
		assert!(!edges.visible_edges.contains_key("root-plain"));

		let hidden = seq.snapshot(&tree, &defaults, Some(3));
		assert!(!hidden.is_node_visible("a1"));
		assert!(hidden.is_node_visible("a"));
		assert_eq!(hidden.visible_edges.get("root-a"), Some(&false));
	}

	#[test]
	fn text_boxes_upsert_and_hide() {
		let tree = family();
		let defaults = SceneDefaults::default();
		let seq = StepSequence::Grouped(vec![
			step(StepAction::show_text("d1", "line one\nline two"), 1),
			step(
				StepAction::ShowTextBox {
					id: "d2".into(),
					text: None,
					position: Some(Point::new(0.0, 40.0)),
					width: Some(140.0),
					height: Some(60.0),
				},
				1,
			),
			step(StepAction::HideTextBox { id: "d1".into() }, 2),
		]);

		let first = seq.snapshot(&tree, &defaults, Some(0));
		let d1 = &first.text_boxes["d1"];
		assert!(d1.visible);
		assert_eq!(d1.position, defaults.text_box_position);
		assert_eq!(d1.width, None);
		assert_eq!(first.text_boxes["d2"].text, "");
		assert_eq!(first.text_boxes["d2"].width, Some(140.0));

		let second = seq.snapshot(&tree, &defaults, Some(1));
		assert!(!second.text_boxes["d1"].visible);
		assert_eq!(second.text_boxes["d1"].text, "line one\nline two");
		assert!(second.text_boxes["d2"].visible);
	}

	#[test]
	fn zoom_replaces_view_box_and_pause_changes_nothing() {
		let tree = family();
		let defaults = SceneDefaults::default();
		let seq = StepSequence::Positional(vec![
			AnimationStep::new(StepAction::zoom("360 50 400 280")),
			AnimationStep::pause(1000),
		]);
		assert_eq!(seq.snapshot(&tree, &defaults, None).view_box, "0 0 300 240");
		let zoomed = seq.snapshot(&tree, &defaults, Some(0));
		assert_eq!(zoomed.view_box, "360 50 400 280");
		assert_eq!(seq.snapshot(&tree, &defaults, Some(1)), zoomed);
	}

	#[test]
	fn out_of_range_positions_apply_nothing_more() {
		let tree = family();
		let defaults = SceneDefaults::default();
		let seq = StepSequence::Grouped(vec![
			step(StepAction::show_nodes(["root"]), 1),
			step(StepAction::show_nodes(["child1"]), 2),
		]);
		let last = seq.snapshot(&tree, &defaults, Some(1));
		assert_eq!(seq.snapshot(&tree, &defaults, Some(2)), last);
		assert_eq!(seq.snapshot(&tree, &defaults, Some(usize::MAX)), last);
		assert_eq!(
			seq.snapshot(&tree, &defaults, None),
			Snapshot::initial(defaults.view_box.clone())
		);
	}

	#[test]
	fn stepping_back_recomputes_from_start() {
		let tree = family();
		let defaults = SceneDefaults::default();
		let seq = StepSequence::Grouped(vec![
			step(StepAction::show_nodes(["root"]), 1),
			step(StepAction::show_nodes(["child1"]), 2),
			step(StepAction::highlight(["child1"]), 3),
		]);
		let forward = seq.snapshot(&tree, &defaults, Some(2));
		assert!(forward.is_highlighted("child1"));
		let back = seq.snapshot(&tree, &defaults, Some(1));
		assert!(!back.is_highlighted("child1"));
		assert!(back.is_node_visible("child1"));
	}

	#[test]
	fn grouped_steps_without_key_never_apply() {
		let tree = family();
		let seq = StepSequence::Grouped(vec![
			step(StepAction::show_nodes(["root"]), 1),
			AnimationStep::new(StepAction::show_nodes(["child1"])),
		]);
		let snap = seq.snapshot(&tree, &SceneDefaults::default(), Some(5));
		assert!(!snap.is_node_visible("child1"));
	}
}
