//! Diagram node data and the parent/child edges derived from it.

use std::collections::HashMap;

use serde::Deserialize;

/// A position in diagram space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Point {
	/// Horizontal, growing right.
	pub x: f64,
	/// Vertical, growing down.
	pub y: f64,
}

impl Point {
	/// A point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// A node in the diagram.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
	/// Unique identifier. Steps and edges reference nodes by this id.
	pub id: String,
	/// Center in diagram space.
	pub x: f64,
	/// Center in diagram space.
	pub y: f64,
	/// Parent node id. Nodes without a parent are roots.
	#[serde(default)]
	pub parent_id: Option<String>,
	/// Text drawn under the circle.
	#[serde(default)]
	pub label: Option<String>,
	/// Open type tag used for style lookup (e.g. "root", "child", "leaf").
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
	/// Opaque payload carried through untouched.
	#[serde(default)]
	pub data: Option<serde_json::Value>,
}

impl TreeNode {
	/// An untyped, unlabelled root at `(x, y)`.
	pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
		Self {
			id: id.into(),
			x,
			y,
			parent_id: None,
			label: None,
			kind: None,
			data: None,
		}
	}

	/// Sets the parent id.
	pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
		self.parent_id = Some(parent_id.into());
		self
	}

	/// Sets the label.
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	/// Sets the type tag.
	pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
		self.kind = Some(kind.into());
		self
	}

	/// The type tag, if any.
	pub fn kind(&self) -> Option<&str> {
		self.kind.as_deref()
	}

	/// Whether this node's type tag is one of `kinds`. Untyped nodes never match.
	pub fn is_kind_in(&self, kinds: &[String]) -> bool {
		self.kind().is_some_and(|k| kinds.iter().any(|t| t == k))
	}

	/// The node's center.
	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}
}

/// Map key for an edge between two nodes.
pub fn edge_key(source: &str, target: &str) -> String {
	format!("{source}-{target}")
}

/// A parent to child connection inferred from `parent_id` links.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
	/// Parent id.
	pub source: String,
	/// Child id.
	pub target: String,
}

impl Edge {
	/// See [`edge_key`].
	pub fn key(&self) -> String {
		edge_key(&self.source, &self.target)
	}
}

/// The immutable node set of one diagram instance, indexed by id.
///
/// Duplicate ids are kept in the node list (they still render) but lookups
/// resolve to the first occurrence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tree {
	nodes: Vec<TreeNode>,
	index: HashMap<String, usize>,
}

impl Tree {
	/// Indexes `nodes` by id.
	pub fn new(nodes: Vec<TreeNode>) -> Self {
		let mut index = HashMap::with_capacity(nodes.len());
		for (i, node) in nodes.iter().enumerate() {
			index.entry(node.id.clone()).or_insert(i);
		}
		Self { nodes, index }
	}

	/// Nodes in authored order.
	pub fn nodes(&self) -> &[TreeNode] {
		&self.nodes
	}

	/// Number of nodes, duplicates included.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// No nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// The first node with this id.
	pub fn node(&self, id: &str) -> Option<&TreeNode> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	/// Position of the node in the node list.
	pub fn position_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Whether any node has this id.
	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	/// Nodes whose parent is `id`, in node order.
	pub fn children<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a TreeNode> + 'a {
		self.nodes
			.iter()
			.filter(move |n| n.parent_id.as_deref() == Some(id))
	}

	/// Nodes tagged `kind`.
	pub fn nodes_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a TreeNode> + 'a {
		self.nodes.iter().filter(move |n| n.kind() == Some(kind))
	}

	/// Nodes without a parent id.
	pub fn roots(&self) -> impl Iterator<Item = &TreeNode> {
		self.nodes.iter().filter(|n| n.parent_id.is_none())
	}

	/// Whether no node names `id` as its parent.
	pub fn is_leaf(&self, id: &str) -> bool {
		self.children(id).next().is_none()
	}

	/// Parent to child edges in node order. Children whose parent is not in
	/// the node set produce no edge.
	pub fn edges(&self) -> Vec<Edge> {
		self.nodes
			.iter()
			.filter_map(|n| {
				let parent = n.parent_id.as_deref()?;
				self.contains(parent).then(|| Edge {
					source: parent.to_string(),
					target: n.id.clone(),
				})
			})
			.collect()
	}

	/// Nodes whose `parent_id` names a node missing from the set.
	pub fn dangling_parents(&self) -> impl Iterator<Item = (&TreeNode, &str)> {
		self.nodes.iter().filter_map(|n| {
			let parent = n.parent_id.as_deref()?;
			(!self.contains(parent)).then_some((n, parent))
		})
	}

	/// Ids that appear more than once, in first-seen order.
	pub fn duplicate_ids(&self) -> Vec<&str> {
		let mut dupes: Vec<&str> = Vec::new();
		for (i, node) in self.nodes.iter().enumerate() {
			if self.index.get(&node.id) != Some(&i) && !dupes.contains(&node.id.as_str()) {
				dupes.push(&node.id);
			}
		}
		dupes
	}
}

impl From<Vec<TreeNode>> for Tree {
	fn from(nodes: Vec<TreeNode>) -> Self {
		Self::new(nodes)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> Tree {
		Tree::new(vec![
			TreeNode::new("root", 50.0, 120.0).with_kind("root"),
			TreeNode::new("a", 150.0, 70.0).with_parent("root").with_kind("child"),
			TreeNode::new("b", 150.0, 170.0).with_parent("root").with_kind("child"),
			TreeNode::new("a1", 250.0, 50.0).with_parent("a").with_kind("leaf"),
		])
	}

	#[test]
	fn derives_one_edge_per_parent_link() {
		let tree = sample();
		let edges = tree.edges();
		assert_eq!(edges.len(), 3);
		assert_eq!(
			edges.iter().filter(|e| e.source == "root" && e.target == "a").count(),
			1
		);
		assert!(edges.iter().all(|e| e.target != "root"));
	}

	#[test]
	fn edge_key_joins_endpoints() {
		let edge = Edge {
			source: "root".into(),
			target: "a".into(),
		};
		assert_eq!(edge.key(), "root-a");
	}

	#[test]
	fn leaves_and_children() {
		let tree = sample();
		assert!(tree.is_leaf("b"));
		assert!(tree.is_leaf("a1"));
		assert!(!tree.is_leaf("root"));
		let kids: Vec<_> = tree.children("root").map(|n| n.id.as_str()).collect();
		assert_eq!(kids, ["a", "b"]);
		assert_eq!(tree.roots().count(), 1);
		assert_eq!(tree.nodes_of_kind("child").count(), 2);
	}

	#[test]
	fn dangling_parent_yields_no_edge() {
		let tree = Tree::new(vec![
			TreeNode::new("root", 0.0, 0.0),
			TreeNode::new("orphan", 0.0, 0.0).with_parent("missing"),
		]);
		assert!(tree.edges().is_empty());
		let dangling: Vec<_> = tree.dangling_parents().map(|(n, p)| (n.id.as_str(), p)).collect();
		assert_eq!(dangling, [("orphan", "missing")]);
	}

	#[test]
	fn first_duplicate_wins_lookup() {
		let tree = Tree::new(vec![
			TreeNode::new("x", 1.0, 0.0),
			TreeNode::new("x", 2.0, 0.0),
		]);
		assert_eq!(tree.node("x").map(|n| n.x), Some(1.0));
		assert_eq!(tree.duplicate_ids(), ["x"]);
	}

	#[test]
	fn deserializes_camel_case_fields() {
		let node: TreeNode = serde_json::from_value(serde_json::json!({
			"id": "child1",
			"x": 150,
			"y": 70,
			"parentId": "root",
			"type": "child",
			"label": "Challenge A",
			"data": { "score": 0.4 }
		}))
		.unwrap();
		assert_eq!(node.parent_id.as_deref(), Some("root"));
		assert_eq!(node.kind(), Some("child"));
		assert!(node.data.is_some());
	}
}
