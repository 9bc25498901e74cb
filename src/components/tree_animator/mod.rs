//! Step-driven SVG tree diagram animator.
//!
//! A diagram is a list of positioned [`TreeNode`]s (edges are derived from
//! `parent_id`) plus a [`StepSequence`] of declarative actions: show, hide and
//! highlight nodes, draw edges, pop up text boxes, zoom. The visible state at
//! any step is a pure fold of the steps up to it, so hosts can jump around
//! freely and the renderer only animates the difference.
//!
//! - [`TreeAnimator`] renders one diagram at a host-controlled step index
//! - [`StepTimeline`] wraps it with step descriptions and playback controls
//! - [`TreeConfig`] holds per-type sizes and colors, timing and scene defaults
//!
//! # Example
//!
//! ```ignore
//! use tree_animator::{AnimationStep, StepAction, StepSequence, TreeAnimator, TreeNode};
//!
//! let nodes = vec![
//!     TreeNode::new("root", 50.0, 120.0).with_kind("root").with_label("Root"),
//!     TreeNode::new("a", 150.0, 70.0).with_parent("root").with_kind("child"),
//! ];
//! let steps = StepSequence::Positional(vec![
//!     AnimationStep::new(StepAction::show_nodes(["root"])),
//!     AnimationStep::new(StepAction::show_nodes(["a"])),
//!     AnimationStep::new(StepAction::show_edge("root", "a")),
//! ]);
//! let step = RwSignal::new(0);
//!
//! view! { <TreeAnimator nodes=nodes steps=steps current_step=step /> }
//! ```

mod component;
pub mod document;
pub(crate) mod render;
pub mod state;
pub mod steps;
pub mod theme;
mod timeline;
pub mod timer;
pub mod types;

pub use component::TreeAnimator;
pub use document::{DiagramDocument, DiagramError};
pub use state::{Snapshot, TextBoxState};
pub use steps::{AnimationStep, StepAction, StepIssue, StepSequence};
pub use theme::{Color, TreeConfig};
pub use timeline::StepTimeline;
pub use types::{Edge, Point, Tree, TreeNode};
