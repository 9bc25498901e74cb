//! Diagram components.

pub mod animated_diagram;
pub mod tree_animator;
