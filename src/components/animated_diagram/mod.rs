//! Fetched, pre-drawn SVG diagrams revealed in numbered groups.
//!
//! Where [`TreeAnimator`](crate::components::tree_animator::TreeAnimator)
//! draws a tree from data, this component plays back a diagram exported from a
//! drawing tool. Cells are tagged `data-cell-id="<kind>-<name>-<sequence>-<group>"`.
//!
//! # Example
//!
//! ```ignore
//! view! { <AnimatedDiagram src="/diagrams/pipeline.svg" group_duration_ms=600 /> }
//! ```

pub mod cells;
mod component;
pub mod load;

pub use cells::{CellId, SvgDiagram};
pub use component::AnimatedDiagram;
pub use load::MountGuard;
