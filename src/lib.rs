//! tree-animator: step-driven SVG tree diagrams for narrating search procedures.
//!
//! This crate provides a WASM component that reveals a tree one declarative
//! step at a time: nodes appear, edges draw on, nodes highlight, and captions
//! pop up, with playback driven by the host page.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, error, info, warn};
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

pub mod components;

pub use components::animated_diagram::AnimatedDiagram;
pub use components::tree_animator::{
	AnimationStep, DiagramDocument, DiagramError, StepAction, StepSequence, StepTimeline,
	TreeAnimator, TreeConfig, TreeNode,
};

/// Id of the `<script type="application/json">` element holding the diagram.
pub const DIAGRAM_ELEMENT_ID: &str = "diagram-data";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("tree-animator: logging initialized");
}

/// Load the diagram from the script element with the given id.
/// Expected format: JSON with { nodes: [...], steps: { mode, steps: [...] }, ... }
pub fn load_diagram(element_id: &str) -> Result<DiagramDocument, DiagramError> {
	let document = web_sys::window()
		.and_then(|window| window.document())
		.ok_or(DiagramError::NoDocument)?;
	let element = document
		.get_element_by_id(element_id)
		.ok_or_else(|| DiagramError::MissingElement(element_id.to_string()))?;
	let script: HtmlScriptElement = element
		.dyn_into()
		.map_err(|_| DiagramError::NotAScript(element_id.to_string()))?;
	let json_text = script
		.text()
		.map_err(|_| DiagramError::Unreadable(element_id.to_string()))?;

	let diagram = DiagramDocument::from_json(&json_text)?;
	info!(
		"tree-animator: loaded {} nodes, {} steps in {} groups",
		diagram.nodes.len(),
		diagram.steps.steps().len(),
		diagram.steps.group_count()
	);
	Ok(diagram)
}

/// Main application component.
/// Loads the diagram from the DOM and renders it with its step timeline.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let content = match load_diagram(DIAGRAM_ELEMENT_ID) {
		Ok(diagram) => {
			for issue in diagram.validate() {
				warn!("tree-animator: {}", issue);
			}
			let DiagramDocument {
				title,
				description,
				nodes,
				steps,
				config,
				step_descriptions,
				auto_play,
				svg_diagram,
			} = diagram;
			view! {
				<StepTimeline
					nodes=nodes
					steps=steps
					config=config
					title=title
					description=description
					step_descriptions=step_descriptions
					auto_play=auto_play
				/>
				{svg_diagram.map(|src| view! {
					<section class="svg-diagram">
						<AnimatedDiagram src=src background="#000000" />
					</section>
				})}
			}
			.into_any()
		}
		Err(e) => {
			error!("tree-animator: {}", e);
			view! { <div class="diagram-error">{format!("Error: {e}")}</div> }.into_any()
		}
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Tree Animator" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<main class="diagram-page">{content}</main>
	}
}
