//! Leptos component that fetches a pre-drawn SVG and reveals it group by group.
//!
//! The markup is inserted as-is; playback only rewrites inline styles of the
//! tagged cells. Every cell is hidden once the SVG is in the DOM, then each
//! group fades in (edges draw on along their paths) and holds for one group
//! duration before the next.

use std::time::Duration;

use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{CssStyleDeclaration, Element, HtmlElement, SvgElement, SvgGeometryElement};

use super::cells::{self, CellId, StyleProp, SvgDiagram};
use super::load::{MountGuard, load_svg};
use crate::components::tree_animator::timer::{AutoAdvance, BrowserScheduler};

/// Shapes whose opacity follows their cell's.
const CELL_SHAPES: &str = "path, ellipse, rect, circle";

#[derive(Clone, Debug, PartialEq)]
enum LoadState {
	Idle,
	Loading,
	Failed(String),
	Ready(SvgDiagram),
}

/// Fetches the SVG at `src` on mount and plays its cell groups in order.
///
/// A failed fetch renders `Error: <message>` in place of the diagram. A result
/// that arrives after the component unmounted is dropped. An SVG without
/// tagged cells is shown statically.
#[component]
pub fn AnimatedDiagram(
	#[prop(into)] src: String,
	#[prop(into, default = "#fff".to_string())] background: String,
	/// Fade/draw time and hold time of each group, in milliseconds.
	#[prop(default = 800)]
	group_duration_ms: u32,
) -> impl IntoView {
	let state = RwSignal::new(if src.is_empty() {
		LoadState::Idle
	} else {
		LoadState::Loading
	});

	let guard = MountGuard::new();
	on_cleanup({
		let guard = guard.clone();
		move || guard.release()
	});

	if !src.is_empty() {
		spawn_local(async move {
			let result = load_svg(&src).await;
			let Some(result) = guard.admit(result) else {
				debug!("tree-animator: dropped `{}`, loaded after unmount", src);
				return;
			};
			match result {
				Ok(diagram) => {
					info!(
						"tree-animator: loaded `{}` with {} reveal groups",
						src,
						diagram.groups.len()
					);
					state.set(LoadState::Ready(diagram));
				}
				Err(e) => {
					warn!("tree-animator: `{}`: {}", src, e);
					state.set(LoadState::Failed(e.to_string()));
				}
			}
		});
	}

	let host = NodeRef::<html::Div>::new();
	// `None` until every cell has been hidden.
	let step = RwSignal::new(None::<usize>);
	let timer = StoredValue::new_local(AutoAdvance::new(BrowserScheduler));
	let hold = Duration::from_millis(u64::from(group_duration_ms));
	let svg_background = background.clone();

	Effect::new(move |_| {
		let Some(host) = host.get() else {
			return;
		};
		let Some(is_static) = state.with(|s| match s {
			LoadState::Ready(diagram) => Some(diagram.is_static()),
			_ => None,
		}) else {
			return;
		};

		if let Ok(Some(svg)) = host.query_selector("svg") {
			apply(
				&svg,
				&[
					("background", svg_background.clone()),
					("width", "100%".into()),
					("height", "100%".into()),
				],
			);
		}
		if is_static {
			return;
		}
		for (cell, id) in tagged_cells(&host) {
			hide_cell(&cell, &id);
		}
		step.set(Some(0));
	});

	Effect::new(move |_| {
		let Some(index) = step.get() else {
			return;
		};
		let Some(host) = host.get_untracked() else {
			return;
		};
		let group = state.with_untracked(|s| match s {
			LoadState::Ready(diagram) => diagram.groups.get(index).cloned(),
			_ => None,
		});
		let Some(group) = group else {
			timer.update_value(|timer| timer.cancel());
			return;
		};

		for (cell, id) in tagged_cells(&host).into_iter().filter(|(_, id)| id.group == group) {
			reveal_cell(&cell, &id, group_duration_ms);
		}
		timer.update_value(|timer| {
			timer.schedule(hold, move || {
				let _ = step.try_set(Some(index + 1));
			})
		});
	});

	on_cleanup(move || {
		timer.try_update_value(|timer| timer.cancel());
	});

	view! {
		<div
			class="animated-diagram-container"
			style=format!("width: 100%; height: 100%; background: {background};")
		>
			{move || match state.get() {
				LoadState::Idle => ().into_any(),
				LoadState::Loading => view! { <div>"Loading diagram..."</div> }.into_any(),
				LoadState::Failed(message) => {
					view! { <div style="color: red;">{format!("Error: {message}")}</div> }.into_any()
				}
				LoadState::Ready(diagram) => {
					view! {
						<div node_ref=host style="width: 100%; height: 100%;" inner_html=diagram.markup></div>
					}
						.into_any()
				}
			}}
		</div>
	}
}

fn elements(root: &Element, selector: &str) -> Vec<Element> {
	let Ok(list) = root.query_selector_all(selector) else {
		return Vec::new();
	};
	(0..list.length())
		.filter_map(|i| list.item(i))
		.filter_map(|node| node.dyn_into::<Element>().ok())
		.collect()
}

fn tagged_cells(host: &Element) -> Vec<(Element, CellId)> {
	elements(host, "[data-cell-id]")
		.into_iter()
		.filter_map(|element| {
			let id = CellId::parse(&element.get_attribute("data-cell-id")?)?;
			Some((element, id))
		})
		.collect()
}

fn style_of(element: &Element) -> Option<CssStyleDeclaration> {
	if let Some(svg) = element.dyn_ref::<SvgElement>() {
		return Some(svg.style());
	}
	element.dyn_ref::<HtmlElement>().map(HtmlElement::style)
}

fn apply(element: &Element, props: &[StyleProp]) {
	let Some(style) = style_of(element) else {
		return;
	};
	for (name, value) in props {
		let _ = style.set_property(name, value);
	}
}

fn apply_with_shapes(cell: &Element, props: &[StyleProp]) {
	apply(cell, props);
	for shape in elements(cell, CELL_SHAPES) {
		apply(&shape, props);
	}
}

fn path_length(path: &Element) -> f64 {
	path.dyn_ref::<SvgGeometryElement>()
		.map(|geometry| f64::from(geometry.get_total_length()))
		.unwrap_or(0.0)
}

fn hide_cell(cell: &Element, id: &CellId) {
	apply_with_shapes(cell, &cells::hidden_cell());
	if id.is_edge() {
		for path in elements(cell, "path") {
			apply(&path, &cells::undrawn_path(path_length(&path)));
		}
	}
}

fn reveal_cell(cell: &Element, id: &CellId, duration_ms: u32) {
	if !id.is_edge() {
		apply_with_shapes(cell, &cells::faded_in(duration_ms));
		return;
	}
	for path in elements(cell, "path") {
		apply(&path, &cells::undrawn_path(path_length(&path)));
		// Forces layout so the undrawn state is committed before the transition.
		let _ = path.get_bounding_client_rect();
		apply(&path, &cells::drawn_path(duration_ms));
	}
	apply_with_shapes(cell, &[("opacity", "1".into())]);
}
