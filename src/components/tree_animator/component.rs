//! Leptos component rendering an animated tree diagram as SVG.
//!
//! The component derives one [`Snapshot`](super::state::Snapshot) per step
//! index and lets CSS transitions animate the difference. Each node, edge and
//! text box is bound to a memoized shape, so only elements whose state changed
//! touch the DOM. Text boxes stay mounted once shown so hiding one fades it
//! out. An `IntersectionObserver` gates auto-advance so off-screen
//! diagrams hold their step.

use std::sync::Arc;
use std::time::Duration;

use leptos::html;
use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use super::render::{self, EdgeShape, NodeShape, TextBoxShape};
use super::steps::StepSequence;
use super::theme::TreeConfig;
use super::timer::{AutoAdvance, BrowserScheduler};
use super::types::{Tree, TreeNode};

/// Fraction of the diagram that must be on screen for auto-advance to run.
const VIEW_THRESHOLD: f64 = 0.3;

type ObserverSlot = Option<(IntersectionObserver, Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>)>;

/// Renders a tree diagram at the step selected by `current_step`.
///
/// `current_step` is a 0-based index into the step sequence's groups; moving it
/// backwards or jumping ahead renders the matching state directly. With
/// `auto_play` set and the diagram on screen, `on_step_complete` receives the
/// index of each group once its hold time elapses. The host decides whether to
/// advance.
#[component]
pub fn TreeAnimator(
	nodes: Vec<TreeNode>,
	steps: StepSequence,
	#[prop(into)] current_step: Signal<usize>,
	#[prop(default = None)] config: Option<TreeConfig>,
	#[prop(into, default = Signal::derive(|| false))] auto_play: Signal<bool>,
	#[prop(default = true)] show_labels: bool,
	#[prop(optional)] on_step_complete: Option<Callback<usize>>,
) -> impl IntoView {
	let config = Arc::new(config.unwrap_or_default());
	let tree = Arc::new(Tree::new(nodes));
	let steps = Arc::new(steps);

	let snapshot = Memo::new({
		let (tree, steps, config) = (tree.clone(), steps.clone(), config.clone());
		move |_| steps.snapshot(&tree, &config.defaults, Some(current_step.get()))
	});

	let container = NodeRef::<html::Div>::new();
	let in_view = RwSignal::new(false);
	let observer: StoredValue<ObserverSlot, LocalStorage> = StoredValue::new_local(None);

	Effect::new(move |_| {
		let Some(element) = container.get() else {
			return;
		};
		if observer.with_value(Option::is_some) {
			return;
		}

		let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
			move |entries: js_sys::Array, _: IntersectionObserver| {
				for entry in entries.iter() {
					let entry: IntersectionObserverEntry = entry.unchecked_into();
					in_view.set(entry.is_intersecting());
				}
			},
		);
		let options = IntersectionObserverInit::new();
		options.set_threshold(&JsValue::from_f64(VIEW_THRESHOLD));

		match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options) {
			Ok(watcher) => {
				watcher.observe(&element);
				observer.set_value(Some((watcher, callback)));
			}
			Err(e) => {
				// Without an observer the diagram counts as always visible.
				warn!("tree-animator: IntersectionObserver unavailable: {:?}", e);
				in_view.set(true);
			}
		}
	});

	let timer = StoredValue::new_local(AutoAdvance::new(BrowserScheduler));
	let default_delay = Duration::from_millis(config.defaults.auto_play_delay);

	Effect::new({
		let steps = steps.clone();
		move |_| {
			let step = current_step.get();
			let armed = auto_play.get() && in_view.get();
			let delay = if armed {
				steps.advance_delay(step, default_delay)
			} else {
				None
			};
			timer.update_value(|timer| match delay {
				Some(delay) => timer.schedule(delay, move || {
					if let Some(callback) = on_step_complete {
						callback.run(step);
					}
				}),
				None => timer.cancel(),
			});
		}
	});

	on_cleanup(move || {
		timer.try_update_value(|timer| timer.cancel());
		observer.try_update_value(|slot| {
			if let Some((watcher, _callback)) = slot.take() {
				watcher.disconnect();
			}
		});
	});

	let edges = render::edge_connections(&tree)
		.into_iter()
		.map(|connection| {
			let (source, target, index) = (
				connection.source.clone(),
				connection.target.clone(),
				connection.index,
			);
			let config = config.clone();
			let shape = Memo::new(move |_| {
				snapshot.with(|s| {
					let visible = s.is_edge_visible(&source.id, &target.id);
					render::edge_shape(&source, &target, visible, &config, index)
				})
			});
			view! { <TreeEdge shape=shape /> }
		})
		.collect_view();

	let nodes = tree
		.nodes()
		.iter()
		.enumerate()
		.map(|(index, node)| {
			let node = node.clone();
			let config = config.clone();
			let shape = Memo::new(move |_| {
				snapshot.with(|s| {
					render::node_shape(
						&node,
						s.is_node_visible(&node.id),
						s.is_highlighted(&node.id),
						show_labels,
						&config,
						index,
					)
				})
			});
			view! { <TreeNodeCircle shape=shape /> }
		})
		.collect_view();

	// One slot per text box id; hidden boxes stay mounted so they can fade out.
	let text_boxes = steps
		.text_box_ids()
		.into_iter()
		.map(|id| {
			let config = config.clone();
			let shape = Memo::new(move |_| {
				snapshot.with(|s| {
					s.text_boxes
						.get(&id)
						.map(|state| render::text_box_shape(&id, state, &config))
				})
			});
			view! { <TreeTextBox shape=shape /> }
		})
		.collect_view();

	view! {
		<div
			node_ref=container
			class="tree-animator"
			style="width: 100%; height: 100%; position: relative; background-color: #000000;"
		>
			<svg
				viewBox=move || snapshot.with(|s| s.view_box.clone())
				style="width: 100%; height: 100%; position: absolute; top: 0; left: 0; background: #000000; border-radius: 8px;"
			>
				<g class="tree-edges">{edges}</g>
				<g class="tree-nodes">{nodes}</g>
				<g class="tree-text-boxes">{text_boxes}</g>
			</svg>
		</div>
	}
}

#[component]
fn TreeEdge(shape: Memo<EdgeShape>) -> impl IntoView {
	let (d, stroke, stroke_width) =
		shape.with_untracked(|s| (s.d.clone(), s.stroke.to_css(), s.stroke_width));

	view! {
		<path
			d=d
			fill="none"
			stroke=stroke
			stroke-width=stroke_width.to_string()
			stroke-linecap="round"
			style=move || shape.with(EdgeShape::style)
		/>
	}
}

/// A node circle with its optional label underneath.
#[component]
fn TreeNodeCircle(shape: Memo<NodeShape>) -> impl IntoView {
	let (cx, cy) = shape.with_untracked(|s| (s.cx.to_string(), s.cy.to_string()));
	let label = shape.with_untracked(|s| s.label.clone());

	let circle_style = move || {
		shape.with(|s| {
			let mut style = s.style();
			if let Some(filter) = s.filter() {
				style.push_str(&format!(" filter: {filter};"));
			}
			style
		})
	};

	view! {
		<circle
			cx=cx
			cy=cy
			r=move || shape.with(|s| s.r.to_string())
			fill=move || shape.with(|s| s.fill.to_css())
			stroke=move || {
				shape.with(|s| s.stroke.map(|(color, _)| color.to_css()).unwrap_or_else(|| "none".into()))
			}
			stroke-width=move || shape.with(|s| s.stroke.map(|(_, width)| width).unwrap_or(0.0).to_string())
			style=circle_style
		/>
		{label.map(|initial| {
			view! {
				<text
					x=initial.x.to_string()
					y=initial.y.to_string()
					text-anchor="middle"
					font-size=initial.font_size.to_string()
					fill=move || shape.with(|s| s.label.as_ref().map(|l| l.color.to_css()).unwrap_or_default())
					style=move || shape.with(|s| s.label.as_ref().map(|l| l.style(s.visible)).unwrap_or_default())
				>
					{initial.text}
				</text>
			}
		})}
	}
}

/// Fades a text box in and out; its content only re-renders when the text or
/// geometry changes.
#[component]
fn TreeTextBox(shape: Memo<Option<TextBoxShape>>) -> impl IntoView {
	let body = Memo::new(move |_| {
		shape.with(|s| {
			s.as_ref().map(|s| TextBoxShape {
				visible: true,
				..s.clone()
			})
		})
	});
	let style = move || shape.with(|s| render::text_box_style(s.as_ref().is_some_and(|s| s.visible)));

	view! {
		<g class="tree-text-box" style=style>
			{move || body.get().map(|shape| view! { <TextBoxBody shape=shape /> })}
		</g>
	}
}

#[component]
fn TextBoxBody(shape: TextBoxShape) -> impl IntoView {
	let TextBoxShape {
		x,
		y,
		width,
		height,
		rx,
		background,
		border,
		text_color,
		text_x,
		text_y,
		font_size,
		lines,
		..
	} = shape;

	view! {
		<rect
			x=x.to_string()
			y=y.to_string()
			width=width.to_string()
			height=height.to_string()
			rx=rx.to_string()
			ry=rx.to_string()
			fill=background.to_css()
			stroke=border.to_css()
			stroke-width="1"
		/>
		<text
			x=text_x.to_string()
			y=text_y.to_string()
			text-anchor="middle"
			dominant-baseline="middle"
			fill=text_color.to_css()
			font-size=font_size.to_string()
			font-weight="500"
		>
			{lines
				.into_iter()
				.map(|line| view! { <tspan x=line.x.to_string() dy=line.dy.to_string()>{line.text}</tspan> })
				.collect_view()}
		</text>
	}
}
