//! Narrated step-through host for a [`TreeAnimator`].
//!
//! Owns the current step index, lists a description per step, and advances on
//! the animator's completion callback while auto-play is on.

use leptos::prelude::*;

use super::component::TreeAnimator;
use super::steps::StepSequence;
use super::theme::TreeConfig;
use super::types::TreeNode;

/// What the host does when the animator reports a finished step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Completion {
	advance_to: Option<usize>,
	keep_playing: bool,
}

/// Decides the next step after `completed` finished while the host shows
/// `current`. A completion for a step the user already left is ignored, and
/// finishing the last group stops playback.
fn after_completion(current: usize, completed: usize, group_count: usize) -> Completion {
	if current != completed {
		return Completion {
			advance_to: None,
			keep_playing: true,
		};
	}
	if completed + 1 >= group_count {
		return Completion {
			advance_to: None,
			keep_playing: false,
		};
	}
	Completion {
		advance_to: Some(completed + 1),
		keep_playing: true,
	}
}

/// Step-through panel: a titled timeline of step descriptions beside the diagram.
///
/// Descriptions are revealed up to the current step. Clicking an entry jumps
/// straight to it; Previous and Next move one step and stop at the ends. With
/// auto-play on, each completed step advances to the next until the last one,
/// where playback stops.
#[component]
pub fn StepTimeline(
	nodes: Vec<TreeNode>,
	steps: StepSequence,
	#[prop(default = None)] config: Option<TreeConfig>,
	#[prop(default = None)] title: Option<String>,
	#[prop(default = None)] description: Option<String>,
	#[prop(optional)] step_descriptions: Vec<String>,
	#[prop(default = false)] auto_play: bool,
	#[prop(default = true)] show_labels: bool,
) -> impl IntoView {
	let group_count = steps.group_count();
	let last = group_count.saturating_sub(1);
	let current = RwSignal::new(0usize);
	let playing = RwSignal::new(auto_play);

	let on_step_complete = Callback::new(move |completed: usize| {
		let outcome = after_completion(current.get_untracked(), completed, group_count);
		if let Some(next) = outcome.advance_to {
			current.set(next);
		}
		if !outcome.keep_playing {
			playing.set(false);
		}
	});

	let entries = (0..group_count)
		.map(|index| {
			let text = step_descriptions
				.get(index)
				.cloned()
				.unwrap_or_else(|| format!("Description for Step {}", index + 1));
			view! {
				<li
					class="step-timeline-entry"
					class:active=move || current.get() == index
					class:reached=move || index <= current.get()
					on:click=move |_| current.set(index)
				>
					<span class="step-timeline-title">{format!("Step {}", index + 1)}</span>
					<p class="step-timeline-text">{move || (index <= current.get()).then(|| text.clone())}</p>
				</li>
			}
		})
		.collect_view();

	view! {
		<section class="step-timeline">
			<header class="step-timeline-header">
				{title.map(|title| view! { <h1>{title}</h1> })}
				{description.map(|description| view! { <p class="subtitle">{description}</p> })}
			</header>
			<div class="step-timeline-body">
				<ol class="step-timeline-entries">{entries}</ol>
				<div class="step-timeline-diagram">
					<TreeAnimator
						nodes=nodes
						steps=steps
						current_step=current
						config=config
						auto_play=playing
						show_labels=show_labels
						on_step_complete=on_step_complete
					/>
				</div>
			</div>
			<nav class="step-timeline-controls">
				<button
					on:click=move |_| current.update(|step| *step = step.saturating_sub(1))
					disabled=move || current.get() == 0
				>
					"Previous"
				</button>
				<span class="step-timeline-position">
					{move || format!("{} / {}", (current.get() + 1).min(group_count), group_count)}
				</span>
				<button
					on:click=move |_| current.update(|step| *step = (*step + 1).min(last))
					disabled=move || current.get() >= last
				>
					"Next"
				</button>
				<button on:click=move |_| {
					if !playing.get_untracked() && current.get_untracked() >= last {
						current.set(0);
					}
					playing.update(|on| *on = !*on);
				}>
					{move || if playing.get() { "Pause" } else { "Play" }}
				</button>
			</nav>
		</section>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn completion_advances_to_next_group() {
		assert_eq!(
			after_completion(1, 1, 4),
			Completion {
				advance_to: Some(2),
				keep_playing: true
			}
		);
	}

	#[test]
	fn late_completion_after_navigation_is_ignored() {
		// User pressed Next, then Previous, before the timer for step 1 fired.
		for current in [0, 2] {
			assert_eq!(
				after_completion(current, 1, 4),
				Completion {
					advance_to: None,
					keep_playing: true
				}
			);
		}
	}

	#[test]
	fn last_group_stops_playback() {
		assert_eq!(
			after_completion(3, 3, 4),
			Completion {
				advance_to: None,
				keep_playing: false
			}
		);
	}

	#[test]
	fn empty_sequence_never_advances() {
		assert_eq!(
			after_completion(0, 0, 0),
			Completion {
				advance_to: None,
				keep_playing: false
			}
		);
	}
}
