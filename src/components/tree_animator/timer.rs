//! Auto-advance scheduling.
//!
//! After a step group is applied the host may ask to be told when that
//! group's hold time has elapsed. [`AutoAdvance`] keeps at most one pending
//! timer per diagram: scheduling always cancels the previous one, and every
//! task is tagged with a generation so a timer that slips past cancellation
//! still never reports a stale step.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use leptos::prelude::{TimeoutHandle, set_timeout_with_handle};
use log::{debug, warn};

/// A single-threaded one-shot timer source.
pub trait Scheduler {
	/// Token returned by [`Scheduler::schedule`] to clear the timer.
	type Handle;

	/// Runs `task` once after `delay`. Returns `None` if the timer could not be set.
	fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Option<Self::Handle>;

	/// Clears a timer. Clearing one that already ran is harmless.
	fn cancel(&self, handle: Self::Handle);
}

/// Browser timers via `setTimeout`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
	type Handle = TimeoutHandle;

	fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Option<TimeoutHandle> {
		match set_timeout_with_handle(task, delay) {
			Ok(handle) => Some(handle),
			Err(e) => {
				warn!("tree-animator: failed to set auto-advance timer: {:?}", e);
				None
			}
		}
	}

	fn cancel(&self, handle: TimeoutHandle) {
		handle.clear();
	}
}

/// Owns the pending auto-advance timer of one diagram instance.
pub struct AutoAdvance<S: Scheduler> {
	scheduler: S,
	/// Handle of the last timer set, with the generation its task expects.
	pending: Option<(S::Handle, u64)>,
	generation: Rc<Cell<u64>>,
}

impl<S: Scheduler> AutoAdvance<S> {
	/// An idle timer slot backed by `scheduler`.
	pub fn new(scheduler: S) -> Self {
		Self {
			scheduler,
			pending: None,
			generation: Rc::new(Cell::new(0)),
		}
	}

	/// Cancels any pending timer, then arranges for `on_elapsed` to run after
	/// `delay` unless cancelled or superseded first.
	pub fn schedule(&mut self, delay: Duration, on_elapsed: impl FnOnce() + 'static) {
		self.cancel();
		let generation = Rc::clone(&self.generation);
		let expected = generation.get();
		debug!("tree-animator: auto-advance in {}ms", delay.as_millis());
		self.pending = self
			.scheduler
			.schedule(
				delay,
				Box::new(move || {
					if generation.get() == expected {
						generation.set(expected.wrapping_add(1));
						on_elapsed();
					}
				}),
			)
			.map(|handle| (handle, expected));
	}

	/// Drops the pending timer, if any. Its task will not run `on_elapsed`.
	pub fn cancel(&mut self) {
		self.generation.set(self.generation.get().wrapping_add(1));
		if let Some((handle, _)) = self.pending.take() {
			self.scheduler.cancel(handle);
		}
	}

	/// Whether a timer is set and has neither fired nor been cancelled.
	pub fn is_pending(&self) -> bool {
		// A task that ran has moved the generation past the one it expected.
		self.pending
			.as_ref()
			.is_some_and(|(_, expected)| *expected == self.generation.get())
	}
}

impl<S: Scheduler> Drop for AutoAdvance<S> {
	fn drop(&mut self) {
		self.cancel();
	}
}
