//! Trailing-edge debouncing.
//!
//! [`Debouncer::call`] restarts a quiet-period timer on every invocation. Only
//! the argument of the most recent call survives; it is handed to the callback
//! once the timer elapses without another call. [`Debouncer::cancel`] drops the
//! pending call without firing it; [`Debouncer::flush`] fires it right away.
//!
//! Each pending call owns a [`GenerationToken`]. The timer task races its sleep
//! against the token and, when the sleep wins, still has to claim the pending
//! slot by generation before firing. A call that lost the race to a newer
//! `call` or to `cancel` therefore never fires, even if its timer had already
//! elapsed.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::token::{GenerationClock, GenerationToken};
use crate::{TaskClass, spawn};

type Callback<T> = Box<dyn Fn(T) + Send + Sync>;

struct Pending<T> {
	token: GenerationToken,
	arg: T,
}

struct DebounceInner<T> {
	delay: Duration,
	callback: Callback<T>,
	clock: GenerationClock,
	pending: Mutex<Option<Pending<T>>>,
}

impl<T> DebounceInner<T> {
	/// Takes the pending argument if `generation` still owns the slot.
	fn claim(&self, generation: u64) -> Option<T> {
		let mut pending = self.pending.lock();
		if pending.as_ref().is_some_and(|p| p.token.generation() == generation) {
			pending.take().map(|p| p.arg)
		} else {
			None
		}
	}
}

/// Collapses rapid calls into one delayed invocation.
///
/// Cloning yields another handle to the same schedule.
pub struct Debouncer<T> {
	inner: Arc<DebounceInner<T>>,
}

impl<T> Clone for Debouncer<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> std::fmt::Debug for Debouncer<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Debouncer")
			.field("delay", &self.inner.delay)
			.field("pending", &self.is_pending())
			.finish()
	}
}

impl<T> Debouncer<T> {
	/// Drops the pending call, if any, without firing it.
	pub fn cancel(&self) {
		if let Some(prev) = self.inner.pending.lock().take() {
			trace!(generation = prev.token.generation(), "debounce.cancel");
			prev.token.cancel();
		}
	}

	/// Fires the pending call now instead of at the end of its quiet period.
	///
	/// Returns false if nothing was pending.
	pub fn flush(&self) -> bool {
		let Some(pending) = self.inner.pending.lock().take() else {
			return false;
		};
		trace!(generation = pending.token.generation(), "debounce.flush");
		pending.token.cancel();
		(self.inner.callback)(pending.arg);
		true
	}

	/// Returns true while a call is waiting for its quiet period.
	pub fn is_pending(&self) -> bool {
		self.inner.pending.lock().is_some()
	}

	/// Returns the quiet period.
	pub fn delay(&self) -> Duration {
		self.inner.delay
	}
}

impl<T: Send + 'static> Debouncer<T> {
	/// Wraps `callback` so it fires `delay` after the last [`Self::call`].
	pub fn new(delay: Duration, callback: impl Fn(T) + Send + Sync + 'static) -> Self {
		Self {
			inner: Arc::new(DebounceInner {
				delay,
				callback: Box::new(callback),
				clock: GenerationClock::new(),
				pending: Mutex::new(None),
			}),
		}
	}

	/// Schedules `arg`, replacing any call still waiting.
	pub fn call(&self, arg: T) {
		let generation = self.inner.clock.next();
		let token = GenerationToken::new(generation, CancellationToken::new());
		let pending = Pending {
			token: token.clone(),
			arg,
		};
		if let Some(prev) = self.inner.pending.lock().replace(pending) {
			prev.token.cancel();
		}
		trace!(generation, delay_ms = self.inner.delay.as_millis() as u64, "debounce.schedule");

		let inner = Arc::clone(&self.inner);
		spawn(TaskClass::Interactive, async move {
			tokio::select! {
				_ = token.cancelled() => {
					trace!(generation = token.generation(), "debounce.superseded");
				}
				_ = tokio::time::sleep(inner.delay) => {
					if let Some(arg) = inner.claim(token.generation()) {
						trace!(generation = token.generation(), "debounce.fire");
						(inner.callback)(arg);
					}
				}
			}
		});
	}
}
