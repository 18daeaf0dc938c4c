use std::future::Future;

use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::TaskClass;

/// Spawns `fut` on the current Tokio runtime inside a `facet.task` span
/// labelled with `class`, so resolver and debounce logs carry their origin.
///
/// # Panics
///
/// Panics when called outside a Tokio runtime. Controllers spawn from their
/// mutating methods, so those must run on a runtime thread.
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	let span = tracing::trace_span!("facet.task", class = class.as_str());
	tokio::spawn(fut.instrument(span))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn spawned_task_runs_to_completion() {
		let handle = spawn(TaskClass::Background, async { 40 + 2 });
		assert_eq!(handle.await.unwrap(), 42);
	}

	#[test]
	#[should_panic]
	fn spawning_without_a_runtime_panics() {
		drop(spawn(TaskClass::Interactive, async {}));
	}
}
