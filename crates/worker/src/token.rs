use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

/// Monotonic generation clock.
///
/// Each request stamps itself with [`GenerationClock::next`]; a response is
/// current only while its stamp is still the latest one handed out for that
/// pipeline.
#[derive(Debug, Default, Clone)]
pub struct GenerationClock {
	next: Arc<AtomicU64>,
}

impl GenerationClock {
	/// Creates a new generation clock starting at generation 1.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the next generation ID.
	pub fn next(&self) -> u64 {
		self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}

	/// Returns the most recently issued generation (0 if none).
	pub fn current(&self) -> u64 {
		self.next.load(Ordering::Acquire)
	}

	/// Returns true if `generation` is the latest issued one.
	pub fn is_current(&self, generation: u64) -> bool {
		self.current() == generation
	}
}

/// Generation-scoped cancellation token.
#[derive(Debug, Clone)]
pub(crate) struct GenerationToken {
	generation: u64,
	cancel: CancellationToken,
}

impl GenerationToken {
	/// Creates a new generation token.
	pub fn new(generation: u64, cancel: CancellationToken) -> Self {
		Self { generation, cancel }
	}

	/// Returns generation ID.
	pub const fn generation(&self) -> u64 {
		self.generation
	}

	/// Requests cancellation.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Future resolving when cancellation is requested.
	pub async fn cancelled(&self) {
		self.cancel.cancelled().await;
	}
}
