use std::sync::Arc;

use facet_worker::GenerationClock;

/// Status of one async pipeline.
#[derive(Debug, Clone, Default)]
pub enum AsyncState<T> {
	/// Never requested, or gated off before the first request.
	#[default]
	Idle,
	Loading,
	Success(T),
	Error(Arc<anyhow::Error>),
}

impl<T> AsyncState<T> {
	pub fn is_loading(&self) -> bool {
		matches!(self, Self::Loading)
	}

	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success(_))
	}

	pub fn is_error(&self) -> bool {
		matches!(self, Self::Error(_))
	}

	pub fn data(&self) -> Option<&T> {
		match self {
			Self::Success(data) => Some(data),
			_ => None,
		}
	}

	pub fn error(&self) -> Option<&anyhow::Error> {
		match self {
			Self::Error(err) => Some(err),
			_ => None,
		}
	}
}

/// Bookkeeping for one keyed async request stream.
///
/// Every request takes a new generation; a response is applied only while its
/// generation is still the latest, so out-of-order responses never win.
#[derive(Debug)]
pub(crate) struct Pipeline<T> {
	clock: GenerationClock,
	pub(crate) state: AsyncState<T>,
	/// Last successful result, kept while a newer request is loading.
	pub(crate) data: Option<T>,
	/// Set once any request has completed, successfully or not.
	pub(crate) fetched: bool,
	/// The key changed while requests were gated off.
	pub(crate) stale: bool,
}

impl<T> Default for Pipeline<T> {
	fn default() -> Self {
		Self {
			clock: GenerationClock::new(),
			state: AsyncState::Idle,
			data: None,
			fetched: false,
			stale: true,
		}
	}
}

impl<T: Clone> Pipeline<T> {
	/// Starts a request and returns its generation.
	pub(crate) fn begin(&mut self) -> u64 {
		self.stale = false;
		self.state = AsyncState::Loading;
		self.clock.next()
	}

	/// Settles the pipeline without a request. In-flight responses become stale.
	pub(crate) fn settle(&mut self, data: T) {
		self.clock.next();
		self.stale = false;
		self.succeed(data);
	}

	/// Marks the key as changed while gated. In-flight responses become stale
	/// and the request is re-issued on enable.
	pub(crate) fn defer(&mut self) {
		self.clock.next();
		self.stale = true;
		if self.state.is_loading() {
			self.state = AsyncState::Idle;
		}
	}

	pub(crate) fn is_current(&self, generation: u64) -> bool {
		self.clock.is_current(generation)
	}

	pub(crate) fn succeed(&mut self, data: T) {
		self.state = AsyncState::Success(data.clone());
		self.data = Some(data);
		self.fetched = true;
	}

	pub(crate) fn fail(&mut self, err: anyhow::Error) {
		self.state = AsyncState::Error(Arc::new(err));
		self.fetched = true;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn superseded_generation_is_not_current() {
		let mut pipeline = Pipeline::<u32>::default();
		let first = pipeline.begin();
		let second = pipeline.begin();

		assert!(!pipeline.is_current(first));
		assert!(pipeline.is_current(second));
		assert!(pipeline.state.is_loading());
		assert!(!pipeline.fetched);
	}

	#[test]
	fn settle_invalidates_in_flight_request() {
		let mut pipeline = Pipeline::default();
		let generation = pipeline.begin();
		pipeline.settle(7);

		assert!(!pipeline.is_current(generation));
		assert_eq!(pipeline.state.data(), Some(&7));
		assert!(pipeline.fetched);
	}

	#[test]
	fn defer_drops_in_flight_request() {
		let mut pipeline = Pipeline::<u32>::default();
		let generation = pipeline.begin();
		pipeline.defer();

		assert!(!pipeline.is_current(generation));
		assert!(pipeline.stale);
		assert!(matches!(pipeline.state, AsyncState::Idle));
	}

	#[test]
	fn failure_counts_as_fetched_and_keeps_last_data() {
		let mut pipeline = Pipeline::default();
		pipeline.begin();
		pipeline.succeed(vec![1]);
		pipeline.begin();
		pipeline.fail(anyhow::anyhow!("backend unavailable"));

		assert!(pipeline.fetched);
		assert!(pipeline.state.is_error());
		assert_eq!(pipeline.data, Some(vec![1]));
		assert_eq!(pipeline.state.error().map(ToString::to_string).as_deref(), Some("backend unavailable"));
	}
}
