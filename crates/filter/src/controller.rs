//! Filter controller.
//!
//! [`FilterController`] owns two views of the same filter:
//!
//! * the **persisted query**, stored in an injected [`QueryStore`] under a
//!   configurable key. This is the single source of truth.
//! * the **buffer**, the text the user is editing. It is updated optimistically
//!   on every keystroke and persisted through a [`Debouncer`].
//!
//! Discrete actions (presets, clear, menu selections) go through
//! [`FilterController::update`] and are written immediately.
//!
//! # Reconciliation
//!
//! The persisted query can change behind the controller's back (history
//! navigation, another component writing the store). [`FilterController::reconcile`]
//! copies it into the buffer only while the buffer is **not** focused, so text
//! the user is still typing is never clobbered. [`FilterController::blur`]
//! reconciles on the way out.

use std::sync::{Arc, Weak};
use std::time::Duration;

use facet_config::{DEFAULT_DEBOUNCE, FilterPreset, FilterSection};
use facet_query::{FilterValues, IntoQuery};
use facet_worker::{Debouncer, TaskClass};
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::store::QueryStore;

/// Side effect run after every persisted write, with the written query.
pub type UpdateCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Construction options for [`FilterController`].
#[derive(Clone)]
pub struct FilterOptions {
	/// Store key the query is persisted under.
	pub key: String,
	/// Query reported while the store has no entry for `key`.
	pub fallback_filter: Option<String>,
	/// Quiet period for [`FilterController::debounce_update`].
	pub debounce: Duration,
	pub on_update: Option<UpdateCallback>,
}

impl Default for FilterOptions {
	fn default() -> Self {
		Self {
			key: facet_query::DEFAULT_FILTER_KEY.to_string(),
			fallback_filter: None,
			debounce: DEFAULT_DEBOUNCE,
			on_update: None,
		}
	}
}

impl std::fmt::Debug for FilterOptions {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FilterOptions")
			.field("key", &self.key)
			.field("fallback_filter", &self.fallback_filter)
			.field("debounce", &self.debounce)
			.field("on_update", &self.on_update.is_some())
			.finish()
	}
}

impl FilterOptions {
	/// Builds options from the `[filter]` configuration section.
	pub fn from_config(section: &FilterSection) -> Self {
		Self {
			key: section.key.clone(),
			fallback_filter: section.fallback.clone(),
			debounce: section.debounce,
			on_update: None,
		}
	}

	pub fn with_fallback_filter(mut self, fallback: impl Into<String>) -> Self {
		self.fallback_filter = Some(fallback.into());
		self
	}

	pub fn with_on_update(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
		self.on_update = Some(Arc::new(f));
		self
	}
}

#[derive(Debug)]
struct BufferState {
	text: String,
	focused: bool,
}

struct FilterInner<S> {
	store: S,
	key: String,
	fallback: RwLock<Option<String>>,
	on_update: Option<UpdateCallback>,
	buffer: Mutex<BufferState>,
}

impl<S: QueryStore> FilterInner<S> {
	fn query(&self) -> String {
		self.store
			.get(&self.key)
			.or_else(|| self.fallback.read().clone())
			.unwrap_or_default()
	}

	fn write(&self, query: String) {
		debug!(key = %self.key, query = %query, "filter.write");
		self.store.set(&self.key, query.clone());
		if let Some(on_update) = &self.on_update {
			on_update(&query);
		}
		self.reconcile();
	}

	fn reconcile(&self) -> bool {
		let query = self.query();
		let mut buffer = self.buffer.lock();
		if buffer.focused || buffer.text == query {
			return false;
		}
		trace!(key = %self.key, from = %buffer.text, to = %query, "filter.buffer.resync");
		buffer.text = query;
		true
	}
}

/// Debounced, focus-aware controller over a persisted filter query.
///
/// Cloning yields another handle to the same controller.
pub struct FilterController<S> {
	inner: Arc<FilterInner<S>>,
	debouncer: Debouncer<String>,
}

impl<S> Clone for FilterController<S> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
			debouncer: self.debouncer.clone(),
		}
	}
}

impl<S: QueryStore + 'static> FilterController<S> {
	/// Creates a controller over `store`; the buffer starts as the current query.
	pub fn new(store: S, options: FilterOptions) -> Self {
		let inner = Arc::new(FilterInner {
			store,
			key: options.key,
			fallback: RwLock::new(options.fallback_filter),
			on_update: options.on_update,
			buffer: Mutex::new(BufferState {
				text: String::new(),
				focused: false,
			}),
		});
		inner.reconcile();

		let weak: Weak<FilterInner<S>> = Arc::downgrade(&inner);
		let debouncer = Debouncer::new(options.debounce, move |query: String| {
			if let Some(inner) = weak.upgrade() {
				inner.write(query);
			}
		});

		Self { inner, debouncer }
	}

	/// Store key this controller persists under.
	pub fn key(&self) -> &str {
		&self.inner.key
	}

	/// The persisted query, or the fallback filter while nothing is persisted.
	pub fn query(&self) -> String {
		self.inner.query()
	}

	/// Parsed form of [`Self::query`].
	pub fn values(&self) -> FilterValues {
		facet_query::parse(&self.query())
	}

	/// True when a filter other than the fallback is active.
	pub fn used(&self) -> bool {
		let query = self.query();
		!query.is_empty() && self.inner.fallback.read().as_deref() != Some(query.as_str())
	}

	pub fn fallback_filter(&self) -> Option<String> {
		self.inner.fallback.read().clone()
	}

	/// Replaces the fallback filter. Only observable while the store holds no
	/// value for the key.
	pub fn set_fallback_filter(&self, fallback: Option<String>) {
		*self.inner.fallback.write() = fallback;
		self.inner.reconcile();
	}

	/// Persists `value` immediately and runs the update callback.
	pub fn update(&self, value: impl IntoQuery) {
		self.inner.write(value.into_query());
	}

	/// Persists `value` after the debounce window, replacing any pending write.
	pub fn debounce_update(&self, value: impl Into<String>) {
		self.debouncer.call(value.into());
	}

	/// Drops a pending debounced write.
	pub fn cancel_debounce(&self) {
		self.debouncer.cancel();
	}

	/// Persists a pending debounced write now. Returns false if none was
	/// waiting.
	///
	/// Views call this before [`Self::blur`] so the buffer does not briefly
	/// revert to the persisted query.
	pub fn flush_debounce(&self) -> bool {
		self.debouncer.flush()
	}

	/// True while a debounced write is waiting.
	pub fn has_pending_update(&self) -> bool {
		self.debouncer.is_pending()
	}

	/// Records typed text in the buffer and schedules it for persistence.
	pub fn input(&self, text: impl Into<String>) {
		let text = text.into();
		self.inner.buffer.lock().text = text.clone();
		self.debounce_update(text);
	}

	/// Current buffer text.
	pub fn buffer(&self) -> String {
		self.inner.buffer.lock().text.clone()
	}

	pub fn is_focused(&self) -> bool {
		self.inner.buffer.lock().focused
	}

	pub fn focus(&self) {
		self.inner.buffer.lock().focused = true;
	}

	/// Drops focus and resyncs the buffer if it disagrees with the store.
	pub fn blur(&self) {
		self.inner.buffer.lock().focused = false;
		self.inner.reconcile();
	}

	/// Copies the persisted query into the buffer unless the buffer is focused.
	///
	/// Returns true if the buffer changed.
	pub fn reconcile(&self) -> bool {
		self.inner.reconcile()
	}

	/// Clears the filter immediately.
	pub fn clear(&self) {
		self.update("");
	}

	/// Persists a preset's query immediately.
	pub fn apply_preset(&self, preset: &FilterPreset) {
		debug!(preset = %preset.name, "filter.preset");
		self.update(preset.query.as_str());
	}

	/// Sets or removes one key of the parsed values and persists immediately.
	///
	/// This is how menu selections are routed back into the query.
	pub fn set_value(&self, key: &str, value: Option<&str>) {
		let mut values = self.values();
		match value {
			Some(value) if !value.is_empty() => {
				values.insert(key, value);
			}
			_ => {
				values.remove(key);
			}
		}
		self.update(&values);
	}

	/// Reconciles on every notification from `changes` until the controller is
	/// dropped or the sender closes.
	pub fn spawn_reconciler(&self, mut changes: watch::Receiver<u64>) -> JoinHandle<()> {
		let weak = Arc::downgrade(&self.inner);
		facet_worker::spawn(TaskClass::Background, async move {
			while changes.changed().await.is_ok() {
				let Some(inner) = weak.upgrade() else {
					break;
				};
				inner.reconcile();
			}
		})
	}
}

#[cfg(test)]
mod tests;
