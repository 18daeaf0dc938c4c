//! Filter menu controller.
//!
//! A [`FilterMenuController`] drives one searchable menu of a filter bar. It
//! runs two independent async pipelines against an [`OptionSource`]:
//!
//! * **selected**: resolves the current value to a full option, answering from
//!   the [`OptionCache`] when it can.
//! * **search**: fetches the options matching the free-text query, re-run on
//!   every query change.
//!
//! Each request is stamped with a generation and only the latest response of
//! each pipeline is applied. The merged list is withheld until both pipelines
//! have completed at least once, so a view never shows results without the
//! current selection among them.
//!
//! Resolver calls are spawned on the ambient Tokio runtime. The state lock is never held
//! across an await point or while user callbacks run.

use std::sync::Arc;

use facet_config::MenuSection;
use facet_worker::TaskClass;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use crate::cache::OptionCache;
use crate::merge::merge_options;
use crate::option::MenuOption;
use crate::source::OptionSource;
use crate::state::{AsyncState, Pipeline};

/// Invoked with the new selection after [`FilterMenuController::select_option`].
pub type ChangeCallback<O> = Arc<dyn Fn(Option<&O>) + Send + Sync>;

/// Construction options for [`FilterMenuController`].
pub struct MenuOptions<O, S> {
	/// Identifies the menu in logs and snapshots.
	pub id: String,
	/// Initially selected value. Empty strings mean no selection.
	pub value: Option<String>,
	pub source: S,
	pub on_change: Option<ChangeCallback<O>>,
	/// While false, neither pipeline issues requests.
	pub enabled: bool,
	/// Apply the substring pass in [`merge_options`].
	pub client_filter: bool,
}

impl<O: MenuOption, S: OptionSource<O>> MenuOptions<O, S> {
	pub fn new(id: impl Into<String>, source: S) -> Self {
		Self {
			id: id.into(),
			value: None,
			source,
			on_change: None,
			enabled: true,
			client_filter: true,
		}
	}

	pub fn with_value(mut self, value: impl Into<String>) -> Self {
		self.value = Some(value.into());
		self
	}

	pub fn with_on_change(mut self, f: impl Fn(Option<&O>) + Send + Sync + 'static) -> Self {
		self.on_change = Some(Arc::new(f));
		self
	}

	pub fn with_enabled(mut self, enabled: bool) -> Self {
		self.enabled = enabled;
		self
	}

	pub fn with_client_filter(mut self, client_filter: bool) -> Self {
		self.client_filter = client_filter;
		self
	}

	/// Applies the `[menu]` configuration section.
	pub fn with_config(self, section: &MenuSection) -> Self {
		self.with_client_filter(section.client_filter)
	}
}

/// Point-in-time view of a menu, for rendering.
#[derive(Debug, Clone)]
pub struct FilterMenuState<O> {
	pub id: String,
	pub value: Option<String>,
	pub query: String,
	pub selected_option: Option<O>,
	/// `None` until both pipelines have completed once.
	pub search_options: Option<Vec<O>>,
	pub is_initializing: bool,
	pub is_searching: bool,
	pub selected: AsyncState<Option<O>>,
	pub search: AsyncState<Vec<O>>,
}

struct MenuState<O> {
	enabled: bool,
	value: Option<String>,
	query: String,
	selected_option: Option<O>,
	selected: Pipeline<Option<O>>,
	search: Pipeline<Vec<O>>,
	cache: OptionCache<O>,
}

impl<O: MenuOption> MenuState<O> {
	fn merged(&self, client_filter: bool) -> Option<Vec<O>> {
		if !(self.selected.fetched && self.search.fetched) {
			return None;
		}
		let results = self.search.data.clone().unwrap_or_default();
		Some(merge_options(results, self.selected_option.as_ref(), &self.query, client_filter))
	}

	fn is_initializing(&self) -> bool {
		self.selected.state.is_loading() && !self.selected.fetched
	}
}

struct MenuInner<O, S> {
	id: String,
	source: S,
	on_change: Option<ChangeCallback<O>>,
	client_filter: bool,
	state: Mutex<MenuState<O>>,
	revision: watch::Sender<u64>,
}

impl<O, S> MenuInner<O, S>
where
	O: MenuOption,
	S: OptionSource<O> + 'static,
{
	fn notify(&self) {
		self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
	}

	/// Resolves the current value. Clearing and cache hits settle at once, even
	/// while gated; only the resolver call waits for the menu to be enabled.
	fn request_selected(self: &Arc<Self>) {
		let request = {
			let mut state = self.state.lock();
			match state.value.clone() {
				None => {
					state.selected_option = None;
					state.selected.settle(None);
					None
				}
				Some(value) => match state.cache.get(&value).cloned() {
					Some(hit) => {
						trace!(menu = %self.id, value = %value, "menu.selected.cache_hit");
						state.selected_option = Some(hit.clone());
						state.selected.settle(Some(hit));
						None
					}
					None => {
						if state.selected_option.as_ref().is_some_and(|o| o.value() != value) {
							state.selected_option = None;
						}
						if state.enabled {
							Some((state.selected.begin(), value))
						} else {
							state.selected.defer();
							None
						}
					}
				},
			}
		};
		self.notify();

		let Some((generation, value)) = request else {
			return;
		};
		debug!(menu = %self.id, value = %value, generation, "menu.selected.resolve");
		let inner = Arc::clone(self);
		facet_worker::spawn(TaskClass::Interactive, async move {
			let result = inner.source.resolve_selected(&value).await;
			inner.finish_selected(generation, &value, result);
		});
	}

	fn finish_selected(&self, generation: u64, value: &str, result: anyhow::Result<Option<O>>) {
		{
			let mut state = self.state.lock();
			if !state.selected.is_current(generation) {
				trace!(menu = %self.id, value, generation, "menu.selected.stale");
				return;
			}
			match result {
				Ok(option) => {
					let option = option.filter(|o| {
						let matches = o.value() == value;
						if !matches {
							debug!(menu = %self.id, requested = value, got = o.value(), "menu.selected.mismatch");
						}
						matches
					});
					if let Some(option) = &option {
						state.cache.set(value, option.clone());
					}
					state.selected_option = option.clone();
					state.selected.succeed(option);
				}
				Err(err) => {
					warn!(menu = %self.id, value, error = %err, "menu.selected.failed");
					state.selected.fail(err);
				}
			}
		}
		self.notify();
	}

	fn request_search(self: &Arc<Self>) {
		let (generation, query) = {
			let mut state = self.state.lock();
			if !state.enabled {
				state.search.defer();
				return;
			}
			(state.search.begin(), state.query.clone())
		};
		self.notify();

		trace!(menu = %self.id, query = %query, generation, "menu.search");
		let inner = Arc::clone(self);
		facet_worker::spawn(TaskClass::Interactive, async move {
			let result = inner.source.search(&query).await;
			inner.finish_search(generation, &query, result);
		});
	}

	fn finish_search(&self, generation: u64, query: &str, result: anyhow::Result<Vec<O>>) {
		{
			let mut state = self.state.lock();
			if !state.search.is_current(generation) {
				trace!(menu = %self.id, query, generation, "menu.search.stale");
				return;
			}
			match result {
				Ok(options) => {
					trace!(menu = %self.id, query, count = options.len(), "menu.search.done");
					state.search.succeed(options);
				}
				Err(err) => {
					warn!(menu = %self.id, query, error = %err, "menu.search.failed");
					state.search.fail(err);
				}
			}
		}
		self.notify();
	}
}

/// Searchable menu bound to one filter key.
///
/// Cloning yields another handle to the same menu.
pub struct FilterMenuController<O, S> {
	inner: Arc<MenuInner<O, S>>,
}

impl<O, S> Clone for FilterMenuController<O, S> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<O, S> FilterMenuController<O, S>
where
	O: MenuOption,
	S: OptionSource<O> + 'static,
{
	/// Creates the menu and, if enabled, starts both pipelines.
	///
	/// Must be called inside a Tokio runtime; resolver calls are spawned
	/// immediately.
	pub fn new(options: MenuOptions<O, S>) -> Self {
		let (revision, _) = watch::channel(0);
		let inner = Arc::new(MenuInner {
			id: options.id,
			source: options.source,
			on_change: options.on_change,
			client_filter: options.client_filter,
			state: Mutex::new(MenuState {
				enabled: options.enabled,
				value: options.value.filter(|v| !v.is_empty()),
				query: String::new(),
				selected_option: None,
				selected: Pipeline::default(),
				search: Pipeline::default(),
				cache: OptionCache::new(),
			}),
			revision,
		});
		inner.request_selected();
		inner.request_search();
		Self { inner }
	}

	pub fn id(&self) -> &str {
		&self.inner.id
	}

	/// Current selected value.
	pub fn value(&self) -> Option<String> {
		self.inner.state.lock().value.clone()
	}

	/// Points the menu at a new value, typically after the persisted query
	/// changed. Empty strings clear the selection.
	pub fn set_value(&self, value: Option<&str>) {
		let value = value.filter(|v| !v.is_empty()).map(str::to_string);
		{
			let mut state = self.inner.state.lock();
			if state.value == value {
				return;
			}
			state.value = value;
		}
		self.inner.request_selected();
	}

	/// Free-text search buffer.
	pub fn query(&self) -> String {
		self.inner.state.lock().query.clone()
	}

	/// Replaces the search buffer and starts a search for it.
	pub fn set_query(&self, query: impl Into<String>) {
		let query = query.into();
		{
			let mut state = self.inner.state.lock();
			if state.query == query {
				return;
			}
			state.query = query;
		}
		self.inner.request_search();
	}

	pub fn is_enabled(&self) -> bool {
		self.inner.state.lock().enabled
	}

	/// Gates both pipelines. Enabling runs whatever was requested while gated.
	pub fn set_enabled(&self, enabled: bool) {
		let (selected, search) = {
			let mut state = self.inner.state.lock();
			if state.enabled == enabled {
				return;
			}
			state.enabled = enabled;
			(enabled && state.selected.stale, enabled && state.search.stale)
		};
		debug!(menu = %self.inner.id, enabled, "menu.enabled");
		if selected {
			self.inner.request_selected();
		}
		if search {
			self.inner.request_search();
		}
	}

	/// Selects `option`, or clears the selection if it is already selected.
	///
	/// Caches the option, clears the search buffer and invokes `on_change`
	/// with the new selection.
	pub fn select_option(&self, option: O) {
		let (next, query_cleared) = {
			let mut state = self.inner.state.lock();
			state.cache.set(option.value(), option.clone());
			let toggled_off = state.value.as_deref() == Some(option.value());
			let next = (!toggled_off).then_some(option);
			state.value = next.as_ref().map(|o| o.value().to_string());
			state.selected_option = next.clone();
			state.selected.settle(next.clone());
			let query_cleared = !state.query.is_empty();
			state.query.clear();
			(next, query_cleared)
		};
		debug!(menu = %self.inner.id, value = ?next.as_ref().map(MenuOption::value), "menu.select");

		if query_cleared {
			self.inner.request_search();
		} else {
			self.inner.notify();
		}
		if let Some(on_change) = &self.inner.on_change {
			on_change(next.as_ref());
		}
	}

	/// Drops the selection without invoking `on_change`.
	pub fn clear_selection(&self) {
		{
			let mut state = self.inner.state.lock();
			state.value = None;
			state.selected_option = None;
			state.selected.settle(None);
		}
		self.inner.notify();
	}

	pub fn selected_option(&self) -> Option<O> {
		self.inner.state.lock().selected_option.clone()
	}

	/// Merged option list, or `None` while either pipeline has never completed.
	pub fn search_options(&self) -> Option<Vec<O>> {
		self.inner.state.lock().merged(self.inner.client_filter)
	}

	/// True while the first resolution of the selected value is in flight.
	pub fn is_initializing(&self) -> bool {
		self.inner.state.lock().is_initializing()
	}

	pub fn is_searching(&self) -> bool {
		self.inner.state.lock().search.state.is_loading()
	}

	/// Returns the cached option for `value`.
	pub fn cached(&self, value: &str) -> Option<O> {
		self.inner.state.lock().cache.get(value).cloned()
	}

	pub fn state(&self) -> FilterMenuState<O> {
		let state = self.inner.state.lock();
		FilterMenuState {
			id: self.inner.id.clone(),
			value: state.value.clone(),
			query: state.query.clone(),
			selected_option: state.selected_option.clone(),
			search_options: state.merged(self.inner.client_filter),
			is_initializing: state.is_initializing(),
			is_searching: state.search.state.is_loading(),
			selected: state.selected.state.clone(),
			search: state.search.state.clone(),
		}
	}

	/// Receiver bumped on every state change.
	pub fn subscribe(&self) -> watch::Receiver<u64> {
		self.inner.revision.subscribe()
	}

	/// Waits until neither pipeline has a request in flight.
	pub async fn settled(&self) {
		let mut changes = self.subscribe();
		loop {
			{
				let state = self.inner.state.lock();
				if !state.selected.state.is_loading() && !state.search.state.is_loading() {
					return;
				}
			}
			if changes.changed().await.is_err() {
				return;
			}
		}
	}
}
