//! External string stores the filter query is persisted in.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

/// A string key-value collection owned outside the controller, such as URL
/// search parameters.
pub trait QueryStore: Send + Sync {
	fn get(&self, key: &str) -> Option<String>;
	fn set(&self, key: &str, value: String);
}

impl<S: QueryStore + ?Sized> QueryStore for Arc<S> {
	fn get(&self, key: &str) -> Option<String> {
		(**self).get(key)
	}

	fn set(&self, key: &str, value: String) {
		(**self).set(key, value)
	}
}

/// In-memory observable store.
///
/// Every write bumps a revision published on a [`watch`] channel, so views can
/// react to changes made by anyone holding the store.
#[derive(Debug)]
pub struct MemoryQueryStore {
	entries: RwLock<HashMap<String, String>>,
	revision: watch::Sender<u64>,
}

impl Default for MemoryQueryStore {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryQueryStore {
	pub fn new() -> Self {
		let (revision, _) = watch::channel(0);
		Self {
			entries: RwLock::new(HashMap::new()),
			revision,
		}
	}

	/// Creates a store with one entry already present, as after a page load
	/// with `?key=value`.
	pub fn with(key: impl Into<String>, value: impl Into<String>) -> Self {
		let store = Self::new();
		store.entries.write().insert(key.into(), value.into());
		store
	}

	/// Removes an entry, publishing a revision if it existed.
	pub fn remove(&self, key: &str) -> Option<String> {
		let removed = self.entries.write().remove(key);
		if removed.is_some() {
			self.revision.send_modify(|r| *r += 1);
		}
		removed
	}

	/// Number of writes so far.
	pub fn revision(&self) -> u64 {
		*self.revision.borrow()
	}

	/// Subscribes to write notifications.
	pub fn subscribe(&self) -> watch::Receiver<u64> {
		self.revision.subscribe()
	}
}

impl QueryStore for MemoryQueryStore {
	fn get(&self, key: &str) -> Option<String> {
		self.entries.read().get(key).cloned()
	}

	fn set(&self, key: &str, value: String) {
		self.entries.write().insert(key.to_string(), value);
		self.revision.send_modify(|r| *r += 1);
	}
}
