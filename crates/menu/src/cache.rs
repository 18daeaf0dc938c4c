use std::collections::HashMap;

use crate::option::MenuOption;

/// Last-seen option per value, owned by one menu controller.
///
/// Entries are never evicted; the cache lives and dies with its controller.
#[derive(Debug, Clone)]
pub struct OptionCache<O> {
	entries: HashMap<String, O>,
}

impl<O> Default for OptionCache<O> {
	fn default() -> Self {
		Self { entries: HashMap::new() }
	}
}

impl<O: MenuOption> OptionCache<O> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, value: &str) -> Option<&O> {
		self.entries.get(value)
	}

	/// Stores `option` under `value`, replacing what was there.
	pub fn set(&mut self, value: impl Into<String>, option: O) {
		self.entries.insert(value.into(), option);
	}

	pub fn contains(&self, value: &str) -> bool {
		self.entries.contains_key(value)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::BaseOption;

	#[test]
	fn set_replaces_previous_entry() {
		let mut cache = OptionCache::new();
		assert!(cache.is_empty());

		cache.set("alice", BaseOption::new("alice", "alice"));
		cache.set("alice", BaseOption::new("alice", "Alice"));

		assert_eq!(cache.len(), 1);
		assert!(cache.contains("alice"));
		assert_eq!(cache.get("alice").map(|o| o.label.as_str()), Some("Alice"));
		assert!(cache.get("bob").is_none());
	}
}
