use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Filter key to filter value mapping derived from a query string.
///
/// Iteration follows insertion order, which is also the order
/// [`crate::serialize`] emits tokens in. Equality ignores order. Re-inserting
/// an existing key keeps its original position and replaces the value, so
/// `a:1 b:2 a:3` parses to `{a: 3, b: 2}` in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterValues(IndexMap<String, String>);

impl FilterValues {
	/// Creates an empty mapping.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the value for `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Returns true if `key` has a value.
	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Inserts or replaces a value, returning the previous one.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
		self.0.insert(key.into(), value.into())
	}

	/// Removes `key`, preserving the order of the remaining entries.
	pub fn remove(&mut self, key: &str) -> Option<String> {
		self.0.shift_remove(key)
	}

	/// Builder form of [`Self::insert`].
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.insert(key, value);
		self
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates `(key, value)` pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Iterates keys in insertion order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}
}

impl<K, V> FromIterator<(K, V)> for FilterValues
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut values = Self::new();
		values.extend(iter);
		values
	}
}

impl<K, V> Extend<(K, V)> for FilterValues
where
	K: Into<String>,
	V: Into<String>,
{
	fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
		for (key, value) in iter {
			self.insert(key, value);
		}
	}
}
