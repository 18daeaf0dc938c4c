//! Filter query string protocol.
//!
//! A filter query is a single string of space-separated `key:value` tokens,
//! persisted verbatim (usually in a URL search parameter):
//!
//! ```text
//! owner:me status:running template:docker
//! ```
//!
//! # Grammar
//!
//! * Tokens are separated by single spaces. Empty tokens are skipped.
//! * A token is split at its **first** colon; everything after it is the value,
//!   so `url:http://x` has the value `http://x`.
//! * Tokens without a colon or with an empty value are dropped.
//! * There is no escaping. A value containing a space is split into two tokens.
//!
//! # Normalization
//!
//! [`parse`] never fails and [`serialize`] omits empty values, so a round trip
//! normalizes rather than preserves: duplicate keys collapse, malformed tokens
//! disappear, and tokens come back in insertion order. The result is stable
//! after one pass: `parse(&serialize(&parse(q))) == parse(q)` for every `q`.

mod values;

pub use values::FilterValues;

/// Conventional store key under which the filter query is persisted.
pub const DEFAULT_FILTER_KEY: &str = "filter";

/// Parses a filter query into values.
///
/// Malformed tokens are ignored; this function has no failure mode.
pub fn parse(query: &str) -> FilterValues {
	let mut values = FilterValues::new();
	if query.is_empty() {
		return values;
	}

	for token in query.split(' ') {
		let Some((key, value)) = token.split_once(':') else {
			continue;
		};
		if value.is_empty() {
			continue;
		}
		values.insert(key, value);
	}

	values
}

/// Serializes values into a filter query.
///
/// Entries with empty values are omitted.
pub fn serialize(values: &FilterValues) -> String {
	let mut out = String::new();
	for (key, value) in values.iter() {
		if value.is_empty() {
			continue;
		}
		out.push_str(key);
		out.push(':');
		out.push_str(value);
		out.push(' ');
	}
	out.trim_matches(' ').to_string()
}

/// Returns `serialize(parse(query))`.
pub fn normalize(query: &str) -> String {
	serialize(&parse(query))
}

/// Anything that can be written as a filter query: raw strings pass through,
/// values are serialized.
pub trait IntoQuery {
	fn into_query(self) -> String;
}

impl IntoQuery for &str {
	fn into_query(self) -> String {
		self.to_string()
	}
}

impl IntoQuery for String {
	fn into_query(self) -> String {
		self
	}
}

impl IntoQuery for &String {
	fn into_query(self) -> String {
		self.clone()
	}
}

impl IntoQuery for &FilterValues {
	fn into_query(self) -> String {
		serialize(self)
	}
}

impl IntoQuery for FilterValues {
	fn into_query(self) -> String {
		serialize(&self)
	}
}
