//! Configuration for the filter controllers.
//!
//! Configuration is written in TOML. Every field is optional; a missing file
//! section keeps the built-in defaults.
//!
//! ```toml
//! [filter]
//! key = "filter"          # store key the query is persisted under
//! debounce_ms = 500       # quiet period before typed text is persisted
//! fallback = "owner:me"   # query used while nothing is persisted
//!
//! [menu]
//! client_filter = true    # substring pass over merged menu options
//!
//! [[presets]]
//! name = "My workspaces"
//! query = "owner:me"
//!
//! [[presets]]
//! name = "All workspaces"
//! query = ""
//! ```
//!
//! # Layering
//!
//! Files are parsed into a [`ConfigLayer`] whose fields are all optional and
//! then merged over a [`Config`]. Later layers override scalar fields; presets
//! from a later layer replace presets with the same name and append the rest.
//!
//! # Policy values
//!
//! The 500 ms debounce window and the client-side substring pass are current
//! policy, not protocol requirements, which is why both are configurable.

pub mod error;

use std::path::Path;
use std::time::Duration;

pub use error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Default quiet period before typed filter text is persisted.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
	pub filter: FilterSection,
	pub menu: MenuSection,
	/// Named queries offered as one-click filters, in display order.
	pub presets: Vec<FilterPreset>,
}

/// Filter controller settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSection {
	/// Store key the serialized query is persisted under.
	pub key: String,
	/// Debounce window for typed text.
	pub debounce: Duration,
	/// Query used while the store holds no value for `key`.
	pub fallback: Option<String>,
}

/// Filter menu settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuSection {
	/// Apply the case-insensitive substring pass after merging options.
	pub client_filter: bool,
}

/// A named filter query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPreset {
	pub name: String,
	pub query: String,
}

impl FilterPreset {
	pub fn new(name: impl Into<String>, query: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			query: query.into(),
		}
	}
}

impl Default for FilterSection {
	fn default() -> Self {
		Self {
			key: facet_query::DEFAULT_FILTER_KEY.to_string(),
			debounce: DEFAULT_DEBOUNCE,
			fallback: None,
		}
	}
}

impl Default for MenuSection {
	fn default() -> Self {
		Self { client_filter: true }
	}
}

/// One parsed configuration file; unset fields leave the base untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
	pub filter: FilterLayer,
	pub menu: MenuLayer,
	pub presets: Vec<FilterPreset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterLayer {
	pub key: Option<String>,
	pub debounce_ms: Option<u64>,
	pub fallback: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MenuLayer {
	pub client_filter: Option<bool>,
}

impl ConfigLayer {
	/// Parses a TOML string into a layer.
	pub fn parse(input: &str) -> Result<Self> {
		let layer: ConfigLayer = toml::from_str(input)?;
		layer.validate()?;
		Ok(layer)
	}

	fn validate(&self) -> Result<()> {
		if self.filter.key.as_deref().is_some_and(str::is_empty) {
			return Err(ConfigError::EmptyKey);
		}
		for preset in &self.presets {
			if preset.name.trim().is_empty() {
				return Err(ConfigError::InvalidPreset(format!("preset with query {:?} has no name", preset.query)));
			}
		}
		Ok(())
	}
}

impl Config {
	/// Parses a TOML string over the defaults.
	pub fn parse(input: &str) -> Result<Self> {
		let mut config = Self::default();
		config.merge(ConfigLayer::parse(input)?);
		Ok(config)
	}

	/// Loads configuration from a file over the defaults.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let mut config = Self::default();
		config.merge(load_layer(path)?);
		Ok(config)
	}

	/// Merges a layer into this configuration.
	///
	/// Values from `layer` override values in `self`.
	pub fn merge(&mut self, layer: ConfigLayer) {
		if let Some(key) = layer.filter.key {
			self.filter.key = key;
		}
		if let Some(ms) = layer.filter.debounce_ms {
			self.filter.debounce = Duration::from_millis(ms);
		}
		if layer.filter.fallback.is_some() {
			self.filter.fallback = layer.filter.fallback;
		}
		if let Some(client_filter) = layer.menu.client_filter {
			self.menu.client_filter = client_filter;
		}
		for preset in layer.presets {
			match self.presets.iter_mut().find(|p| p.name == preset.name) {
				Some(existing) => *existing = preset,
				None => self.presets.push(preset),
			}
		}
	}

	/// Finds a preset by name.
	pub fn preset(&self, name: &str) -> Option<&FilterPreset> {
		self.presets.iter().find(|p| p.name == name)
	}
}

/// Reads one configuration layer from disk.
pub fn load_layer(path: impl AsRef<Path>) -> Result<ConfigLayer> {
	let path = path.as_ref();
	let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
		path: path.to_path_buf(),
		error: e,
	})?;
	ConfigLayer::parse(&content)
}

#[cfg(test)]
mod tests;
