//! Error types for configuration parsing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when parsing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The persisted filter key is empty.
	#[error("filter key must not be empty")]
	EmptyKey,

	/// A preset is malformed.
	#[error("invalid preset: {0}")]
	InvalidPreset(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
