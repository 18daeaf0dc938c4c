//! CLI schema and parsing helpers for the facet binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use facet_menu::BaseOption;

#[derive(Parser, Debug)]
#[command(name = "facet")]
#[command(about = "Inspect filter queries and drive filter menus")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Configuration file (TOML)
	#[arg(short, long, global = true, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Print the values of a filter query as JSON
	Parse {
		/// Filter query, e.g. "owner:me status:running"
		query: String,
	},
	/// Print the normalized form of a filter query
	Normalize {
		/// Filter query
		query: String,
	},
	/// List configured presets, or print the query of one
	Presets {
		/// Preset name
		name: Option<String>,
	},
	/// Run a filter menu over a fixed option list and print the result as JSON
	Menu(MenuArgs),
}

/// Arguments for `facet menu`.
#[derive(Args, Debug)]
pub struct MenuArgs {
	/// Filter key the menu controls
	#[arg(long, default_value = "owner")]
	pub key: String,

	/// Persisted filter query to start from
	#[arg(long, default_value = "")]
	pub filter: String,

	/// Menu options as `value` or `value=Label` (comma-separated)
	#[arg(long, value_delimiter = ',', value_parser = parse_option, required = true)]
	pub options: Vec<BaseOption>,

	/// Selected value; overrides the one found in --filter
	#[arg(long)]
	pub value: Option<String>,

	/// Search text typed into the menu
	#[arg(long, default_value = "")]
	pub query: String,

	/// Select the option with this value once the menu has loaded
	#[arg(long, value_name = "VALUE")]
	pub select: Option<String>,
}

/// Parses `value` or `value=Label` into an option.
///
/// A missing or blank label falls back to the value.
pub fn parse_option(s: &str) -> Result<BaseOption, String> {
	let (value, label) = s.split_once('=').unwrap_or((s, s));
	let value = value.trim();
	if value.is_empty() {
		return Err(format!("option {s:?} has no value"));
	}
	let label = match label.trim() {
		"" => value,
		label => label,
	};
	Ok(BaseOption::new(value, label))
}
