use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use facet_config::Config;
use facet_filter::{FilterController, FilterOptions, MemoryQueryStore};
use facet_menu::{BaseOption, FilterMenuController, MenuOption, MenuOptions, StaticOptions};
use tracing::debug;

use crate::cli::{Command, MenuArgs};

/// Loads `path` over the defaults, or returns the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
	match path {
		Some(path) => Config::load(path).with_context(|| format!("failed to load config from {}", path.display())),
		None => Ok(Config::default()),
	}
}

/// Executes `command` and returns what should be printed.
pub async fn run(command: Command, config: &Config) -> anyhow::Result<String> {
	debug!(?command, "facet.run");
	match command {
		Command::Parse { query } => Ok(serde_json::to_string_pretty(&facet_query::parse(&query))?),
		Command::Normalize { query } => Ok(facet_query::normalize(&query)),
		Command::Presets { name } => presets(config, name.as_deref()),
		Command::Menu(args) => menu(config, args).await,
	}
}

fn presets(config: &Config, name: Option<&str>) -> anyhow::Result<String> {
	match name {
		Some(name) => config
			.preset(name)
			.map(|p| p.query.clone())
			.ok_or_else(|| anyhow!("no preset named {name:?}")),
		None => Ok(config
			.presets
			.iter()
			.map(|p| format!("{}\t{}", p.name, p.query))
			.collect::<Vec<_>>()
			.join("\n")),
	}
}

/// Wires a filter controller and one menu together the way a filter bar does:
/// the menu's value comes from the parsed query and selections are written
/// back under `args.key`.
async fn menu(config: &Config, args: MenuArgs) -> anyhow::Result<String> {
	let store = Arc::new(MemoryQueryStore::new());
	let filter = FilterController::new(Arc::clone(&store), FilterOptions::from_config(&config.filter));
	if !args.filter.is_empty() {
		filter.update(args.filter.as_str());
	}

	let selectable = args.options.clone();
	let value = args.value.or_else(|| filter.values().get(&args.key).map(str::to_string));
	let writer = filter.clone();
	let key = args.key.clone();
	let mut options = MenuOptions::new(args.key, StaticOptions::new(args.options))
		.with_config(&config.menu)
		.with_on_change(move |option: Option<&BaseOption>| writer.set_value(&key, option.map(MenuOption::value)));
	if let Some(value) = value {
		options = options.with_value(value);
	}

	let menu = FilterMenuController::new(options);
	menu.set_query(args.query);
	menu.settled().await;

	if let Some(select) = args.select {
		let option = selectable
			.into_iter()
			.find(|o| o.value == select)
			.ok_or_else(|| anyhow!("no option with value {select:?}"))?;
		menu.select_option(option);
		menu.settled().await;
	}

	let state = menu.state();
	let out = serde_json::json!({
		"filter": filter.query(),
		"value": state.value,
		"selected": state.selected_option,
		"options": state.search_options.unwrap_or_default(),
	});
	Ok(serde_json::to_string_pretty(&out)?)
}
