use std::io::Write;
use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;

const FULL: &str = r#"
[filter]
key = "q"
debounce_ms = 250
fallback = "owner:me"

[menu]
client_filter = false

[[presets]]
name = "My workspaces"
query = "owner:me"

[[presets]]
name = "Running"
query = "status:running"
"#;

#[test]
fn empty_input_keeps_defaults() {
	let config = Config::parse("").unwrap();
	assert_eq!(config, Config::default());
	assert_eq!(config.filter.key, "filter");
	assert_eq!(config.filter.debounce, DEFAULT_DEBOUNCE);
	assert!(config.menu.client_filter);
}

#[test]
fn parses_every_section() {
	let config = Config::parse(FULL).unwrap();
	assert_eq!(config.filter.key, "q");
	assert_eq!(config.filter.debounce, Duration::from_millis(250));
	assert_eq!(config.filter.fallback.as_deref(), Some("owner:me"));
	assert!(!config.menu.client_filter);
	assert_eq!(
		config.presets,
		vec![FilterPreset::new("My workspaces", "owner:me"), FilterPreset::new("Running", "status:running")]
	);
	assert_eq!(config.preset("Running").map(|p| p.query.as_str()), Some("status:running"));
}

#[test]
fn later_layer_overrides_and_replaces_presets_by_name() {
	let mut config = Config::parse(FULL).unwrap();
	let layer = ConfigLayer::parse(
		r#"
[filter]
debounce_ms = 100

[[presets]]
name = "Running"
query = "status:running owner:me"

[[presets]]
name = "Failed"
query = "status:failed"
"#,
	)
	.unwrap();
	config.merge(layer);

	assert_eq!(config.filter.key, "q");
	assert_eq!(config.filter.debounce, Duration::from_millis(100));
	let names: Vec<_> = config.presets.iter().map(|p| p.name.as_str()).collect();
	assert_eq!(names, vec!["My workspaces", "Running", "Failed"]);
	assert_eq!(config.preset("Running").unwrap().query, "status:running owner:me");
}

#[test]
fn empty_key_is_rejected() {
	let err = Config::parse("[filter]\nkey = \"\"\n").unwrap_err();
	assert!(matches!(err, ConfigError::EmptyKey));
}

#[test]
fn unnamed_preset_is_rejected() {
	let err = Config::parse("[[presets]]\nname = \" \"\nquery = \"owner:me\"\n").unwrap_err();
	assert!(matches!(err, ConfigError::InvalidPreset(_)));
}

#[test]
fn unknown_fields_are_rejected() {
	let err = Config::parse("[filter]\ndebounce = 5\n").unwrap_err();
	assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn load_reads_file() {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	file.write_all(FULL.as_bytes()).unwrap();
	let config = Config::load(file.path()).unwrap();
	assert_eq!(config.presets.len(), 2);
}

#[test]
fn load_reports_missing_path() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("missing.toml");
	let err = Config::load(&path).unwrap_err();
	match err {
		ConfigError::Io { path: p, .. } => assert_eq!(p, path),
		other => panic!("expected Io error, got {other:?}"),
	}
}
