use crate::option::MenuOption;

/// Builds the list a menu displays.
///
/// The selected option, if any, is moved to the front and any search result
/// with the same value is dropped, so the selection is listed exactly once.
/// With `client_filter` set, options whose label and value both miss `query`
/// (case-insensitive substring) are then removed, the selection included.
pub fn merge_options<O: MenuOption>(mut options: Vec<O>, selected: Option<&O>, query: &str, client_filter: bool) -> Vec<O> {
	if let Some(selected) = selected {
		options.retain(|o| o.value() != selected.value());
		options.insert(0, selected.clone());
	}

	if client_filter && !query.is_empty() {
		let needle = query.to_lowercase();
		options.retain(|o| o.label().to_lowercase().contains(&needle) || o.value().to_lowercase().contains(&needle));
	}

	options
}
