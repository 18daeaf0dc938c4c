use serde::{Deserialize, Serialize};

/// A selectable menu entry.
///
/// `value` is the unique id written into the filter query; `label` is what a
/// view displays. Two options are the same menu entry when their values match,
/// whatever else they carry.
pub trait MenuOption: Clone + Send + Sync + 'static {
	fn value(&self) -> &str;
	fn label(&self) -> &str;
}

/// Option with no extension fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseOption {
	pub value: String,
	pub label: String,
}

impl BaseOption {
	pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			value: value.into(),
			label: label.into(),
		}
	}

	/// Option labelled with its own value.
	pub fn from_value(value: impl Into<String>) -> Self {
		let value = value.into();
		Self {
			label: value.clone(),
			value,
		}
	}
}

impl MenuOption for BaseOption {
	fn value(&self) -> &str {
		&self.value
	}

	fn label(&self) -> &str {
		&self.label
	}
}
