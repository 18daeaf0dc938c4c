//! Searchable filter menus.
//!
//! Each menu of a filter bar (owner, template, status, ...) is a
//! [`FilterMenuController`] over an [`OptionSource`]. The controller resolves
//! the currently selected value to a full option, searches as the user types,
//! and merges both into one list with the selection on top.
//!
//! ```ignore
//! let menu = FilterMenuController::new(
//! 	MenuOptions::new("status", StaticOptions::new(statuses))
//! 		.with_value(filter.values().get("status").unwrap_or_default())
//! 		.with_on_change(move |option| filter.set_value("status", option.map(MenuOption::value))),
//! );
//! ```

mod cache;
mod controller;
mod merge;
mod option;
mod source;
mod state;

pub use cache::OptionCache;
pub use controller::{ChangeCallback, FilterMenuController, FilterMenuState, MenuOptions};
pub use merge::merge_options;
pub use option::{BaseOption, MenuOption};
pub use source::{FnOptionSource, OptionSource, StaticOptions};
pub use state::AsyncState;
