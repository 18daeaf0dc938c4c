//! Filter query controller.
//!
//! Keeps a persisted filter query (see [`facet_query`] for the wire format) and
//! the text buffer a user edits in sync. Typed text is debounced before it is
//! persisted; discrete actions are persisted immediately; external changes
//! reach the buffer only while it is not focused.
//!
//! The store is an injected dependency ([`QueryStore`]) so the controller runs
//! the same against URL parameters, a test double, or [`MemoryQueryStore`].

mod controller;
mod store;

pub use controller::{FilterController, FilterOptions, UpdateCallback};
pub use facet_config::FilterPreset;
pub use facet_query::{FilterValues, IntoQuery};
pub use store::{MemoryQueryStore, QueryStore};
