//! Option sources.
//!
//! A source answers the two questions a menu asks: "which option has this
//! value?" and "which options match this text?". Both are async and fallible.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::option::MenuOption;

/// Backend for a filter menu.
#[async_trait]
pub trait OptionSource<O: MenuOption>: Send + Sync {
	/// Resolves the option whose value is `value`, if it exists.
	async fn resolve_selected(&self, value: &str) -> anyhow::Result<Option<O>>;

	/// Returns the options matching `query`.
	async fn search(&self, query: &str) -> anyhow::Result<Vec<O>>;
}

#[async_trait]
impl<O, S> OptionSource<O> for Arc<S>
where
	O: MenuOption,
	S: OptionSource<O> + ?Sized,
{
	async fn resolve_selected(&self, value: &str) -> anyhow::Result<Option<O>> {
		(**self).resolve_selected(value).await
	}

	async fn search(&self, query: &str) -> anyhow::Result<Vec<O>> {
		(**self).search(query).await
	}
}

/// Closure-backed [`OptionSource`].
pub struct FnOptionSource<R, S> {
	resolve: R,
	search: S,
}

impl<R, S> FnOptionSource<R, S> {
	pub fn new(resolve: R, search: S) -> Self {
		Self { resolve, search }
	}
}

#[async_trait]
impl<O, R, RF, S, SF> OptionSource<O> for FnOptionSource<R, S>
where
	O: MenuOption,
	R: Fn(String) -> RF + Send + Sync,
	RF: Future<Output = anyhow::Result<Option<O>>> + Send,
	S: Fn(String) -> SF + Send + Sync,
	SF: Future<Output = anyhow::Result<Vec<O>>> + Send,
{
	async fn resolve_selected(&self, value: &str) -> anyhow::Result<Option<O>> {
		(self.resolve)(value.to_string()).await
	}

	async fn search(&self, query: &str) -> anyhow::Result<Vec<O>> {
		(self.search)(query.to_string()).await
	}
}

/// Fixed option list, for enumerations such as workspace status.
///
/// Search ignores the query and returns every option; narrowing is left to the
/// menu's client-side filter.
#[derive(Debug, Clone)]
pub struct StaticOptions<O> {
	options: Vec<O>,
}

impl<O: MenuOption> StaticOptions<O> {
	pub fn new(options: impl IntoIterator<Item = O>) -> Self {
		Self {
			options: options.into_iter().collect(),
		}
	}

	pub fn options(&self) -> &[O] {
		&self.options
	}
}

#[async_trait]
impl<O: MenuOption> OptionSource<O> for StaticOptions<O> {
	async fn resolve_selected(&self, value: &str) -> anyhow::Result<Option<O>> {
		Ok(self.options.iter().find(|o| o.value() == value).cloned())
	}

	async fn search(&self, _query: &str) -> anyhow::Result<Vec<O>> {
		Ok(self.options.clone())
	}
}
