use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tokio::time::{sleep, timeout};

use super::*;
use crate::store::MemoryQueryStore;

const KEY: &str = "filter";

fn controller(store: &Arc<MemoryQueryStore>) -> FilterController<Arc<MemoryQueryStore>> {
	FilterController::new(Arc::clone(store), FilterOptions::default())
}

fn persisted(store: &MemoryQueryStore) -> Option<String> {
	store.get(KEY)
}

async fn wait_until<F>(name: &str, mut condition: F)
where
	F: FnMut() -> bool,
{
	timeout(Duration::from_secs(2), async move {
		loop {
			if condition() {
				return;
			}
			sleep(Duration::from_millis(10)).await;
		}
	})
	.await
	.unwrap_or_else(|_| panic!("timed out waiting for {name}"));
}

#[tokio::test(start_paused = true)]
async fn debounced_typing_writes_once_with_last_value() {
	let store = Arc::new(MemoryQueryStore::new());
	let filter = controller(&store);

	filter.debounce_update("a");
	sleep(Duration::from_millis(100)).await;
	filter.debounce_update("ab");
	sleep(Duration::from_millis(100)).await;
	filter.debounce_update("abc");
	assert_eq!(store.revision(), 0);

	sleep(DEFAULT_DEBOUNCE + Duration::from_millis(10)).await;
	assert_eq!(store.revision(), 1);
	assert_eq!(persisted(&store).as_deref(), Some("abc"));
}

#[tokio::test(start_paused = true)]
async fn debounce_window_is_500ms_by_default() {
	// Current policy, not a protocol requirement.
	let store = Arc::new(MemoryQueryStore::new());
	let filter = controller(&store);

	filter.debounce_update("owner:me");
	sleep(Duration::from_millis(499)).await;
	assert_eq!(persisted(&store), None);
	sleep(Duration::from_millis(2)).await;
	assert_eq!(persisted(&store).as_deref(), Some("owner:me"));
}

#[tokio::test]
async fn update_writes_immediately_and_notifies() {
	let store = Arc::new(MemoryQueryStore::new());
	let seen = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&seen);
	let filter = FilterController::new(
		Arc::clone(&store),
		FilterOptions::default().with_on_update(move |q| sink.lock().push(q.to_string())),
	);

	filter.update("status:running");
	assert_eq!(persisted(&store).as_deref(), Some("status:running"));
	assert_eq!(filter.buffer(), "status:running");

	filter.update(FilterValues::new().with("owner", "me").with("status", ""));
	assert_eq!(persisted(&store).as_deref(), Some("owner:me"));
	assert_eq!(*seen.lock(), vec!["status:running".to_string(), "owner:me".to_string()]);
}

#[tokio::test]
async fn values_are_parsed_from_query() {
	let store = Arc::new(MemoryQueryStore::with(KEY, "owner:me status:running"));
	let filter = controller(&store);

	let values = filter.values();
	assert_eq!(values.get("owner"), Some("me"));
	assert_eq!(values.get("status"), Some("running"));
	assert_eq!(filter.buffer(), "owner:me status:running");
}

#[tokio::test(start_paused = true)]
async fn focused_buffer_survives_external_change_until_blur() {
	let store = Arc::new(MemoryQueryStore::with(KEY, "owner:me"));
	let filter = controller(&store);

	filter.focus();
	filter.input("owner:me st");
	store.set(KEY, "status:stopped".to_string());

	assert!(!filter.reconcile());
	assert_eq!(filter.buffer(), "owner:me st");

	filter.cancel_debounce();
	filter.blur();
	assert_eq!(filter.buffer(), "status:stopped");
	assert_eq!(filter.buffer(), filter.query());

	sleep(DEFAULT_DEBOUNCE * 2).await;
	assert_eq!(persisted(&store).as_deref(), Some("status:stopped"));
}

#[tokio::test]
async fn unfocused_buffer_follows_external_change() {
	let store = Arc::new(MemoryQueryStore::with(KEY, "owner:me"));
	let filter = controller(&store);

	store.set(KEY, "template:docker".to_string());
	assert!(filter.reconcile());
	assert_eq!(filter.buffer(), "template:docker");
	assert!(!filter.reconcile());
}

#[tokio::test(start_paused = true)]
async fn pending_write_lands_after_blur_unless_cancelled() {
	let store = Arc::new(MemoryQueryStore::new());
	let filter = controller(&store);

	filter.focus();
	filter.input("owner:alice");
	filter.blur();
	// Nothing persisted yet, so blur resyncs to the empty query.
	assert_eq!(filter.buffer(), "");
	assert!(filter.has_pending_update());

	sleep(DEFAULT_DEBOUNCE + Duration::from_millis(1)).await;
	assert_eq!(persisted(&store).as_deref(), Some("owner:alice"));
	assert_eq!(filter.buffer(), "owner:alice");
}

#[tokio::test(start_paused = true)]
async fn flush_before_blur_keeps_typed_text() {
	let store = Arc::new(MemoryQueryStore::new());
	let filter = controller(&store);

	filter.focus();
	filter.input("owner:alice");
	assert!(filter.flush_debounce());
	filter.blur();

	assert_eq!(filter.buffer(), "owner:alice");
	assert_eq!(persisted(&store).as_deref(), Some("owner:alice"));
	assert!(!filter.has_pending_update());

	sleep(DEFAULT_DEBOUNCE * 2).await;
	assert_eq!(store.revision(), 1);
	assert!(!filter.flush_debounce());
}

#[tokio::test]
async fn fallback_applies_only_while_nothing_is_persisted() {
	let store = Arc::new(MemoryQueryStore::new());
	let filter = FilterController::new(Arc::clone(&store), FilterOptions::default().with_fallback_filter("owner:me"));

	assert_eq!(filter.query(), "owner:me");
	assert!(!filter.used());

	filter.set_fallback_filter(Some("owner:you".to_string()));
	assert_eq!(filter.query(), "owner:you");
	assert_eq!(filter.buffer(), "owner:you");

	filter.update("status:running");
	assert!(filter.used());

	filter.set_fallback_filter(Some("owner:me".to_string()));
	assert_eq!(filter.query(), "status:running");

	filter.clear();
	assert_eq!(filter.query(), "");
	assert!(!filter.used());
}

#[tokio::test]
async fn query_equal_to_fallback_is_not_used() {
	let store = Arc::new(MemoryQueryStore::with(KEY, "owner:me"));
	let filter = FilterController::new(Arc::clone(&store), FilterOptions::default().with_fallback_filter("owner:me"));
	assert!(!filter.used());
}

#[tokio::test]
async fn set_value_inserts_and_removes_keys() {
	let store = Arc::new(MemoryQueryStore::with(KEY, "owner:me status:running"));
	let filter = controller(&store);

	filter.set_value("template", Some("docker"));
	assert_eq!(filter.query(), "owner:me status:running template:docker");

	filter.set_value("status", None);
	assert_eq!(filter.query(), "owner:me template:docker");

	filter.set_value("owner", Some(""));
	assert_eq!(filter.query(), "template:docker");
}

#[tokio::test]
async fn presets_are_written_immediately() {
	let store = Arc::new(MemoryQueryStore::new());
	let filter = controller(&store);

	filter.apply_preset(&FilterPreset::new("Running", "status:running"));
	assert_eq!(persisted(&store).as_deref(), Some("status:running"));
	assert_eq!(store.revision(), 1);
}

#[tokio::test]
async fn custom_key_is_respected() {
	let store = Arc::new(MemoryQueryStore::new());
	let section = facet_config::FilterSection {
		key: "q".to_string(),
		..Default::default()
	};
	let filter = FilterController::new(Arc::clone(&store), FilterOptions::from_config(&section));

	filter.update("owner:me");
	assert_eq!(store.get("q").as_deref(), Some("owner:me"));
	assert_eq!(persisted(&store), None);
	assert_eq!(filter.key(), "q");
}

#[tokio::test]
async fn reconciler_follows_store_notifications() {
	let store = Arc::new(MemoryQueryStore::new());
	let filter = controller(&store);
	let handle = filter.spawn_reconciler(store.subscribe());

	store.set(KEY, "owner:bob".to_string());
	wait_until("buffer resync", || filter.buffer() == "owner:bob").await;

	filter.focus();
	store.set(KEY, "owner:carol".to_string());
	sleep(Duration::from_millis(20)).await;
	assert_eq!(filter.buffer(), "owner:bob");

	drop(filter);
	store.set(KEY, "owner:dave".to_string());
	timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
}
