//! Generic list engine: search + pagination + filtering over a fetched
//! collection.
//!
//! A [`ListController`] owns the UI-facing list state (current page, total,
//! loading flag, search form) and is generic over the record type and the
//! async fetch function that produces the *entire* collection. Filtering
//! and pagination happen client-side:
//!
//! - the default filter keeps records whose serialized field contains the
//!   searched value as a substring (case-sensitive), ANDed across fields;
//!   a [`FilterFn`] replaces it wholesale when supplied,
//! - the current page is the contiguous slice
//!   `[(page_num - 1) * page_size, page_num * page_size)` of the filtered
//!   collection.
//!
//! Concurrent `fetch_data` calls are allowed and race by design; a
//! generation counter makes the *last issued* request the winner, so a slow
//! response from an older request can never overwrite newer state (and
//! never touches the loading flag it no longer owns).

use crate::errors::Result;
use crate::notify::Notify;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Fallback page size when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Search form: field name to filter value. Empty values impose no
/// constraint.
pub type SearchForm = BTreeMap<String, String>;

/// Async fetch of the whole unfiltered collection.
pub type FetchFn<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<T>>> + Send + Sync>;

/// Custom filter hook: receives the full collection and the search form.
pub type FilterFn<T> = Arc<dyn Fn(Vec<T>, &SearchForm) -> Vec<T> + Send + Sync>;

/// Construction options for [`ListController`].
#[derive(Clone)]
pub struct ListOptions<T> {
    /// Initial search form snapshot; [`ListController::reset`] restores it
    pub initial_search_form: SearchForm,
    /// Page size applied until the caller changes it
    pub default_page_size: usize,
    /// Replaces the default substring filter when set
    pub custom_filter: Option<FilterFn<T>>,
}

impl<T> Default for ListOptions<T> {
    fn default() -> Self {
        Self {
            initial_search_form: SearchForm::new(),
            default_page_size: DEFAULT_PAGE_SIZE,
            custom_filter: None,
        }
    }
}

/// Point-in-time copy of the list state handed to callers.
#[derive(Debug, Clone)]
pub struct ListSnapshot<T> {
    /// Records of the current page only
    pub items: Vec<T>,
    /// Count of records matching the filter, pre-pagination
    pub total: usize,
    pub page_num: usize,
    pub page_size: usize,
    pub loading: bool,
}

struct ListState<T> {
    items: Vec<T>,
    total: usize,
    page_num: usize,
    page_size: usize,
    loading: bool,
    search_form: SearchForm,
}

pub struct ListController<T> {
    fetch: FetchFn<T>,
    initial_search_form: SearchForm,
    custom_filter: Option<FilterFn<T>>,
    notifier: Arc<dyn Notify>,
    state: Mutex<ListState<T>>,
    generation: AtomicU64,
}

impl<T> ListController<T>
where
    T: Serialize + Clone + Send + 'static,
{
    pub fn new(fetch: FetchFn<T>, options: ListOptions<T>, notifier: Arc<dyn Notify>) -> Self {
        let page_size = options.default_page_size.max(1);

        Self {
            fetch,
            initial_search_form: options.initial_search_form.clone(),
            custom_filter: options.custom_filter,
            notifier,
            state: Mutex::new(ListState {
                items: Vec::new(),
                total: 0,
                page_num: 1,
                page_size,
                loading: false,
                search_form: options.initial_search_form,
            }),
            generation: AtomicU64::new(0),
        }
    }

    /// Convenience constructor from a plain async closure.
    pub fn from_fn<F, Fut>(fetch: F, options: ListOptions<T>, notifier: Arc<dyn Notify>) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
    {
        Self::new(Arc::new(move || fetch().boxed()), options, notifier)
    }

    fn state(&self) -> MutexGuard<'_, ListState<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        let state = self.state();
        ListSnapshot {
            items: state.items.clone(),
            total: state.total,
            page_num: state.page_num,
            page_size: state.page_size,
            loading: state.loading,
        }
    }

    pub fn search_form(&self) -> SearchForm {
        self.state().search_form.clone()
    }

    /// Set one search field. Takes effect on the next [`search`](Self::search).
    pub fn set_field(&self, field: impl Into<String>, value: impl Into<String>) {
        self.state().search_form.insert(field.into(), value.into());
    }

    /// Fetch the collection, filter it through the current search form and
    /// slice out the current page.
    ///
    /// On failure the previous `items`/`total` stay in place, the cause is
    /// logged and a notice is surfaced. The loading flag is always cleared
    /// by whichever call currently owns the state.
    pub async fn fetch_data(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state().loading = true;

        let result = (self.fetch)().await;

        let mut state = self.state();
        if self.generation.load(Ordering::SeqCst) != generation {
            // A newer request was issued while this one was in flight; its
            // completion owns the state now.
            debug!(generation, "Discarding stale list response");
            return;
        }

        match result {
            Ok(all) => {
                let filtered = match &self.custom_filter {
                    Some(filter) => filter(all, &state.search_form),
                    None => default_filter(all, &state.search_form),
                };

                state.total = filtered.len();
                let start = state.page_num.saturating_sub(1) * state.page_size;
                state.items = filtered.into_iter().skip(start).take(state.page_size).collect();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch list data");
                self.notifier.error("Failed to load list data");
            }
        }

        state.loading = false;
    }

    /// Re-run the query from page 1. Call after mutating the search form.
    pub async fn search(&self) {
        self.state().page_num = 1;
        self.fetch_data().await;
    }

    /// Restore the initial search form snapshot, then search.
    ///
    /// Only fields present in the snapshot are overwritten; fields added
    /// later keep whatever value they hold.
    pub async fn reset(&self) {
        {
            let mut state = self.state();
            for (field, value) in &self.initial_search_form {
                state.search_form.insert(field.clone(), value.clone());
            }
        }
        self.search().await;
    }

    /// Jump to a page. No upper bound is enforced: a page past the end
    /// yields empty items while `total` keeps the true count.
    pub async fn set_page(&self, page_num: usize) {
        self.state().page_num = page_num.max(1);
        self.fetch_data().await;
    }

    /// Change the page size and start over from page 1.
    pub async fn set_page_size(&self, page_size: usize) {
        {
            let mut state = self.state();
            state.page_size = page_size.max(1);
            state.page_num = 1;
        }
        self.fetch_data().await;
    }
}

/// Default filter: for every non-empty search field, keep records whose
/// serialized field value contains the searched text (case-sensitive).
/// Fields are ANDed; a record lacking a searched field is dropped.
fn default_filter<T: Serialize>(records: Vec<T>, search_form: &SearchForm) -> Vec<T> {
    let active: Vec<(&String, &String)> = search_form.iter().filter(|(_, value)| !value.is_empty()).collect();
    if active.is_empty() {
        return records;
    }

    records
        .into_iter()
        .filter(|record| {
            let serialized = serde_json::to_value(record).unwrap_or(Value::Null);
            active
                .iter()
                .all(|(field, needle)| field_text(&serialized, field).is_some_and(|text| text.contains(needle.as_str())))
        })
        .collect()
}

/// Stringify one serialized field, `None` when absent or null.
fn field_text(record: &Value, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
