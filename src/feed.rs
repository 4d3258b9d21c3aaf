//! Incremental pagination over the product search API.
//!
//! A [`ProductFeed`] owns one pagination session for a fixed query: the next
//! page cursor, the accumulated items, and the loading/error flags. The
//! presentation layer drives it through [`start`](ProductFeed::start),
//! [`notify_visible`](ProductFeed::notify_visible) and
//! [`retry`](ProductFeed::retry), and observes it through a
//! [`tokio::sync::watch`] channel of [`FeedState`] snapshots.
//!
//! At most one fetch is in flight per feed, including across a restart. The
//! loading flag is claimed atomically before the fetch starts and released
//! only after its result has been applied, so two `advance` calls never
//! interleave their mutations.

use std::sync::Arc;

use tokio::sync::watch;

use crate::client::ProductFetcher;
use crate::error::ProductError;
use crate::models::Product;

// ---------------------------------------------------------------------------
// FeedState
// ---------------------------------------------------------------------------

/// Coarse state of a feed, derived from its [`FeedState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    /// Ready to fetch the next page.
    Idle,
    /// A page fetch is in flight.
    Loading,
    /// An empty page was seen; no further fetches happen until `start`.
    Exhausted,
    /// The last fetch failed; `retry` resumes at the same page.
    Errored,
}

/// Snapshot of a pagination session.
#[derive(Debug, Clone)]
pub struct FeedState {
    /// Products from every page fetched so far, in page order.
    pub items: Vec<Product>,
    pub is_loading: bool,
    /// `false` once an empty page has been observed.
    pub has_more: bool,
    /// 1-based page requested by the next fetch.
    pub next_page: u32,
    pub error_message: Option<String>,
    pub last_error: Option<Arc<ProductError>>,
    generation: u64,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            has_more: true,
            next_page: 1,
            error_message: None,
            last_error: None,
            generation: 0,
        }
    }
}

impl FeedState {
    pub fn phase(&self) -> FeedPhase {
        if self.is_loading {
            FeedPhase::Loading
        } else if self.last_error.is_some() {
            FeedPhase::Errored
        } else if !self.has_more {
            FeedPhase::Exhausted
        } else {
            FeedPhase::Idle
        }
    }
}

/// User-facing sentence for a failed fetch.
pub fn error_message(error: &ProductError) -> String {
    match error {
        ProductError::InvalidRequest(_) => "Invalid request URL.".to_string(),
        ProductError::Decode(_) => "Received unexpected data from server.".to_string(),
        ProductError::Http(code) => format!("Server responded with status code {}.", code),
        ProductError::Network(cause) => format!("Network error: {}", cause),
    }
}

// ---------------------------------------------------------------------------
// ProductFeed
// ---------------------------------------------------------------------------

/// Pagination controller for one product listing.
pub struct ProductFeed {
    fetcher: Arc<dyn ProductFetcher>,
    query: String,
    state: watch::Sender<FeedState>,
}

impl ProductFeed {
    /// Create an empty feed for `query`. Nothing is fetched until
    /// [`start`](Self::start) is called.
    pub fn new(fetcher: Arc<dyn ProductFetcher>, query: &str) -> Self {
        let (state, _) = watch::channel(FeedState::default());
        Self {
            fetcher,
            query: query.to_string(),
            state,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    // -- Observation -------------------------------------------------------

    /// Receive a notification after every state change.
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> FeedState {
        self.state.borrow().clone()
    }

    pub fn items(&self) -> Vec<Product> {
        self.state.borrow().items.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn has_more(&self) -> bool {
        self.state.borrow().has_more
    }

    pub fn error_message(&self) -> Option<String> {
        self.state.borrow().error_message.clone()
    }

    pub fn last_error(&self) -> Option<Arc<ProductError>> {
        self.state.borrow().last_error.clone()
    }

    pub fn phase(&self) -> FeedPhase {
        self.state.borrow().phase()
    }

    // -- Operations --------------------------------------------------------

    /// Reset the session to page 1 with no items and no error, then fetch
    /// the first page.
    ///
    /// The loading flag survives the reset. If a fetch is already in flight,
    /// it keeps the flag, drops its now stale page on arrival, and fetches
    /// page 1 for the new session in its place, so at most one fetch is ever
    /// outstanding.
    pub async fn start(&self) {
        self.state.send_modify(|s| {
            *s = FeedState {
                generation: s.generation.wrapping_add(1),
                is_loading: s.is_loading,
                ..FeedState::default()
            };
        });
        self.advance().await;
    }

    /// Fetch the next page and append it.
    ///
    /// No-op while a fetch is in flight or after an empty page was seen. On
    /// failure the typed error and its message are recorded and the cursor
    /// stays put, so a later call retries the same page.
    pub async fn advance(&self) {
        let mut claimed = None;
        self.state.send_if_modified(|s| {
            if s.is_loading || !s.has_more {
                return false;
            }
            s.is_loading = true;
            s.error_message = None;
            s.last_error = None;
            claimed = Some((s.generation, s.next_page));
            true
        });
        let Some((mut generation, mut page)) = claimed else {
            log::debug!("Skipping fetch for {:?}: busy or exhausted", self.query);
            return;
        };

        let mut guard = LoadingGuard {
            state: &self.state,
            armed: true,
        };
        loop {
            let result = self.fetcher.fetch_products(&self.query, page).await;

            let mut restarted = None;
            self.state.send_if_modified(|s| {
                if s.generation != generation {
                    log::debug!("Discarding stale page {} for {:?}", page, self.query);
                    restarted = Some((s.generation, s.next_page));
                    return false;
                }
                s.is_loading = false;
                match result {
                    Ok(products) if products.is_empty() => {
                        log::info!("No more results for {:?} after page {}", self.query, page - 1);
                        s.has_more = false;
                    }
                    Ok(products) => {
                        s.items.extend(products);
                        s.next_page += 1;
                    }
                    Err(e) => {
                        log::warn!("Fetching page {} for {:?} failed: {}", page, self.query, e);
                        s.error_message = Some(error_message(&e));
                        s.last_error = Some(Arc::new(e));
                    }
                }
                true
            });

            match restarted {
                Some((current, next)) => {
                    generation = current;
                    page = next;
                }
                None => break,
            }
        }
        guard.armed = false;
    }

    /// Infinite-scroll trigger: fetch the next page when `item` is the last
    /// item loaded so far. Items are matched by id.
    pub async fn notify_visible(&self, item: &Product) {
        let is_last = self
            .state
            .borrow()
            .items
            .last()
            .is_some_and(|last| last.id == item.id);
        if is_last {
            self.advance().await;
        }
    }

    /// Re-attempt the page that last failed. Same gating as
    /// [`advance`](Self::advance); items and cursor are left alone.
    pub async fn retry(&self) {
        self.advance().await;
    }
}

/// Releases the loading flag if an `advance` future is dropped mid-fetch.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<FeedState>,
    armed: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.state.send_if_modified(|s| {
            if !s.is_loading {
                return false;
            }
            s.is_loading = false;
            true
        });
    }
}
