//! Product browsing core.
//!
//! Queries a paginated product-search API, accumulates result pages for an
//! infinitely scrolling grid, and loads product images through a two-tier
//! (memory + disk) cache. Rendering is left to the caller: it observes a
//! [`ProductFeed`], reports which items became visible, and asks the
//! [`ImageLoader`] for each visible item's image.
//!
//! # Quick start
//!
//! ```no_run
//! use product_showcase::Showcase;
//!
//! # async fn example() -> Result<(), product_showcase::ShowcaseError> {
//! let showcase = Showcase::builder().build()?;
//!
//! let feed = showcase.feed("jeans");
//! feed.start().await;
//!
//! for product in feed.items() {
//!     if let Some(url) = product.primary_image_url() {
//!         let _image = showcase.images().load(url).await;
//!     }
//! }
//!
//! // Scrolling reached the last cell
//! if let Some(last) = feed.items().last() {
//!     feed.notify_visible(last).await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod feed;
pub mod image_loader;
pub mod image_store;
pub mod models;
pub mod request;

pub use client::{ProductClient, ProductFetcher};
pub use error::{ProductError, Result, ShowcaseError};
pub use feed::{FeedPhase, FeedState, ProductFeed};
pub use image_loader::ImageLoader;
pub use image_store::ImageStore;
pub use models::{Pagination, Price, Product, ProductImage, SearchResponse, Swatch};
pub use request::SearchRequest;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

// ---------------------------------------------------------------------------
// ShowcaseBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`Showcase`].
///
/// Use [`Showcase::builder()`] to obtain one, chain configuration methods, and
/// call [`build()`](ShowcaseBuilder::build).
pub struct ShowcaseBuilder {
    cache_dir: Option<PathBuf>,
    base_url: Option<String>,
    timeout: Duration,
    memory_capacity: usize,
    user_agent: String,
}

impl Default for ShowcaseBuilder {
    fn default() -> Self {
        Self {
            cache_dir: None,
            base_url: None,
            timeout: config::DEFAULT_TIMEOUT,
            memory_capacity: config::DEFAULT_MEMORY_CAPACITY,
            user_agent: config::USER_AGENT.to_string(),
        }
    }
}

impl ShowcaseBuilder {
    /// Set the directory for the on-disk image tier.
    ///
    /// If not set, the platform cache directory is used (e.g.
    /// `~/.cache/product-showcase/images` on Linux).
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Point product searches at a different host, such as a staging server.
    ///
    /// The search path and query parameters are appended to it.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    /// HTTP timeout for both search requests and image downloads.
    ///
    /// Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Maximum number of decoded images held in memory. Defaults to 256.
    pub fn memory_capacity(mut self, capacity: usize) -> Self {
        self.memory_capacity = capacity;
        self
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Build the showcase. One HTTP connection pool is shared by the search
    /// client and the image loader.
    ///
    /// Fails with [`ShowcaseError::Io`] if the cache directory cannot be
    /// created.
    pub fn build(self) -> std::result::Result<Showcase, ShowcaseError> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .build()?;

        let mut client = ProductClient::with_http(http.clone());
        if let Some(raw) = &self.base_url {
            let base = Url::parse(raw).map_err(|e| {
                ShowcaseError::InvalidArgument(format!("base URL {:?}: {}", raw, e))
            })?;
            if base.cannot_be_a_base() {
                return Err(ShowcaseError::InvalidArgument(format!(
                    "base URL {:?} cannot carry a path",
                    raw
                )));
            }
            client = client.base_url(base);
        }

        let cache_dir = self.cache_dir.unwrap_or_else(config::default_cache_dir);
        fs::create_dir_all(&cache_dir)?;
        let store = Arc::new(ImageStore::new(cache_dir, self.memory_capacity));
        let images = Arc::new(ImageLoader::new(Arc::clone(&store), http));

        Ok(Showcase {
            client: Arc::new(client),
            store,
            images,
        })
    }
}

// ---------------------------------------------------------------------------
// Showcase
// ---------------------------------------------------------------------------

/// Entry point wiring the search client, image store, and image loader.
///
/// Every collaborator is an explicitly constructed, shared instance; feeds
/// created from the same showcase reuse them.
pub struct Showcase {
    client: Arc<ProductClient>,
    store: Arc<ImageStore>,
    images: Arc<ImageLoader>,
}

impl Showcase {
    pub fn builder() -> ShowcaseBuilder {
        ShowcaseBuilder::default()
    }

    /// Create a fresh pagination session for `query`.
    pub fn feed(&self, query: &str) -> ProductFeed {
        ProductFeed::new(self.client.clone(), query)
    }

    /// Feed for the default query.
    pub fn default_feed(&self) -> ProductFeed {
        self.feed(config::DEFAULT_QUERY)
    }

    pub fn client(&self) -> &Arc<ProductClient> {
        &self.client
    }

    pub fn images(&self) -> &Arc<ImageLoader> {
        &self.images
    }

    pub fn image_store(&self) -> &Arc<ImageStore> {
        &self.store
    }
}

impl fmt::Display for Showcase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showcase(cache_dir={}, cached_images={})",
            self.store.cache_dir().display(),
            self.store.memory_len()
        )
    }
}
