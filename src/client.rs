//! Product search API client.
//!
//! Executes one GET per page against the search endpoint, validates the HTTP
//! status, and decodes the JSON envelope into a list of [`Product`]s. No
//! retries happen here; retrying is the caller's decision.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::error::{ProductError, Result};
use crate::models::{Product, SearchResponse};
use crate::request::SearchRequest;

/// Source of result pages for a [`ProductFeed`](crate::ProductFeed).
///
/// Implemented by [`ProductClient`] for the live API; tests substitute stubs.
#[async_trait]
pub trait ProductFetcher: Send + Sync {
    /// Fetch one page of results. An empty vector means there are no more
    /// results for `query`.
    async fn fetch_products(&self, query: &str, page: u32) -> Result<Vec<Product>>;
}

/// reqwest-backed client for the product search endpoint.
#[derive(Debug, Clone)]
pub struct ProductClient {
    http: Client,
    base_url: Option<Url>,
}

impl ProductClient {
    /// Create a client with its own HTTP connection pool.
    pub fn new(timeout: Duration) -> std::result::Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(crate::config::USER_AGENT)
            .build()?;
        Ok(Self::with_http(http))
    }

    /// Create a client sharing an existing [`reqwest::Client`].
    pub fn with_http(http: Client) -> Self {
        Self {
            http,
            base_url: None,
        }
    }

    /// Send requests to `base` instead of the production host.
    pub fn base_url(mut self, base: Url) -> Self {
        self.base_url = Some(base);
        self
    }

    fn request_url(&self, query: &str, page: u32) -> Result<Url> {
        let mut request = SearchRequest::new(query).page(page);
        if let Some(base) = &self.base_url {
            request = request.base_url(base.clone());
        }
        request.build()
    }
}

#[async_trait]
impl ProductFetcher for ProductClient {
    async fn fetch_products(&self, query: &str, page: u32) -> Result<Vec<Product>> {
        let url = self.request_url(query, page)?;
        log::info!("Fetching products: {}", url);

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            log::warn!("Search for {:?} page {} failed with {}", query, page, status);
            return Err(ProductError::Http(i32::from(status.as_u16())));
        }

        let body = resp.bytes().await?;
        let decoded: SearchResponse = serde_json::from_slice(&body).map_err(|e| {
            log::warn!("Unexpected search response for page {}: {}", page, e);
            ProductError::Decode(e)
        })?;
        let products = decoded.into_products();
        log::debug!("Page {} returned {} products", page, products.len());
        Ok(products)
    }
}
