//! Image loading with store-first lookup and network fallback.
//!
//! A load checks the [`ImageStore`] (memory, then disk), falls back to
//! downloading the URL, decodes the bytes, and writes the result back to the
//! store. Every failure degrades to `None`; nothing is surfaced as an error.
//!
//! Concurrent loads of the same URL share a single in-flight fetch. Loads of
//! distinct URLs run fully in parallel. Disk reads, decoding, and encoding run
//! on the blocking thread pool via [`tokio::task::spawn_blocking`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use image::DynamicImage;
use reqwest::{Client, Url};

use crate::image_store::ImageStore;

type LoadFuture = Shared<BoxFuture<'static, Option<Arc<DynamicImage>>>>;

/// Loads product images through the shared [`ImageStore`].
pub struct ImageLoader {
    store: Arc<ImageStore>,
    http: Client,
    in_flight: Mutex<HashMap<String, LoadFuture>>,
}

impl ImageLoader {
    pub fn new(store: Arc<ImageStore>, http: Client) -> Self {
        Self {
            store,
            http,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// The store this loader reads from and writes through to.
    pub fn store(&self) -> &Arc<ImageStore> {
        &self.store
    }

    /// Number of distinct URLs currently being fetched.
    pub fn in_flight(&self) -> usize {
        self.lock_in_flight().len()
    }

    /// Load the image at `url`, or `None` if it cannot be fetched or decoded.
    pub async fn load(&self, url: &Url) -> Option<Arc<DynamicImage>> {
        if let Some(image) = self.store.get_memory(url) {
            return Some(image);
        }

        let key = url.as_str().to_string();
        let load = {
            let mut in_flight = self.lock_in_flight();
            match in_flight.get(&key) {
                Some(existing) => {
                    log::debug!("Joining in-flight load for {}", url);
                    existing.clone()
                }
                None => {
                    let load = resolve(Arc::clone(&self.store), self.http.clone(), url.clone())
                        .boxed()
                        .shared();
                    in_flight.insert(key.clone(), load.clone());
                    load
                }
            }
        };

        let mut waiter = Waiter {
            loader: self,
            key,
            load: Some(load),
        };
        let image = match waiter.load.as_mut() {
            Some(load) => load.await,
            None => None,
        };
        drop(waiter);
        image
    }

    /// Parse `url` and [`load`](Self::load) it. Unparsable URLs are a miss.
    pub async fn load_str(&self, url: &str) -> Option<Arc<DynamicImage>> {
        match Url::parse(url) {
            Ok(url) => self.load(&url).await,
            Err(e) => {
                log::debug!("Not loading malformed image URL {:?}: {}", url, e);
                None
            }
        }
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<String, LoadFuture>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// One caller's stake in a shared load. On drop, finished loads leave the
/// in-flight table, and so do cancelled ones that no other caller awaits.
struct Waiter<'a> {
    loader: &'a ImageLoader,
    key: String,
    load: Option<LoadFuture>,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.loader.lock_in_flight();
        let Some(load) = self.load.take() else {
            return;
        };
        let remove = match in_flight.get(&self.key) {
            Some(current) if current.peek().is_some() => true,
            // Only the table's copy and ours remain.
            Some(current) => current.ptr_eq(&load) && load.strong_count() == Some(2),
            None => false,
        };
        if remove {
            in_flight.remove(&self.key);
        }
        // Released under the lock so concurrent cancellations count each other.
        drop(load);
    }
}

async fn resolve(store: Arc<ImageStore>, http: Client, url: Url) -> Option<Arc<DynamicImage>> {
    let cached = {
        let store = Arc::clone(&store);
        let url = url.clone();
        tokio::task::spawn_blocking(move || store.get(&url))
            .await
            .ok()
            .flatten()
    };
    if cached.is_some() {
        return cached;
    }

    log::info!("Image cache miss, fetching {}", url);
    let bytes = match fetch_bytes(&http, &url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Failed to fetch image {}: {}", url, e);
            return None;
        }
    };

    tokio::task::spawn_blocking(move || match image::load_from_memory(&bytes) {
        Ok(decoded) => {
            let image = Arc::new(decoded);
            store.put(&url, Arc::clone(&image));
            Some(image)
        }
        Err(e) => {
            log::warn!("Undecodable image at {}: {}", url, e);
            None
        }
    })
    .await
    .ok()
    .flatten()
}

async fn fetch_bytes(http: &Client, url: &Url) -> reqwest::Result<Vec<u8>> {
    let resp = http.get(url.clone()).send().await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}
