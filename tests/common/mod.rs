//! Shared test fixtures for the product showcase integration tests.
//!
//! Provides a scriptable [`StubFetcher`], product fixtures, a sample search
//! envelope as returned by the live API, and a tiny PNG encoder for image
//! tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use product_showcase::{Price, Product, ProductError, ProductFetcher};
use tokio::sync::Notify;

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A product with a name, brand, and one price derived from `id`.
pub fn item(id: &str) -> Product {
    Product {
        id: id.to_string(),
        product_name: Some(format!("Jeans {}", id)),
        brand_name: Some("H&M".to_string()),
        prices: vec![Price {
            formatted_price: Some(format!("{} SEK", id)),
        }],
        images: Some(Vec::new()),
        swatches: Some(Vec::new()),
    }
}

pub fn ids(products: &[Product]) -> Vec<&str> {
    products.iter().map(|p| p.id.as_str()).collect()
}

// ---------------------------------------------------------------------------
// StubFetcher
// ---------------------------------------------------------------------------

/// Serves `pages[page - 1]`, or an empty page past the end. When an error
/// factory is set, every call fails with a fresh error from it instead.
#[derive(Default)]
pub struct StubFetcher {
    inner: Mutex<StubInner>,
}

#[derive(Default)]
struct StubInner {
    pages: Vec<Vec<Product>>,
    error: Option<fn() -> ProductError>,
    calls: Vec<(String, u32)>,
}

impl StubFetcher {
    pub fn with_pages(pages: Vec<Vec<Product>>) -> Arc<Self> {
        let stub = Self::default();
        stub.set_pages(pages);
        Arc::new(stub)
    }

    pub fn failing(error: fn() -> ProductError) -> Arc<Self> {
        let stub = Self::default();
        stub.set_error(Some(error));
        Arc::new(stub)
    }

    pub fn set_pages(&self, pages: Vec<Vec<Product>>) {
        self.inner.lock().unwrap().pages = pages;
    }

    pub fn set_error(&self, error: Option<fn() -> ProductError>) {
        self.inner.lock().unwrap().error = error;
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().calls.len()
    }

    pub fn pages_requested(&self) -> Vec<u32> {
        self.calls().into_iter().map(|(_, page)| page).collect()
    }
}

#[async_trait]
impl ProductFetcher for StubFetcher {
    async fn fetch_products(&self, query: &str, page: u32) -> product_showcase::Result<Vec<Product>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push((query.to_string(), page));
        if let Some(error) = inner.error {
            return Err(error());
        }
        Ok(inner
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// GatedFetcher
// ---------------------------------------------------------------------------

/// Parks every fetch until [`release`](GatedFetcher::release) is called,
/// then serves `responses` in call order (empty pages once they run out).
/// Tracks how many fetches are suspended at once.
#[derive(Default)]
pub struct GatedFetcher {
    inner: Mutex<GatedInner>,
    entered: Notify,
    gate: Notify,
}

#[derive(Default)]
struct GatedInner {
    responses: VecDeque<Vec<Product>>,
    pages: Vec<u32>,
    active: usize,
    max_active: usize,
}

impl GatedFetcher {
    pub fn with_responses(responses: Vec<Vec<Product>>) -> Arc<Self> {
        let stub = Self::default();
        stub.inner.lock().unwrap().responses = responses.into();
        Arc::new(stub)
    }

    /// Resolves once a fetch has started and is parked at the gate.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Let one parked fetch complete.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().pages.len()
    }

    pub fn pages_requested(&self) -> Vec<u32> {
        self.inner.lock().unwrap().pages.clone()
    }

    pub fn max_active(&self) -> usize {
        self.inner.lock().unwrap().max_active
    }
}

#[async_trait]
impl ProductFetcher for GatedFetcher {
    async fn fetch_products(&self, _query: &str, page: u32) -> product_showcase::Result<Vec<Product>> {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.pages.push(page);
            inner.active += 1;
            inner.max_active = inner.max_active.max(inner.active);
        }
        self.entered.notify_one();
        self.gate.notified().await;

        let mut inner = self.inner.lock().unwrap();
        inner.active -= 1;
        Ok(inner.responses.pop_front().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Wire fixtures
// ---------------------------------------------------------------------------

/// Trimmed copy of a real search response with two products.
pub fn sample_response() -> serde_json::Value {
    serde_json::json!({
        "requestDateTime": "2025-12-09T17:14:27.908Z",
        "responseSource": "Elevate",
        "pagination": {
            "currentPage": 1,
            "nextPageNum": 2,
            "totalPages": 47
        },
        "searchHits": {
            "numberOfHits": 2,
            "productList": [
                {
                    "id": "1302894009",
                    "productName": "Flared High Jeans",
                    "external": false,
                    "brandName": "H&M",
                    "url": "/sv_se/productpage.1302894009.html",
                    "prices": [
                        {
                            "priceType": "whitePrice",
                            "price": 299,
                            "formattedPrice": "299,00 kr."
                        }
                    ],
                    "swatches": [
                        { "articleId": "1302894009", "colorName": "Vit", "colorCode": "EFEEEA" },
                        { "articleId": "1302894008", "colorName": "Mörkgrå", "colorCode": "706C6F" }
                    ],
                    "images": [
                        { "url": "https://image.hm.com/assets/hm/78/4e/784e5c168c94bbc02d429fec28685731706be0fe.jpg" }
                    ]
                },
                {
                    "id": "1313469006",
                    "productName": "Flared High Jeans",
                    "brandName": "H&M",
                    "prices": [
                        { "priceType": "whitePrice", "price": 349, "formattedPrice": "349,00 kr." }
                    ],
                    "swatches": [
                        { "articleId": "1313469006", "colorName": "Svart", "colorCode": "000000" }
                    ],
                    "images": [
                        { "url": "https://image.hm.com/assets/hm/e6/52/e65271fcf6d960c264701aaf8867ec127e50fc05.jpg" }
                    ]
                }
            ]
        }
    })
}

// ---------------------------------------------------------------------------
// Image fixtures
// ---------------------------------------------------------------------------

/// A small RGB image with a distinct color per pixel.
pub fn test_image(seed: u8) -> DynamicImage {
    let img = RgbImage::from_fn(4, 3, |x, y| {
        Rgb([seed, (x * 40) as u8, (y * 60) as u8])
    });
    DynamicImage::ImageRgb8(img)
}

pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}
