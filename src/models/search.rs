use serde::{Deserialize, Serialize};

use super::product::Product;

// ---------------------------------------------------------------------------
// SearchResponse - Wire envelope for one result page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub search_hits: Option<SearchHits>,
    pub pagination: Pagination,
}

impl SearchResponse {
    /// Products on this page. A missing hit container or product list is an
    /// empty page, not an error.
    pub fn into_products(self) -> Vec<Product> {
        self.search_hits
            .and_then(|hits| hits.product_list)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHits {
    pub product_list: Option<Vec<Product>>,
    pub number_of_hits: Option<i64>,
}

/// Server-side pagination metadata. Informational only; end of results is
/// detected by an empty page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
}
