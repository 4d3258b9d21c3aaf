use std::path::PathBuf;
use std::time::Duration;

pub const API_BASE: &str = "https://api.hm.com";
pub const SEARCH_PATH: &str = "/search-services/v1/sv_se/search/resultpage";

/// Client identifier sent as the `touchPoint` query parameter.
pub const TOUCH_POINT: &str = "ios";
pub const DEFAULT_QUERY: &str = "jeans";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MEMORY_CAPACITY: usize = 256;
pub const USER_AGENT: &str = concat!("product-showcase/", env!("CARGO_PKG_VERSION"));

pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("product-showcase").join("images")
    } else {
        PathBuf::from(".product-showcase-cache")
    }
}
