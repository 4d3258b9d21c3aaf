use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Product - One search hit as rendered in the grid
// ---------------------------------------------------------------------------

/// A product returned by the search API.
///
/// Identity is `id`; everything else is display data. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub product_name: Option<String>,
    pub brand_name: Option<String>,
    pub prices: Vec<Price>,
    pub images: Option<Vec<ProductImage>>,
    pub swatches: Option<Vec<Swatch>>,
}

impl Product {
    /// The first formatted price, which is the one shown in the grid.
    pub fn display_price(&self) -> Option<&str> {
        self.prices.first().and_then(|p| p.formatted_price.as_deref())
    }

    /// URL of the primary image, if the first image carries a usable URL.
    pub fn primary_image_url(&self) -> Option<&Url> {
        self.images
            .as_ref()
            .and_then(|images| images.first())
            .and_then(|image| image.url.as_ref())
    }

    /// Color variants, empty when the server sent none.
    pub fn swatches(&self) -> &[Swatch] {
        self.swatches.as_deref().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Price
// ---------------------------------------------------------------------------

/// A price already localized and currency-formatted by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub formatted_price: Option<String>,
}

// ---------------------------------------------------------------------------
// ProductImage
// ---------------------------------------------------------------------------

/// Reference to a product image. Missing or malformed URLs decode to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(
        default,
        deserialize_with = "lenient_url",
        serialize_with = "url_as_str"
    )]
    pub url: Option<Url>,
}

fn lenient_url<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match Url::parse(&s) {
        Ok(url) => Some(url),
        Err(e) => {
            log::debug!("Ignoring malformed image URL {:?}: {}", s, e);
            None
        }
    }))
}

fn url_as_str<S>(url: &Option<Url>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match url {
        Some(url) => serializer.serialize_some(url.as_str()),
        None => serializer.serialize_none(),
    }
}

// ---------------------------------------------------------------------------
// Swatch - Color variant chip
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swatch {
    pub color_code: Option<String>,
    pub color_name: Option<String>,
}

impl Swatch {
    /// Parse the hex color code into `(r, g, b)`.
    ///
    /// Leading and trailing non-alphanumeric characters (e.g. `#`) are
    /// trimmed and an optional `0x`/`0X` prefix is skipped, then hex digits
    /// are read up to the first non-hex character.
    /// The lowest 24 bits of the scanned value are split into channels.
    /// Returns `None` when the code is absent or starts with no hex digit.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let code = self.color_code.as_deref()?;
        let trimmed = code.trim_matches(|c: char| !c.is_alphanumeric());
        let unprefixed = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let digits: String = unprefixed
            .chars()
            .take_while(|c| c.is_ascii_hexdigit())
            .collect();
        if digits.is_empty() {
            return None;
        }
        // Scanning saturates on overflow; only the low 24 bits matter.
        let value = u64::from_str_radix(&digits, 16).unwrap_or(u64::MAX);
        Some((
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        ))
    }
}
