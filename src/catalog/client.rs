//! Read-only mockup/variant catalog client.
//!
//! The catalog is reference data fetched once per studio session; the client
//! exposes strict `Result` methods plus `*_or_empty` conveniences that match
//! the storefront's empty-state downgrade for fetch failures.

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};

use crate::foundation::core::Side;
use crate::foundation::error::{StudioError, StudioResult};

/// A purchasable garment template (T-Shirt, Hoodie, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockupType {
    /// Backend id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// URL slug, used as the catalog lookup key and in descriptors.
    pub slug: String,
    /// Base price before variant modifiers.
    #[serde(default, deserialize_with = "de_price")]
    pub base_price: f64,
    #[serde(default)]
    /// Optional marketing description.
    pub description: Option<String>,
    #[serde(default)]
    /// Preview image shown in the type selector.
    pub preview_image: Option<String>,
    #[serde(default)]
    /// Owning category id, when linked.
    pub category: Option<u64>,
}

/// A specific size/color variant with pre-rendered front/back photography.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockupVariant {
    /// Backend id, referenced by design descriptors.
    pub id: u64,
    /// Owning [`MockupType`] id.
    pub mockup_type: u64,
    #[serde(default)]
    /// Owning type's slug, denormalized by the backend serializer.
    pub mockup_type_slug: Option<String>,
    /// Garment size code (XS..XXXL).
    #[serde(default = "default_size")]
    pub size: String,
    /// Color display name.
    pub color_name: String,
    #[serde(default)]
    /// Hex swatch for the color, when set.
    pub color_hex: Option<String>,
    #[serde(default)]
    /// Front base photography URL.
    pub front_image: Option<String>,
    #[serde(default)]
    /// Back base photography URL.
    pub back_image: Option<String>,
    #[serde(default)]
    /// Small preview thumbnail URL.
    pub thumbnail: Option<String>,
    /// Additional price for this variant.
    #[serde(default, deserialize_with = "de_price")]
    pub price_modifier: f64,
    /// Base price plus modifier, as computed by the backend.
    #[serde(default, deserialize_with = "de_price")]
    pub effective_price: f64,
    #[serde(default)]
    /// Remaining stock for this size/color.
    pub stock: i64,
}

impl MockupVariant {
    /// Base photography URL for one garment side.
    pub fn base_image(&self, side: Side) -> Option<&str> {
        match side {
            Side::Front => self.front_image.as_deref(),
            Side::Back => self.back_image.as_deref(),
        }
    }
}

fn default_size() -> String {
    "M".to_string()
}

/// One distinct color available across the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorOption {
    /// Color display name.
    pub color_name: String,
    #[serde(default)]
    /// Hex swatch, when set.
    pub color_hex: Option<String>,
}

/// Accept prices as JSON numbers or the backend's decimal strings ("699.00").
pub(crate) fn de_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(f64),
        Str(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Num(v) => Ok(v),
        Repr::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid price \"{s}\""))),
    }
}

/// HTTP client for the mockup catalog endpoints.
pub struct CatalogClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl CatalogClient {
    /// Create a client for the given API base URL.
    pub fn new(base_url: impl Into<String>) -> StudioResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("teestudio/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> StudioResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .with_context(|| format!("request '{url}'"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StudioError::api(format!("GET {url} failed ({status}): {body}")));
        }
        response
            .json::<T>()
            .map_err(|e| StudioError::serde(format!("parse response from {url}: {e}")))
    }

    /// List active mockup types.
    pub fn list_types(&self) -> StudioResult<Vec<MockupType>> {
        self.get_json("/mockup-types/", &[])
    }

    /// Fetch one mockup type by slug.
    pub fn get_type(&self, slug: &str) -> StudioResult<MockupType> {
        self.get_json(&format!("/mockup-types/{slug}/"), &[])
    }

    /// List variants, optionally filtered by type slug and/or color name.
    pub fn list_variants(
        &self,
        mockup_type: Option<&str>,
        color: Option<&str>,
    ) -> StudioResult<Vec<MockupVariant>> {
        let mut query = Vec::new();
        if let Some(t) = mockup_type {
            query.push(("mockup_type", t));
        }
        if let Some(c) = color {
            query.push(("color", c));
        }
        self.get_json("/mockup-variants/", &query)
    }

    /// Fetch one variant by id.
    pub fn get_variant(&self, id: u64) -> StudioResult<MockupVariant> {
        self.get_json(&format!("/mockup-variants/{id}/"), &[])
    }

    /// All distinct colors across active variants.
    pub fn available_colors(&self) -> StudioResult<Vec<ColorOption>> {
        self.get_json("/mockup-variants/colors/", &[])
    }

    /// [`Self::list_types`], downgraded to an empty list on failure.
    pub fn list_types_or_empty(&self) -> Vec<MockupType> {
        self.list_types().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "mockup type fetch failed, showing empty catalog");
            Vec::new()
        })
    }

    /// [`Self::list_variants`], downgraded to an empty list on failure.
    pub fn list_variants_or_empty(
        &self,
        mockup_type: Option<&str>,
        color: Option<&str>,
    ) -> Vec<MockupVariant> {
        self.list_variants(mockup_type, color).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "mockup variant fetch failed, showing empty catalog");
            Vec::new()
        })
    }
}
