//! Paginated design-library search client.
//!
//! The library is the curated pool of reusable logos sellers upload; the
//! studio searches it by keyword/category instead of requiring an upload.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{StudioError, StudioResult};

/// A reusable logo from the curated design library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignLibraryItem {
    /// Backend id, recorded on logos as their library reference.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Logo image URL.
    pub image: String,
    /// Commission credited to the owner per order using this logo.
    #[serde(default = "default_commission")]
    pub commission_per_use: f64,
    #[serde(default)]
    /// Owner's display name, when exposed.
    pub owner_name: Option<String>,
}

fn default_commission() -> f64 {
    49.0
}

/// One page of library search results.
#[derive(Debug, Clone, Default)]
pub struct LibraryPage {
    /// Total matching items across all pages.
    pub count: u64,
    /// `true` when another page follows.
    pub has_next: bool,
    /// Items on this page.
    pub results: Vec<DesignLibraryItem>,
}

impl<'de> Deserialize<'de> for LibraryPage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // The endpoint returns DRF pagination envelopes when pagination is
        // configured and a plain array otherwise; accept both.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Paged {
                count: u64,
                next: Option<String>,
                results: Vec<DesignLibraryItem>,
            },
            Plain(Vec<DesignLibraryItem>),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Paged {
                count,
                next,
                results,
            } => LibraryPage {
                count,
                has_next: next.is_some(),
                results,
            },
            Repr::Plain(results) => LibraryPage {
                count: results.len() as u64,
                has_next: false,
                results,
            },
        })
    }
}

/// Search parameters for one library page.
#[derive(Debug, Clone, Default)]
pub struct LibraryQuery {
    /// Keyword filter.
    pub search: Option<String>,
    /// Category id filter.
    pub category: Option<u64>,
    /// 1-based page number.
    pub page: Option<u32>,
}

/// HTTP client for the design-library endpoint.
pub struct LibraryClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl LibraryClient {
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

    /// Fetch one page of active library items.
    pub fn search(&self, query: &LibraryQuery) -> StudioResult<LibraryPage> {
        let url = format!("{}/design-library/", self.base_url);
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(s) = &query.search {
            params.push(("search", s.clone()));
        }
        if let Some(c) = query.category {
            params.push(("category", c.to_string()));
        }
        if let Some(p) = query.page {
            params.push(("page", p.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .with_context(|| format!("request '{url}'"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StudioError::api(format!("GET {url} failed ({status}): {body}")));
        }
        response
            .json::<LibraryPage>()
            .map_err(|e| StudioError::serde(format!("parse library page: {e}")))
    }

    /// [`Self::search`], downgraded to an empty page on failure.
    pub fn search_or_empty(&self, query: &LibraryQuery) -> LibraryPage {
        self.search(query).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "library search failed, showing empty suggestions");
            LibraryPage::default()
        })
    }
}
