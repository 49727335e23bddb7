use anyhow::Context;
use base64::Engine as _;

use crate::foundation::error::{StudioError, StudioResult};

/// Resolves and fetches asset bytes for compositing.
///
/// Handles the three source kinds the studio produces: backend media paths
/// (relative paths joined against the API base URL), inline `data:` URLs
/// (the built-in mockup is an SVG data URL), and local filesystem paths.
///
/// Fetches carry no timeout and no retry: a slow or hung load stalls that
/// compositing call until the transport gives up, and a failed load surfaces
/// as an error the caller downgrades per the studio's fail-silent posture.
pub struct AssetFetcher {
    api_base: String,
    client: reqwest::blocking::Client,
}

impl AssetFetcher {
    /// Create a fetcher resolving relative media paths against `api_base`.
    pub fn new(api_base: impl Into<String>) -> StudioResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("teestudio/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a fetcher with no API base: relative paths resolve to local
    /// files instead of backend media URLs.
    pub fn offline() -> StudioResult<Self> {
        Self::new("")
    }

    /// Resolve a backend media path into an absolute URL.
    ///
    /// Absolute `http(s)` URLs and `data:` URLs pass through unchanged; other
    /// non-empty paths are joined against the API base with a single `/`. An
    /// offline fetcher leaves them untouched, so they read as local files.
    pub fn resolve_url(&self, path: &str) -> String {
        let s = path.trim();
        if s.is_empty() {
            return String::new();
        }
        if s.starts_with("http://") || s.starts_with("https://") || s.starts_with("data:") {
            return s.to_string();
        }
        if self.api_base.is_empty() {
            return s.to_string();
        }
        let normalized = if s.starts_with('/') {
            s.to_string()
        } else {
            format!("/{s}")
        };
        format!("{}{}", self.api_base, normalized)
    }

    /// Fetch raw bytes for a resolved URL.
    pub fn fetch(&self, url: &str) -> StudioResult<Vec<u8>> {
        if url.is_empty() {
            return Err(StudioError::asset("empty asset url"));
        }
        if let Some(rest) = url.strip_prefix("data:") {
            return decode_data_url(rest);
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            let response = self
                .client
                .get(url)
                .send()
                .with_context(|| format!("fetch asset '{url}'"))?;
            if !response.status().is_success() {
                return Err(StudioError::asset(format!(
                    "fetch asset '{url}': status {}",
                    response.status()
                )));
            }
            let bytes = response.bytes().context("read asset body")?;
            return Ok(bytes.to_vec());
        }
        std::fs::read(url)
            .with_context(|| format!("read asset file '{url}'"))
            .map_err(Into::into)
    }
}

/// Decode the payload of a `data:` URL (the part after `data:`).
fn decode_data_url(rest: &str) -> StudioResult<Vec<u8>> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| StudioError::asset("data url has no ',' separator"))?;
    if meta.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| StudioError::asset(format!("data url base64 payload: {e}")))
    } else {
        Ok(percent_decode(payload))
    }
}

fn percent_decode(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(v) = s
                .get(i + 1..i + 3)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            {
                out.push(v);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> AssetFetcher {
        AssetFetcher::new("http://localhost:8000").unwrap()
    }

    #[test]
    fn resolve_joins_relative_media_paths() {
        let f = fetcher();
        assert_eq!(
            f.resolve_url("/media/logos/a.png"),
            "http://localhost:8000/media/logos/a.png"
        );
        assert_eq!(
            f.resolve_url("media/logos/a.png"),
            "http://localhost:8000/media/logos/a.png"
        );
        assert_eq!(f.resolve_url(""), "");
    }

    #[test]
    fn resolve_passes_absolute_and_data_urls_through() {
        let f = fetcher();
        assert_eq!(f.resolve_url("https://cdn.example/a.png"), "https://cdn.example/a.png");
        assert_eq!(f.resolve_url("data:image/png;base64,AAAA"), "data:image/png;base64,AAAA");
    }

    #[test]
    fn trailing_slash_on_base_is_normalized() {
        let f = AssetFetcher::new("http://localhost:8000/").unwrap();
        assert_eq!(f.resolve_url("/a.png"), "http://localhost:8000/a.png");
    }

    #[test]
    fn data_url_base64_round_trips() {
        let payload = base64::engine::general_purpose::STANDARD.encode(b"hello");
        let bytes = fetcher()
            .fetch(&format!("data:image/png;base64,{payload}"))
            .unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn data_url_percent_encoded_svg_decodes() {
        let url = "data:image/svg+xml;charset=utf-8,%3Csvg%20width%3D%221%22%2F%3E";
        let bytes = fetcher().fetch(url).unwrap();
        assert_eq!(bytes, br#"<svg width="1"/>"#);
    }

    #[test]
    fn data_url_without_separator_is_an_error() {
        assert!(fetcher().fetch("data:image/png").is_err());
    }

    #[test]
    fn offline_fetcher_leaves_relative_paths_as_local_files() {
        let f = AssetFetcher::offline().unwrap();
        assert_eq!(f.resolve_url("assets/logo.png"), "assets/logo.png");
        assert_eq!(f.resolve_url("/tmp/logo.png"), "/tmp/logo.png");
        assert!(f.fetch("/definitely/not/a/file.png").is_err());
    }
}
