//! Submission of a finished design as a multipart form.
//!
//! The payload carries the rendered PNG preview per side, the original
//! uploaded logo file per side (when the logo was not a library selection),
//! and the JSON design descriptor for server-side replay.

use anyhow::Context;
use reqwest::blocking::multipart;
use serde::Deserialize;

use crate::assets::fetch::AssetFetcher;
use crate::catalog::client::{MockupVariant, de_price};
use crate::foundation::core::{ContainerSize, Side};
use crate::foundation::error::{StudioError, StudioResult};
use crate::render::compositor::{Compositor, encode_png};
use crate::studio::descriptor::DesignDescriptor;
use crate::studio::state::{DesignState, SideState};
use crate::studio::validate::validate_submission;

/// Product fields accompanying the design payload.
#[derive(Debug, Clone)]
pub struct ProductMeta {
    /// Product display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Retail price.
    pub price: f64,
    /// Stock to list, when the caller overrides the backend default.
    pub stock: Option<u32>,
}

/// A fully prepared submission for `/custom-products/`.
#[derive(Debug)]
pub struct SubmissionRequest {
    /// Product fields.
    pub meta: ProductMeta,
    /// Replayable design descriptor.
    pub descriptor: DesignDescriptor,
    /// Front preview PNG, when the front side composited.
    pub preview_front: Option<Vec<u8>>,
    /// Back preview PNG, when the back side composited.
    pub preview_back: Option<Vec<u8>>,
    /// Original front logo upload bytes, when one was uploaded.
    pub logo_front: Option<Vec<u8>>,
    /// Original back logo upload bytes, when one was uploaded.
    pub logo_back: Option<Vec<u8>>,
}

impl SubmissionRequest {
    /// Validate, composite both sides concurrently, and assemble the payload.
    ///
    /// A side whose assets fail to load contributes no preview; the caller
    /// submits whatever rendered. Validation failures abort before any
    /// compositing work starts.
    pub fn prepare(
        compositor: &Compositor,
        fetcher: &AssetFetcher,
        variant: &MockupVariant,
        design: &DesignState,
        container: ContainerSize,
        meta: ProductMeta,
    ) -> StudioResult<Self> {
        validate_submission(&meta.name, Some(variant), design)
            .map_err(|e| StudioError::validation(e.to_string()))?;

        let frames = compositor.composite_design(fetcher, variant, design, container);
        let preview_front = frames.front.as_ref().map(encode_png).transpose()?;
        let preview_back = frames.back.as_ref().map(encode_png).transpose()?;

        Ok(Self {
            descriptor: DesignDescriptor::from_state(design, variant, container),
            preview_front,
            preview_back,
            logo_front: first_upload(design.side(Side::Front)),
            logo_back: first_upload(design.side(Side::Back)),
            meta,
        })
    }
}

/// First uploaded-file logo on a side, if any.
fn first_upload(side: &SideState) -> Option<Vec<u8>> {
    side.logos()
        .iter()
        .find_map(|logo| logo.source.as_ref().map(|bytes| bytes.as_ref().clone()))
}

/// Subset of the created-product response the studio consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedProduct {
    /// Backend id of the created product.
    pub id: u64,
    /// Product name as stored.
    pub name: String,
    /// Preview image path, when the backend stored one.
    #[serde(default)]
    pub design_preview: Option<String>,
    /// Fallback product image path.
    #[serde(default)]
    pub image: Option<String>,
    /// Stored price.
    #[serde(default, deserialize_with = "de_price")]
    pub price: f64,
}

/// HTTP client for custom-product submission.
pub struct SubmissionClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl SubmissionClient {
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

    /// Create a custom product from a prepared submission.
    pub fn create_custom_product(
        &self,
        token: &str,
        request: &SubmissionRequest,
    ) -> StudioResult<CreatedProduct> {
        let url = format!("{}/custom-products/", self.base_url);
        let form = build_form(request)?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .with_context(|| format!("submit design to '{url}'"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StudioError::api(format!(
                "submit design failed ({status}): {body}"
            )));
        }
        response
            .json::<CreatedProduct>()
            .map_err(|e| StudioError::serde(format!("parse created product: {e}")))
    }
}

fn build_form(request: &SubmissionRequest) -> StudioResult<multipart::Form> {
    let meta = &request.meta;
    let mut form = multipart::Form::new()
        .text("name", meta.name.trim().to_string())
        .text("price", format_price(meta.price))
        .text("design_data", request.descriptor.to_json()?);

    if let Some(description) = &meta.description {
        form = form.text("description", description.clone());
    }
    if let Some(stock) = meta.stock {
        form = form.text("stock", stock.to_string());
    }

    for side in Side::ALL {
        let (preview, logo) = match side {
            Side::Front => (&request.preview_front, &request.logo_front),
            Side::Back => (&request.preview_back, &request.logo_back),
        };
        if let Some(png) = preview {
            let part = multipart::Part::bytes(png.clone())
                .file_name(format!("custom_preview_{side}.png"))
                .mime_str("image/png")
                .context("preview part mime")?;
            form = form.part(format!("design_preview_{side}"), part);
        }
        if let Some(bytes) = logo {
            let part = multipart::Part::bytes(bytes.clone())
                .file_name(format!("design_logo_{side}"))
                .mime_str("application/octet-stream")
                .context("logo part mime")?;
            form = form.part(format!("design_logo_{side}"), part);
        }
    }

    Ok(form)
}

/// Render a price the way the storefront sends it: integers bare, otherwise
/// two decimals.
fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{}", price as i64)
    } else {
        format!("{price:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::{CanvasSize, Point};
    use crate::render::text::FontCatalog;
    use crate::studio::state::LogoItem;
    use base64::Engine as _;
    use std::io::Cursor;

    fn png_data_url(width: u32, height: u32, rgba: [u8; 4]) -> String {
        let mut img = image::RgbaImage::new(width, height);
        for px in img.pixels_mut() {
            *px = image::Rgba(rgba);
        }
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&buf)
        )
    }

    fn variant_with_front_only() -> MockupVariant {
        serde_json::from_value(serde_json::json!({
            "id": 5,
            "mockup_type": 1,
            "mockup_type_slug": "t-shirt",
            "size": "M",
            "color_name": "White",
            "front_image": png_data_url(16, 16, [240, 240, 240, 255]),
        }))
        .unwrap()
    }

    fn meta() -> ProductMeta {
        ProductMeta {
            name: "My Custom Tee".to_string(),
            description: None,
            price: 699.0,
            stock: Some(9999),
        }
    }

    #[test]
    fn prepare_renders_previews_and_carries_uploads() {
        let compositor = Compositor::new(FontCatalog::new()).with_canvas(CanvasSize {
            width: 16,
            height: 16,
        });
        let fetcher = AssetFetcher::offline().unwrap();
        let container = ContainerSize::new(440.0, 440.0).unwrap();
        let variant = variant_with_front_only();

        let logo_url = png_data_url(4, 4, [255, 0, 0, 255]);
        let mut design = DesignState::new();
        let mut logo = LogoItem::from_upload(logo_url, vec![1, 2, 3]);
        logo.position = Point::new(220.0, 220.0);
        design.side_mut(Side::Front).add_logo(logo).unwrap();

        let request = SubmissionRequest::prepare(
            &compositor,
            &fetcher,
            &variant,
            &design,
            container,
            meta(),
        )
        .unwrap();

        // Front composites; the back has no base image so it yields nothing.
        assert!(request.preview_front.is_some());
        assert!(request.preview_back.is_none());
        assert_eq!(request.logo_front.as_deref(), Some(&[1u8, 2, 3][..]));
        assert!(request.logo_back.is_none());
        assert_eq!(request.descriptor.mockup_variant_id, 5);
        request.descriptor.validate().unwrap();

        build_form(&request).unwrap();
    }

    #[test]
    fn prepare_rejects_an_empty_design_before_compositing() {
        let compositor = Compositor::new(FontCatalog::new());
        let fetcher = AssetFetcher::offline().unwrap();
        let container = ContainerSize::new(440.0, 440.0).unwrap();

        let err = SubmissionRequest::prepare(
            &compositor,
            &fetcher,
            &variant_with_front_only(),
            &DesignState::new(),
            container,
            meta(),
        )
        .unwrap_err();
        assert!(matches!(err, StudioError::Validation(_)));
    }

    #[test]
    fn library_selections_do_not_attach_upload_parts() {
        let compositor = Compositor::new(FontCatalog::new()).with_canvas(CanvasSize {
            width: 16,
            height: 16,
        });
        let fetcher = AssetFetcher::offline().unwrap();
        let container = ContainerSize::new(440.0, 440.0).unwrap();
        let variant = variant_with_front_only();

        let mut design = DesignState::new();
        design
            .side_mut(Side::Front)
            .add_logo(LogoItem::from_library(9, png_data_url(4, 4, [0, 255, 0, 255])))
            .unwrap();

        let request = SubmissionRequest::prepare(
            &compositor,
            &fetcher,
            &variant,
            &design,
            container,
            meta(),
        )
        .unwrap();
        assert!(request.logo_front.is_none());
        assert!(request.preview_front.is_some());
    }

    #[test]
    fn price_formats_like_the_storefront() {
        assert_eq!(format_price(699.0), "699");
        assert_eq!(format_price(749.5), "749.50");
    }
}
