//! Per-side compositing: base mockup photography plus placed elements,
//! rasterized at print resolution.

use std::io::Cursor;

use anyhow::Context;

use crate::assets::color::Rgba8;
use crate::assets::decode::{PreparedImage, decode_image};
use crate::assets::fetch::AssetFetcher;
use crate::catalog::client::MockupVariant;
use crate::foundation::core::{Affine, CanvasSize, ContainerSize, Point, Side};
use crate::foundation::error::{StudioError, StudioResult};
use crate::render::raster::{Frame, draw_image};
use crate::render::text::{BASE_TEXT_SIZE_PX, FontCatalog, draw_text};
use crate::studio::state::{DesignState, LogoItem, SideState, TextBlock};

/// Logo draw width in canvas pixels at scale 1.0.
pub(crate) const BASE_LOGO_WIDTH_PX: f64 = 260.0;

/// Rasterizes side state onto mockup photography.
///
/// Each compositing call allocates its own private frame; front and back
/// share nothing and may run concurrently.
pub struct Compositor {
    canvas: CanvasSize,
    fonts: FontCatalog,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(FontCatalog::with_system_fallback())
    }
}

impl Compositor {
    /// Compositor drawing at the default print canvas (900×900).
    pub fn new(fonts: FontCatalog) -> Self {
        Self {
            canvas: CanvasSize::default(),
            fonts,
        }
    }

    /// Override the output canvas size.
    pub fn with_canvas(mut self, canvas: CanvasSize) -> Self {
        self.canvas = canvas;
        self
    }

    /// The output canvas size.
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Composite already-decoded inputs into a frame.
    ///
    /// Pure with respect to IO: the base fills the canvas, logos draw in
    /// array order (later entries occlude earlier ones), then text draws
    /// character by character. Container-space anchors rescale per axis into
    /// canvas space.
    pub fn composite_prepared(
        &self,
        base: &PreparedImage,
        logos: &[(PreparedImage, LogoItem)],
        text: &TextBlock,
        container: ContainerSize,
    ) -> StudioResult<Frame> {
        let mut frame = Frame::new(self.canvas);

        draw_image(
            &mut frame,
            base,
            Affine::scale_non_uniform(
                f64::from(self.canvas.width) / f64::from(base.width),
                f64::from(self.canvas.height) / f64::from(base.height),
            ),
        );

        for (image, item) in logos {
            let draw_w = BASE_LOGO_WIDTH_PX * item.scale();
            let draw_h = image.height_for_width(draw_w);
            let transform = self.element_transform(item.position, item.rotation_deg(), container)
                * Affine::translate((-draw_w / 2.0, -draw_h / 2.0))
                * Affine::scale(draw_w / f64::from(image.width));
            draw_image(&mut frame, image, transform);
        }

        if !text.is_empty() {
            let font = self.fonts.resolve(&text.font_family).ok_or_else(|| {
                StudioError::render(format!(
                    "no font available for family \"{}\"",
                    text.font_family
                ))
            })?;
            let colors: Vec<Rgba8> = (0..text.content().chars().count())
                .map(|i| text.char_color_at(i))
                .collect();
            let size_px = BASE_TEXT_SIZE_PX * text.scale() as f32;
            let transform =
                self.element_transform(text.position, text.rotation_deg(), container);
            draw_text(&mut frame, font, text.content(), &colors, size_px, transform);
        }

        Ok(frame)
    }

    /// Composite one side from raw state, resolving assets through `fetcher`.
    ///
    /// Any load failure (missing base URL, network error, undecodable bytes,
    /// unresolvable font) aborts this side silently: the caller treats a
    /// `None` as "nothing to submit for this side". No retry.
    #[tracing::instrument(skip_all, fields(side = %side))]
    pub fn composite_side(
        &self,
        fetcher: &AssetFetcher,
        variant: &MockupVariant,
        side: Side,
        state: &SideState,
        container: ContainerSize,
    ) -> Option<Frame> {
        let Some(base_url) = variant.base_image(side) else {
            tracing::debug!("variant has no base image for this side");
            return None;
        };
        let base = match self.load_image(fetcher, base_url) {
            Ok(img) => img,
            Err(e) => {
                tracing::debug!(error = %e, url = base_url, "base image load failed");
                return None;
            }
        };

        let mut logos = Vec::with_capacity(state.logos().len());
        for item in state.logos() {
            match self.load_image(fetcher, &item.url) {
                Ok(img) => logos.push((img, item.clone())),
                Err(e) => {
                    tracing::debug!(error = %e, url = %item.url, "logo load failed");
                    return None;
                }
            }
        }

        match self.composite_prepared(&base, &logos, &state.text, container) {
            Ok(frame) => Some(frame),
            Err(e) => {
                tracing::debug!(error = %e, "compositing failed");
                None
            }
        }
    }

    /// Composite both sides concurrently and join the results.
    ///
    /// The two sides share no mutable state and are order-independent.
    pub fn composite_design(
        &self,
        fetcher: &AssetFetcher,
        variant: &MockupVariant,
        design: &DesignState,
        container: ContainerSize,
    ) -> SideFrames {
        let (front, back) = rayon::join(
            || self.composite_side(fetcher, variant, Side::Front, design.side(Side::Front), container),
            || self.composite_side(fetcher, variant, Side::Back, design.side(Side::Back), container),
        );
        SideFrames { front, back }
    }

    fn load_image(&self, fetcher: &AssetFetcher, url: &str) -> StudioResult<PreparedImage> {
        let resolved = fetcher.resolve_url(url);
        let bytes = fetcher.fetch(&resolved)?;
        decode_image(&bytes)
    }

    /// Anchor transform: container-space position rescaled per axis into
    /// canvas space, then rotation about that point.
    fn element_transform(
        &self,
        position: Point,
        rotation_deg: f64,
        container: ContainerSize,
    ) -> Affine {
        let cx = position.x / container.width * f64::from(self.canvas.width);
        let cy = position.y / container.height * f64::from(self.canvas.height);
        Affine::translate((cx, cy)) * Affine::rotate(rotation_deg.to_radians())
    }
}

/// Composited output for both sides.
#[derive(Clone, Debug)]
pub struct SideFrames {
    /// Front output, when that side composited.
    pub front: Option<Frame>,
    /// Back output, when that side composited.
    pub back: Option<Frame>,
}

impl SideFrames {
    /// One side's output.
    pub fn get(&self, side: Side) -> Option<&Frame> {
        match side {
            Side::Front => self.front.as_ref(),
            Side::Back => self.back.as_ref(),
        }
    }

    /// `true` when neither side produced output.
    pub fn is_empty(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }
}

/// Encode a frame as PNG bytes.
///
/// Deterministic for identical frames, so identical designs produce
/// byte-identical previews.
pub fn encode_png(frame: &Frame) -> StudioResult<Vec<u8>> {
    let mut rgba = frame.data.clone();
    unpremultiply_rgba8_in_place(&mut rgba);

    let img = image::RgbaImage::from_raw(frame.width, frame.height, rgba)
        .ok_or_else(|| StudioError::render("frame buffer does not match dimensions"))?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in px.iter_mut().take(3) {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
