//! Per-character text measurement and drawing.
//!
//! Text is measured and drawn one character at a time so each character can
//! carry its own color. The two passes use independent per-character
//! advances with no kerning-pair adjustment; the resulting non-uniform
//! kerning is an acknowledged simplification of this renderer.

use std::collections::BTreeMap;
use std::sync::Arc;

use ab_glyph::{Font, FontArc, ScaleFont, point};

use crate::assets::color::Rgba8;
use crate::assets::decode::PreparedImage;
use crate::foundation::core::Affine;
use crate::foundation::error::{StudioError, StudioResult};
use crate::render::composite::mul_div255;
use crate::render::raster::{Frame, draw_image};

/// Text size in canvas pixels at scale 1.0.
pub(crate) const BASE_TEXT_SIZE_PX: f32 = 64.0;

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation2/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Named font families available for text blocks.
///
/// Families are registered from raw font bytes; unresolved family names fall
/// back to a default face (a system face when one can be found).
#[derive(Default)]
pub struct FontCatalog {
    families: BTreeMap<String, FontArc>,
    fallback: Option<FontArc>,
}

impl FontCatalog {
    /// Empty catalog with no fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with the first loadable system face as fallback.
    pub fn with_system_fallback() -> Self {
        let mut catalog = Self::new();
        for path in FONT_CANDIDATES {
            if let Ok(bytes) = std::fs::read(path) {
                if let Ok(font) = FontArc::try_from_vec(bytes) {
                    catalog.fallback = Some(font);
                    break;
                }
            }
        }
        catalog
    }

    /// Register a family from raw font bytes (TTF/OTF).
    ///
    /// The first registered family also becomes the fallback when no system
    /// face was found.
    pub fn register(&mut self, family: impl Into<String>, bytes: Vec<u8>) -> StudioResult<()> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| StudioError::asset(format!("parse font: {e}")))?;
        if self.fallback.is_none() {
            self.fallback = Some(font.clone());
        }
        self.families.insert(family.into().to_lowercase(), font);
        Ok(())
    }

    /// Resolve a requested family, falling back to the default face.
    pub fn resolve(&self, family: &str) -> Option<&FontArc> {
        self.families
            .get(&family.to_lowercase())
            .or(self.fallback.as_ref())
    }
}

/// Advance width of each character, measured independently.
pub(crate) fn char_advances(font: &FontArc, size_px: f32, text: &str) -> Vec<f32> {
    let scaled = font.as_scaled(size_px);
    text.chars()
        .map(|ch| scaled.h_advance(scaled.glyph_id(ch)))
        .collect()
}

/// Draw a text run centered on the placement origin.
///
/// `placement` maps text-local coordinates (baseline at y=0, run centered on
/// x=0) into frame coordinates. `colors` holds one resolved color per char.
pub(crate) fn draw_text(
    frame: &mut Frame,
    font: &FontArc,
    text: &str,
    colors: &[Rgba8],
    size_px: f32,
    placement: Affine,
) {
    let advances = char_advances(font, size_px, text);
    let total: f32 = advances.iter().sum();

    let mut pen_x = f64::from(-total / 2.0);
    for (i, ch) in text.chars().enumerate() {
        let color = colors.get(i).copied().unwrap_or_default();
        draw_char(frame, font, ch, size_px, color, placement, pen_x);
        pen_x += f64::from(advances[i]);
    }
}

fn draw_char(
    frame: &mut Frame,
    font: &FontArc,
    ch: char,
    size_px: f32,
    color: Rgba8,
    placement: Affine,
    pen_x: f64,
) {
    let glyph = font
        .glyph_id(ch)
        .with_scale_and_position(size_px, point(0.0, 0.0));
    let Some(outline) = font.outline_glyph(glyph) else {
        // Whitespace and glyphless characters still consumed their advance.
        return;
    };

    let bounds = outline.px_bounds();
    let width = bounds.width().max(0.0).ceil() as u32;
    let height = bounds.height().max(0.0).ceil() as u32;
    if width == 0 || height == 0 {
        return;
    }

    // Rasterize coverage, tint with the character color, and reuse the
    // affine image path so rotation matches logo drawing exactly.
    let mut coverage = vec![0.0f32; width as usize * height as usize];
    outline.draw(|x, y, c| {
        let idx = y as usize * width as usize + x as usize;
        if c > coverage[idx] {
            coverage[idx] = c;
        }
    });

    let premul = color.to_premul();
    let mut rgba = Vec::with_capacity(coverage.len() * 4);
    for c in &coverage {
        let cov = ((c.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
        rgba.push(mul_div255(u16::from(premul[0]), cov));
        rgba.push(mul_div255(u16::from(premul[1]), cov));
        rgba.push(mul_div255(u16::from(premul[2]), cov));
        rgba.push(mul_div255(u16::from(premul[3]), cov));
    }
    let glyph_image = PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba),
    };

    let offset = Affine::translate((
        pen_x + f64::from(bounds.min.x),
        f64::from(bounds.min.y),
    ));
    draw_image(frame, &glyph_image, placement * offset);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::CanvasSize;

    fn fallback_font() -> Option<FontArc> {
        FontCatalog::with_system_fallback().resolve("sans-serif").cloned()
    }

    #[test]
    fn resolve_prefers_registered_family_case_insensitively() {
        // No font bytes can be synthesized here; exercise the lookup table
        // only when a system face is available to register under a test name.
        let Some(bytes) = FONT_CANDIDATES.iter().find_map(|p| std::fs::read(p).ok()) else {
            return;
        };

        let mut catalog = FontCatalog::new();
        catalog.register("Inter", bytes).unwrap();
        assert!(catalog.resolve("inter").is_some());
        assert!(catalog.resolve("INTER").is_some());
        // Unknown family falls back to the first registered face.
        assert!(catalog.resolve("unknown").is_some());
    }

    #[test]
    fn register_rejects_non_font_bytes() {
        let mut catalog = FontCatalog::new();
        assert!(catalog.register("bogus", vec![0u8; 16]).is_err());
    }

    #[test]
    fn advances_measure_each_char_independently() {
        let Some(font) = fallback_font() else {
            return;
        };
        let a = char_advances(&font, 64.0, "AB");
        let b = char_advances(&font, 64.0, "A");
        let c = char_advances(&font, 64.0, "B");
        assert_eq!(a.len(), 2);
        // Per-character measurement: the run is exactly the two independent
        // advances, with no pair adjustment.
        assert_eq!(a[0], b[0]);
        assert_eq!(a[1], c[0]);
        assert!(a.iter().all(|&adv| adv > 0.0));
    }

    #[test]
    fn draw_text_paints_the_requested_color_around_the_anchor() {
        let Some(font) = fallback_font() else {
            return;
        };
        let mut frame = Frame::new(CanvasSize {
            width: 200,
            height: 200,
        });
        let red = Rgba8::rgb(255, 0, 0);
        draw_text(
            &mut frame,
            &font,
            "I",
            &[red],
            64.0,
            Affine::translate((100.0, 100.0)),
        );

        let mut painted = 0usize;
        for y in 0..200 {
            for x in 0..200 {
                let px = frame.pixel(x, y);
                if px[3] > 0 {
                    painted += 1;
                    assert!(px[0] >= px[1] && px[0] >= px[2]);
                }
            }
        }
        assert!(painted > 0);
    }

    #[test]
    fn empty_text_draws_nothing() {
        let Some(font) = fallback_font() else {
            return;
        };
        let mut frame = Frame::new(CanvasSize {
            width: 16,
            height: 16,
        });
        draw_text(&mut frame, &font, "", &[], 64.0, Affine::IDENTITY);
        assert!(frame.data.iter().all(|&b| b == 0));
    }
}
