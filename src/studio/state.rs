use std::collections::BTreeMap;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::assets::color::Rgba8;
use crate::foundation::core::{ContainerSize, Point, Side, Vec2};
use crate::studio::validate::ValidationError;

/// Maximum number of logos a single side can hold.
pub const MAX_LOGOS_PER_SIDE: usize = 3;

/// Element scale band. Out-of-band values are clamped, not wrapped.
pub const MIN_SCALE: f64 = 0.05;
/// Upper bound of the element scale band.
pub const MAX_SCALE: f64 = 1.5;

/// Element rotation band in degrees. Out-of-band values are clamped, not wrapped.
pub const MIN_ROTATION_DEG: f64 = -180.0;
/// Upper bound of the element rotation band in degrees.
pub const MAX_ROTATION_DEG: f64 = 180.0;

const DEFAULT_SCALE: f64 = 0.6;
const DEFAULT_POSITION: Point = Point::new(220.0, 220.0);

/// Clamp a requested scale into the allowed band.
pub fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Clamp a requested rotation into the allowed band.
pub fn clamp_rotation(deg: f64) -> f64 {
    deg.clamp(MIN_ROTATION_DEG, MAX_ROTATION_DEG)
}

/// A placed logo: an uploaded file or a design-library selection.
///
/// Position is stored in the editor container's pixel space; compositing
/// rescales it into canvas space.
#[derive(Clone, Debug)]
pub struct LogoItem {
    /// Resolved image URL (object URL, backend media path, or data URL).
    pub url: String,
    /// Original uploaded bytes, kept for submission alongside the preview.
    pub source: Option<Arc<Vec<u8>>>,
    /// Design-library item id when selected from the library.
    pub library_ref: Option<u64>,
    /// Anchor position in container pixel space.
    pub position: Point,
    scale: f64,
    rotation_deg: f64,
}

impl LogoItem {
    /// Logo referencing an already-hosted image.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source: None,
            library_ref: None,
            position: DEFAULT_POSITION,
            scale: DEFAULT_SCALE,
            rotation_deg: 0.0,
        }
    }

    /// Logo created from a file upload. The bytes travel with the submission.
    pub fn from_upload(url: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            source: Some(Arc::new(bytes)),
            ..Self::new(url)
        }
    }

    /// Logo selected from the design library.
    pub fn from_library(library_id: u64, url: impl Into<String>) -> Self {
        Self {
            library_ref: Some(library_id),
            ..Self::new(url)
        }
    }

    /// Current scale, always within `[MIN_SCALE, MAX_SCALE]`.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Current rotation in degrees, always within the rotation band.
    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    /// Set scale from a slider value, clamped.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = clamp_scale(scale);
    }

    /// Apply a discrete scale tap (e.g. ±0.1), clamped.
    pub fn nudge_scale(&mut self, delta: f64) {
        self.set_scale(self.scale + delta);
    }

    /// Set rotation from a slider value, clamped (not wrapped).
    pub fn set_rotation(&mut self, deg: f64) {
        self.rotation_deg = clamp_rotation(deg);
    }

    /// Apply a discrete rotation tap (e.g. ±15°, ±45°), clamped.
    pub fn nudge_rotation(&mut self, delta_deg: f64) {
        self.set_rotation(self.rotation_deg + delta_deg);
    }
}

/// The single text block a side can carry.
///
/// The per-character color array always has exactly one entry per char of
/// `content`; every edit resynchronizes it against the block default.
#[derive(Clone, Debug)]
pub struct TextBlock {
    /// Font family requested for drawing; resolved through the font catalog.
    pub font_family: String,
    /// Default color for characters without an override.
    pub color: Rgba8,
    /// Anchor position in container pixel space.
    pub position: Point,
    content: String,
    char_colors: Vec<Rgba8>,
    scale: f64,
    rotation_deg: f64,
}

impl Default for TextBlock {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            color: Rgba8::BLACK,
            position: DEFAULT_POSITION,
            content: String::new(),
            char_colors: Vec::new(),
            scale: DEFAULT_SCALE,
            rotation_deg: 0.0,
        }
    }
}

impl TextBlock {
    /// Current text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Per-character colors, one entry per char of the content.
    pub fn char_colors(&self) -> &[Rgba8] {
        &self.char_colors
    }

    /// Resolved color for the character at `index` (override, else default).
    pub fn char_color_at(&self, index: usize) -> Rgba8 {
        self.char_colors.get(index).copied().unwrap_or(self.color)
    }

    /// `true` when the block draws nothing.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Replace the content, resynchronizing the color array to its length.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.char_colors = resync_colors(
            &self.char_colors,
            self.content.chars().count(),
            self.color,
        );
    }

    /// Override the color of one character. Returns `false` when out of range.
    pub fn set_char_color(&mut self, index: usize, color: Rgba8) -> bool {
        match self.char_colors.get_mut(index) {
            Some(slot) => {
                *slot = color;
                true
            }
            None => false,
        }
    }

    /// Current scale, always within `[MIN_SCALE, MAX_SCALE]`.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Current rotation in degrees, always within the rotation band.
    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    /// Set scale, clamped.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = clamp_scale(scale);
    }

    /// Apply a discrete scale tap, clamped.
    pub fn nudge_scale(&mut self, delta: f64) {
        self.set_scale(self.scale + delta);
    }

    /// Set rotation, clamped (not wrapped).
    pub fn set_rotation(&mut self, deg: f64) {
        self.rotation_deg = clamp_rotation(deg);
    }

    /// Apply a discrete rotation tap, clamped.
    pub fn nudge_rotation(&mut self, delta_deg: f64) {
        self.set_rotation(self.rotation_deg + delta_deg);
    }
}

/// Resynchronize a per-character color array to a new text length.
///
/// Existing overrides are kept position-for-position; growth pads with
/// `fallback`, shrink truncates.
pub fn resync_colors(old: &[Rgba8], new_len: usize, fallback: Rgba8) -> Vec<Rgba8> {
    let mut out = Vec::with_capacity(new_len);
    out.extend(old.iter().copied().take(new_len));
    out.resize(new_len, fallback);
    out
}

/// An in-progress drag of one element.
///
/// The pointer-to-anchor offset is captured once at drag start so subsequent
/// moves don't jump the element under the pointer. Dropping the session ends
/// the drag.
#[derive(Clone, Copy, Debug)]
pub struct DragSession {
    offset: Vec2,
}

impl DragSession {
    /// Start a drag from the current pointer and element anchor positions.
    pub fn begin(pointer: Point, anchor: Point) -> Self {
        Self {
            offset: pointer - anchor,
        }
    }

    /// Element position for a pointer move, clamped to the container.
    pub fn position_for(&self, pointer: Point, container: ContainerSize) -> Point {
        container.clamp_point(pointer - self.offset)
    }
}

/// Design state for one garment side: up to three logos and a text block.
#[derive(Clone, Debug, Default)]
pub struct SideState {
    logos: SmallVec<[LogoItem; MAX_LOGOS_PER_SIDE]>,
    /// The side's text block.
    pub text: TextBlock,
}

impl SideState {
    /// Logos in paint order (later entries occlude earlier ones).
    pub fn logos(&self) -> &[LogoItem] {
        &self.logos
    }

    /// `true` while another logo slot is available.
    pub fn can_add_logo(&self) -> bool {
        self.logos.len() < MAX_LOGOS_PER_SIDE
    }

    /// Append a logo, rejecting a fourth slot.
    pub fn add_logo(&mut self, logo: LogoItem) -> Result<(), ValidationError> {
        if !self.can_add_logo() {
            return Err(ValidationError::LogoLimit);
        }
        self.logos.push(logo);
        Ok(())
    }

    /// Mutable access to one logo for transform controls.
    pub fn logo_mut(&mut self, index: usize) -> Option<&mut LogoItem> {
        self.logos.get_mut(index)
    }

    /// Remove a logo, returning it when the index was populated.
    pub fn remove_logo(&mut self, index: usize) -> Option<LogoItem> {
        if index < self.logos.len() {
            Some(self.logos.remove(index))
        } else {
            None
        }
    }

    /// `true` when the side has no logos and no text.
    pub fn is_empty(&self) -> bool {
        self.logos.is_empty() && self.text.is_empty()
    }
}

/// Whole-design state: one [`SideState`] per garment side.
///
/// A single keyed container rather than mirrored front/back fields, so side
/// logic cannot drift between copies.
#[derive(Clone, Debug)]
pub struct DesignState {
    sides: BTreeMap<Side, SideState>,
}

impl Default for DesignState {
    fn default() -> Self {
        let mut sides = BTreeMap::new();
        for side in Side::ALL {
            sides.insert(side, SideState::default());
        }
        Self { sides }
    }
}

impl DesignState {
    /// Fresh design with both sides empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one side's state.
    pub fn side(&self, side: Side) -> &SideState {
        &self.sides[&side]
    }

    /// Mutate one side's state.
    pub fn side_mut(&mut self, side: Side) -> &mut SideState {
        self.sides.entry(side).or_default()
    }

    /// Iterate sides in front/back order.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &SideState)> {
        self.sides.iter().map(|(side, state)| (*side, state))
    }

    /// `true` when neither side has any element.
    pub fn is_empty(&self) -> bool {
        self.sides.values().all(SideState::is_empty)
    }
}
