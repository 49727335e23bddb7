//! The JSON design descriptor submitted alongside rendered previews.
//!
//! Placement coordinates are normalized to [0,1] fractions of the editor
//! container, so the backend can replay a design at any resolution.

use serde::{Deserialize, Serialize};

use crate::assets::color::Rgba8;
use crate::catalog::client::MockupVariant;
use crate::foundation::core::{ContainerSize, Point, Side};
use crate::foundation::error::{StudioError, StudioResult};
use crate::studio::state::{
    DesignState, LogoItem, MAX_LOGOS_PER_SIDE, MAX_ROTATION_DEG, MAX_SCALE, MIN_ROTATION_DEG,
    MIN_SCALE, SideState,
};

/// Descriptor discriminator for mockup-based designs.
pub const DESCRIPTOR_TYPE: &str = "logo_on_mockup";

/// Normalized element placement: position as container fractions, plus the
/// raw scale and rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Horizontal anchor as a fraction of container width.
    pub x: f64,
    /// Vertical anchor as a fraction of container height.
    pub y: f64,
    /// Element scale.
    pub scale: f64,
    /// Element rotation in degrees.
    pub rotation: f64,
}

impl Placement {
    /// Normalize a container-space anchor into descriptor form.
    pub fn normalized(
        position: Point,
        scale: f64,
        rotation_deg: f64,
        container: ContainerSize,
    ) -> Self {
        Self {
            x: position.x / container.width,
            y: position.y / container.height,
            scale,
            rotation: rotation_deg,
        }
    }

    /// Map the normalized anchor back into a container's pixel space.
    pub fn position_in(&self, container: ContainerSize) -> Point {
        Point::new(self.x * container.width, self.y * container.height)
    }
}

/// One logo entry in a side descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoDescriptor {
    /// Resolved logo image URL.
    pub url: String,
    /// Normalized placement.
    pub placement: Placement,
}

/// Design payload for one garment side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideDescriptor {
    /// `true` when the side carries at least one logo.
    pub has_logo: bool,
    /// `true` when the side carries text.
    pub has_text: bool,
    /// Logos in paint order.
    #[serde(default)]
    pub logos: Vec<LogoDescriptor>,
    /// Text placement, present when the side has text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_placement: Option<Placement>,
    /// Text content, present when the side has text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Default text color, present when the side has text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<Rgba8>,
    /// Requested font family, present when the side has text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_font: Option<String>,
    /// Per-character colors, present when the side has text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_colors: Option<Vec<Rgba8>>,
}

impl SideDescriptor {
    /// Build the descriptor for one side's current state.
    pub fn from_side(side: &SideState, container: ContainerSize) -> Self {
        let logos: Vec<LogoDescriptor> = side
            .logos()
            .iter()
            .map(|logo| LogoDescriptor {
                url: logo.url.clone(),
                placement: Placement::normalized(
                    logo.position,
                    logo.scale(),
                    logo.rotation_deg(),
                    container,
                ),
            })
            .collect();

        let text = &side.text;
        let has_text = !text.is_empty();

        Self {
            has_logo: !logos.is_empty(),
            has_text,
            logos,
            text_placement: has_text.then(|| {
                Placement::normalized(
                    text.position,
                    text.scale(),
                    text.rotation_deg(),
                    container,
                )
            }),
            text: has_text.then(|| text.content().to_string()),
            text_color: has_text.then(|| text.color),
            text_font: has_text.then(|| text.font_family.clone()),
            char_colors: has_text.then(|| text.char_colors().to_vec()),
        }
    }

    /// Replay the descriptor into editable side state for a container.
    ///
    /// Out-of-band scales and rotations are clamped by the state setters, and
    /// the char-color array is resynchronized to the text length.
    pub fn to_side_state(&self, container: ContainerSize) -> SideState {
        let mut side = SideState::default();

        for logo in self.logos.iter().take(MAX_LOGOS_PER_SIDE) {
            let mut item = LogoItem::new(logo.url.clone());
            item.position = container.clamp_point(logo.placement.position_in(container));
            item.set_scale(logo.placement.scale);
            item.set_rotation(logo.placement.rotation);
            // SideState::default() starts empty, so the capped take() cannot
            // overflow the slot limit.
            let _ = side.add_logo(item);
        }

        if let Some(content) = &self.text {
            if let Some(font) = &self.text_font {
                side.text.font_family = font.clone();
            }
            if let Some(color) = self.text_color {
                side.text.color = color;
            }
            side.text.set_content(content.clone());
            if let Some(colors) = &self.char_colors {
                for (i, color) in colors.iter().enumerate() {
                    side.text.set_char_color(i, *color);
                }
            }
            if let Some(p) = self.text_placement {
                side.text.position = container.clamp_point(p.position_in(container));
                side.text.set_scale(p.scale);
                side.text.set_rotation(p.rotation);
            }
        }

        side
    }
}

/// The size/color pairing the shopper picked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantChoice {
    /// Garment size code.
    pub size: String,
    /// Color display name.
    pub color: String,
}

/// Front and back side descriptors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidesDescriptor {
    /// Front side payload.
    pub front: SideDescriptor,
    /// Back side payload.
    pub back: SideDescriptor,
}

/// The complete design descriptor handed to the backend on submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignDescriptor {
    /// Descriptor discriminator, always [`DESCRIPTOR_TYPE`].
    #[serde(rename = "type")]
    pub kind: String,
    /// Mockup type slug.
    pub mockup_type: String,
    /// Selected variant id.
    pub mockup_variant_id: u64,
    /// Selected size/color.
    pub variant: VariantChoice,
    /// Per-side payloads.
    pub sides: SidesDescriptor,
}

impl DesignDescriptor {
    /// Build the submission descriptor for the current design.
    pub fn from_state(
        design: &DesignState,
        variant: &MockupVariant,
        container: ContainerSize,
    ) -> Self {
        Self {
            kind: DESCRIPTOR_TYPE.to_string(),
            mockup_type: variant.mockup_type_slug.clone().unwrap_or_default(),
            mockup_variant_id: variant.id,
            variant: VariantChoice {
                size: variant.size.clone(),
                color: variant.color_name.clone(),
            },
            sides: SidesDescriptor {
                front: SideDescriptor::from_side(design.side(Side::Front), container),
                back: SideDescriptor::from_side(design.side(Side::Back), container),
            },
        }
    }

    /// Read one side's payload.
    pub fn side(&self, side: Side) -> &SideDescriptor {
        match side {
            Side::Front => &self.sides.front,
            Side::Back => &self.sides.back,
        }
    }

    /// Parse a descriptor from JSON.
    pub fn from_json(s: &str) -> StudioResult<Self> {
        serde_json::from_str(s).map_err(|e| StudioError::serde(format!("parse descriptor: {e}")))
    }

    /// Serialize the descriptor to JSON.
    pub fn to_json(&self) -> StudioResult<String> {
        serde_json::to_string(self)
            .map_err(|e| StudioError::serde(format!("serialize descriptor: {e}")))
    }

    /// Validate descriptor invariants.
    ///
    /// Checks the logo slot limit, normalized placement ranges, the transform
    /// bands, and char-color/text alignment.
    pub fn validate(&self) -> StudioResult<()> {
        for side in Side::ALL {
            let d = self.side(side);
            if d.logos.len() > MAX_LOGOS_PER_SIDE {
                return Err(StudioError::validation(format!(
                    "{side}: at most {MAX_LOGOS_PER_SIDE} logos per side"
                )));
            }
            let placements = d
                .logos
                .iter()
                .map(|l| l.placement)
                .chain(d.text_placement);
            for p in placements {
                if !(0.0..=1.0).contains(&p.x) || !(0.0..=1.0).contains(&p.y) {
                    return Err(StudioError::validation(format!(
                        "{side}: placement ({}, {}) outside [0,1]",
                        p.x, p.y
                    )));
                }
                if !(MIN_SCALE..=MAX_SCALE).contains(&p.scale) {
                    return Err(StudioError::validation(format!(
                        "{side}: scale {} outside [{MIN_SCALE}, {MAX_SCALE}]",
                        p.scale
                    )));
                }
                if !(MIN_ROTATION_DEG..=MAX_ROTATION_DEG).contains(&p.rotation) {
                    return Err(StudioError::validation(format!(
                        "{side}: rotation {} outside [{MIN_ROTATION_DEG}, {MAX_ROTATION_DEG}]",
                        p.rotation
                    )));
                }
            }
            if let (Some(text), Some(colors)) = (&d.text, &d.char_colors) {
                if colors.len() != text.chars().count() {
                    return Err(StudioError::validation(format!(
                        "{side}: charColors length {} != text length {}",
                        colors.len(),
                        text.chars().count()
                    )));
                }
            }
        }
        Ok(())
    }
}
