use crate::foundation::error::{StudioError, StudioResult};

pub use kurbo::{Affine, Point, Vec2};

/// Garment side. Each side owns fully independent design state.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Front of the garment.
    Front,
    /// Back of the garment.
    Back,
}

impl Side {
    /// Both sides, in front/back order.
    pub const ALL: [Side; 2] = [Side::Front, Side::Back];

    /// Lowercase wire name used in descriptors and multipart field names.
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for CanvasSize {
    /// The fixed print-resolution canvas used for preview rasterization.
    fn default() -> Self {
        Self {
            width: 900,
            height: 900,
        }
    }
}

/// On-screen editor container dimensions in display pixels.
///
/// Element positions are stored in this space and rescaled per axis into
/// canvas space at compositing time. The editor enforces a square container,
/// so the per-axis rescale is uniform in practice.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContainerSize {
    /// Width in display pixels.
    pub width: f64,
    /// Height in display pixels.
    pub height: f64,
}

impl ContainerSize {
    /// Create a validated container size (both dimensions finite and > 0).
    pub fn new(width: f64, height: f64) -> StudioResult<Self> {
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(StudioError::validation(
                "container dimensions must be finite and > 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// Clamp a container-space point into the container bounds.
    pub fn clamp_point(self, p: Point) -> Point {
        Point::new(p.x.clamp(0.0, self.width), p.y.clamp(0.0, self.height))
    }
}
