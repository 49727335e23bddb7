//! Teestudio is the compositing engine behind a custom-apparel design studio.
//!
//! It keeps per-side (front/back) placement state for up to three logos and a
//! text block, and rasterizes that state onto garment mockup photography as a
//! print-resolution PNG. The flow is boundary-oriented:
//!
//! - Browse the mockup catalog and design library ([`CatalogClient`],
//!   [`LibraryClient`])
//! - Edit a [`DesignState`] through drag and transform controls
//! - Composite both sides with a [`Compositor`] and submit the previews plus
//!   a replayable [`DesignDescriptor`] via [`SubmissionClient`]
//!
//! Asset and network failures follow the storefront's fail-silent posture: a
//! side whose images cannot load simply produces no output, and catalog
//! fetches downgrade to empty listings.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod catalog;
mod foundation;
mod library;
mod render;
mod studio;
mod submit;

pub use crate::assets::color::Rgba8;
pub use crate::assets::decode::{PreparedImage, decode_image};
pub use crate::assets::fetch::AssetFetcher;
pub use crate::catalog::client::{CatalogClient, ColorOption, MockupType, MockupVariant};
pub use crate::foundation::core::{Affine, CanvasSize, ContainerSize, Point, Side, Vec2};
pub use crate::foundation::error::{StudioError, StudioResult};
pub use crate::library::client::{DesignLibraryItem, LibraryClient, LibraryPage, LibraryQuery};
pub use crate::render::compositor::{Compositor, SideFrames, encode_png};
pub use crate::render::raster::Frame;
pub use crate::render::text::FontCatalog;
pub use crate::studio::descriptor::{
    DESCRIPTOR_TYPE, DesignDescriptor, LogoDescriptor, Placement, SideDescriptor,
    SidesDescriptor, VariantChoice,
};
pub use crate::studio::state::{
    DesignState, DragSession, LogoItem, MAX_LOGOS_PER_SIDE, MAX_ROTATION_DEG, MAX_SCALE,
    MIN_ROTATION_DEG, MIN_SCALE, SideState, TextBlock, clamp_rotation, clamp_scale,
    resync_colors,
};
pub use crate::studio::validate::{ValidationError, validate_submission};
pub use crate::submit::form::{CreatedProduct, ProductMeta, SubmissionClient, SubmissionRequest};
