//! softshadow renders soft drop-shadow images for rectangular UI elements and caches them.
//!
//! A [`ShadowSpec`] describes the owner element (size, corner radii) and the shadow
//! (color, blur, expand, offsets). Rendering it goes through a fixed pipeline:
//!
//! 1. **Rasterize**: [`ShapeRasterizer`] paints the solid shadow shape into a canvas
//!    padded for blur bleed (rectangle, circle, or rounded rectangle with stadium caps).
//! 2. **Blur**: [`BoxBlurEngine`] approximates a Gaussian with three box passes per channel.
//! 3. **Encode**: an [`ImageCodec`] (PNG by default) turns pixels into bytes.
//!
//! [`RenderCache`] keys every request by a [`Fingerprint`] of the spec, renders each
//! distinct shadow at most once even under concurrency, and persists entries so they
//! survive restarts. [`shadow_frame`] tells callers where to place the resulting image.
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: value-equal specs produce byte-identical images.
//! - **Straight RGBA8**: pixels are not premultiplied.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cache;
mod effects;
mod encode;
mod foundation;
mod layout;
mod shape;

pub use cache::fingerprint::{ALGORITHM_VERSION, Fingerprint, fingerprint_shadow};
pub use cache::render::{
    CacheStats, RenderCache, RenderCacheOpts, render_shadow_pixels, render_shadow_png,
};
pub use effects::blur::{
    BoxBlurEngine, GAUSS_BOX_PASSES, blur_pixels, box_blur_channel, boxes_for_gauss,
};
pub use encode::png::{ImageCodec, PngCodec};
pub use foundation::core::{Color, PixelBuffer};
pub use foundation::error::{ShadowError, ShadowResult};
pub use layout::placement::{OwnerGeometry, shadow_frame};
pub use shape::raster::{RasterOpts, ShapeKind, ShapeRasterizer};
pub use shape::spec::{
    Corner, CornerRadii, MAX_BLUR_RADIUS, MAX_CANVAS_SIDE, OwnerPosition, SHADOW_MARGIN,
    ShadowOptions, ShadowSpec,
};
