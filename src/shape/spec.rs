use serde::{Deserialize, Serialize};

use crate::foundation::core::Color;
use crate::foundation::error::{ShadowError, ShadowResult};

/// Transparent band, in pixels, between the canvas edge and the solid shape. It is
/// reserved for blur bleed.
pub const SHADOW_MARGIN: u32 = 10;

/// Largest blur radius (the Gaussian sigma, in pixels) accepted by [`ShadowSpec::validate`].
pub const MAX_BLUR_RADIUS: u32 = 256;

/// Largest canvas side accepted by [`ShadowSpec::validate`].
pub const MAX_CANVAS_SIDE: u32 = 8192;

/// One of the four corners of the owner element.
///
/// The declaration order matches [`CornerRadii::to_array`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-right corner.
    BottomRight,
    /// Bottom-left corner.
    BottomLeft,
}

impl Corner {
    /// All corners in array order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// Position of this corner in [`Corner::ALL`].
    pub fn index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomRight => 2,
            Corner::BottomLeft => 3,
        }
    }
}

/// Per-corner radii in device pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CornerRadii {
    /// Top-left radius.
    pub top_left: f32,
    /// Top-right radius.
    pub top_right: f32,
    /// Bottom-right radius.
    pub bottom_right: f32,
    /// Bottom-left radius.
    pub bottom_left: f32,
}

impl CornerRadii {
    /// Radii listed clockwise from the top-left corner.
    pub fn new(top_left: f32, top_right: f32, bottom_right: f32, bottom_left: f32) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Same radius on every corner.
    pub fn uniform(r: f32) -> Self {
        Self::new(r, r, r, r)
    }

    /// Radius of `corner`.
    pub fn get(&self, corner: Corner) -> f32 {
        self.to_array()[corner.index()]
    }

    /// Radii in [`Corner::ALL`] order.
    pub fn to_array(&self) -> [f32; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// `true` when no corner is rounded.
    pub fn is_zero(&self) -> bool {
        self.to_array().iter().all(|&r| r == 0.0)
    }
}

/// Everything that determines one shadow image.
///
/// `width`/`height` are the owner element's size. The rendered canvas is larger, see
/// [`ShadowSpec::canvas_size`]. Two value-equal specs always render byte-identical images.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShadowSpec {
    /// Owner element width in pixels.
    pub width: u32,
    /// Owner element height in pixels.
    pub height: u32,
    /// Gaussian standard deviation of the blur, in pixels.
    #[serde(default = "default_blur_radius")]
    pub blur_radius: u32,
    /// Grows (positive) or shrinks (negative) the solid shape on every side.
    #[serde(default)]
    pub expand: i32,
    /// Horizontal offset of the shadow relative to its owner.
    #[serde(default)]
    pub x_offset: i32,
    /// Vertical offset of the shadow relative to its owner.
    #[serde(default)]
    pub y_offset: i32,
    /// Shadow color.
    #[serde(default = "default_color")]
    pub color: Color,
    /// Owner corner radii.
    #[serde(default)]
    pub corner_radii: CornerRadii,
}

fn default_blur_radius() -> u32 {
    3
}

fn default_color() -> Color {
    Color::GRAY
}

impl ShadowSpec {
    /// Gray shadow with a blur radius of 3 and square corners.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            blur_radius: default_blur_radius(),
            expand: 0,
            x_offset: 0,
            y_offset: 0,
            color: default_color(),
            corner_radii: CornerRadii::default(),
        }
    }

    /// Softer preset: `#888888`, blur 6, pulled in by 6 pixels on every side.
    pub fn soft(width: u32, height: u32) -> Self {
        Self {
            blur_radius: 6,
            expand: -(3 + 6 / 2),
            color: Color::rgb(0x88, 0x88, 0x88),
            ..Self::new(width, height)
        }
    }

    /// Replace the blur radius.
    pub fn with_blur(mut self, blur_radius: u32) -> Self {
        self.blur_radius = blur_radius;
        self
    }

    /// Replace the expand amount.
    pub fn with_expand(mut self, expand: i32) -> Self {
        self.expand = expand;
        self
    }

    /// Replace both offsets.
    pub fn with_offset(mut self, x_offset: i32, y_offset: i32) -> Self {
        self.x_offset = x_offset;
        self.y_offset = y_offset;
        self
    }

    /// Replace the color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Replace the corner radii.
    pub fn with_corner_radii(mut self, corner_radii: CornerRadii) -> Self {
        self.corner_radii = corner_radii;
        self
    }

    /// Space added around the owner on each side of the canvas:
    /// `blur_radius + SHADOW_MARGIN + max(expand, 0)`.
    pub fn padding(&self) -> u32 {
        saturate_u32(self.padding_u64())
    }

    /// Transparent band on each side of the canvas: `SHADOW_MARGIN + max(-expand, 0)`.
    pub fn interior_inset(&self) -> u32 {
        let shrink = (-i64::from(self.expand)).max(0) as u64;
        saturate_u32(u64::from(SHADOW_MARGIN) + shrink)
    }

    /// Size of the rendered image: the owner grown by [`ShadowSpec::padding`] on every side.
    pub fn canvas_size(&self) -> (u32, u32) {
        let pad = 2 * self.padding_u64();
        (
            saturate_u32(u64::from(self.width) + pad),
            saturate_u32(u64::from(self.height) + pad),
        )
    }

    /// Reject specs whose blur or canvas size are outside the supported bounds.
    ///
    /// Odd geometry (zero size, radii larger than the shape, an interior collapsed by a
    /// negative expand) is not rejected here; the rasterizer clamps it.
    pub fn validate(&self) -> ShadowResult<()> {
        if self.blur_radius > MAX_BLUR_RADIUS {
            return Err(ShadowError::validation(format!(
                "blur_radius {} exceeds the maximum of {MAX_BLUR_RADIUS}",
                self.blur_radius
            )));
        }
        let pad = 2 * self.padding_u64();
        let (w, h) = (
            u64::from(self.width) + pad,
            u64::from(self.height) + pad,
        );
        if w > u64::from(MAX_CANVAS_SIDE) || h > u64::from(MAX_CANVAS_SIDE) {
            return Err(ShadowError::validation(format!(
                "shadow canvas {w}x{h} exceeds the maximum side of {MAX_CANVAS_SIDE}"
            )));
        }
        Ok(())
    }

    fn padding_u64(&self) -> u64 {
        let grow = i64::from(self.expand).max(0) as u64;
        u64::from(self.blur_radius) + u64::from(SHADOW_MARGIN) + grow
    }
}

fn saturate_u32(v: u64) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}

/// Owner layout values that some callers fold into the cache key even though they do
/// not change pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerPosition {
    /// Owner top margin.
    pub margin_top: f32,
    /// Owner left margin.
    pub margin_left: f32,
    /// Parent top padding.
    pub padding_top: f32,
    /// Parent left padding.
    pub padding_left: f32,
}

/// Per-request overrides applied on top of a [`ShadowSpec`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowOptions {
    /// Radii to render with instead of the spec's own.
    pub border: Option<CornerRadii>,
    /// Position folded into the fingerprint only.
    pub position: Option<OwnerPosition>,
}

impl ShadowOptions {
    /// Spec with the border override applied.
    pub fn resolve(&self, spec: &ShadowSpec) -> ShadowSpec {
        match self.border {
            Some(radii) => spec.clone().with_corner_radii(radii),
            None => spec.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shape/spec.rs"]
mod tests;
