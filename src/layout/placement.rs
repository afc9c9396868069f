use kurbo::Rect;
use serde::{Deserialize, Serialize};

use crate::shape::spec::{SHADOW_MARGIN, ShadowSpec};

/// Layout of the element a shadow belongs to, in the parent's coordinate space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerGeometry {
    /// Owner left edge.
    pub x: f64,
    /// Owner top edge.
    pub y: f64,
    /// Owner left margin.
    pub margin_left: f64,
    /// Parent left padding.
    pub padding_left: f64,
    /// Owner left border width.
    pub border_left: f64,
    /// Owner top border width.
    pub border_top: f64,
}

/// Rectangle the shadow image should occupy so its solid shape lines up with the
/// owner, shifted by the spec's offsets. The size is the canvas size.
pub fn shadow_frame(owner: &OwnerGeometry, spec: &ShadowSpec) -> Rect {
    let reach = f64::from(SHADOW_MARGIN)
        + f64::from(spec.blur_radius)
        + f64::from(spec.expand.max(0));
    let x = owner.x.max(owner.margin_left) + f64::from(spec.x_offset) + owner.padding_left
        - (reach + owner.border_left);
    let y = owner.y + f64::from(spec.y_offset) - (reach + owner.border_top);
    let (w, h) = spec.canvas_size();
    Rect::from_origin_size((x, y), (f64::from(w), f64::from(h)))
}

#[cfg(test)]
#[path = "../../tests/unit/layout/placement.rs"]
mod tests;
