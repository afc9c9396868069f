use std::f64::consts::PI;

use kurbo::Point;

use crate::foundation::core::{Color, PixelBuffer};
use crate::shape::spec::{Corner, MAX_CANVAS_SIDE, ShadowSpec};

/// Finest arc step honored; smaller values are raised to it.
const MIN_ARC_STEP_DEG: f64 = 1e-3;

/// Tolerance when matching a radius against half an owner side.
const RADIUS_EPSILON: f32 = 1e-3;

/// Rasterizer tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterOpts {
    /// Angular step of the arc sweeps, in degrees.
    pub arc_step_deg: f64,
    /// Added to each corner's radius to get the number of rings swept for that corner,
    /// indexed like [`Corner::ALL`].
    ///
    /// The default keeps the bottom-right corner one ring short of the others, which is
    /// how existing shadows have always looked. Use [`RasterOpts::symmetric`] for four
    /// identical corners.
    pub stroke_adjust: [i32; 4],
}

impl Default for RasterOpts {
    fn default() -> Self {
        Self {
            arc_step_deg: 0.1,
            stroke_adjust: [0, 0, -1, 0],
        }
    }
}

impl RasterOpts {
    /// Default options with no per-corner stroke adjustment.
    pub fn symmetric() -> Self {
        Self {
            stroke_adjust: [0; 4],
            ..Self::default()
        }
    }
}

/// Which drawing strategy [`ShapeRasterizer::rasterize`] picks for a spec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    /// The solid interior is empty; the canvas stays transparent.
    Empty,
    /// Square corners: the interior is filled.
    Rect,
    /// Square owner whose four equal radii are half its side: one filled disc.
    Circle,
    /// Rectangle with carved corners and, where a side allows it, stadium caps.
    Rounded,
}

/// Turns a [`ShadowSpec`] into the unblurred shadow mask.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShapeRasterizer {
    opts: RasterOpts,
}

/// Half-open pixel rectangle `[x0, x1) × [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Interior {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

impl Interior {
    fn of(spec: &ShadowSpec) -> Self {
        let (w, h) = spec.canvas_size();
        let inset = i64::from(spec.interior_inset());
        Self {
            x0: inset,
            y0: inset,
            x1: i64::from(w) - inset,
            y1: i64::from(h) - inset,
        }
    }

    fn width(&self) -> i64 {
        (self.x1 - self.x0).max(0)
    }

    fn height(&self) -> i64 {
        (self.y1 - self.y0).max(0)
    }

    fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    fn corners(self) -> [Corner; 2] {
        match self {
            Side::Top => [Corner::TopLeft, Corner::TopRight],
            Side::Bottom => [Corner::BottomLeft, Corner::BottomRight],
            Side::Left => [Corner::TopLeft, Corner::BottomLeft],
            Side::Right => [Corner::TopRight, Corner::BottomRight],
        }
    }
}

/// Corner radii as given (non-finite and negative read as 0), rounded to pixels, and
/// clamped to the interior.
struct Radii {
    exact: [f32; 4],
    requested: [i64; 4],
    clamped: [i64; 4],
}

impl Radii {
    fn of(spec: &ShadowSpec, interior: &Interior) -> Self {
        let limit = interior.width().min(interior.height()) / 2;
        let mut exact = [0f32; 4];
        let mut requested = [0i64; 4];
        let mut clamped = [0i64; 4];
        for (i, r) in spec.corner_radii.to_array().into_iter().enumerate() {
            let r = if r.is_finite() && r > 0.0 { r } else { 0.0 };
            let px = r.round() as i64;
            exact[i] = r;
            requested[i] = px;
            clamped[i] = px.min(limit);
        }
        Self {
            exact,
            requested,
            clamped,
        }
    }
}

impl ShapeRasterizer {
    /// Rasterizer with the given options.
    pub fn new(opts: RasterOpts) -> Self {
        Self { opts }
    }

    /// Options in use.
    pub fn opts(&self) -> &RasterOpts {
        &self.opts
    }

    /// Strategy [`ShapeRasterizer::rasterize`] will use for `spec`.
    pub fn classify(&self, spec: &ShadowSpec) -> ShapeKind {
        let interior = Interior::of(spec);
        let radii = Radii::of(spec, &interior);
        classify_parts(spec, &interior, &radii)
    }

    /// Canvas-sized mask: `spec.color` inside the shadow shape, transparent elsewhere.
    #[tracing::instrument(
        level = "debug",
        skip(self, spec),
        fields(width = spec.width, height = spec.height)
    )]
    pub fn rasterize(&self, spec: &ShadowSpec) -> PixelBuffer {
        let (w, h) = spec.canvas_size();
        if w > MAX_CANVAS_SIDE || h > MAX_CANVAS_SIDE {
            tracing::warn!(
                canvas_w = w,
                canvas_h = h,
                max = MAX_CANVAS_SIDE,
                "shadow canvas exceeds the maximum side; leaving it transparent"
            );
            return PixelBuffer::new(w.min(MAX_CANVAS_SIDE), h.min(MAX_CANVAS_SIDE));
        }
        let mut buf = PixelBuffer::new(w, h);
        if spec.width == 0 || spec.height == 0 {
            tracing::warn!("shadow owner has a zero dimension");
        }

        let interior = Interior::of(spec);
        let radii = Radii::of(spec, &interior);
        match classify_parts(spec, &interior, &radii) {
            ShapeKind::Empty => {
                tracing::debug!("shadow interior is empty; leaving canvas transparent");
            }
            ShapeKind::Rect => fill_interior(&mut buf, &interior, spec.color),
            ShapeKind::Circle => draw_disc(&mut buf, &interior, spec.color),
            ShapeKind::Rounded => {
                fill_interior(&mut buf, &interior, spec.color);
                self.carve_rounded(&mut buf, spec, &interior, &radii);
            }
        }
        buf
    }

    fn carve_rounded(
        &self,
        buf: &mut PixelBuffer,
        spec: &ShadowSpec,
        interior: &Interior,
        radii: &Radii,
    ) {
        let mut capped = [false; 4];
        for side in [Side::Top, Side::Bottom, Side::Left, Side::Right] {
            let [a, b] = side.corners();
            if capped[a.index()] || capped[b.index()] {
                continue;
            }
            if !has_stadium_cap(spec, radii, side) {
                continue;
            }
            self.draw_cap(buf, interior, side, spec.color);
            capped[a.index()] = true;
            capped[b.index()] = true;
        }

        for corner in Corner::ALL {
            let i = corner.index();
            let r = radii.clamped[i];
            if capped[i] || r == 0 {
                continue;
            }
            if r != radii.requested[i] {
                tracing::warn!(
                    ?corner,
                    requested = radii.requested[i],
                    clamped = r,
                    "corner radius exceeds half the shadow interior; clamping"
                );
            }
            let stroke = (r + i64::from(self.opts.stroke_adjust[i])).max(0);
            self.draw_corner(buf, interior, corner, r, stroke, spec.color);
        }
    }

    fn draw_corner(
        &self,
        buf: &mut PixelBuffer,
        interior: &Interior,
        corner: Corner,
        r: i64,
        stroke: i64,
        color: Color,
    ) {
        let Interior { x0, y0, x1, y1 } = *interior;
        // r×r carve box at (bx0, by0); the arc center is its corner facing the interior.
        let (bx0, by0, center, start_deg) = match corner {
            Corner::TopLeft => (x0, y0, (x0 + r, y0 + r), 180.0),
            Corner::TopRight => (x1 - r, y0, (x1 - r, y0 + r), 270.0),
            Corner::BottomRight => (x1 - r, y1 - r, (x1 - r, y1 - r), 0.0),
            Corner::BottomLeft => (x0, y1 - r, (x0 + r, y1 - r), 90.0),
        };
        buf.fill_rect(bx0, by0, bx0 + r, by0 + r, Color::TRANSPARENT);

        let center = Point::new(center.0 as f64, center.1 as f64);
        let dropped = self.sweep(buf, interior, center, stroke, start_deg, start_deg + 90.0, color);
        if dropped > 0 {
            tracing::trace!(?corner, dropped, "arc points outside the interior skipped");
        }
    }

    fn draw_cap(&self, buf: &mut PixelBuffer, interior: &Interior, side: Side, color: Color) {
        let Interior { x0, y0, x1, y1 } = *interior;
        let (iw, ih) = (interior.width() as f64, interior.height() as f64);
        // A cap spans the whole side, so its radius is half that side of the interior.
        let (radius, center, start_deg) = match side {
            Side::Top => (iw / 2.0, Point::new(x0 as f64 + iw / 2.0, y0 as f64 + iw / 2.0), 180.0),
            Side::Bottom => (iw / 2.0, Point::new(x0 as f64 + iw / 2.0, y1 as f64 - iw / 2.0), 0.0),
            Side::Left => (ih / 2.0, Point::new(x0 as f64 + ih / 2.0, y0 as f64 + ih / 2.0), 90.0),
            Side::Right => (ih / 2.0, Point::new(x1 as f64 - ih / 2.0, y0 as f64 + ih / 2.0), 270.0),
        };
        let depth = radius.ceil() as i64;
        match side {
            Side::Top => buf.fill_rect(x0, y0, x1, (y0 + depth).min(y1), Color::TRANSPARENT),
            Side::Bottom => buf.fill_rect(x0, (y1 - depth).max(y0), x1, y1, Color::TRANSPARENT),
            Side::Left => buf.fill_rect(x0, y0, (x0 + depth).min(x1), y1, Color::TRANSPARENT),
            Side::Right => buf.fill_rect((x1 - depth).max(x0), y0, x1, y1, Color::TRANSPARENT),
        }

        let rings = (radius + 0.5).floor() as i64;
        self.sweep(buf, interior, center, rings, start_deg, start_deg + 180.0, color);
    }

    /// Write `color` along rings of radius `k - 0.5` for `k = 1..=rings` between two
    /// angles (degrees, y down). Points are clipped to the interior; returns how many
    /// were dropped.
    #[allow(clippy::too_many_arguments)]
    fn sweep(
        &self,
        buf: &mut PixelBuffer,
        interior: &Interior,
        center: Point,
        rings: i64,
        start_deg: f64,
        end_deg: f64,
        color: Color,
    ) -> usize {
        let step = if self.opts.arc_step_deg.is_finite() && self.opts.arc_step_deg > 0.0 {
            self.opts.arc_step_deg.max(MIN_ARC_STEP_DEG)
        } else {
            RasterOpts::default().arc_step_deg
        };
        let steps = ((end_deg - start_deg) / step).ceil() as usize;

        let mut dropped = 0usize;
        for k in 1..=rings {
            let rho = k as f64 - 0.5;
            for i in 0..steps {
                let angle = (start_deg + i as f64 * step) * PI / 180.0;
                let x = (center.x + rho * angle.cos()).floor() as i64;
                let y = (center.y + rho * angle.sin()).floor() as i64;
                if !interior.contains(x, y) || !buf.put(x, y, color) {
                    dropped += 1;
                }
            }
        }
        dropped
    }
}

fn classify_parts(spec: &ShadowSpec, interior: &Interior, radii: &Radii) -> ShapeKind {
    if interior.is_empty() {
        return ShapeKind::Empty;
    }
    if radii.requested.iter().all(|&r| r == 0) {
        return ShapeKind::Rect;
    }
    let r = radii.exact[0];
    let all_equal = radii.exact.iter().all(|&x| (x - r).abs() < RADIUS_EPSILON);
    if all_equal && spec.width == spec.height && spans(r, spec.width) {
        return ShapeKind::Circle;
    }
    ShapeKind::Rounded
}

/// `true` when a radius of `r` on both ends covers an owner side of `side_len` exactly.
fn spans(r: f32, side_len: u32) -> bool {
    r > 0.0 && (2.0 * r - side_len as f32).abs() < RADIUS_EPSILON
}

fn has_stadium_cap(spec: &ShadowSpec, radii: &Radii, side: Side) -> bool {
    let [a, b] = side.corners();
    let (ra, rb) = (radii.exact[a.index()], radii.exact[b.index()]);
    if (ra - rb).abs() >= RADIUS_EPSILON {
        return false;
    }
    let side_len = match side {
        Side::Top | Side::Bottom => spec.width,
        Side::Left | Side::Right => spec.height,
    };
    spans(ra, side_len)
}

fn fill_interior(buf: &mut PixelBuffer, interior: &Interior, color: Color) {
    buf.fill_rect(interior.x0, interior.y0, interior.x1, interior.y1, color);
}

/// Disc inscribed in the interior; a pixel is inside when its center is within the radius.
fn draw_disc(buf: &mut PixelBuffer, interior: &Interior, color: Color) {
    let radius = interior.width().min(interior.height()) as f64 / 2.0;
    let cx = (interior.x0 + interior.x1) as f64 / 2.0;
    let cy = (interior.y0 + interior.y1) as f64 / 2.0;
    let r2 = radius * radius;
    for y in interior.y0..interior.y1 {
        let dy = y as f64 + 0.5 - cy;
        for x in interior.x0..interior.x1 {
            let dx = x as f64 + 0.5 - cx;
            if dx * dx + dy * dy <= r2 {
                buf.put(x, y, color);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shape/raster.rs"]
mod tests;
