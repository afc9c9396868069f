use super::*;
use crate::shape::spec::CornerRadii;

const INK: Color = Color::rgb(40, 50, 60);

fn is_ink(buf: &PixelBuffer, x: i64, y: i64) -> bool {
    buf.get(x, y) == Some(INK)
}

fn distance(x: i64, y: i64, cx: f64, cy: f64) -> f64 {
    let dx = x as f64 + 0.5 - cx;
    let dy = y as f64 + 0.5 - cy;
    (dx * dx + dy * dy).sqrt()
}

#[test]
fn square_corners_fill_interior_and_leave_margin_transparent() {
    let spec = ShadowSpec::new(30, 20).with_blur(2).with_color(INK);
    let raster = ShapeRasterizer::default();
    assert_eq!(raster.classify(&spec), ShapeKind::Rect);

    let buf = raster.rasterize(&spec);
    assert_eq!((buf.width(), buf.height()), (54, 44));
    for y in 0..44 {
        for x in 0..54 {
            let inside = (10..44).contains(&x) && (10..34).contains(&y);
            let expected = if inside { INK } else { Color::TRANSPARENT };
            assert_eq!(buf.get(x, y), Some(expected), "pixel ({x}, {y})");
        }
    }
}

#[test]
fn negative_expand_widens_the_transparent_band() {
    let spec = ShadowSpec::new(30, 20).with_blur(2).with_expand(-3).with_color(INK);
    let buf = ShapeRasterizer::default().rasterize(&spec);
    assert_eq!((buf.width(), buf.height()), (54, 44));
    assert!(!is_ink(&buf, 12, 20));
    assert!(is_ink(&buf, 13, 20));
    assert!(is_ink(&buf, 40, 20));
    assert!(!is_ink(&buf, 41, 20));
}

#[test]
fn positive_expand_grows_canvas_and_shape() {
    let spec = ShadowSpec::new(30, 20).with_blur(2).with_expand(4).with_color(INK);
    let buf = ShapeRasterizer::default().rasterize(&spec);
    assert_eq!((buf.width(), buf.height()), (62, 52));
    let filled = buf.pixels().iter().filter(|&&c| c == INK).count();
    assert_eq!(filled, (30 + 4 + 8) * (20 + 4 + 8));
}

#[test]
fn circle_membership_matches_distance_to_center() {
    let spec = ShadowSpec::new(40, 40)
        .with_blur(4)
        .with_color(INK)
        .with_corner_radii(CornerRadii::uniform(20.0));
    let raster = ShapeRasterizer::default();
    assert_eq!(raster.classify(&spec), ShapeKind::Circle);

    let buf = raster.rasterize(&spec);
    assert_eq!((buf.width(), buf.height()), (68, 68));
    // Interior is [10, 58) on both axes.
    let (cx, cy, radius) = (34.0, 34.0, 24.0);
    for y in 0..68 {
        for x in 0..68 {
            let d = distance(x, y, cx, cy);
            if d <= radius - 1.0 {
                assert!(is_ink(&buf, x, y), "({x}, {y}) at {d} should be inside");
            } else if d >= radius + 1.0 {
                assert!(!is_ink(&buf, x, y), "({x}, {y}) at {d} should be outside");
            }
        }
    }
}

#[test]
fn unequal_radii_on_square_owner_is_not_a_circle() {
    let spec = ShadowSpec::new(40, 40).with_corner_radii(CornerRadii::new(20.0, 20.0, 20.0, 19.0));
    assert_eq!(ShapeRasterizer::default().classify(&spec), ShapeKind::Rounded);

    let spec = ShadowSpec::new(40, 40).with_corner_radii(CornerRadii::uniform(10.0));
    assert_eq!(ShapeRasterizer::default().classify(&spec), ShapeKind::Rounded);
}

#[test]
fn rounded_corners_are_carved_around_each_arc_center() {
    let spec = ShadowSpec::new(100, 60)
        .with_blur(6)
        .with_color(INK)
        .with_corner_radii(CornerRadii::uniform(8.0));
    let raster = ShapeRasterizer::new(RasterOpts::symmetric());
    assert_eq!(raster.classify(&spec), ShapeKind::Rounded);
    let buf = raster.rasterize(&spec);
    assert_eq!((buf.width(), buf.height()), (132, 92));

    let interior = Interior::of(&spec);
    assert_eq!(interior, Interior { x0: 10, y0: 10, x1: 122, y1: 82 });
    let r = 8i64;
    let boxes = [
        (10, 10, 18.0, 18.0),
        (114, 10, 114.0, 18.0),
        (114, 74, 114.0, 74.0),
        (10, 74, 18.0, 74.0),
    ];
    for (bx, by, cx, cy) in boxes {
        for y in by..by + r {
            for x in bx..bx + r {
                let d = distance(x, y, cx, cy);
                if d <= r as f64 - 1.0 {
                    assert!(is_ink(&buf, x, y), "({x}, {y}) at {d} should be solid");
                } else if d >= r as f64 + 1.0 {
                    assert!(!is_ink(&buf, x, y), "({x}, {y}) at {d} should be carved");
                }
            }
        }
    }

    // Straight edges are untouched.
    assert!(is_ink(&buf, 60, 10));
    assert!(is_ink(&buf, 10, 40));
    assert!(!is_ink(&buf, 60, 9));
    assert!(!is_ink(&buf, 122, 40));
}

#[test]
fn bottom_right_corner_is_one_ring_short_by_default() {
    // Flags the historical asymmetry: the bottom-right arc sweeps radius - 1 rings.
    let spec = ShadowSpec::new(100, 60)
        .with_blur(6)
        .with_color(INK)
        .with_corner_radii(CornerRadii::uniform(8.0));
    let (x1, y0, y1, r) = (122i64, 10i64, 82i64, 8i64);

    let legacy = ShapeRasterizer::default().rasterize(&spec);
    assert!(is_ink(&legacy, x1 - 1, y0 + r - 1));
    assert!(!is_ink(&legacy, x1 - 1, y1 - r));

    let symmetric = ShapeRasterizer::new(RasterOpts::symmetric()).rasterize(&spec);
    assert!(is_ink(&symmetric, x1 - 1, y0 + r - 1));
    assert!(is_ink(&symmetric, x1 - 1, y1 - r));

    let mut adjusted = RasterOpts::default();
    adjusted.stroke_adjust = [0; 4];
    assert_eq!(ShapeRasterizer::new(adjusted).rasterize(&spec), symmetric);
}

#[test]
fn stadium_side_gets_one_continuous_cap() {
    let spec = ShadowSpec::new(40, 100)
        .with_blur(5)
        .with_color(INK)
        .with_corner_radii(CornerRadii::uniform(20.0));
    let raster = ShapeRasterizer::default();
    assert_eq!(raster.classify(&spec), ShapeKind::Rounded);
    let buf = raster.rasterize(&spec);
    assert_eq!((buf.width(), buf.height()), (70, 130));

    // Interior [10, 60) × [10, 120); the top cap is centered on (35, 35) with radius 25,
    // so its first row is a short chord around x = 35. Two quarter arcs of radius 20
    // would leave a flat run reaching x = 26.
    let top_row: Vec<i64> = (0..70).filter(|&x| is_ink(&buf, x, 10)).collect();
    assert!(top_row.contains(&34) && top_row.contains(&35), "{top_row:?}");
    assert!(top_row.iter().all(|&x| (30..=39).contains(&x)), "{top_row:?}");

    for y in 10..30 {
        let row: Vec<i64> = (0..70).filter(|&x| is_ink(&buf, x, y)).collect();
        assert!(!row.is_empty(), "row {y} is empty");
        let span = row[row.len() - 1] - row[0] + 1;
        assert_eq!(span as usize, row.len(), "row {y} has a seam: {row:?}");
    }

    // Bottom cap mirrors the top one.
    let bottom_row: Vec<i64> = (0..70).filter(|&x| is_ink(&buf, x, 119)).collect();
    assert!(bottom_row.contains(&34) && bottom_row.contains(&35), "{bottom_row:?}");
    assert!(bottom_row.iter().all(|&x| (30..=39).contains(&x)), "{bottom_row:?}");
}

#[test]
fn wide_stadium_caps_left_and_right() {
    let spec = ShadowSpec::new(100, 40)
        .with_blur(5)
        .with_color(INK)
        .with_corner_radii(CornerRadii::uniform(20.0));
    let buf = ShapeRasterizer::default().rasterize(&spec);
    // Interior [10, 120) × [10, 60); both caps are centered on y = 35.
    let left_col: Vec<i64> = (0..70).filter(|&y| is_ink(&buf, 10, y)).collect();
    assert!(left_col.contains(&34) && left_col.contains(&35), "{left_col:?}");
    assert!(left_col.iter().all(|&y| (30..=39).contains(&y)), "{left_col:?}");
    let right_col: Vec<i64> = (0..70).filter(|&y| is_ink(&buf, 119, y)).collect();
    assert!(right_col.contains(&34) && right_col.contains(&35), "{right_col:?}");
    assert!(right_col.iter().all(|&y| (30..=39).contains(&y)), "{right_col:?}");
    assert!(is_ink(&buf, 65, 10));
}

#[test]
fn oversized_radius_is_clamped_not_rejected() {
    let spec = ShadowSpec::new(20, 20)
        .with_blur(0)
        .with_color(INK)
        .with_corner_radii(CornerRadii::new(100.0, 0.0, 0.0, 0.0));
    let buf = ShapeRasterizer::default().rasterize(&spec);
    assert_eq!(buf.len(), 40 * 40);
    assert!(!is_ink(&buf, 10, 10));
    assert!(is_ink(&buf, 29, 29));
    assert!(is_ink(&buf, 29, 10));
}

#[test]
fn non_finite_and_negative_radii_count_as_square() {
    let spec = ShadowSpec::new(20, 20).with_corner_radii(CornerRadii::new(
        f32::NAN,
        -4.0,
        f32::INFINITY,
        0.0,
    ));
    assert_eq!(ShapeRasterizer::default().classify(&spec), ShapeKind::Rect);
}

#[test]
fn collapsed_interior_renders_transparent_canvas() {
    let spec = ShadowSpec::new(20, 20).with_expand(-100).with_color(INK);
    let raster = ShapeRasterizer::default();
    assert_eq!(raster.classify(&spec), ShapeKind::Empty);
    let buf = raster.rasterize(&spec);
    assert!(buf.pixels().iter().all(|&c| c == Color::TRANSPARENT));

    let spec = ShadowSpec::new(0, 0).with_blur(0);
    let buf = raster.rasterize(&spec);
    assert_eq!((buf.width(), buf.height()), (20, 20));
    assert!(buf.pixels().iter().all(|&c| c == Color::TRANSPARENT));
}

#[test]
fn invalid_arc_step_falls_back_to_default() {
    let spec = ShadowSpec::new(50, 30).with_corner_radii(CornerRadii::uniform(6.0));
    let broken = RasterOpts {
        arc_step_deg: 0.0,
        ..RasterOpts::default()
    };
    assert_eq!(
        ShapeRasterizer::new(broken).rasterize(&spec),
        ShapeRasterizer::default().rasterize(&spec)
    );
}

#[test]
fn rasterize_is_deterministic() {
    let spec = ShadowSpec::soft(64, 48).with_corner_radii(CornerRadii::new(3.0, 9.0, 12.0, 0.0));
    let raster = ShapeRasterizer::default();
    assert_eq!(raster.rasterize(&spec), raster.rasterize(&spec));
}

#[test]
fn half_pixel_radius_spanning_an_odd_side_is_a_stadium() {
    let spec = ShadowSpec::new(41, 100)
        .with_blur(0)
        .with_color(INK)
        .with_corner_radii(CornerRadii::uniform(20.5));
    let interior = Interior::of(&spec);
    let radii = Radii::of(&spec, &interior);
    assert!(has_stadium_cap(&spec, &radii, Side::Top));
    assert!(has_stadium_cap(&spec, &radii, Side::Bottom));
    assert!(!has_stadium_cap(&spec, &radii, Side::Left));

    let buf = ShapeRasterizer::default().rasterize(&spec);
    assert_eq!((buf.width(), buf.height()), (61, 120));
    // Interior [10, 51) × [10, 110); the top cap is centered on (30.5, 30.5) with
    // radius 20.5, so its first row runs from x = 24 to x = 36 without a gap.
    let top_row: Vec<i64> = (0..61).filter(|&x| is_ink(&buf, x, 10)).collect();
    assert_eq!(top_row.first(), Some(&24), "{top_row:?}");
    assert_eq!(top_row.last(), Some(&36), "{top_row:?}");
    assert_eq!(top_row.len(), 13, "{top_row:?}");
}

#[test]
fn half_pixel_radius_on_odd_square_is_a_circle() {
    let spec = ShadowSpec::new(41, 41)
        .with_blur(0)
        .with_color(INK)
        .with_corner_radii(CornerRadii::uniform(20.5));
    let raster = ShapeRasterizer::default();
    assert_eq!(raster.classify(&spec), ShapeKind::Circle);

    let buf = raster.rasterize(&spec);
    assert_eq!((buf.width(), buf.height()), (61, 61));
    let (cx, cy, radius) = (30.5, 30.5, 20.5);
    for y in 0..61 {
        for x in 0..61 {
            let d = distance(x, y, cx, cy);
            if d <= radius - 1.0 {
                assert!(is_ink(&buf, x, y), "({x}, {y}) at {d} should be inside");
            } else if d >= radius + 1.0 {
                assert!(!is_ink(&buf, x, y), "({x}, {y}) at {d} should be outside");
            }
        }
    }

    let almost = spec.with_corner_radii(CornerRadii::uniform(20.4));
    assert_eq!(raster.classify(&almost), ShapeKind::Rounded);
}

#[test]
fn oversized_canvas_is_bounded_and_transparent() {
    let spec = ShadowSpec::new(200_000, 10).with_blur(0).with_color(INK);
    let buf = ShapeRasterizer::default().rasterize(&spec);
    assert_eq!((buf.width(), buf.height()), (MAX_CANVAS_SIDE, 30));
    assert!(buf.pixels().iter().all(|&c| c == Color::TRANSPARENT));

    let spec = ShadowSpec::new(u32::MAX, 1).with_blur(0).with_color(INK);
    let buf = ShapeRasterizer::default().rasterize(&spec);
    assert_eq!((buf.width(), buf.height()), (MAX_CANVAS_SIDE, 21));
}

#[test]
fn tiny_arc_step_is_raised_to_the_minimum() {
    let spec = ShadowSpec::new(20, 12)
        .with_blur(0)
        .with_color(INK)
        .with_corner_radii(CornerRadii::uniform(3.0));
    let tiny = RasterOpts {
        arc_step_deg: 1e-12,
        ..RasterOpts::default()
    };
    let floor = RasterOpts {
        arc_step_deg: MIN_ARC_STEP_DEG,
        ..RasterOpts::default()
    };
    assert_eq!(
        ShapeRasterizer::new(tiny).rasterize(&spec),
        ShapeRasterizer::new(floor).rasterize(&spec)
    );
}
