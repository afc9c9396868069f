use super::*;

#[test]
fn frame_centers_canvas_on_owner() {
    let owner = OwnerGeometry {
        x: 50.0,
        y: 40.0,
        ..OwnerGeometry::default()
    };
    let spec = ShadowSpec::new(100, 60).with_blur(6);
    let frame = shadow_frame(&owner, &spec);
    assert_eq!(frame.x0, 50.0 - 16.0);
    assert_eq!(frame.y0, 40.0 - 16.0);
    assert_eq!(frame.width(), 132.0);
    assert_eq!(frame.height(), 92.0);
    assert_eq!(frame.center(), kurbo::Point::new(100.0, 70.0));
}

#[test]
fn offsets_padding_and_borders_shift_the_frame() {
    let owner = OwnerGeometry {
        x: 10.0,
        y: 20.0,
        margin_left: 0.0,
        padding_left: 4.0,
        border_left: 2.0,
        border_top: 3.0,
    };
    let spec = ShadowSpec::new(30, 30).with_blur(0).with_offset(5, -7);
    let frame = shadow_frame(&owner, &spec);
    assert_eq!(frame.x0, 10.0 + 5.0 + 4.0 - (10.0 + 2.0));
    assert_eq!(frame.y0, 20.0 - 7.0 - (10.0 + 3.0));
}

#[test]
fn margin_wins_when_larger_than_x() {
    let owner = OwnerGeometry {
        x: 2.0,
        margin_left: 12.0,
        ..OwnerGeometry::default()
    };
    let spec = ShadowSpec::new(10, 10).with_blur(0);
    assert_eq!(shadow_frame(&owner, &spec).x0, 12.0 - 10.0);
}

#[test]
fn positive_expand_moves_the_frame_out_and_negative_does_not() {
    let owner = OwnerGeometry::default();
    let grown = ShadowSpec::new(20, 20).with_blur(1).with_expand(4);
    let frame = shadow_frame(&owner, &grown);
    assert_eq!((frame.x0, frame.y0), (-15.0, -15.0));
    assert_eq!(frame.width(), 50.0);

    let shrunk = ShadowSpec::new(20, 20).with_blur(1).with_expand(-4);
    let frame = shadow_frame(&owner, &shrunk);
    assert_eq!((frame.x0, frame.y0), (-11.0, -11.0));
    assert_eq!(frame.width(), 42.0);
}

#[test]
fn geometry_deserializes_with_defaults() {
    let owner: OwnerGeometry = serde_json::from_str(r#"{"x": 3.5, "border_top": 1}"#).unwrap();
    assert_eq!(owner.x, 3.5);
    assert_eq!(owner.border_top, 1.0);
    assert_eq!(owner.y, 0.0);
}
