use scenekit_designer::{
    bounding_box_of, fit_group_to_bounds, group_resize, resize_from_handle, resize_rotated,
    rotate_about, snap_angle, Geometry, Point, ResizeHandle,
};
use std::f64::consts::FRAC_PI_2;

const EPS: f64 = 1e-9;

fn assert_geometry(actual: Geometry, expected: Geometry) {
    let close = |a: f64, b: f64| (a - b).abs() < 1e-6;
    assert!(
        close(actual.x, expected.x)
            && close(actual.y, expected.y)
            && close(actual.width, expected.width)
            && close(actual.height, expected.height)
            && close(actual.rotation, expected.rotation),
        "{:?} != {:?}",
        actual,
        expected
    );
}

#[test]
fn test_bounding_box_single_element() {
    let g = Geometry::new(10.0, 10.0, 100.0, 50.0);
    assert_eq!(bounding_box_of(&[g]), Some(g));

    // A lone rotated element keeps its own tilt.
    let tilted = g.with_rotation(0.3);
    assert_eq!(bounding_box_of(&[tilted]), Some(tilted));
}

#[test]
fn test_bounding_box_two_elements() {
    let bounds = bounding_box_of(&[
        Geometry::new(0.0, 0.0, 10.0, 10.0),
        Geometry::new(20.0, 20.0, 10.0, 10.0),
    ]);
    assert_eq!(bounds, Some(Geometry::new(0.0, 0.0, 30.0, 30.0)));
}

#[test]
fn test_bounding_box_uses_rotated_corners() {
    let bounds = bounding_box_of(&[
        Geometry::new(0.0, 0.0, 10.0, 10.0),
        Geometry::new(20.0, 0.0, 20.0, 10.0).with_rotation(FRAC_PI_2),
    ])
    .unwrap();
    // The second box becomes 10 wide and 20 tall around (30, 5).
    assert_geometry(bounds, Geometry::new(0.0, -5.0, 35.0, 20.0));
    assert_eq!(bounds.rotation, 0.0);
}

#[test]
fn test_bounding_box_empty() {
    assert_eq!(bounding_box_of(&[]), None);
}

#[test]
fn test_resize_bottom_right() {
    let initial = Geometry::new(0.0, 0.0, 100.0, 100.0);
    let g = resize_from_handle(ResizeHandle::BottomRight, &initial, 20.0, -10.0, 5.0);
    assert_eq!(g, Geometry::new(0.0, 0.0, 120.0, 90.0));
}

#[test]
fn test_resize_top_left() {
    let initial = Geometry::new(0.0, 0.0, 100.0, 100.0);
    let g = resize_from_handle(ResizeHandle::TopLeft, &initial, 20.0, 20.0, 5.0);
    assert_eq!(g, Geometry::new(20.0, 20.0, 80.0, 80.0));
}

#[test]
fn test_resize_clamps_and_keeps_opposite_edge() {
    let initial = Geometry::new(0.0, 0.0, 100.0, 100.0);

    // Dragging the left edge past the right edge pins the right edge.
    let g = resize_from_handle(ResizeHandle::Left, &initial, 150.0, 0.0, 5.0);
    assert_eq!(g, Geometry::new(95.0, 0.0, 5.0, 100.0));

    let g = resize_from_handle(ResizeHandle::Bottom, &initial, 0.0, -200.0, 5.0);
    assert_eq!(g, Geometry::new(0.0, 0.0, 100.0, 5.0));
}

#[test]
fn test_resize_rotated_matches_upright_when_unrotated() {
    let initial = Geometry::new(10.0, 10.0, 50.0, 40.0);
    for handle in ResizeHandle::ALL {
        assert_eq!(
            resize_rotated(handle, &initial, 7.0, -3.0, 5.0),
            resize_from_handle(handle, &initial, 7.0, -3.0, 5.0)
        );
    }
}

#[test]
fn test_resize_rotated_keeps_opposite_edge_in_place() {
    // Rotated a quarter turn: the local right edge faces down in scene space.
    let initial = Geometry::new(0.0, 0.0, 100.0, 50.0).with_rotation(FRAC_PI_2);
    let fixed_before = ResizeHandle::Left.anchor_on(&initial);

    let g = resize_rotated(ResizeHandle::Right, &initial, 0.0, 20.0, 5.0);
    assert!((g.width - 120.0).abs() < EPS);
    assert!((g.height - 50.0).abs() < EPS);

    let fixed_after = ResizeHandle::Left.anchor_on(&g);
    assert!(fixed_before.distance_to(&fixed_after) < 1e-6);
}

#[test]
fn test_group_resize_about_group_center() {
    let items = [
        Geometry::new(0.0, 0.0, 10.0, 10.0),
        Geometry::new(20.0, 20.0, 10.0, 10.0),
    ];
    let bounds = bounding_box_of(&items).unwrap();
    let scaled = group_resize(&items, &bounds, 2.0, 2.0, 0.01);

    assert_geometry(scaled[0], Geometry::new(-15.0, -15.0, 20.0, 20.0));
    assert_geometry(scaled[1], Geometry::new(25.0, 25.0, 20.0, 20.0));
    assert_geometry(
        bounding_box_of(&scaled).unwrap(),
        Geometry::new(-15.0, -15.0, 60.0, 60.0),
    );
}

#[test]
fn test_group_resize_clamps_scale() {
    let items = [Geometry::new(0.0, 0.0, 10.0, 10.0)];
    let bounds = items[0];
    let scaled = group_resize(&items, &bounds, -1.0, 0.0, 0.1);
    assert!((scaled[0].width - 1.0).abs() < EPS);
    assert!((scaled[0].height - 1.0).abs() < EPS);
}

#[test]
fn test_fit_group_to_bounds() {
    let items = [
        Geometry::new(0.0, 0.0, 10.0, 10.0),
        Geometry::new(20.0, 20.0, 10.0, 10.0),
    ];
    let bounds = Geometry::new(0.0, 0.0, 30.0, 30.0);
    let target = Geometry::new(0.0, 0.0, 60.0, 60.0);
    let fitted = fit_group_to_bounds(&items, &bounds, &target, 0.01);

    assert_geometry(fitted[0], Geometry::new(0.0, 0.0, 20.0, 20.0));
    assert_geometry(fitted[1], Geometry::new(40.0, 40.0, 20.0, 20.0));
}

#[test]
fn test_rotate_about_is_rigid() {
    let items = [
        Geometry::new(0.0, 0.0, 10.0, 10.0),
        Geometry::new(20.0, 0.0, 10.0, 10.0),
    ];
    let rotated = rotate_about(&items, Point::new(15.0, 5.0), FRAC_PI_2);

    assert_geometry(
        rotated[0],
        Geometry::new(10.0, -10.0, 10.0, 10.0).with_rotation(FRAC_PI_2),
    );
    assert_geometry(
        rotated[1],
        Geometry::new(10.0, 10.0, 10.0, 10.0).with_rotation(FRAC_PI_2),
    );
    let d_before = items[0].center().distance_to(&items[1].center());
    let d_after = rotated[0].center().distance_to(&rotated[1].center());
    assert!((d_before - d_after).abs() < EPS);
}

#[test]
fn test_snap_angle() {
    let snapped = snap_angle(44f64.to_radians(), 45.0, 5.0);
    assert!((snapped - 45f64.to_radians()).abs() < EPS);

    let untouched = snap_angle(30f64.to_radians(), 45.0, 5.0);
    assert_eq!(untouched, 30f64.to_radians());

    let negative = snap_angle(-92f64.to_radians(), 45.0, 5.0);
    assert!((negative + FRAC_PI_2).abs() < EPS);

    let far = snap_angle(100f64.to_radians(), 45.0, 5.0);
    assert_eq!(far, 100f64.to_radians());
}
