use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(r.iter().count(), 3);
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(3), FrameIndex(2)).is_err());
}

#[test]
fn fmt_num_uses_shortest_form() {
    assert_eq!(fmt_num(10.0), "10");
    assert_eq!(fmt_num(-0.0), "0");
    assert_eq!(fmt_num(0.5), "0.5");
    assert_eq!(fmt_num(-12.25), "-12.25");
}

#[test]
fn point_key_folds_negative_zero() {
    assert_eq!(
        PointKey::from(Point::new(-0.0, 1.0)),
        PointKey::from(Point::new(0.0, 1.0))
    );
    assert_ne!(
        PointKey::from(Point::new(0.05, 1.0)),
        PointKey::from(Point::new(0.0, 1.0))
    );
}

#[test]
fn matrix_fn_formats_coefficients_in_svg_order() {
    let m = Affine::new([1.0, 0.0, 0.0, 2.0, 10.0, -5.5]);
    assert_eq!(matrix_fn(m), "matrix(1, 0, 0, 2, 10, -5.5)");
    assert!(is_identity_matrix(Affine::IDENTITY));
    assert!(!is_identity_matrix(m));
}
