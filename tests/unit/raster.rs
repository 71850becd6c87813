use super::*;
use crate::render::document::{Element, Fragment};

fn red_square_doc() -> Document {
    let mut fragment = Fragment::new();
    fragment.body.push(std::sync::Arc::new(
        Element::new("path")
            .with_attr("fill", "#FF0000")
            .with_attr("d", "M 0 0 L 5 0 L 5 5 L 0 5 Z"),
    ));
    Document::new(10.0, 10.0, fragment)
}

#[test]
fn renders_at_document_size() {
    let img = rasterize(&red_square_doc(), 10, 10).unwrap();
    assert_eq!((img.width, img.height), (10, 10));
    assert_eq!(img.data.len(), 10 * 10 * 4);

    let px = |x: usize, y: usize| &img.data[(y * 10 + x) * 4..(y * 10 + x) * 4 + 4];
    assert_eq!(px(2, 2), &[255, 0, 0, 255]);
    assert_eq!(px(8, 8), &[0, 0, 0, 0]);
}

#[test]
fn scales_to_requested_size() {
    let img = rasterize(&red_square_doc(), 20, 20).unwrap();
    let px = |x: usize, y: usize| &img.data[(y * 20 + x) * 4..(y * 20 + x) * 4 + 4];
    assert_eq!(px(8, 8), &[255, 0, 0, 255]);
    assert_eq!(px(12, 12), &[0, 0, 0, 0]);
}

#[test]
fn zero_size_is_rejected() {
    assert!(rasterize(&red_square_doc(), 0, 10).is_err());
}

#[test]
fn straight_alpha_conversion() {
    let img = RasterImage {
        width: 2,
        height: 1,
        data: vec![128, 0, 0, 128, 10, 20, 30, 255],
    };
    assert_eq!(img.to_straight_rgba(), vec![255, 0, 0, 128, 10, 20, 30, 255]);
}

#[test]
fn malformed_svg_is_an_error() {
    assert!(parse_svg("<svg").is_err());
}
