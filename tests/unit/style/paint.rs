use super::*;
use crate::foundation::core::Affine;
use crate::project::model::{Gradient, GradientStop, SolidStroke, SpreadMethod};

fn attr<'a>(paint: &'a ResolvedPaint, key: &str) -> Option<&'a str> {
    paint
        .attrs
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.as_str())
}

fn solid_stroke(f: impl FnOnce(&mut SolidStroke)) -> StrokeStyle {
    let mut s = SolidStroke {
        fill: FillStyle::Solid(SolidColor::new("#112233")),
        ..SolidStroke::default()
    };
    f(&mut s);
    StrokeStyle::Solid(s)
}

#[test]
fn solid_fill_with_opacity() {
    let mut w = Warnings::new();
    let paint = resolve_fill(
        &FillStyle::Solid(SolidColor {
            color: "#FF0000".to_string(),
            alpha: Some(0.5),
        }),
        Rect::ZERO,
        &mut w,
    );
    assert_eq!(attr(&paint, "fill"), Some("#FF0000"));
    assert_eq!(attr(&paint, "fill-opacity"), Some("0.5"));
    assert_eq!(attr(&paint, "stroke"), Some("none"));
    assert!(paint.defs.is_empty());
    assert!(w.is_empty());
}

#[test]
fn gradient_fill_references_fragment() {
    let g = Gradient {
        matrix: Affine::IDENTITY,
        stops: vec![GradientStop {
            ratio: 0.0,
            color: "#000000".to_string(),
            alpha: None,
        }],
        spread: SpreadMethod::Pad,
    };
    let mut w = Warnings::new();
    let paint = resolve_fill(&FillStyle::LinearGradient(g), Rect::ZERO, &mut w);
    let id = paint.defs.ids().next().unwrap().to_string();
    assert!(id.starts_with("Gradient_"));
    assert_eq!(attr(&paint, "fill"), Some(format!("url(#{id})").as_str()));
    assert_eq!(paint.defs.get(&id).unwrap().name(), "linearGradient");
}

#[test]
fn unsupported_fill_paints_nothing() {
    let mut w = Warnings::new();
    let paint = resolve_fill(
        &FillStyle::Unsupported("BitmapFill".to_string()),
        Rect::ZERO,
        &mut w,
    );
    assert_eq!(attr(&paint, "fill"), Some("none"));
    assert!(matches!(w.as_slice(), [Warning::UnsupportedStyle(_)]));
}

#[test]
fn mask_fill_is_opaque_white() {
    let paint = mask_fill();
    assert_eq!(attr(&paint, "fill"), Some("#FFFFFF"));
    assert_eq!(attr(&paint, "fill-opacity"), None);
}

#[test]
fn stroke_defaults() {
    let mut w = Warnings::new();
    let paint = resolve_stroke(&solid_stroke(|_| {}), &mut w);
    assert_eq!(attr(&paint, "stroke-linecap"), Some("round"));
    assert_eq!(attr(&paint, "stroke-linejoin"), Some("round"));
    assert_eq!(attr(&paint, "stroke-width"), Some("1"));
    assert_eq!(attr(&paint, "stroke"), Some("#112233"));
    assert_eq!(attr(&paint, "fill"), Some("none"));
    assert_eq!(attr(&paint, "stroke-miterlimit"), None);
    assert!(w.is_empty());
}

#[test]
fn stroke_caps_joins_and_hairline() {
    let mut w = Warnings::new();
    let paint = resolve_stroke(
        &solid_stroke(|s| {
            s.caps = Some("none".into());
            s.joints = Some("miter".into());
            s.weight = Some(4.0);
            s.hairline = true;
        }),
        &mut w,
    );
    assert_eq!(attr(&paint, "stroke-linecap"), Some("butt"));
    assert_eq!(attr(&paint, "stroke-linejoin"), Some("miter"));
    assert_eq!(attr(&paint, "stroke-miterlimit"), Some("5"));
    assert_eq!(attr(&paint, "stroke-width"), Some("0.05"));

    let paint = resolve_stroke(
        &solid_stroke(|s| {
            s.joints = Some("miter".into());
            s.miter_limit = Some(2.5);
        }),
        &mut w,
    );
    assert_eq!(attr(&paint, "stroke-miterlimit"), Some("2.5"));
    assert!(w.is_empty());
}

#[test]
fn stroke_scale_modes() {
    let mut w = Warnings::new();
    let paint = resolve_stroke(&solid_stroke(|s| s.scale_mode = Some("none".into())), &mut w);
    assert_eq!(attr(&paint, "vector-effect"), Some("non-scaling-stroke"));
    assert!(w.is_empty());

    let paint = resolve_stroke(
        &solid_stroke(|s| s.scale_mode = Some("horizontal".into())),
        &mut w,
    );
    assert_eq!(attr(&paint, "vector-effect"), None);
    assert_eq!(attr(&paint, "stroke"), Some("#112233"));
    assert_eq!(
        w.as_slice(),
        [Warning::UnsupportedScaleMode("horizontal".to_string())]
    );
}

#[test]
fn unsupported_strokes_and_paints_warn() {
    let mut w = Warnings::new();
    let paint = resolve_stroke(&StrokeStyle::Unsupported("DashedStroke".into()), &mut w);
    assert_eq!(attr(&paint, "fill"), Some("none"));
    assert_eq!(attr(&paint, "stroke"), None);

    let paint = resolve_stroke(
        &solid_stroke(|s| s.fill = FillStyle::Unsupported("BitmapFill".into())),
        &mut w,
    );
    assert_eq!(attr(&paint, "stroke"), Some("none"));
    assert_eq!(w.len(), 2);
}

#[test]
fn painted_path_carries_paint_and_data() {
    let path = painted_path("M 0 0 L 1 1".to_string(), &mask_fill());
    assert_eq!(path.name(), "path");
    assert_eq!(path.attr("fill"), Some("#FFFFFF"));
    assert_eq!(path.attr("d"), Some("M 0 0 L 1 1"));
}
