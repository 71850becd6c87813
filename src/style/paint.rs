use std::sync::Arc;

use crate::foundation::core::{Rect, fmt_num};
use crate::foundation::warning::{Warning, Warnings};
use crate::project::model::{FillStyle, SolidColor, StrokeStyle};
use crate::render::document::{Attrs, Defs, Element};
use crate::style::gradient::GradientPaint;

/// Stroke width used for hairline strokes.
pub const HAIRLINE_WIDTH: f64 = 0.05;

/// Miter limit applied to miter joins that do not specify one.
pub const DEFAULT_MITER_LIMIT: f64 = 5.0;

/// Presentation attributes for one path plus the fragments they reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedPaint {
    /// Attributes to set on the path.
    pub attrs: Attrs,
    /// Gradients referenced by `attrs`.
    pub defs: Defs,
}

impl ResolvedPaint {
    fn attr(&mut self, key: &'static str, value: impl Into<String>) {
        self.attrs.push((key, value.into()));
    }

    fn no_fill() -> Self {
        let mut p = Self::default();
        p.attr("fill", "none");
        p
    }
}

/// Paint for a fill region.
pub fn resolve_fill(style: &FillStyle, bounds: Rect, warnings: &mut Warnings) -> ResolvedPaint {
    let mut paint = ResolvedPaint::default();
    match style {
        FillStyle::Solid(SolidColor { color, alpha }) => {
            paint.attr("fill", color.as_str());
            if let Some(alpha) = alpha {
                paint.attr("fill-opacity", fmt_num(*alpha));
            }
            paint.attr("stroke", "none");
        }
        FillStyle::LinearGradient(g) => {
            paint_gradient(&mut paint, GradientPaint::linear(g));
        }
        FillStyle::RadialGradient(g) => {
            paint_gradient(&mut paint, GradientPaint::radial(g, bounds));
        }
        FillStyle::Unsupported(tag) => {
            warnings.push(Warning::UnsupportedStyle(format!("fill {tag}")));
            paint = ResolvedPaint::no_fill();
            paint.attr("stroke", "none");
        }
    }
    paint
}

fn paint_gradient(paint: &mut ResolvedPaint, gradient: GradientPaint) {
    let id = gradient.render_id();
    paint.attr("fill", format!("url(#{id})"));
    paint.attr("stroke", "none");
    paint.defs.insert(id, Arc::new(gradient.to_fragment()));
}

/// Paint used for every fill while rendering mask content.
pub fn mask_fill() -> ResolvedPaint {
    let mut paint = ResolvedPaint::default();
    paint.attr("fill", "#FFFFFF");
    paint.attr("stroke", "none");
    paint
}

/// Paint for a stroke path.
///
/// Only solid strokes with a solid color are drawn; anything else resolves to no paint and a
/// warning.
pub fn resolve_stroke(style: &StrokeStyle, warnings: &mut Warnings) -> ResolvedPaint {
    let stroke = match style {
        StrokeStyle::Solid(s) => s,
        StrokeStyle::Unsupported(tag) => {
            warnings.push(Warning::UnsupportedStyle(format!("stroke {tag}")));
            return ResolvedPaint::no_fill();
        }
    };

    let cap = match stroke.caps.as_deref() {
        None | Some("round") => "round",
        Some("square") => "square",
        Some("none") => "butt",
        Some(other) => {
            warnings.push(Warning::UnsupportedStyle(format!("stroke caps {other}")));
            "round"
        }
    };
    let join = match stroke.joints.as_deref() {
        None | Some("round") => "round",
        Some("bevel") => "bevel",
        Some("miter") => "miter",
        Some(other) => {
            warnings.push(Warning::UnsupportedStyle(format!("stroke joints {other}")));
            "round"
        }
    };
    let width = if stroke.hairline {
        HAIRLINE_WIDTH
    } else {
        stroke.weight.unwrap_or(1.0)
    };

    let mut paint = ResolvedPaint::no_fill();
    paint.attr("stroke-linecap", cap);
    paint.attr("stroke-width", fmt_num(width));
    paint.attr("stroke-linejoin", join);
    if join == "miter" {
        paint.attr(
            "stroke-miterlimit",
            fmt_num(stroke.miter_limit.unwrap_or(DEFAULT_MITER_LIMIT)),
        );
    }

    match stroke.scale_mode.as_deref() {
        None | Some("normal") => {}
        Some("none") => paint.attr("vector-effect", "non-scaling-stroke"),
        Some(other) => {
            warnings.push(Warning::UnsupportedScaleMode(other.to_string()));
        }
    }

    match &stroke.fill {
        FillStyle::Solid(SolidColor { color, alpha }) => {
            paint.attr("stroke", color.as_str());
            if let Some(alpha) = alpha {
                paint.attr("stroke-opacity", fmt_num(*alpha));
            }
        }
        other => {
            warnings.push(Warning::UnsupportedStyle(format!(
                "non-solid stroke paint {}",
                fill_kind(other)
            )));
            paint.attr("stroke", "none");
        }
    }
    paint
}

fn fill_kind(style: &FillStyle) -> &str {
    match style {
        FillStyle::Solid(_) => "solid",
        FillStyle::LinearGradient(_) => "linear gradient",
        FillStyle::RadialGradient(_) => "radial gradient",
        FillStyle::Unsupported(tag) => tag,
    }
}

/// Apply resolved paint to a path element.
pub(crate) fn painted_path(d: String, paint: &ResolvedPaint) -> Element {
    Element::new("path")
        .with_attrs(paint.attrs.iter().cloned())
        .with_attr("d", d)
}

#[cfg(test)]
#[path = "../../tests/unit/style/paint.rs"]
mod tests;
