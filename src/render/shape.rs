use std::sync::Arc;

use crate::edge::outline::outline_edges;
use crate::edge::segment::{Segment, segments_to_path_data};
use crate::foundation::core::Rect;
use crate::foundation::error::XflResult;
use crate::foundation::warning::{Warning, Warnings};
use crate::project::model::Shape;
use crate::render::document::{Defs, Element};
use crate::style::color_effect::ColorEffect;
use crate::style::paint::{mask_fill, painted_path, resolve_fill, resolve_stroke};

/// Converted shape, independent of where it is placed.
///
/// The renderer wraps `fill` and `stroke` in per-position groups; the paths themselves are
/// shared between every placement of an identical shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ShapeParts {
    pub(crate) fill: Vec<Arc<Element>>,
    pub(crate) stroke: Vec<Arc<Element>>,
    /// Filter id to put on the fill reference, if any.
    pub(crate) filter: Option<String>,
    /// Gradients and the filter.
    pub(crate) defs: Defs,
}

/// Convert a shape into filled and stroked paths.
///
/// One path is emitted per fill style, holding all of its rings, and one per stroke style.
/// Inside a mask every fill is opaque white, strokes are dropped and `effect` is ignored.
pub(crate) fn convert_shape(
    shape: &Shape,
    effect: ColorEffect,
    inside_mask: bool,
    warnings: &mut Warnings,
) -> XflResult<ShapeParts> {
    let outline = outline_edges(shape.edges())?;
    let mut parts = ShapeParts::default();

    for (fill_id, rings) in &outline.fills {
        let paint = if inside_mask {
            mask_fill()
        } else {
            let Some(style) = shape.fill_style(*fill_id) else {
                warnings.push(Warning::UnsupportedStyle(format!(
                    "fill style {fill_id} is not defined"
                )));
                continue;
            };
            resolve_fill(style, union_bounds(rings), warnings)
        };
        parts.defs.extend(&paint.defs);
        parts
            .fill
            .push(Arc::new(painted_path(segments_to_path_data(rings), &paint)));
    }

    if inside_mask {
        if !outline.strokes.is_empty() {
            warnings.push(Warning::StrokeInMask);
        }
    } else {
        for (stroke_id, segments) in &outline.strokes {
            let Some(style) = shape.stroke_style(*stroke_id) else {
                warnings.push(Warning::UnsupportedStyle(format!(
                    "stroke style {stroke_id} is not defined"
                )));
                continue;
            };
            let paint = resolve_stroke(style, warnings);
            parts
                .stroke
                .push(Arc::new(painted_path(segments_to_path_data(segments), &paint)));
        }
    }

    if !inside_mask && !parts.fill.is_empty() {
        if let Some(filter) = effect.to_fragment() {
            let id = effect.render_id();
            parts.defs.insert(id.clone(), filter);
            parts.filter = Some(id);
        }
    }

    Ok(parts)
}

fn union_bounds(rings: &[Segment]) -> Rect {
    rings
        .iter()
        .map(Segment::bounds)
        .reduce(|a, b| a.union(b))
        .unwrap_or(Rect::ZERO)
}

#[cfg(test)]
#[path = "../../tests/unit/render/shape.rs"]
mod tests;
