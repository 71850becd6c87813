use std::sync::Arc;

use crate::foundation::core::{Affine, GRADIENT_HALF_SPAN, Point, Rect, fmt_num, matrix_fn};
use crate::foundation::math::{StableHasher, content_id};
use crate::project::model::{Gradient, GradientStop, SpreadMethod};
use crate::render::document::Element;

/// Resolved gradient paint in user space.
#[derive(Debug, Clone, PartialEq)]
pub enum GradientPaint {
    /// Gradient along the segment `start -> end`.
    Linear {
        /// 0% position.
        start: Point,
        /// 100% position.
        end: Point,
        /// Color stops.
        stops: Vec<GradientStop>,
        /// Spread method.
        spread: SpreadMethod,
    },
    /// Circle of `radius` around the origin, placed by `transform`.
    Radial {
        /// Orientation and position.
        transform: Affine,
        /// Radius before `transform`.
        radius: f64,
        /// Color stops.
        stops: Vec<GradientStop>,
        /// Spread method.
        spread: SpreadMethod,
    },
}

impl GradientPaint {
    /// Linear gradient: the matrix maps `(-16384/20, 0)` to the start and `(16384/20, 0)` to
    /// the end.
    ///
    /// ```text
    ///            0%             100%
    ///     start >---------o---------> end
    ///    (M · s)      (tx, ty)     (M · e)
    /// ```
    pub fn linear(g: &Gradient) -> Self {
        Self::Linear {
            start: g.matrix * Point::new(-GRADIENT_HALF_SPAN, 0.0),
            end: g.matrix * Point::new(GRADIENT_HALF_SPAN, 0.0),
            stops: g.stops.clone(),
            spread: g.spread,
        }
    }

    /// Radial gradient.
    ///
    /// The radius is `16384/20 · |(a, b)|` and the transform is the matrix with its linear
    /// part divided by `|(a, b)|`. A degenerate matrix falls back to a circle centered on
    /// `bounds` with half its diagonal as radius.
    pub fn radial(g: &Gradient, bounds: Rect) -> Self {
        let [a, b, c, d, tx, ty] = g.matrix.as_coeffs();
        let norm = a.hypot(b);
        let (transform, radius) = if norm.is_finite() && norm > 0.0 {
            (
                Affine::new([a / norm, b / norm, c / norm, d / norm, tx, ty]),
                GRADIENT_HALF_SPAN * norm,
            )
        } else {
            (
                Affine::translate(bounds.center().to_vec2()),
                bounds.width().hypot(bounds.height()) / 2.0,
            )
        };
        Self::Radial {
            transform,
            radius,
            stops: g.stops.clone(),
            spread: g.spread,
        }
    }

    /// `Gradient_<hash>` id derived from geometry, stops and spread.
    pub fn render_id(&self) -> String {
        let mut h = StableHasher::new();
        let (stops, spread) = match self {
            Self::Linear {
                start,
                end,
                stops,
                spread,
            } => {
                h.write_u8(0);
                for v in [start.x, start.y, end.x, end.y] {
                    h.write_f64(v);
                }
                (stops, spread)
            }
            Self::Radial {
                transform,
                radius,
                stops,
                spread,
            } => {
                h.write_u8(1);
                for v in transform.as_coeffs() {
                    h.write_f64(v);
                }
                h.write_f64(*radius);
                (stops, spread)
            }
        };
        h.write_str(spread.as_svg());
        h.write_u32(stops.len() as u32);
        for s in stops {
            h.write_f64(s.ratio);
            h.write_str(&s.color);
            h.write_opt_f64(s.alpha);
        }
        content_id("Gradient", h.finish())
    }

    /// `<linearGradient>` or `<radialGradient>` in user space.
    pub fn to_fragment(&self) -> Element {
        let (el, stops) = match self {
            Self::Linear {
                start,
                end,
                stops,
                spread,
            } => (
                Element::new("linearGradient")
                    .with_attr("id", self.render_id())
                    .with_attr("gradientUnits", "userSpaceOnUse")
                    .with_attr("x1", fmt_num(start.x))
                    .with_attr("y1", fmt_num(start.y))
                    .with_attr("x2", fmt_num(end.x))
                    .with_attr("y2", fmt_num(end.y))
                    .with_attr("spreadMethod", spread.as_svg()),
                stops,
            ),
            Self::Radial {
                transform,
                radius,
                stops,
                spread,
            } => (
                Element::new("radialGradient")
                    .with_attr("id", self.render_id())
                    .with_attr("gradientUnits", "userSpaceOnUse")
                    .with_attr("cx", "0")
                    .with_attr("cy", "0")
                    .with_attr("r", fmt_num(*radius))
                    .with_attr("fx", "0")
                    .with_attr("fy", "0")
                    .with_attr("gradientTransform", matrix_fn(*transform))
                    .with_attr("spreadMethod", spread.as_svg()),
                stops,
            ),
        };
        el.with_children(stops.iter().map(|s| {
            let mut stop = Element::new("stop")
                .with_attr("offset", format!("{}%", fmt_num(s.ratio * 100.0)))
                .with_attr("stop-color", s.color.as_str());
            if let Some(alpha) = s.alpha {
                stop.set_attr("stop-opacity", fmt_num(alpha));
            }
            Arc::new(stop)
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/gradient.rs"]
mod tests;
