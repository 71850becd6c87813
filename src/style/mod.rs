//! Paint: color effects, gradients and fill/stroke attribute resolution.

pub mod color_effect;
pub mod gradient;
pub mod paint;
