//! xflsvg renders frames of Adobe Animate XFL projects to standalone SVG documents.
//!
//! # Pipeline overview
//!
//! 1. **Load**: an unzipped XFL directory (or a JSON dump) becomes a [`Project`], an immutable
//!    tree of timelines, layers, keyframes and elements.
//! 2. **Decode**: each shape's `edges` strings are decoded into [`Segment`]s, and fill
//!    segments are stitched into closed rings per fill style ([`outline_edges`]).
//! 3. **Render**: [`Renderer::render`] walks the timeline back to front, resolving symbol
//!    instances, masks, color effects and gradients into a [`Document`].
//! 4. **Write**: [`Document::to_svg_string`] serializes the result; [`rasterize`] turns it into
//!    premultiplied RGBA8 pixels.
//!
//! Reusable fragments (gradients, filters) get content-hash ids, and per-position fragments
//! (fills, strokes, masks) get ids derived from timeline name, frame and position, so equal
//! input always produces equal output.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod edge;
mod foundation;
mod project;
mod raster;
mod render;
mod style;

pub use edge::assemble::{FillId, assemble_rings};
pub use edge::outline::{Outline, StrokeId, outline_edges};
pub use edge::segment::{Segment, SegmentBuilder, Vertex, parse_edges, segments_to_path_data};
pub use edge::token::{Token, Tokenizer, parse_number};
pub use foundation::core::{
    Affine, FrameIndex, FrameRange, GRADIENT_HALF_SPAN, Point, Rect, TWIPS_PER_PX, fmt_num,
    matrix_fn,
};
pub use foundation::error::{XflError, XflResult};
pub use foundation::warning::{Warning, Warnings};
pub use project::model::{
    ColorDescriptor, EdgeRecord, Element as XflElement, FillEntry, FillStyle, Gradient,
    GradientStop, Keyframe, Layer, LayerKind, LoopMode, Project, Shape, SolidColor, SolidStroke,
    SpreadMethod, Stage, StrokeEntry, StrokeStyle, SymbolInstance, SymbolType, Timeline,
    TimelineKind,
};
pub use project::source::ProjectSource;
pub use project::xfl::{read_xfl_dir, read_xfl_dir_with, unescape_entities};
pub use raster::{RasterImage, parse_svg, rasterize};
pub use render::batch::{BatchOpts, RenderedFrame, render_frames_parallel};
pub use render::cache::CacheStats;
pub use render::document::{Attrs, Defs, Document, Element, Fragment};
pub use render::playback::{active_keyframe, loop_frame};
pub use render::renderer::{Renderer, RendererOpts, RendererStats, timeline_id};
pub use style::color_effect::{ColorEffect, EffectKey};
pub use style::gradient::GradientPaint;
pub use style::paint::{
    DEFAULT_MITER_LIMIT, HAIRLINE_WIDTH, ResolvedPaint, mask_fill, resolve_fill, resolve_stroke,
};
