use std::sync::Arc;

use crate::foundation::core::{Affine, FrameIndex, is_identity_matrix, matrix_fn};
use crate::foundation::error::{XflError, XflResult};
use crate::foundation::math::{StableHasher, content_id};
use crate::foundation::warning::{Warning, Warnings};
use crate::project::model::{
    Element as XflElement, Layer, LayerKind, Shape, SymbolInstance, SymbolType, TimelineKind,
};
use crate::project::source::ProjectSource;
use crate::render::cache::{CacheStats, LruCache};
use crate::render::document::{Document, Element, Fragment};
use crate::render::playback::{active_keyframe, loop_frame};
use crate::render::shape::{ShapeParts, convert_shape};
use crate::style::color_effect::{ColorEffect, EffectKey};

/// Renderer configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RendererOpts {
    /// Maximum number of memoized timeline renders.
    pub timeline_cache_capacity: usize,
    /// Maximum number of memoized shape conversions.
    pub shape_cache_capacity: usize,
}

impl Default for RendererOpts {
    fn default() -> Self {
        Self {
            timeline_cache_capacity: 8192,
            shape_cache_capacity: 4096,
        }
    }
}

impl RendererOpts {
    /// Defaults, overridden by `XFLSVG_TIMELINE_CACHE` and `XFLSVG_SHAPE_CACHE` when they hold
    /// a positive integer.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            timeline_cache_capacity: env_capacity("XFLSVG_TIMELINE_CACHE")
                .unwrap_or(defaults.timeline_cache_capacity),
            shape_cache_capacity: env_capacity("XFLSVG_SHAPE_CACHE")
                .unwrap_or(defaults.shape_cache_capacity),
        }
    }
}

fn env_capacity(var: &str) -> Option<usize> {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&n| n > 0)
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TimelineKey {
    name: String,
    kind: TimelineKind,
    frame: u32,
    effect: EffectKey,
    inside_mask: bool,
}

type ShapeKey = (u64, bool, EffectKey);

/// Hit/miss counters of both renderer caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    /// Timeline render cache.
    pub timelines: CacheStats,
    /// Shape conversion cache.
    pub shapes: CacheStats,
    /// Timeline renders currently cached.
    pub timeline_entries: usize,
    /// Shape conversions currently cached.
    pub shape_entries: usize,
}

/// Scene graph renderer.
///
/// A renderer borrows a project and owns its caches, so repeated frames of the same project
/// should go through one renderer. Rendering needs `&mut self`; use one renderer per thread
/// (see [`crate::render_frames_parallel`]).
pub struct Renderer<'p, P: ProjectSource + ?Sized> {
    project: &'p P,
    timelines: LruCache<TimelineKey, Arc<Fragment>>,
    shapes: LruCache<ShapeKey, Arc<ShapeParts>>,
    warnings: Warnings,
    // Timeline frames currently being built, innermost last.
    active: Vec<(String, TimelineKind, u32, bool)>,
}

impl<'p, P: ProjectSource + ?Sized> Renderer<'p, P> {
    /// Renderer with default options.
    pub fn new(project: &'p P) -> Self {
        Self::with_opts(project, RendererOpts::default())
    }

    /// Renderer with explicit options.
    pub fn with_opts(project: &'p P, opts: RendererOpts) -> Self {
        Self {
            project,
            timelines: LruCache::new(opts.timeline_cache_capacity),
            shapes: LruCache::new(opts.shape_cache_capacity),
            warnings: Warnings::new(),
            active: Vec::new(),
        }
    }

    /// The project being rendered.
    pub fn project(&self) -> &'p P {
        self.project
    }

    /// Render one frame of a timeline into a `width` x `height` document.
    #[tracing::instrument(skip(self))]
    pub fn render(
        &mut self,
        name: &str,
        frame: FrameIndex,
        width: f64,
        height: f64,
        kind: TimelineKind,
    ) -> XflResult<Document> {
        let fragment = self.render_timeline(name, kind, frame.0, ColorEffect::identity(), false)?;
        Ok(Document::new(width, height, Fragment::clone(&fragment)))
    }

    /// Warnings collected since the last call.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        self.warnings.take()
    }

    /// Warnings collected so far.
    pub fn warnings(&self) -> &[Warning] {
        self.warnings.as_slice()
    }

    /// Cache counters.
    pub fn stats(&self) -> RendererStats {
        RendererStats {
            timelines: self.timelines.stats(),
            shapes: self.shapes.stats(),
            timeline_entries: self.timelines.len(),
            shape_entries: self.shapes.len(),
        }
    }

    fn render_timeline(
        &mut self,
        name: &str,
        kind: TimelineKind,
        frame: u32,
        effect: ColorEffect,
        inside_mask: bool,
    ) -> XflResult<Arc<Fragment>> {
        let effect = if inside_mask {
            ColorEffect::identity()
        } else {
            effect
        };
        let key = TimelineKey {
            name: name.to_string(),
            kind,
            frame,
            effect: effect.key(),
            inside_mask,
        };
        if let Some(hit) = self.timelines.get(&key) {
            return Ok(hit);
        }
        tracing::debug!(name, frame, inside_mask, "timeline cache miss");

        // Reaching the same timeline frame again while building it can never terminate.
        let entry = (name.to_string(), kind, frame, inside_mask);
        if self.active.contains(&entry) {
            return Err(XflError::project(format!(
                "recursive symbol {name} at frame {frame}"
            )));
        }
        self.active.push(entry);
        let built = self.build_timeline(name, kind, frame, effect, inside_mask);
        self.active.pop();

        let fragment = Arc::new(built?);
        self.timelines.insert(key, Arc::clone(&fragment));
        Ok(fragment)
    }

    fn build_timeline(
        &mut self,
        name: &str,
        kind: TimelineKind,
        frame: u32,
        effect: ColorEffect,
        inside_mask: bool,
    ) -> XflResult<Fragment> {
        let project = self.project;
        let timeline = project.timeline(name, kind)?;
        let mut id = format!("{}_{frame}", timeline_id(name, kind));
        if inside_mask {
            id.insert_str(0, "Mask_");
        }

        let mut out = Fragment::new();
        // Mask id and the body collected under it while the mask is open.
        let mut open_mask: Option<(String, Vec<Arc<Element>>)> = None;
        let mask_starts = timeline.mask_starts();

        for (layer_idx, layer) in timeline.layers.iter().enumerate().rev() {
            match &layer.kind {
                LayerKind::Guide => continue,
                LayerKind::Mask => {
                    close_mask(&mut out, open_mask.take());
                    continue;
                }
                LayerKind::Normal | LayerKind::Folder => {}
                LayerKind::Other(raw) => {
                    self.warnings.push(Warning::UnknownLayerType(raw.clone()));
                }
            }

            if open_mask.is_none() {
                if let Some(mask_idx) = mask_starts.get(layer_idx).copied().flatten() {
                    let mask_id = format!("Mask_{id}_{layer_idx}");
                    if let Some(mask_layer) = timeline.layers.get(mask_idx) {
                        let stencil = self.render_layer(
                            mask_layer,
                            frame,
                            &format!("{mask_id}_MASK"),
                            effect,
                            true,
                        )?;
                        out.defs.extend(&stencil.defs);
                        let mask = Element::new("mask")
                            .with_attr("id", mask_id.clone())
                            .with_children(stencil.body);
                        out.defs.insert(mask_id.clone(), mask);
                    }
                    open_mask = Some((mask_id, Vec::new()));
                }
            }

            let rendered = self.render_layer(
                layer,
                frame,
                &format!("{id}_Layer{layer_idx}"),
                effect,
                inside_mask,
            )?;
            out.defs.extend(&rendered.defs);
            match &mut open_mask {
                Some((_, masked)) => masked.extend(rendered.body),
                None => out.body.extend(rendered.body),
            }
        }
        close_mask(&mut out, open_mask);

        Ok(out)
    }

    fn render_layer(
        &mut self,
        layer: &Layer,
        frame: u32,
        id: &str,
        effect: ColorEffect,
        inside_mask: bool,
    ) -> XflResult<Fragment> {
        let mut out = Fragment::new();
        let Some((keyframe, offset)) = active_keyframe(layer, frame) else {
            return Ok(out);
        };
        for (element_idx, element) in keyframe.elements.iter().enumerate() {
            let rendered = self.render_element(
                element,
                &format!("{id}_{element_idx}"),
                offset,
                effect,
                inside_mask,
            )?;
            out.append(&rendered);
        }
        Ok(out)
    }

    fn render_element(
        &mut self,
        element: &XflElement,
        id: &str,
        offset: u32,
        effect: ColorEffect,
        inside_mask: bool,
    ) -> XflResult<Fragment> {
        match element {
            XflElement::Shape(shape) => {
                let mut out = self.render_shape(shape, id, effect, inside_mask)?;
                wrap_matrix(&mut out, shape.matrix);
                Ok(out)
            }
            XflElement::SymbolInstance(instance) => {
                let fragment = self.render_instance(instance, offset, effect, inside_mask)?;
                let mut out = Fragment::clone(&fragment);
                wrap_matrix(&mut out, instance.matrix);
                Ok(out)
            }
            XflElement::Group(children) => {
                let mut out = Fragment::new();
                for (child_idx, child) in children.iter().enumerate() {
                    let child_id = if children.len() > 1 {
                        format!("{id}_MEMBER_{child_idx}")
                    } else {
                        id.to_string()
                    };
                    let rendered =
                        self.render_element(child, &child_id, offset, effect, inside_mask)?;
                    out.append(&rendered);
                }
                Ok(out)
            }
            XflElement::Unsupported(tag) => {
                self.warnings.push(Warning::UnsupportedElement(tag.clone()));
                Ok(Fragment::new())
            }
        }
    }

    fn render_instance(
        &mut self,
        instance: &SymbolInstance,
        offset: u32,
        effect: ColorEffect,
        inside_mask: bool,
    ) -> XflResult<Arc<Fragment>> {
        match &instance.symbol_type {
            SymbolType::Graphic => {}
            SymbolType::MovieClip => {
                self.warnings
                    .push(Warning::UnknownSymbolType("movie clip".to_string()));
            }
            SymbolType::Button => {
                self.warnings
                    .push(Warning::UnknownSymbolType("button".to_string()));
            }
            SymbolType::Other(raw) => {
                self.warnings.push(Warning::UnknownSymbolType(raw.clone()));
            }
        }

        let effect = match (&instance.color, inside_mask) {
            (Some(desc), false) => {
                effect.compose(ColorEffect::from_descriptor(desc, &mut self.warnings))
            }
            _ => effect,
        };

        let name = instance.library_item_name.as_str();
        let last = match instance.last_frame {
            Some(last) => last,
            None => self.project.timeline(name, TimelineKind::Symbol)?.last_frame(),
        };
        let frame = loop_frame(&instance.loop_mode, instance.first_frame, last, offset)?;
        self.render_timeline(name, TimelineKind::Symbol, frame, effect, inside_mask)
    }

    fn render_shape(
        &mut self,
        shape: &Shape,
        id: &str,
        effect: ColorEffect,
        inside_mask: bool,
    ) -> XflResult<Fragment> {
        let effect = if inside_mask {
            ColorEffect::identity()
        } else {
            effect
        };
        let key: ShapeKey = (shape.fingerprint(), inside_mask, effect.key());
        let parts = match self.shapes.get(&key) {
            Some(parts) => parts,
            None => {
                tracing::debug!(id, "shape cache miss");
                let parts = Arc::new(convert_shape(shape, effect, inside_mask, &mut self.warnings)?);
                self.shapes.insert(key, Arc::clone(&parts));
                parts
            }
        };

        let mut out = Fragment::new();
        out.defs.extend(&parts.defs);

        if !parts.fill.is_empty() {
            let fill_id = format!("{id}_FILL");
            out.defs.insert(
                fill_id.clone(),
                Element::new("g")
                    .with_attr("id", fill_id.clone())
                    .with_children(parts.fill.iter().cloned()),
            );
            let mut fill_use = Element::new("use").with_attr("xlink:href", format!("#{fill_id}"));
            if let Some(filter) = &parts.filter {
                fill_use.set_attr("filter", format!("url(#{filter})"));
            }
            out.body.push(Arc::new(fill_use));
        }

        if !parts.stroke.is_empty() {
            let stroke_id = format!("{id}_STROKE");
            out.defs.insert(
                stroke_id.clone(),
                Element::new("g")
                    .with_attr("id", stroke_id.clone())
                    .with_children(parts.stroke.iter().cloned()),
            );
            out.body.push(Arc::new(
                Element::new("use").with_attr("xlink:href", format!("#{stroke_id}")),
            ));
        }

        Ok(out)
    }
}

fn close_mask(out: &mut Fragment, open: Option<(String, Vec<Arc<Element>>)>) {
    if let Some((mask_id, body)) = open {
        out.body.push(Arc::new(
            Element::new("g")
                .with_attr("mask", format!("url(#{mask_id})"))
                .with_children(body),
        ));
    }
}

fn wrap_matrix(out: &mut Fragment, matrix: Affine) {
    if !is_identity_matrix(matrix) && !out.body.is_empty() {
        out.wrap_body(Element::new("g").with_attr("transform", matrix_fn(matrix)));
    }
}

/// Id prefix of every fragment rendered from a timeline.
///
/// Symbols whose name is already a valid id keep it unchanged. Scenes, and symbols whose name
/// had to be sanitized, get `_` plus a hash of the raw name and kind appended, so distinct
/// timelines never share ids.
pub fn timeline_id(name: &str, kind: TimelineKind) -> String {
    let sanitized = sanitize_id(name);
    if kind == TimelineKind::Symbol && sanitized == name {
        return sanitized;
    }
    let mut h = StableHasher::new();
    h.write_bool(kind == TimelineKind::Scene);
    h.write_str(name);
    content_id(&sanitized, h.finish())
}

/// Every character outside `[A-Za-z0-9_]` becomes `_`.
pub(crate) fn sanitize_id(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
