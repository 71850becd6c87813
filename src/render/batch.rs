use rayon::prelude::*;

use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{XflError, XflResult};
use crate::foundation::warning::Warning;
use crate::project::model::TimelineKind;
use crate::project::source::ProjectSource;
use crate::render::document::Document;
use crate::render::renderer::{Renderer, RendererOpts};

/// Settings for rendering a range of frames.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchOpts {
    /// Worker threads; `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Options for each worker's renderer.
    pub renderer: RendererOpts,
}

/// One rendered frame of a batch.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedFrame {
    /// Frame index in the rendered timeline.
    pub frame: FrameIndex,
    /// Output document.
    pub document: Document,
    /// Warnings raised while rendering this frame.
    pub warnings: Vec<Warning>,
}

/// Render every frame of `range` in parallel.
///
/// Each worker thread owns one [`Renderer`], so caches are shared between the frames a worker
/// handles but never across threads. Results come back in frame order; the first failing
/// frame fails the batch.
#[tracing::instrument(skip(project, opts), fields(frames = range.len_frames()))]
pub fn render_frames_parallel<P>(
    project: &P,
    name: &str,
    kind: TimelineKind,
    range: FrameRange,
    width: f64,
    height: f64,
    opts: &BatchOpts,
) -> XflResult<Vec<RenderedFrame>>
where
    P: ProjectSource + Sync + ?Sized,
{
    let pool = build_thread_pool(opts.threads)?;
    let frames: Vec<FrameIndex> = range.iter().collect();

    let rendered = pool.install(|| {
        frames
            .par_iter()
            .map_init(
                || Renderer::with_opts(project, opts.renderer.clone()),
                |renderer, &frame| -> XflResult<RenderedFrame> {
                    let document = renderer.render(name, frame, width, height, kind)?;
                    Ok(RenderedFrame {
                        frame,
                        document,
                        warnings: renderer.take_warnings(),
                    })
                },
            )
            .collect::<Vec<_>>()
    });

    rendered.into_iter().collect()
}

fn build_thread_pool(threads: Option<usize>) -> XflResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(XflError::project("thread count must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| XflError::project(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/batch.rs"]
mod tests;
