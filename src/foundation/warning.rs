/// Non-fatal conversion problem.
///
/// A warning means something was degraded to a safe default (identity color, no paint, an
/// element skipped) and the render carried on.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Fill or stroke style the resolver has no mapping for.
    #[error("unsupported style: {0}")]
    UnsupportedStyle(String),

    /// Color descriptor that matches none of the known effect kinds.
    #[error("unknown color effect: {0}")]
    UnknownColorEffect(String),

    /// Tint color that is not written as `#RRGGBB`.
    #[error("tint color isn't in hex format: {0}")]
    NonHexTint(String),

    /// Layer type other than normal, guide, mask or folder.
    #[error("unknown layer type: {0}")]
    UnknownLayerType(String),

    /// Symbol instance that is not a graphic symbol; it is rendered as one.
    #[error("unknown symbol type: {0}")]
    UnknownSymbolType(String),

    /// Element kind the renderer skips.
    #[error("unsupported element: {0}")]
    UnsupportedElement(String),

    /// Strokes are dropped while rendering mask content.
    #[error("strokes in masks are not supported")]
    StrokeInMask,

    /// Stroke scale mode other than `normal` or `none`; the stroke scales normally.
    #[error("unsupported stroke scale mode: {0}")]
    UnsupportedScaleMode(String),

    /// Project entry that could not be loaded but did not abort loading.
    #[error("project warning: {0}")]
    Project(String),
}

/// Ordered collection of warnings.
///
/// Every pushed warning is also logged through `tracing`, so warnings stay observable even when
/// the caller never drains the collection.
#[derive(Debug, Default, Clone)]
pub struct Warnings {
    items: Vec<Warning>,
}

impl Warnings {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and record a warning.
    pub fn push(&mut self, warning: Warning) {
        tracing::warn!(%warning, "xflsvg warning");
        self.items.push(warning);
    }

    /// Recorded warnings in emission order.
    pub fn as_slice(&self) -> &[Warning] {
        &self.items
    }

    /// Number of recorded warnings.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Return `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drain all recorded warnings.
    pub fn take(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.items)
    }

    /// Move every warning from `other` into `self` without logging them again.
    pub fn append(&mut self, other: &mut Warnings) {
        self.items.append(&mut other.items);
    }
}
