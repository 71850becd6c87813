use crate::foundation::error::{XflError, XflResult};
use crate::project::model::{Project, Stage, Timeline, TimelineKind};

/// Read-only access to a parsed project.
///
/// The renderer only needs stage settings and timelines by name, so any front-end that can
/// produce [`Timeline`]s (an XFL directory, JSON, an in-memory builder) can implement this.
pub trait ProjectSource {
    /// Stage width, height and background.
    fn stage(&self) -> &Stage;

    /// Scene names in document order.
    fn scene_names(&self) -> Vec<String>;

    /// Library symbol names.
    fn symbol_names(&self) -> Vec<String>;

    /// Look up a timeline.
    ///
    /// Returns [`XflError::NotFound`] when no timeline of that kind has the name.
    fn timeline(&self, name: &str, kind: TimelineKind) -> XflResult<&Timeline>;
}

impl ProjectSource for Project {
    fn stage(&self) -> &Stage {
        &self.stage
    }

    fn scene_names(&self) -> Vec<String> {
        self.scenes.iter().map(|s| s.name.clone()).collect()
    }

    fn symbol_names(&self) -> Vec<String> {
        self.symbols.keys().cloned().collect()
    }

    fn timeline(&self, name: &str, kind: TimelineKind) -> XflResult<&Timeline> {
        let found = match kind {
            TimelineKind::Scene => self.scenes.iter().find(|s| s.name == name),
            TimelineKind::Symbol => self.symbols.get(name),
        };
        found.ok_or_else(|| XflError::not_found(kind.as_str(), name))
    }
}
