/// Convenience result type used across xflsvg.
pub type XflResult<T> = Result<T, XflError>;

/// Fatal error taxonomy.
///
/// Every variant aborts the conversion of the shape or symbol that contains it; the error is
/// propagated to the caller of [`crate::Renderer::render`], which decides whether to skip the
/// frame or stop a batch.
#[derive(thiserror::Error, Debug)]
pub enum XflError {
    /// Malformed edge token stream.
    #[error("edge format error: {0}")]
    Format(String),

    /// Fill segments could not be joined into closed rings.
    #[error("shape assembly error: {0}")]
    Assembly(String),

    /// A looping symbol instance resolved to an empty or negative loop.
    #[error("invalid loop: first frame {first}, last frame {last}")]
    InvalidLoop {
        /// First frame of the loop.
        first: i64,
        /// Last frame of the loop (inclusive).
        last: i64,
    },

    /// Loop mode the renderer does not understand.
    #[error("unknown loop mode: {0}")]
    UnknownLoopMode(String),

    /// Requested timeline does not exist in the project.
    #[error("{kind} does not exist: {name}")]
    NotFound {
        /// Timeline kind (`scene` or `symbol`).
        kind: &'static str,
        /// Requested timeline name.
        name: String,
    },

    /// Project could not be read or parsed.
    #[error("project error: {0}")]
    Project(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl XflError {
    /// Build a [`XflError::Format`] value.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Build a [`XflError::Assembly`] value.
    pub fn assembly(msg: impl Into<String>) -> Self {
        Self::Assembly(msg.into())
    }

    /// Build a [`XflError::Project`] value.
    pub fn project(msg: impl Into<String>) -> Self {
        Self::Project(msg.into())
    }

    /// Build a [`XflError::NotFound`] value.
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
