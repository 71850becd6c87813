//! Project data model and the readers that produce it.

pub mod model;
pub mod source;
pub mod xfl;
