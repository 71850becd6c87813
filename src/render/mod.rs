pub mod batch;
pub(crate) mod cache;
pub mod document;
pub mod playback;
pub mod renderer;
pub(crate) mod shape;
