//! Edge decoding: `edges` strings to segments, and segments to fill rings and stroke paths.

pub mod assemble;
pub mod outline;
pub mod segment;
pub mod token;
