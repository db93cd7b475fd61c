// crates/clipsqueeze-core/src/helpers/mod.rs

pub mod geometry;
pub mod paths;
pub mod time;
