// crates/clipsqueeze-media/src/helpers/mod.rs
//
// Internal helper modules for clipsqueeze-media.
// Not re-exported from lib.rs.

pub mod seek;
