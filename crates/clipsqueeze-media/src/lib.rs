// crates/clipsqueeze-media/src/lib.rs
//
// FFmpeg-backed collaborators for the controller. No egui dependency;
// communicates with clipsqueeze-ui via channels only.
//
// To add a new media capability:
//   1. Create a new module file here
//   2. Add `mod mymodule;` below
//   3. Call it from worker.rs and, if the controller needs it, put a trait
//      for it in clipsqueeze_core::collab

pub mod decode;
pub mod encode;
pub mod fifo;
pub mod probe;
pub mod stage;
pub mod worker;

mod helpers;
#[cfg(test)]
mod test_clip;

// Re-export the main public API so clipsqueeze-ui imports are simple.
pub use worker::MediaWorker;
pub use clipsqueeze_core::media_types::{MediaResult, PlaybackFrame};
