// crates/clipsqueeze-core/src/lib.rs
//
// Pure application logic. No egui, no ffmpeg.
//
// The controller owns the presentation state and talks to the outside world
// only through the collaborator traits in `collab` and the `MediaResult`
// messages those collaborators send back.

pub mod collab;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod helpers;
pub mod media_types;
pub mod profile;
pub mod report;
pub mod state;

pub use controller::{Collaborators, Controller};
pub use error::CompressError;
pub use state::{Affordances, PresentationState};
