// crates/clipsqueeze-core/src/collab.rs
//
// The controller's collaborators. Everything slow or platform-specific lives
// behind one of these traits; the controller itself never blocks on I/O
// except for the post-export stats read.
//
// Async collaborators receive a `Sender<MediaResult>` and must reply exactly
// once per call. They never call back into the controller; replies are
// picked up by `Controller::poll` on the UI thread.

use std::path::{Path, PathBuf};

use crossbeam_channel::Sender;
use uuid::Uuid;

use crate::error::CompressError;
use crate::media_types::{ExportRequest, MediaResult, MediaStats};

/// Modal file picker restricted to movie files.
///
/// Replies `Picked` or `PickCancelled` tagged with `pick_id`.
pub trait MediaPicker {
    fn present(&mut self, pick_id: Uuid, reply: Sender<MediaResult>);
}

/// Makes a picked file locally processable by copying it into a staging
/// directory.
///
/// Replies `Staged` with the copy's path, or `StageFailed`.
pub trait AssetStager {
    fn stage(&self, pick_id: Uuid, source: PathBuf, reply: Sender<MediaResult>);
}

/// Opaque compressor. Runs off the calling thread.
///
/// May send any number of `ExportProgress` messages, then exactly one
/// `ExportFinished`.
pub trait ExportSession {
    fn export_async(&self, request: ExportRequest, reply: Sender<MediaResult>);
}

/// Synchronous size + stream info read.
pub trait MediaInspector {
    fn inspect(&self, path: &Path) -> Result<MediaStats, CompressError>;
}

/// Plays a finished file. Has no influence on presentation state.
pub trait Player {
    fn play(&mut self, path: &Path);
}
