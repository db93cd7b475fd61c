// crates/clipsqueeze-core/src/media_types.rs
//
// Types that flow across the channel between collaborators and the controller.
// Plain data, no egui or ffmpeg.

use std::path::PathBuf;
use uuid::Uuid;

use crate::profile::ExportSettings;

/// Portion of the source to export. `duration_secs = None` runs to the end.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeRange {
    pub start_secs:    f64,
    pub duration_secs: Option<f64>,
}

impl TimeRange {
    /// The whole asset.
    pub fn full() -> Self {
        Self { start_secs: 0.0, duration_secs: None }
    }

    /// End point in source seconds, if bounded.
    pub fn end_secs(&self) -> Option<f64> {
        self.duration_secs.map(|d| self.start_secs + d)
    }
}

impl Default for TimeRange {
    fn default() -> Self { Self::full() }
}

/// One export job, built by the controller and consumed by the export session.
#[derive(Clone, Debug)]
pub struct ExportRequest {
    pub job_id:     Uuid,
    /// Local, already-staged source file.
    pub source:     PathBuf,
    /// Destination, always carrying the container's extension.
    pub output:     PathBuf,
    pub settings:   ExportSettings,
    pub time_range: TimeRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportStatus {
    Completed,
    Cancelled,
    Failed,
}

/// Terminal outcome of one `ExportRequest`. Sent exactly once per job.
#[derive(Clone, Debug)]
pub struct ExportResult {
    pub job_id: Uuid,
    pub status: ExportStatus,
    pub source: PathBuf,
    pub output: PathBuf,
    /// Detail for the log. Never shown in the UI.
    pub error:  Option<String>,
}

impl ExportResult {
    pub fn completed(req: &ExportRequest) -> Self {
        Self::finish(req, ExportStatus::Completed, None)
    }

    pub fn cancelled(req: &ExportRequest) -> Self {
        Self::finish(req, ExportStatus::Cancelled, None)
    }

    pub fn failed(req: &ExportRequest, msg: impl Into<String>) -> Self {
        Self::finish(req, ExportStatus::Failed, Some(msg.into()))
    }

    fn finish(req: &ExportRequest, status: ExportStatus, error: Option<String>) -> Self {
        Self {
            job_id: req.job_id,
            status,
            source: req.source.clone(),
            output: req.output.clone(),
            error,
        }
    }
}

/// What the report needs to know about one file.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaStats {
    pub bytes:         u64,
    pub width:         u32,
    pub height:        u32,
    /// Estimated video data rate, bits per second. 0 when unknown.
    pub bitrate:       u64,
    /// Nominal frames per second. 0.0 when unknown.
    pub frame_rate:    f64,
    pub duration_secs: f64,
}

/// Replies sent from collaborator threads to the controller.
#[derive(Debug)]
pub enum MediaResult {
    Picked         { pick_id: Uuid, path: PathBuf },
    PickCancelled  { pick_id: Uuid },
    Staged         { pick_id: Uuid, path: PathBuf },
    StageFailed    { pick_id: Uuid, msg: String },
    ExportProgress { job_id: Uuid, frame: u64, total_frames: u64 },
    ExportFinished(ExportResult),
}

/// A decoded frame from the dedicated playback pipeline.
pub struct PlaybackFrame {
    pub id:        Uuid,
    pub timestamp: f64,
    pub width:     u32,
    pub height:    u32,
    pub data:      Vec<u8>, // RGBA
}
