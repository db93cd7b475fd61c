// crates/clipsqueeze-core/src/controller.rs
//
// Selection/export controller.
//
// Owned by the UI thread. `&mut self` on every mutating method is the
// single-writer token for the presentation state: collaborators run on their
// own threads and only ever send `MediaResult` messages into the reply
// channel, which `poll()` drains once per frame.
//
// Flow:
//   select_video ─► picker ─► Picked ─► stager ─► Staged ─► request_export
//                                                              │
//   Complete / Cancelled / Failure ◄─ on_export_complete ◄─ ExportFinished
//
// Pick sessions and export jobs are tagged with UUIDs; a reply whose id is not
// the current one is dropped.

use std::path::{Path, PathBuf};

use crossbeam_channel::{unbounded, Receiver, Sender};
use uuid::Uuid;

use crate::collab::{AssetStager, ExportSession, MediaInspector, MediaPicker, Player};
use crate::error::CompressError;
use crate::helpers::paths::output_path_for;
use crate::helpers::time::format_duration;
use crate::media_types::{ExportRequest, ExportResult, ExportStatus, MediaResult, TimeRange};
use crate::profile::{ExportProfile, ReportDetail};
use crate::report;
use crate::state::{
    Affordances, ExportGuard, PresentationState, MSG_CANCELLED, MSG_FAILED,
};

/// Everything the controller talks to.
pub struct Collaborators {
    pub picker:    Box<dyn MediaPicker>,
    pub stager:    Box<dyn AssetStager>,
    pub session:   Box<dyn ExportSession>,
    pub inspector: Box<dyn MediaInspector>,
    pub player:    Box<dyn Player>,
}

pub struct Controller {
    collab:       Collaborators,
    state:        PresentationState,
    guard:        ExportGuard,
    /// Pick session the next `Picked`/`PickCancelled`/`Staged` must match.
    pending_pick: Option<Uuid>,
    /// Last successful export. Kept for playback only.
    output:       Option<PathBuf>,
    /// (frame, total) of the in-flight export.
    progress:     Option<(u64, u64)>,
    profile:      ExportProfile,
    /// Report layout of the profile the in-flight job was submitted with.
    job_report:   ReportDetail,
    reply_tx:     Sender<MediaResult>,
    reply_rx:     Receiver<MediaResult>,
}

impl Controller {
    pub fn new(collab: Collaborators, profile: ExportProfile) -> Self {
        let (reply_tx, reply_rx) = unbounded();
        Self {
            collab,
            state:        PresentationState::Initialized,
            guard:        ExportGuard::Idle,
            pending_pick: None,
            output:       None,
            progress:     None,
            job_report:   profile.report,
            profile,
            reply_tx,
            reply_rx,
        }
    }

    pub fn state(&self) -> &PresentationState {
        &self.state
    }

    /// What the UI should show this frame.
    pub fn affordances(&self) -> Affordances {
        Affordances::from_state(&self.state).with_progress(self.progress)
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn is_export_in_flight(&self) -> bool {
        self.guard.is_in_flight()
    }

    pub fn profile(&self) -> &ExportProfile {
        &self.profile
    }

    /// Select the profile used by the next export. An in-flight export keeps
    /// the settings it was submitted with.
    pub fn set_profile(&mut self, profile: ExportProfile) -> Result<(), CompressError> {
        profile.settings.validate()?;
        log::info!("[app] profile → {}", profile.name);
        self.profile = profile;
        Ok(())
    }

    // ── Operations ───────────────────────────────────────────────────────────

    pub fn select_video(&mut self) -> Result<(), CompressError> {
        if self.guard.is_in_flight() {
            log::warn!("[app] select_video rejected: export in flight");
            return Err(CompressError::Busy);
        }
        let pick_id = Uuid::new_v4();
        if let Some(old) = self.pending_pick.replace(pick_id) {
            log::debug!("[app] pick {old} superseded by {pick_id}");
        }
        self.set_state(PresentationState::Loading);
        self.collab.picker.present(pick_id, self.reply_tx.clone());
        Ok(())
    }

    pub fn on_video_picked(&mut self, pick_id: Uuid, source: PathBuf) {
        if self.pending_pick != Some(pick_id) {
            log::debug!("[app] stale pick {pick_id} ignored");
            return;
        }
        log::info!("[app] picked {}", source.display());
        self.collab.stager.stage(pick_id, source, self.reply_tx.clone());
    }

    pub fn on_picker_cancelled(&mut self, pick_id: Uuid) {
        if self.pending_pick != Some(pick_id) {
            return;
        }
        self.pending_pick = None;
        log::info!("[app] picker cancelled");
        self.set_state(PresentationState::Cancelled(MSG_CANCELLED.into()));
    }

    fn on_staged(&mut self, pick_id: Uuid, path: PathBuf) {
        if self.pending_pick != Some(pick_id) {
            log::debug!("[app] stale staged copy {} ignored", path.display());
            return;
        }
        self.pending_pick = None;
        if let Err(e) = self.request_export(path) {
            log::warn!("[app] export not started: {e}");
        }
    }

    fn on_stage_failed(&mut self, pick_id: Uuid, msg: String) {
        if self.pending_pick != Some(pick_id) {
            return;
        }
        self.pending_pick = None;
        self.fail("[stage]", CompressError::WriteFailure(msg));
    }

    /// Submit `source` to the export session with the current profile.
    /// Returns the job id.
    pub fn request_export(&mut self, source: PathBuf) -> Result<Uuid, CompressError> {
        if self.guard.is_in_flight() {
            return Err(CompressError::Busy);
        }
        let settings = self.profile.settings.clone();
        let output = output_path_for(&source, settings.container.extension());
        let request = ExportRequest {
            job_id:     Uuid::new_v4(),
            source,
            output,
            settings,
            time_range: TimeRange::full(),
        };
        let job_id = request.job_id;

        log::info!(
            "[export] job {job_id}: {} → {} ({})",
            request.source.display(),
            request.output.display(),
            self.profile.name,
        );
        self.guard = ExportGuard::InFlight(job_id);
        self.job_report = self.profile.report;
        self.set_state(PresentationState::Loading);
        self.collab.session.export_async(request, self.reply_tx.clone());
        Ok(job_id)
    }

    pub fn on_export_progress(&mut self, job_id: Uuid, frame: u64, total_frames: u64) {
        if self.guard.owns(job_id) {
            self.progress = Some((frame, total_frames));
        }
    }

    pub fn on_export_complete(&mut self, result: ExportResult) {
        if !self.guard.owns(result.job_id) {
            log::debug!("[export] stale result for job {} ignored", result.job_id);
            return;
        }
        self.guard = ExportGuard::Idle;

        match result.status {
            ExportStatus::Completed => match self.build_report(&result) {
                Ok(report) => {
                    self.output = Some(result.output.clone());
                    self.set_state(PresentationState::Complete(report));
                }
                Err(e) => self.fail("[probe]", e),
            },
            ExportStatus::Cancelled => {
                log::info!("[export] job {} cancelled", result.job_id);
                self.set_state(PresentationState::Cancelled(MSG_CANCELLED.into()));
            }
            ExportStatus::Failed => {
                let detail = result.error.clone().unwrap_or_default();
                self.fail("[export]", CompressError::ExportFailure(detail));
            }
        }
    }

    fn build_report(&self, result: &ExportResult) -> Result<String, CompressError> {
        let original   = self.collab.inspector.inspect(&result.source)?;
        let compressed = self.collab.inspector.inspect(&result.output)?;
        log::info!(
            "[export] job {} done ({}): {} → {} bytes ({}% smaller)",
            result.job_id,
            format_duration(compressed.duration_secs),
            original.bytes,
            compressed.bytes,
            report::savings_percent(&original, &compressed),
        );
        Ok(report::format_report(&original, &compressed, self.job_report))
    }

    /// Hand the last output to the player. Returns `false` when there is none.
    pub fn play_compressed_video(&mut self) -> bool {
        match self.output.as_deref() {
            Some(path) => {
                log::info!("[app] play {}", path.display());
                self.collab.player.play(path);
                true
            }
            None => false,
        }
    }

    /// Drain collaborator replies and apply them. Call once per frame.
    /// Returns the number of messages handled.
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(msg) = self.reply_rx.try_recv() {
            handled += 1;
            match msg {
                MediaResult::Picked { pick_id, path }        => self.on_video_picked(pick_id, path),
                MediaResult::PickCancelled { pick_id }       => self.on_picker_cancelled(pick_id),
                MediaResult::Staged { pick_id, path }        => self.on_staged(pick_id, path),
                MediaResult::StageFailed { pick_id, msg }    => self.on_stage_failed(pick_id, msg),
                MediaResult::ExportProgress { job_id, frame, total_frames } => {
                    self.on_export_progress(job_id, frame, total_frames)
                }
                MediaResult::ExportFinished(result)          => self.on_export_complete(result),
            }
        }
        handled
    }

    /// End the current request with the error's fixed label. The detail only
    /// goes to the log.
    fn fail(&mut self, area: &str, err: CompressError) {
        log::warn!("{area} {err}");
        let label = err.user_message().unwrap_or(MSG_FAILED);
        self.set_state(PresentationState::Failure(label.into()));
    }

    /// The only place the presentation state changes. Progress belongs to the
    /// outgoing state and is always dropped.
    fn set_state(&mut self, next: PresentationState) {
        log::debug!("[app] state {:?} → {:?}", self.state, next);
        self.progress = None;
        self.state = next;
    }
}
