// crates/clipsqueeze-media/src/worker.rs
//
// MediaWorker: owns the playback decode thread and spawns staging / export
// threads. Implements the controller's AssetStager, ExportSession and
// MediaInspector collaborators; all public API that clipsqueeze-ui calls
// lives here.
//
// Cheap to clone: every clone shares the same playback pipeline, cancel map
// and shutdown flag, so the controller can hold one box per collaborator role.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;
use uuid::Uuid;

use clipsqueeze_core::collab::{AssetStager, ExportSession, MediaInspector};
use clipsqueeze_core::error::CompressError;
use clipsqueeze_core::media_types::{ExportRequest, ExportResult, MediaResult, MediaStats, PlaybackFrame};

use crate::decode::LiveDecoder;
use crate::encode::export_file;
use crate::probe::probe_stats;
use crate::stage::stage_copy;

/// Playback frames are decoded at most this wide.
pub const PLAYBACK_MAX_W: u32 = 960;

// ── Internal types ────────────────────────────────────────────────────────────

enum PlaybackCmd {
    Start { id: Uuid, path: PathBuf },
    Stop,
}

// ── MediaWorker ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MediaWorker {
    staging_dir: PathBuf,
    /// Dedicated playback pipeline.
    pb_tx:       Sender<PlaybackCmd>,
    pub pb_rx:   Receiver<PlaybackFrame>,
    shutdown:    Arc<AtomicBool>,
    /// Per-job cancel flags, keyed by job_id. Only shutdown sets them.
    export_cancels: Arc<Mutex<HashMap<Uuid, Arc<AtomicBool>>>>,
}

impl MediaWorker {
    pub fn new(staging_dir: PathBuf) -> Self {
        // ── Dedicated playback decode thread ──────────────────────────────────
        // Runs ahead of the UI filling a bounded channel; send() blocking on a
        // full channel is the rate limiter.
        let (pb_tx, pb_cmd_rx)   = bounded::<PlaybackCmd>(4);
        let (pb_frame_tx, pb_rx) = bounded::<PlaybackFrame>(32);

        thread::spawn(move || {
            let mut decoder: Option<(Uuid, LiveDecoder)> = None;
            loop {
                let cmd = if decoder.is_some() {
                    match pb_cmd_rx.try_recv() {
                        Ok(cmd)                         => Some(cmd),
                        Err(TryRecvError::Empty)        => None,
                        Err(TryRecvError::Disconnected) => return,
                    }
                } else {
                    match pb_cmd_rx.recv() {
                        Ok(cmd) => Some(cmd),
                        Err(_)  => return,
                    }
                };

                match cmd {
                    Some(PlaybackCmd::Start { id, path }) => {
                        decoder = match LiveDecoder::open(&path, PLAYBACK_MAX_W) {
                            Ok(d)  => Some((id, d)),
                            Err(e) => {
                                log::warn!("[pb] open {}: {e}", path.display());
                                None
                            }
                        };
                        continue;
                    }
                    Some(PlaybackCmd::Stop) => {
                        decoder = None;
                        continue;
                    }
                    None => {}
                }

                if let Some((id, d)) = decoder.as_mut() {
                    match d.next_frame() {
                        Some((data, width, height, timestamp)) => {
                            let f = PlaybackFrame { id: *id, timestamp, width, height, data };
                            if pb_frame_tx.send(f).is_err() { return; }
                        }
                        None => {
                            log::info!("[pb] eof {}", d.path.display());
                            decoder = None;
                        }
                    }
                }
            }
        });

        Self {
            staging_dir,
            pb_tx,
            pb_rx,
            shutdown:       Arc::new(AtomicBool::new(false)),
            export_cancels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Cancel in-flight exports and stop playback. Exports finish with
    /// `ExportStatus::Cancelled`.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        for flag in self.export_cancels.lock().values() {
            flag.store(true, Ordering::Relaxed);
        }
        let _ = self.pb_tx.try_send(PlaybackCmd::Stop);
    }

    /// Start the playback pipeline from the top of `path`.
    pub fn start_playback(&self, id: Uuid, path: PathBuf) {
        // Flush stale frames from the previous session.
        while self.pb_rx.try_recv().is_ok() {}
        let _ = self.pb_tx.try_send(PlaybackCmd::Start { id, path });
    }

    pub fn stop_playback(&self) {
        let _ = self.pb_tx.try_send(PlaybackCmd::Stop);
    }
}

// ── Collaborator impls ────────────────────────────────────────────────────────

impl AssetStager for MediaWorker {
    fn stage(&self, pick_id: Uuid, source: PathBuf, reply: Sender<MediaResult>) {
        let dir = self.staging_dir.clone();
        thread::spawn(move || {
            let msg = match stage_copy(&source, &dir) {
                Ok(path) => MediaResult::Staged { pick_id, path },
                Err(e)   => {
                    log::warn!("[stage] {}: {e:#}", source.display());
                    MediaResult::StageFailed { pick_id, msg: format!("{e:#}") }
                }
            };
            let _ = reply.send(msg);
        });
    }
}

impl ExportSession for MediaWorker {
    fn export_async(&self, request: ExportRequest, reply: Sender<MediaResult>) {
        let job_id = request.job_id;
        let cancel = Arc::new(AtomicBool::new(false));
        let sd     = self.shutdown.clone();

        // Register before spawning so shutdown() can't miss a starting job.
        self.export_cancels.lock().insert(job_id, Arc::clone(&cancel));

        let cancels_ref = Arc::clone(&self.export_cancels);
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) {
                log::info!("[export] job {job_id} not started: worker shutting down");
                let _ = reply.send(MediaResult::ExportFinished(ExportResult::cancelled(&request)));
            } else {
                export_file(request, cancel, reply);
            }
            cancels_ref.lock().remove(&job_id);
        });
    }
}

impl MediaInspector for MediaWorker {
    fn inspect(&self, path: &Path) -> Result<MediaStats, CompressError> {
        probe_stats(path).map_err(|e| CompressError::ReadFailure(format!("{e:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use clipsqueeze_core::media_types::{ExportStatus, TimeRange};
    use clipsqueeze_core::profile::ExportProfile;

    const WAIT: Duration = Duration::from_secs(5);
    const EXPORT_WAIT: Duration = Duration::from_secs(60);

    #[test]
    fn stage_replies_with_copy() {
        let staging = tempfile::tempdir().unwrap();
        let src_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("clip.mov");
        std::fs::write(&src, b"0123456789").unwrap();

        let worker = MediaWorker::new(staging.path().to_path_buf());
        let (tx, rx) = crossbeam_channel::unbounded();
        let pick_id = Uuid::new_v4();
        worker.stage(pick_id, src, tx);

        match rx.recv_timeout(WAIT).unwrap() {
            MediaResult::Staged { pick_id: id, path } => {
                assert_eq!(id, pick_id);
                assert!(path.starts_with(staging.path()));
                assert_eq!(std::fs::read(path).unwrap(), b"0123456789");
            }
            other => panic!("expected Staged, got {other:?}"),
        }
    }

    #[test]
    fn stage_of_missing_file_fails() {
        let staging = tempfile::tempdir().unwrap();
        let worker = MediaWorker::new(staging.path().to_path_buf());
        let (tx, rx) = crossbeam_channel::unbounded();
        let pick_id = Uuid::new_v4();
        worker.stage(pick_id, "/definitely/not/here.mov".into(), tx);

        assert!(matches!(
            rx.recv_timeout(WAIT).unwrap(),
            MediaResult::StageFailed { pick_id: id, .. } if id == pick_id
        ));
    }

    #[test]
    fn inspect_failure_is_read_failure() {
        let worker = MediaWorker::new(std::env::temp_dir());
        let err = worker.inspect(Path::new("/definitely/not/here.mp4")).unwrap_err();
        assert!(matches!(err, CompressError::ReadFailure(_)));
    }

    #[test]
    fn export_after_shutdown_is_cancelled() {
        let worker = MediaWorker::new(std::env::temp_dir());
        worker.shutdown();

        let request = ExportRequest {
            job_id:     Uuid::new_v4(),
            source:     "/tmp/in.mov".into(),
            output:     "/tmp/in.mp4".into(),
            settings:   ExportProfile::low_bandwidth().settings,
            time_range: TimeRange::full(),
        };
        let (tx, rx) = crossbeam_channel::unbounded();
        worker.export_async(request.clone(), tx);

        match rx.recv_timeout(WAIT).unwrap() {
            MediaResult::ExportFinished(r) => {
                assert_eq!(r.job_id, request.job_id);
                assert_eq!(r.status, ExportStatus::Cancelled);
            }
            other => panic!("expected ExportFinished, got {other:?}"),
        }
    }

    #[test]
    fn export_async_completes_once_at_profile_size() {
        if !crate::test_clip::has_h264_encoder() {
            eprintln!("libx264 not available; skipping");
            return;
        }
        let staging = tempfile::tempdir().unwrap();
        let source = staging.path().join("clipsqueeze_in.mov");
        crate::test_clip::write_clip(&source, 240, 180, 20).unwrap();

        let worker = MediaWorker::new(staging.path().to_path_buf());
        let request = ExportRequest {
            job_id:     Uuid::new_v4(),
            source:     source.clone(),
            output:     staging.path().join("clipsqueeze_in.mp4"),
            settings:   ExportProfile::low_bandwidth().settings,
            time_range: TimeRange::full(),
        };
        let (tx, rx) = crossbeam_channel::unbounded();
        worker.export_async(request.clone(), tx);

        let result = loop {
            match rx.recv_timeout(EXPORT_WAIT).unwrap() {
                MediaResult::ExportFinished(r) => break r,
                MediaResult::ExportProgress { .. } => {}
                other => panic!("unexpected {other:?}"),
            }
        };
        assert_eq!(result.job_id, request.job_id);
        assert_eq!(result.status, ExportStatus::Completed, "{:?}", result.error);
        // The export thread drops its sender after the one result.
        assert!(rx.recv_timeout(WAIT).is_err());

        let stats = worker.inspect(&request.output).unwrap();
        assert_eq!((stats.width, stats.height), (320, 568));
        assert!(stats.bytes > 0);
    }
}
