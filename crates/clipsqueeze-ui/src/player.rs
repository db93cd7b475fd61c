// crates/clipsqueeze-ui/src/player.rs
//
// Playback of the compressed file.
//
// `QueuedPlayer` is the controller's Player collaborator. It only queues an
// OpenPlayer command; app.rs opens the window after the UI pass.
//
// `PlayerWindow` owns one playback session. The media worker's decode thread
// fills a bounded channel as fast as FFmpeg can go, so frames are consumed
// through a one-slot pending buffer and only shown once the wall clock has
// caught up with their PTS. The clock is anchored to the first frame that
// arrives, so open latency never counts as lateness. Video only.

use std::path::PathBuf;
use std::time::Instant;

use crossbeam_channel::Sender;
use eframe::egui;
use uuid::Uuid;

use clipsqueeze_core::collab::Player;
use clipsqueeze_core::commands::UiCommand;
use clipsqueeze_core::helpers::geometry::fit_within;
use clipsqueeze_core::helpers::time::format_clock;
use clipsqueeze_core::media_types::PlaybackFrame;
use clipsqueeze_media::MediaWorker;

use crate::helpers::format::{file_label, fit_label};

/// Show a frame at most this early.
const EARLY_SLACK: f64 = 1.0 / 120.0;
/// Frames later than this are skipped when a newer one is waiting.
const LATE_SLACK: f64 = 1.0 / 30.0;

pub struct QueuedPlayer {
    tx: Sender<UiCommand>,
}

impl QueuedPlayer {
    pub fn new(tx: Sender<UiCommand>) -> Self {
        Self { tx }
    }
}

impl Player for QueuedPlayer {
    fn play(&mut self, path: &std::path::Path) {
        let _ = self.tx.send(UiCommand::OpenPlayer(path.to_path_buf()));
    }
}

/// Frame timestamp relative to the first shown frame.
pub fn frame_due(rel_ts: f64, elapsed: f64) -> bool {
    rel_ts <= elapsed + EARLY_SLACK
}

pub fn frame_overdue(rel_ts: f64, elapsed: f64) -> bool {
    rel_ts < elapsed - LATE_SLACK
}

struct Session {
    id:      Uuid,
    path:    PathBuf,
    /// (wall clock, PTS) of the first frame.
    anchor:  Option<(Instant, f64)>,
    pending: Option<PlaybackFrame>,
    texture: Option<egui::TextureHandle>,
    size:    (u32, u32),
    /// PTS of the frame on screen, relative to the anchor.
    shown:   f64,
}

#[derive(Default)]
pub struct PlayerWindow {
    session: Option<Session>,
}

impl PlayerWindow {
    pub fn open(&mut self, worker: &MediaWorker, path: PathBuf) {
        let id = Uuid::new_v4();
        log::info!("[pb] playing {}", path.display());
        worker.start_playback(id, path.clone());
        self.session = Some(Session {
            id,
            path,
            anchor:  None,
            pending: None,
            texture: None,
            size:    (0, 0),
            shown:   0.0,
        });
    }

    pub fn close(&mut self, worker: &MediaWorker) {
        if self.session.take().is_some() {
            worker.stop_playback();
        }
    }

    /// Pull due frames from the worker. Call once per frame before drawing.
    pub fn poll(&mut self, worker: &MediaWorker, ctx: &egui::Context) {
        let Some(s) = self.session.as_mut() else { return };

        // Drop frames from a previous session.
        if s.pending.as_ref().is_some_and(|f| f.id != s.id) {
            s.pending = None;
        }
        if s.pending.is_none() {
            s.pending = worker.pb_rx.try_recv().ok().filter(|f| f.id == s.id);
        }

        let Some(frame_ts) = s.pending.as_ref().map(|f| f.timestamp) else {
            // Nothing decoded yet (or EOF); keep polling while the window is up.
            ctx.request_repaint_after(std::time::Duration::from_millis(15));
            return;
        };
        let (anchor_at, anchor_ts) = *s.anchor.get_or_insert((Instant::now(), frame_ts));
        let elapsed = anchor_at.elapsed().as_secs_f64();

        // Fast-forward past overdue frames.
        while s
            .pending
            .as_ref()
            .is_some_and(|f| frame_overdue(f.timestamp - anchor_ts, elapsed))
        {
            match worker.pb_rx.try_recv() {
                Ok(newer) if newer.id == s.id => s.pending = Some(newer),
                Ok(_)  => {}
                Err(_) => break,
            }
        }

        if let Some(frame) = s.pending.take() {
            if frame_due(frame.timestamp - anchor_ts, elapsed) {
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [frame.width as usize, frame.height as usize],
                    &frame.data,
                );
                match s.texture.as_mut() {
                    Some(tex) => tex.set(image, egui::TextureOptions::LINEAR),
                    None => {
                        s.texture = Some(ctx.load_texture("player_frame", image, egui::TextureOptions::LINEAR));
                    }
                }
                s.size  = (frame.width, frame.height);
                s.shown = frame.timestamp - anchor_ts;
            } else {
                s.pending = Some(frame);
            }
        }
        ctx.request_repaint();
    }

    pub fn ui(&mut self, ctx: &egui::Context, cmds: &mut Vec<UiCommand>) {
        let Some(s) = self.session.as_ref() else { return };

        let mut open = true;
        egui::Window::new(fit_label(&file_label(&s.path), 320.0))
            .id(egui::Id::new("player_window"))
            .open(&mut open)
            .resizable(true)
            .default_size([480.0, 360.0])
            .show(ctx, |ui| {
                match &s.texture {
                    Some(tex) => {
                        let avail = ui.available_size();
                        let (w, h) = fit_within(s.size.0, s.size.1, avail.x, (avail.y - 24.0).max(32.0));
                        ui.vertical_centered(|ui| {
                            ui.add(egui::Image::new(egui::load::SizedTexture::new(tex.id(), egui::vec2(w, h))));
                        });
                    }
                    None => {
                        ui.centered_and_justified(|ui| ui.spinner());
                    }
                }
                ui.label(
                    egui::RichText::new(format_clock(s.shown))
                        .monospace()
                        .color(crate::theme::DARK_TEXT_DIM),
                );
            });

        if !open {
            cmds.push(UiCommand::ClosePlayer);
        }
    }
}
