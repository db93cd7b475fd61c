// crates/clipsqueeze-ui/src/app.rs
//
// ClipSqueezeApp: owns the controller on the UI thread and renders its
// affordances. Widgets never touch the controller directly; they push
// UiCommands which are processed after the UI pass.

use std::time::Duration;

use crossbeam_channel::Receiver;
use eframe::egui;
use serde::{Deserialize, Serialize};

use clipsqueeze_core::commands::UiCommand;
use clipsqueeze_core::config::AppConfig;
use clipsqueeze_core::profile::{self, ExportProfile};
use clipsqueeze_core::{Collaborators, Controller};
use clipsqueeze_media::MediaWorker;

use crate::helpers::format::report_for_display;
use crate::picker::RfdPicker;
use crate::player::{PlayerWindow, QueuedPlayer};
use crate::theme::{configure_style, message_color, ACCENT, DARK_TEXT_DIM};

/// While loading, poll collaborator replies at least this often.
const LOADING_POLL: Duration = Duration::from_millis(50);

#[derive(Default, Serialize, Deserialize)]
struct AppStorage {
    selected_profile: Option<String>,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct ClipSqueezeApp {
    controller:   Controller,
    worker:       MediaWorker,
    /// Built-ins plus config.json profiles, in combo-box order.
    profiles:     Vec<ExportProfile>,
    player:       PlayerWindow,
    /// OpenPlayer commands queued by QueuedPlayer.
    player_rx:    Receiver<UiCommand>,
    /// Commands emitted by widgets each frame, processed after the UI pass.
    pending_cmds: Vec<UiCommand>,
}

impl ClipSqueezeApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        configure_style(&cc.egui_ctx);
        // Pin to dark mode so OS theme changes don't overwrite the palette.
        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = egui::ThemePreference::Dark;
        });

        let profiles = config.all_profiles();

        // The last profile picked in the UI beats config.json's default.
        let stored = cc.storage
            .and_then(|s| eframe::get_value::<AppStorage>(s, eframe::APP_KEY))
            .unwrap_or_default();
        let selected = stored
            .selected_profile
            .and_then(|name| profile::find(&profiles, &name).cloned())
            .unwrap_or_else(|| config.active_profile());

        let worker = MediaWorker::new(config.staging_dir());
        log::info!("[app] staging dir {}", worker.staging_dir().display());

        let (player_tx, player_rx) = crossbeam_channel::unbounded();
        let collab = Collaborators {
            picker:    Box::new(RfdPicker::default()),
            stager:    Box::new(worker.clone()),
            session:   Box::new(worker.clone()),
            inspector: Box::new(worker.clone()),
            player:    Box::new(QueuedPlayer::new(player_tx)),
        };

        Self {
            controller:   Controller::new(collab, selected),
            worker,
            profiles,
            player:       PlayerWindow::default(),
            player_rx,
            pending_cmds: Vec::new(),
        }
    }

    fn process_command(&mut self, cmd: UiCommand) {
        match cmd {
            // ── Controller ───────────────────────────────────────────────────
            UiCommand::SelectVideo => {
                if let Err(e) = self.controller.select_video() {
                    log::warn!("[app] {e}");
                }
            }
            UiCommand::PlayCompressedVideo => {
                if !self.controller.play_compressed_video() {
                    log::debug!("[app] nothing to play yet");
                }
            }
            UiCommand::SetProfile(name) => {
                match profile::find(&self.profiles, &name) {
                    Some(p) => {
                        if let Err(e) = self.controller.set_profile(p.clone()) {
                            log::warn!("[app] {e}");
                        }
                    }
                    None => log::warn!("[app] unknown profile '{name}'"),
                }
            }

            // ── Player window ────────────────────────────────────────────────
            UiCommand::OpenPlayer(path) => {
                self.player.open(&self.worker, path);
            }
            UiCommand::ClosePlayer => {
                self.player.close(&self.worker);
            }
        }
    }

    fn top_bar(&mut self, ui: &mut egui::Ui, busy: bool) {
        ui.horizontal_centered(|ui| {
            ui.label(egui::RichText::new("ClipSqueeze").strong().size(15.0).color(ACCENT));
            ui.separator();
            ui.label(egui::RichText::new("Profile").size(12.0).color(DARK_TEXT_DIM));

            let current = self.controller.profile();
            let cmds = &mut self.pending_cmds;
            ui.add_enabled_ui(!busy, |ui| {
                egui::ComboBox::from_id_salt("profile_combo")
                    .selected_text(current.label.as_str())
                    .show_ui(ui, |ui| {
                        for p in &self.profiles {
                            let selected = p.name == current.name;
                            if ui.selectable_label(selected, p.label.as_str()).clicked() && !selected {
                                cmds.push(UiCommand::SetProfile(p.name.clone()));
                            }
                        }
                    });
            });
        });
    }

    fn main_view(&mut self, ui: &mut egui::Ui) {
        let aff = self.controller.affordances();

        ui.vertical_centered(|ui| {
            ui.add_space(24.0);

            if aff.spinner_visible {
                if aff.spinner_animating {
                    ui.add(egui::Spinner::new().size(36.0));
                }
                if let Some(p) = aff.progress {
                    ui.add_space(8.0);
                    ui.add(egui::ProgressBar::new(p).desired_width(240.0).show_percentage());
                }
            }

            if aff.select_visible && ui.button("Select video").clicked() {
                self.pending_cmds.push(UiCommand::SelectVideo);
            }
            if aff.play_visible && ui.button("▶ Play").clicked() {
                self.pending_cmds.push(UiCommand::PlayCompressedVideo);
            }

            if !aff.message.is_empty() {
                ui.add_space(12.0);
                ui.label(
                    egui::RichText::new(report_for_display(&aff.message))
                        .monospace()
                        .color(message_color(self.controller.state())),
                );
            }
        });
    }
}

// ── eframe::App ───────────────────────────────────────────────────────────────

impl eframe::App for ClipSqueezeApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let stored = AppStorage { selected_profile: Some(self.controller.profile().name.clone()) };
        eframe::set_value(storage, eframe::APP_KEY, &stored);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if self.controller.is_export_in_flight() {
            log::info!("[app] exit with an export in flight; cancelling");
        }
        self.player.close(&self.worker);
        self.worker.shutdown();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ── Collaborator replies, then playback frames ────────────────────────
        self.controller.poll();
        self.player.poll(&self.worker, ctx);

        let busy = self.controller.state().is_loading();

        egui::TopBottomPanel::top("top_panel")
            .exact_height(36.0)
            .show(ctx, |ui| self.top_bar(ui, busy));

        egui::CentralPanel::default().show(ctx, |ui| self.main_view(ui));

        self.player.ui(ctx, &mut self.pending_cmds);

        // ── Process commands emitted this frame ───────────────────────────────
        let cmds: Vec<UiCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            self.process_command(cmd);
        }
        // QueuedPlayer only fires from inside process_command.
        while let Ok(cmd) = self.player_rx.try_recv() {
            self.process_command(cmd);
        }

        if self.controller.state().is_loading() {
            ctx.request_repaint_after(LOADING_POLL);
        }
    }
}
