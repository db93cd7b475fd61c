// crates/clipsqueeze-ui/src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod helpers;
mod picker;
mod player;
mod theme;

use clipsqueeze_core::config::load_config;
use clipsqueeze_core::helpers::paths::default_config_path;

fn main() -> eframe::Result {
    helpers::log::init_logging();

    if let Err(e) = ffmpeg_the_third::init() {
        log::error!("[app] FFmpeg init failed: {e}");
        std::process::exit(1);
    }

    let config_path = default_config_path();
    let config = load_config(&config_path);
    // First run: leave a config.json next to the app data for hand edits.
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            log::warn!("[config] {e}");
        }
    }

    let native_options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_title("ClipSqueeze")
            .with_inner_size([520.0, 460.0])
            .with_min_inner_size([380.0, 320.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "ClipSqueeze",
        native_options,
        Box::new(|cc| Ok(Box::new(app::ClipSqueezeApp::new(cc, config)))),
    )
}
