// crates/clipsqueeze-core/src/commands.rs
//
// Every user action in ClipSqueeze is expressed as a UiCommand.
// Widgets push these during the frame; app.rs processes them after the UI pass
// so the controller is never borrowed while egui is drawing.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    // ── Controller ───────────────────────────────────────────────────────────
    /// "Select video" button.
    SelectVideo,
    /// "Play" button. A no-op until an export has completed.
    PlayCompressedVideo,
    /// Profile combo box. Carries the profile name.
    SetProfile(String),

    // ── Player window ────────────────────────────────────────────────────────
    /// Sent by the player collaborator; opens the window and starts decoding.
    OpenPlayer(PathBuf),
    /// Window closed or playback reached the end.
    ClosePlayer,
}
