// crates/clipsqueeze-ui/src/helpers/format.rs
//
// UI-layer string utilities that don't belong in clipsqueeze-core.
//
// Report building lives in clipsqueeze_core::report and time formatting in
// clipsqueeze_core::helpers::time. This module only adapts strings for
// drawing.

use std::path::Path;

/// The report separates lines with '\r'; egui breaks lines on '\n' only.
pub fn report_for_display(message: &str) -> String {
    message.replace("\r\n", "\n").replace('\r', "\n")
}

/// Truncates `text` to fit within `max_px` using a per-character width
/// heuristic (≈ 7 px/char at the body font size). Appends "…" when
/// truncated. Avoids egui font measurement, which requires `&mut Fonts`.
pub fn fit_label(text: &str, max_px: f32) -> String {
    const AVG_CHAR_PX: f32 = 7.0;
    const ELLIPSIS: &str = "…";
    let max_chars = (max_px / AVG_CHAR_PX).max(0.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    // Reserve one slot for the ellipsis itself.
    let keep = max_chars.saturating_sub(1);
    text.chars().take(keep).collect::<String>() + ELLIPSIS
}

/// File name for titles and status lines.
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
