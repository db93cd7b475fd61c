// crates/clipsqueeze-core/src/helpers/time.rs
//
// Human-readable durations for the player window and the export log.

/// Format a duration in seconds as a compact human-readable string.
///
/// | Range         | Format       | Example   |
/// |---------------|--------------|-----------|
/// | ≥ 3600 s      | `H:MM:SS`    | `1:04:35` |
/// | ≥ 60 s        | `M:SS`       | `3:07`    |
/// | < 60 s        | `S.Xs`       | `4.2s`    |
///
/// ```
/// use clipsqueeze_core::helpers::time::format_duration;
/// assert_eq!(format_duration(4.2),    "4.2s");
/// assert_eq!(format_duration(187.0),  "3:07");
/// assert_eq!(format_duration(3875.0), "1:04:35");
/// ```
pub fn format_duration(secs: f64) -> String {
    let secs = secs.max(0.0);
    if secs >= 3600.0 {
        format!(
            "{}:{:02}:{:02}",
            secs as u64 / 3600,
            (secs as u64 % 3600) / 60,
            secs as u64 % 60,
        )
    } else if secs >= 60.0 {
        format!("{}:{:02}", secs as u64 / 60, secs as u64 % 60)
    } else {
        format!("{secs:.1}s")
    }
}

/// Playback clock as `M:SS`, regardless of length.
///
/// ```
/// use clipsqueeze_core::helpers::time::format_clock;
/// assert_eq!(format_clock(0.0),   "0:00");
/// assert_eq!(format_clock(65.9),  "1:05");
/// assert_eq!(format_clock(3725.0), "62:05");
/// ```
pub fn format_clock(secs: f64) -> String {
    let s = secs.max(0.0) as u64;
    format!("{}:{:02}", s / 60, s % 60)
}

/// Expected frame count for a clip, never zero.
pub fn frame_count(duration_secs: f64, fps: f64) -> u64 {
    ((duration_secs * fps).ceil() as u64).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_durations_clamp() {
        assert_eq!(format_duration(-3.0), "0.0s");
        assert_eq!(format_clock(-1.0), "0:00");
    }

    #[test]
    fn frame_count_rounds_up() {
        assert_eq!(frame_count(10.0, 30.0), 300);
        assert_eq!(frame_count(0.01, 30.0), 1);
        assert_eq!(frame_count(0.0, 30.0), 1);
    }
}
