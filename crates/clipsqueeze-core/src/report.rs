// crates/clipsqueeze-core/src/report.rs
//
// Before/after report shown in the label when an export completes.
//
// Lines are separated by '\r'; an empty line ("\r\r") separates the original
// block from the compressed block. The UI swaps '\r' for '\n' at draw time.

use std::fmt::Write;

use crate::media_types::MediaStats;
use crate::profile::ReportDetail;

pub const LINE_SEP: char = '\r';

/// Round to `places` decimal places, half away from zero.
pub fn round_to(value: f64, places: u32) -> f64 {
    let divisor = 10f64.powi(places as i32);
    (value * divisor).round() / divisor
}

/// Bytes as mebibytes, rounded to 3 places.
pub fn megabytes(bytes: u64) -> f64 {
    round_to(bytes as f64 / 1024.0 / 1024.0, 3)
}

fn block(out: &mut String, label: &str, s: &MediaStats, detail: ReportDetail) {
    let sep = LINE_SEP;
    let _ = write!(out, "{label} mbs: {}{sep}", megabytes(s.bytes));
    let _ = write!(out, "{label} bytes: {}{sep}", s.bytes);
    let _ = write!(out, "{label} wxh: {}x{}", s.width, s.height);
    if detail == ReportDetail::Detailed {
        let _ = write!(out, "{sep}{label} bitrate: {}", s.bitrate);
        let _ = write!(out, "{sep}{label} frame rate: {}", round_to(s.frame_rate, 2));
    }
}

/// Build the multi-line report for an original/compressed pair.
pub fn format_report(original: &MediaStats, compressed: &MediaStats, detail: ReportDetail) -> String {
    let mut out = String::with_capacity(256);
    block(&mut out, "Original", original, detail);
    out.push(LINE_SEP);
    out.push(LINE_SEP);
    block(&mut out, "Compressed", compressed, detail);
    out
}

/// Percentage saved relative to the original, for the log.
pub fn savings_percent(original: &MediaStats, compressed: &MediaStats) -> f64 {
    if original.bytes == 0 {
        return 0.0;
    }
    round_to(
        (1.0 - compressed.bytes as f64 / original.bytes as f64) * 100.0,
        1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(bytes: u64, w: u32, h: u32) -> MediaStats {
        MediaStats {
            bytes,
            width:         w,
            height:        h,
            bitrate:       1_000_000,
            frame_rate:    29.970_03,
            duration_secs: 10.0,
        }
    }

    #[test]
    fn megabytes_rounds_to_three_places() {
        assert_eq!(megabytes(1_048_576), 1.0);
        assert_eq!(megabytes(1_500_000), 1.431);
        assert_eq!(megabytes(0), 0.0);
    }

    #[test]
    fn detailed_report_layout() {
        let r = format_report(
            &stats(12_944_670, 1920, 1080),
            &stats(1_048_576, 320, 568),
            ReportDetail::Detailed,
        );
        let lines: Vec<&str> = r.split(LINE_SEP).collect();
        assert_eq!(lines[0], "Original mbs: 12.345");
        assert_eq!(lines[1], "Original bytes: 12944670");
        assert_eq!(lines[2], "Original wxh: 1920x1080");
        assert_eq!(lines[3], "Original bitrate: 1000000");
        assert_eq!(lines[4], "Original frame rate: 29.97");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "Compressed mbs: 1");
        assert_eq!(lines[8], "Compressed wxh: 320x568");
        assert_eq!(lines.len(), 11);
    }

    #[test]
    fn basic_report_omits_rates() {
        let r = format_report(&stats(2048, 640, 480), &stats(1024, 320, 240), ReportDetail::Basic);
        assert!(!r.contains("bitrate"));
        assert!(!r.contains("frame rate"));
        assert!(r.contains("Original bytes: 2048"));
        assert!(r.contains("Compressed bytes: 1024"));
        assert!(r.contains("640x480") && r.contains("320x240"));
        assert_eq!(r.split(LINE_SEP).count(), 7);
    }

    #[test]
    fn savings() {
        assert_eq!(savings_percent(&stats(1000, 1, 1), &stats(250, 1, 1)), 75.0);
        assert_eq!(savings_percent(&stats(0, 1, 1), &stats(250, 1, 1)), 0.0);
    }
}
