// crates/clipsqueeze-media/src/probe.rs
//
// In-process FFmpeg probing for the before/after report: byte size,
// dimensions, bitrate, frame rate and duration of one file.

use std::path::Path;

use anyhow::{anyhow, Context, Result};

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::media::Type;
use ffmpeg::util::rational::Rational;

use clipsqueeze_core::media_types::MediaStats;

/// Read `path`'s size from the filesystem and its stream info from FFmpeg.
pub fn probe_stats(path: &Path) -> Result<MediaStats> {
    let bytes = std::fs::metadata(path)
        .with_context(|| format!("stat '{}'", path.display()))?
        .len();

    let ictx = input(path).with_context(|| format!("open '{}'", path.display()))?;
    let stream = ictx
        .streams()
        .best(Type::Video)
        .ok_or_else(|| anyhow!("no video stream in '{}'", path.display()))?;

    let (width, height, stream_bps) = unsafe {
        let p = stream.parameters().as_ptr();
        ((*p).width.max(0) as u32, (*p).height.max(0) as u32, (*p).bit_rate)
    };
    if width == 0 || height == 0 {
        return Err(anyhow!("video stream in '{}' has no dimensions", path.display()));
    }

    let duration_secs = container_duration(&ictx)
        .or_else(|| {
            let tb = stream.time_base();
            let d = stream.duration() as f64 * f64::from(tb);
            (d > 0.0).then_some(d)
        })
        .unwrap_or(0.0);

    let frame_rate = rate_to_f64(stream.avg_frame_rate())
        .or_else(|| rate_to_f64(stream.rate()))
        .unwrap_or(0.0);

    let bitrate = estimate_bitrate(stream_bps, ictx.bit_rate(), bytes, duration_secs);

    log::info!(
        "[probe] {}: {bytes} bytes, {width}x{height}, {bitrate} bps, {frame_rate:.2} fps, {duration_secs:.2}s",
        path.display(),
    );
    Ok(MediaStats { bytes, width, height, bitrate, frame_rate, duration_secs })
}

fn container_duration(ictx: &ffmpeg::format::context::Input) -> Option<f64> {
    let d = ictx.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
    (d > 0.0).then_some(d)
}

fn rate_to_f64(r: Rational) -> Option<f64> {
    (r.numerator() > 0 && r.denominator() > 0).then(|| f64::from(r))
}

/// Video bitrate in bps: the stream's own figure, else the container's, else
/// derived from file size and duration. 0 when nothing is known.
pub fn estimate_bitrate(stream_bps: i64, container_bps: i64, bytes: u64, duration_secs: f64) -> u64 {
    if stream_bps > 0 {
        return stream_bps as u64;
    }
    if container_bps > 0 {
        return container_bps as u64;
    }
    if duration_secs > 0.0 {
        return (bytes as f64 * 8.0 / duration_secs).round() as u64;
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_bitrate_wins() {
        assert_eq!(estimate_bitrate(800_000, 900_000, 10, 1.0), 800_000);
    }

    #[test]
    fn container_bitrate_is_second_choice() {
        assert_eq!(estimate_bitrate(0, 900_000, 10, 1.0), 900_000);
    }

    #[test]
    fn size_over_duration_is_last_resort() {
        assert_eq!(estimate_bitrate(0, 0, 1_000_000, 8.0), 1_000_000);
        assert_eq!(estimate_bitrate(0, 0, 1_000_000, 0.0), 0);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(probe_stats(Path::new("/definitely/not/here.mp4")).is_err());
    }

    #[test]
    fn non_media_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.mp4");
        std::fs::write(&path, b"plain text, not a container").unwrap();
        assert!(probe_stats(&path).is_err());
    }
}
