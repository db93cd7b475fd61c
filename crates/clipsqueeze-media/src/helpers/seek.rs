// crates/clipsqueeze-media/src/helpers/seek.rs
//
// Seek helper wrapping avformat seek with a soft-fail policy.
//
// `avformat_seek_file(max_ts=0)` returns EPERM on Windows for a freshly opened
// context, and some containers refuse random access entirely. The export
// filters decoded frames against its time window, so a failed seek only costs
// decode time.

use ffmpeg_the_third as ffmpeg;

/// Seek `ictx` to the keyframe at or before `target_secs` (absolute, including
/// the container's start_time).
///
/// Returns `true` if the seek succeeded or was skipped because the target is
/// the start of the file. Returns `false` (and logs) on failure; the demuxer
/// stays where it was.
pub fn seek_to_secs(
    ictx:        &mut ffmpeg::format::context::Input,
    target_secs: f64,
    label:       &str,
) -> bool {
    if target_secs <= 0.0 {
        return true;
    }

    let seek_ts = secs_to_av_time(target_secs);
    match ictx.seek(seek_ts, ..=seek_ts) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("[seek] soft-fail in {label} at {target_secs:.3}s: {e}; decoding from current position");
            false
        }
    }
}

/// Seconds → AV_TIME_BASE units.
pub fn secs_to_av_time(secs: f64) -> i64 {
    (secs * ffmpeg::ffi::AV_TIME_BASE as f64) as i64
}
