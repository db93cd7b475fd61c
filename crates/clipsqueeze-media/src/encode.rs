// crates/clipsqueeze-media/src/encode.rs
//
// Single-file H.264 + AAC MP4 export.
//
// Design:
//   • `export_file()`: blocking function meant to run on its own thread;
//     called from MediaWorker::export_async. Sends ExportProgress every
//     PROGRESS_INTERVAL frames and exactly one ExportFinished on exit.
//   • Everything the encoder needs comes from the request's ExportSettings;
//     nothing here is profile-specific.
//
// Stream layout in the output MP4:
//   Stream 0: H.264 video (YUV420P, width × height, average video_bitrate)
//   Stream 1: AAC audio (FLTP, sample_rate, 1 or 2 channels), only when the
//             source has an audio stream
//
// PTS strategy:
//   Video: frame counter in 1/fps, where fps is the source's average frame
//          rate (30 when unknown). The output is constant frame rate.
//   Audio: sample counter in 1/sample_rate.
//   Both start at zero regardless of the requested time range.
//
// Time range:
//   Decoded PTS are absolute, so they are shifted by the container's
//   start_time before being compared with the window. A full range has no
//   lower bound; edit-list frames slightly before the origin are kept.
//
// Cancellation:
//   `cancel` is checked once per demuxed packet. A cancelled export finishes
//   with ExportStatus::Cancelled, never Failed.

use std::sync::{Arc, atomic::{AtomicBool, Ordering}};

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::Sender;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::codec::{self, Id as CodecId};
use ffmpeg::encoder;
use ffmpeg::format::{Pixel, Sample, input as open_input, output as open_output};
use ffmpeg::format::sample::Type as SampleType;
use ffmpeg::media::Type as MediaType;
use ffmpeg::software::scaling::{Context as ScaleCtx, Flags as ScaleFlags};
use ffmpeg::software::resampling;
use ffmpeg::util::channel_layout::{ChannelLayout, ChannelLayoutMask};
use ffmpeg::util::frame::video::Video as VideoFrame;
use ffmpeg::util::frame::audio::Audio as AudioFrame;
use ffmpeg::util::rational::Rational;
use ffmpeg::Packet;

use clipsqueeze_core::helpers::time::frame_count;
use clipsqueeze_core::media_types::{ExportRequest, ExportResult, MediaResult, TimeRange};
use clipsqueeze_core::profile::{AudioCodec, VideoCodec};

use crate::fifo::AudioFifo;
use crate::helpers::seek::seek_to_secs;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Send a progress update every this many encoded video frames.
pub const PROGRESS_INTERVAL: u64 = 15;

/// Output frame rate when the source doesn't declare a usable one.
const FALLBACK_FPS: i32 = 30;

/// Audio frames this far before the window start are still kept.
const AUDIO_SLACK: f64 = 0.05;

/// Capacity of each frame pulled out of the resampler at EOF.
const RESAMPLER_FLUSH_SAMPLES: usize = 4096;

/// AV_NOPTS_VALUE.
const NO_PTS: i64 = i64::MIN;

/// Marker error: the cancel flag was observed.
#[derive(Debug, thiserror::Error)]
#[error("cancelled")]
pub struct Cancelled;

// ── Public entry point ────────────────────────────────────────────────────────

/// Export `request` to disk. Blocking; run this on a dedicated thread.
pub fn export_file(request: ExportRequest, cancel: Arc<AtomicBool>, tx: Sender<MediaResult>) {
    log::info!(
        "[export] job {} start: {} → {} ({}x{} @ {} bps)",
        request.job_id,
        request.source.display(),
        request.output.display(),
        request.settings.width,
        request.settings.height,
        request.settings.video_bitrate,
    );

    let result = match run_export(&request, &cancel, &tx) {
        Ok(frames) => {
            log::info!("[export] job {} wrote {frames} frames", request.job_id);
            ExportResult::completed(&request)
        }
        Err(e) if e.is::<Cancelled>() => ExportResult::cancelled(&request),
        Err(e) => {
            log::warn!("[export] job {} failed: {e:#}", request.job_id);
            ExportResult::failed(&request, format!("{e:#}"))
        }
    };
    let _ = tx.send(MediaResult::ExportFinished(result));
}

// ── Pure helpers ──────────────────────────────────────────────────────────────

/// Source average frame rate, or FALLBACK_FPS when it is missing or absurd.
pub fn output_frame_rate(avg: Rational) -> Rational {
    let (num, den) = (avg.numerator(), avg.denominator());
    if num > 0 && den > 0 && (num as f64 / den as f64) <= 240.0 {
        avg
    } else {
        Rational::new(FALLBACK_FPS, 1)
    }
}

/// `[start, end)` in source seconds. `end` is infinite when neither the range
/// nor the container gives a bound.
pub fn export_window(range: &TimeRange, source_secs: f64) -> (f64, f64) {
    let start = range.start_secs.max(0.0);
    let source_end = if source_secs > 0.0 { source_secs } else { f64::INFINITY };
    let end = range.end_secs().map_or(source_end, |e| e.min(source_end));
    (start, end.max(start))
}

/// Container start_time (AV_TIME_BASE units) in seconds, 0 when unset.
pub fn container_origin(start_time: i64) -> f64 {
    if start_time == NO_PTS {
        0.0
    } else {
        start_time as f64 / ffmpeg::ffi::AV_TIME_BASE as f64
    }
}

/// Where a frame falls relative to the export window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowPos {
    Before,
    Inside,
    After,
}

/// `rel_secs` is the frame's PTS minus the container origin. With `start`
/// at zero nothing counts as before the window.
pub fn window_pos(rel_secs: f64, start: f64, end: f64, slack: f64) -> WindowPos {
    if start > 0.0 && rel_secs < start - slack {
        WindowPos::Before
    } else if rel_secs >= end {
        WindowPos::After
    } else {
        WindowPos::Inside
    }
}

pub fn video_codec_id(codec: VideoCodec) -> CodecId {
    match codec {
        VideoCodec::H264 => CodecId::H264,
    }
}

pub fn audio_codec_id(codec: AudioCodec) -> CodecId {
    match codec {
        AudioCodec::Aac => CodecId::AAC,
    }
}

/// Frames the progress bar should expect for the window.
pub fn expected_frames(start: f64, end: f64, fps: Rational) -> u64 {
    if !end.is_finite() {
        return 1;
    }
    frame_count(end - start, f64::from(fps))
}

fn layout_for(channels: u16) -> ChannelLayout<'static> {
    if channels == 1 { ChannelLayout::MONO } else { ChannelLayout::STEREO }
}

fn mask_for(channels: u16) -> ChannelLayoutMask {
    if channels == 1 { ChannelLayoutMask::MONO } else { ChannelLayoutMask::STEREO }
}

/// Copy an opened encoder's parameters into output stream `idx`.
/// encoder::{Video, Audio} don't implement AsPtr<AVCodecParameters>.
pub(crate) fn copy_encoder_params(
    octx: &mut ffmpeg::format::context::Output,
    idx:  usize,
    enc:  &codec::Context,
) -> Result<()> {
    if octx.stream(idx).is_none() {
        return Err(anyhow!("no output stream {idx}"));
    }
    let ret = unsafe {
        ffmpeg::ffi::avcodec_parameters_from_context(
            (**(*octx.as_mut_ptr()).streams.add(idx)).codecpar,
            enc.as_ptr() as *mut ffmpeg::ffi::AVCodecContext,
        )
    };
    if ret < 0 {
        return Err(anyhow!("avcodec_parameters_from_context (stream {idx}) failed: {ret}"));
    }
    Ok(())
}

fn check_cancel(cancel: &AtomicBool) -> Result<()> {
    if cancel.load(Ordering::Relaxed) {
        return Err(Cancelled.into());
    }
    Ok(())
}

// ── Audio encoder state ───────────────────────────────────────────────────────

struct AudioEncState {
    encoder:        ffmpeg::encoder::Audio,
    stream_idx:     usize,
    /// Next output frame's PTS in samples.
    out_sample_idx: i64,
    /// AAC frame size in samples (typically 1024).
    frame_size:     usize,
    fifo:           AudioFifo,
    /// 1/sample_rate.
    audio_tb:       Rational,
    /// Muxer-assigned timebase, known after write_header.
    ost_audio_tb:   Rational,
}

impl AudioEncState {
    /// Drain buffered samples → encode → write interleaved to `octx`.
    /// With `flush` the partial tail is zero-padded and sent too.
    fn drain_fifo(&mut self, octx: &mut ffmpeg::format::context::Output, flush: bool) -> Result<()> {
        while self.fifo.len() >= self.frame_size || (flush && !self.fifo.is_empty()) {
            let frame = self.fifo.pop_frame(self.frame_size, self.out_sample_idx);
            self.out_sample_idx += self.frame_size as i64;
            self.encoder.send_frame(&frame).context("send audio frame to encoder")?;
            self.drain_packets(octx)?;
        }
        Ok(())
    }

    fn drain_packets(&mut self, octx: &mut ffmpeg::format::context::Output) -> Result<()> {
        let mut pkt = Packet::empty();
        while self.encoder.receive_packet(&mut pkt).is_ok() {
            pkt.set_stream(self.stream_idx);
            pkt.rescale_ts(self.audio_tb, self.ost_audio_tb);
            pkt.write_interleaved(octx).context("write audio packet")?;
        }
        Ok(())
    }

    fn flush_encoder(&mut self, octx: &mut ffmpeg::format::context::Output) -> Result<()> {
        self.encoder.send_eof().context("send EOF to audio encoder")?;
        self.drain_packets(octx)
    }
}

/// Converts decoded audio to the FIFO's FLTP layout and rate. Built lazily
/// from the first frame that needs it.
struct Resampler {
    ctx:      Option<resampling::Context>,
    channels: u16,
    rate:     u32,
}

impl Resampler {
    fn new(channels: u16, rate: u32) -> Self {
        Self { ctx: None, channels, rate }
    }

    /// Convert `raw` and append it to `fifo`.
    fn push(&mut self, raw: &AudioFrame, fifo: &mut AudioFifo) -> Result<()> {
        let target_fmt = Sample::F32(SampleType::Planar);
        let needs_resample = raw.format() != target_fmt
            || raw.rate() != self.rate
            || raw.ch_layout().channels() as u16 != self.channels;

        if !needs_resample {
            fifo.push(raw);
            return Ok(());
        }

        if self.ctx.is_none() {
            let src_layout = if raw.ch_layout().channels() >= 2 { raw.ch_layout() } else { ChannelLayout::MONO };
            self.ctx = Some(
                resampling::Context::get2(
                    raw.format(), src_layout,                 raw.rate(),
                    target_fmt,   layout_for(self.channels),  self.rate,
                )
                .context("create audio resampler")?,
            );
        }
        let Some(rs) = self.ctx.as_mut() else { return Ok(()) };

        let mut resampled = AudioFrame::empty();
        if rs.run(raw, &mut resampled).is_ok() && resampled.samples() > 0 {
            fifo.push(&resampled);
        }
        Ok(())
    }

    /// Move samples the resampler is still holding into `fifo`. Call once,
    /// after the decoder is drained.
    fn flush(&mut self, fifo: &mut AudioFifo) -> Result<()> {
        let Some(rs) = self.ctx.as_mut() else { return Ok(()) };
        // Bounded: a rate conversion buffers far less than this many frames.
        for _ in 0..8 {
            let mut tail = AudioFrame::new(
                Sample::F32(SampleType::Planar),
                RESAMPLER_FLUSH_SAMPLES,
                mask_for(self.channels),
            );
            tail.set_rate(self.rate);
            rs.flush(&mut tail).context("flush audio resampler")?;
            if tail.samples() == 0 {
                break;
            }
            fifo.push(&tail);
        }
        Ok(())
    }
}

/// Decoder + resampler for the source's audio stream.
struct AudioInput {
    decoder:   ffmpeg::decoder::audio::Audio,
    stream:    usize,
    tb:        Rational,
    resampler: Resampler,
}

// ── Internal implementation ───────────────────────────────────────────────────

/// Returns the number of video frames written.
fn run_export(request: &ExportRequest, cancel: &AtomicBool, tx: &Sender<MediaResult>) -> Result<u64> {
    let settings = &request.settings;
    settings.validate()?;
    check_cancel(cancel)?;

    // ── Input ─────────────────────────────────────────────────────────────────
    let mut ictx = open_input(&request.source)
        .with_context(|| format!("open '{}'", request.source.display()))?;

    let (video_idx, in_video_tb, avg_rate, mut video_decoder) = {
        let stream = ictx
            .streams()
            .best(MediaType::Video)
            .ok_or_else(|| anyhow!("no video stream in '{}'", request.source.display()))?;
        let decoder = codec::context::Context::from_parameters(stream.parameters())
            .context("video decoder context")?
            .decoder()
            .video()
            .context("open video decoder")?;
        (stream.index(), stream.time_base(), stream.avg_frame_rate(), decoder)
    };

    // Audio is optional; a silent source gives a video-only MP4.
    let mut audio_in: Option<AudioInput> = None;
    if let Some(ast) = ictx.streams().best(MediaType::Audio) {
        let (stream, tb) = (ast.index(), ast.time_base());
        match codec::context::Context::from_parameters(ast.parameters()).and_then(|c| c.decoder().audio()) {
            Ok(decoder) => {
                let resampler = Resampler::new(settings.channels, settings.sample_rate);
                audio_in = Some(AudioInput { decoder, stream, tb, resampler });
            }
            Err(e)      => log::warn!("[export] audio decoder open failed, exporting video only: {e}"),
        }
    }

    let source_secs = ictx.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
    let origin      = container_origin(unsafe { (*ictx.as_ptr()).start_time });
    let fps         = output_frame_rate(avg_rate);
    let frame_tb    = fps.invert();
    let (start, end) = export_window(&request.time_range, source_secs);
    let total_frames = expected_frames(start, end, fps);

    if start > 0.0 {
        seek_to_secs(&mut ictx, origin + start, "export");
    }

    // ── Output ────────────────────────────────────────────────────────────────
    let mut octx = open_output(&request.output)
        .with_context(|| format!("could not open output '{}'", request.output.display()))?;

    let video_id = video_codec_id(settings.video_codec);
    let vcodec = encoder::find(video_id)
        .ok_or_else(|| anyhow!("{video_id:?} encoder not found; is libx264 available?"))?;

    let mut ost_video = octx.add_stream(vcodec).context("add video stream")?;
    ost_video.set_time_base(frame_tb);

    let mut video_enc = codec::context::Context::new_with_codec(vcodec)
        .encoder()
        .video()
        .context("create video encoder context")?;
    video_enc.set_width(settings.width);
    video_enc.set_height(settings.height);
    video_enc.set_format(Pixel::YUV420P);
    video_enc.set_time_base(frame_tb);
    video_enc.set_frame_rate(Some(fps));
    video_enc.set_bit_rate(settings.video_bitrate as usize);
    video_enc.set_max_bit_rate(settings.video_bitrate as usize);

    let mut opts = ffmpeg::Dictionary::new();
    opts.set("preset", "fast");

    let mut video_encoder = video_enc.open_as_with(vcodec, opts).context("open video encoder")?;
    // libavcodec resets the SAR while opening; set it on the opened context.
    video_encoder.set_aspect_ratio(Rational::new(1, 1));
    copy_encoder_params(&mut octx, 0, &video_encoder)?;

    let mut audio_state: Option<AudioEncState> = None;
    if audio_in.is_some() {
        let audio_tb = Rational::new(1, settings.sample_rate as i32);
        let audio_id = audio_codec_id(settings.audio_codec);
        let acodec = encoder::find(audio_id).ok_or_else(|| anyhow!("{audio_id:?} encoder not found"))?;

        let mut ost_audio = octx.add_stream(acodec).context("add audio stream")?;
        ost_audio.set_time_base(audio_tb);
        let stream_idx = ost_audio.index();

        let mut audio_enc = codec::context::Context::new_with_codec(acodec)
            .encoder()
            .audio()
            .context("create audio encoder context")?;
        audio_enc.set_rate(settings.sample_rate as i32);
        audio_enc.set_ch_layout(layout_for(settings.channels));
        audio_enc.set_format(Sample::F32(SampleType::Planar));
        audio_enc.set_bit_rate(settings.audio_bitrate as usize);

        let audio_encoder = audio_enc
            .open_as_with(acodec, ffmpeg::Dictionary::new())
            .context("open audio encoder")?;
        let frame_size = (audio_encoder.frame_size() as usize).max(1024);
        copy_encoder_params(&mut octx, stream_idx, &audio_encoder)?;

        audio_state = Some(AudioEncState {
            encoder:        audio_encoder,
            stream_idx,
            out_sample_idx: 0,
            frame_size,
            fifo:           AudioFifo::new(settings.channels, settings.sample_rate),
            audio_tb,
            ost_audio_tb:   audio_tb,
        });
    }

    // ── Header ────────────────────────────────────────────────────────────────
    let mut header_opts = ffmpeg::Dictionary::new();
    if settings.optimize_for_network {
        header_opts.set("movflags", "faststart");
    }
    octx.write_header_with(header_opts).context("write output header")?;

    let ost_video_tb = octx.stream(0).ok_or_else(|| anyhow!("video stream vanished"))?.time_base();
    if let Some(state) = audio_state.as_mut() {
        state.ost_audio_tb = octx
            .stream(state.stream_idx)
            .ok_or_else(|| anyhow!("audio stream vanished"))?
            .time_base();
    }

    // ── Packet loop ───────────────────────────────────────────────────────────
    let mut video_scaler: Option<ScaleCtx> = None;
    let mut out_frame_idx: i64 = 0;
    let half_frame = 0.5 / f64::from(fps);

    // Scale + encode one decoded frame. Returns false once past the window.
    let mut encode_video = |decoded: &VideoFrame,
                            scaler: &mut Option<ScaleCtx>,
                            octx: &mut ffmpeg::format::context::Output,
                            out_frame_idx: &mut i64|
     -> Result<bool> {
        let rel = decoded.pts().map_or(0.0, |p| p as f64 * f64::from(in_video_tb) - origin);
        match window_pos(rel, start, end, half_frame) {
            WindowPos::Before => return Ok(true),
            WindowPos::After  => return Ok(false),
            WindowPos::Inside => {}
        }

        if scaler.is_none() {
            *scaler = Some(
                ScaleCtx::get(
                    decoded.format(), decoded.width(), decoded.height(),
                    Pixel::YUV420P,   settings.width,  settings.height,
                    ScaleFlags::BILINEAR,
                )
                .context("create swscale context")?,
            );
        }
        let Some(sc) = scaler.as_mut() else { return Ok(true) };

        let mut yuv = VideoFrame::empty();
        sc.run(decoded, &mut yuv).context("scale video frame")?;
        yuv.set_pts(Some(*out_frame_idx));
        yuv.set_kind(decoded.kind());
        unsafe {
            (*yuv.as_mut_ptr()).sample_aspect_ratio = ffmpeg::ffi::AVRational { num: 1, den: 1 };
        }

        video_encoder.send_frame(&yuv).context("send video frame to encoder")?;
        let mut pkt = Packet::empty();
        while video_encoder.receive_packet(&mut pkt).is_ok() {
            pkt.set_stream(0);
            pkt.rescale_ts(frame_tb, ost_video_tb);
            pkt.write_interleaved(octx).context("write video packet")?;
        }

        *out_frame_idx += 1;
        if *out_frame_idx as u64 % PROGRESS_INTERVAL == 0 {
            let _ = tx.send(MediaResult::ExportProgress {
                job_id:       request.job_id,
                frame:        (*out_frame_idx as u64).min(total_frames),
                total_frames,
            });
        }
        Ok(true)
    };

    'packet_loop: for result in ictx.packets() {
        let (stream, packet) = result.context("read packet")?;
        check_cancel(cancel)?;

        let sidx = stream.index();
        if sidx == video_idx {
            video_decoder.send_packet(&packet).context("send video packet to decoder")?;
            let mut decoded = VideoFrame::empty();
            while video_decoder.receive_frame(&mut decoded).is_ok() {
                if !encode_video(&decoded, &mut video_scaler, &mut octx, &mut out_frame_idx)? {
                    break 'packet_loop;
                }
            }
        } else if let (Some(input), Some(state)) = (audio_in.as_mut(), audio_state.as_mut()) {
            if sidx != input.stream || input.decoder.send_packet(&packet).is_err() {
                continue;
            }
            let mut raw = AudioFrame::empty();
            while input.decoder.receive_frame(&mut raw).is_ok() {
                let rel = raw.pts().map_or(0.0, |p| p as f64 * f64::from(input.tb) - origin);
                if window_pos(rel, start, end, AUDIO_SLACK) != WindowPos::Inside {
                    continue;
                }
                input.resampler.push(&raw, &mut state.fifo)?;
                state.drain_fifo(&mut octx, false)?;
            }
        }
    }

    // ── Flush decoders ────────────────────────────────────────────────────────
    let _ = video_decoder.send_eof();
    let mut decoded = VideoFrame::empty();
    while video_decoder.receive_frame(&mut decoded).is_ok() {
        if !encode_video(&decoded, &mut video_scaler, &mut octx, &mut out_frame_idx)? {
            break;
        }
    }
    drop(encode_video);

    if let (Some(input), Some(state)) = (audio_in.as_mut(), audio_state.as_mut()) {
        let _ = input.decoder.send_eof();
        let mut raw = AudioFrame::empty();
        while input.decoder.receive_frame(&mut raw).is_ok() {
            let rel = raw.pts().map_or(0.0, |p| p as f64 * f64::from(input.tb) - origin);
            if window_pos(rel, start, end, AUDIO_SLACK) == WindowPos::Inside {
                input.resampler.push(&raw, &mut state.fifo)?;
            }
        }
        input.resampler.flush(&mut state.fifo)?;
    }

    // ── Flush encoders ────────────────────────────────────────────────────────
    video_encoder.send_eof().context("send EOF to video encoder")?;
    let mut pkt = Packet::empty();
    while video_encoder.receive_packet(&mut pkt).is_ok() {
        pkt.set_stream(0);
        pkt.rescale_ts(frame_tb, ost_video_tb);
        pkt.write_interleaved(&mut octx).context("write flush video packet")?;
    }

    if let Some(state) = audio_state.as_mut() {
        state.drain_fifo(&mut octx, true)?;
        state.flush_encoder(&mut octx)?;
    }

    octx.write_trailer().context("write trailer")?;

    if out_frame_idx == 0 {
        return Err(anyhow!("no video frames in the requested range"));
    }
    Ok(out_frame_idx as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use clipsqueeze_core::media_types::ExportStatus;
    use clipsqueeze_core::profile::ExportProfile;

    use crate::probe::probe_stats;
    use crate::test_clip::{box_offset, has_h264_encoder, write_clip};

    #[test]
    fn frame_rate_falls_back_to_thirty() {
        assert_eq!(output_frame_rate(Rational::new(0, 1)), Rational::new(30, 1));
        assert_eq!(output_frame_rate(Rational::new(25, 0)), Rational::new(30, 1));
        assert_eq!(output_frame_rate(Rational::new(90_000, 1)), Rational::new(30, 1));
        assert_eq!(output_frame_rate(Rational::new(30_000, 1001)), Rational::new(30_000, 1001));
    }

    #[test]
    fn full_range_uses_container_duration() {
        assert_eq!(export_window(&TimeRange::full(), 12.5), (0.0, 12.5));
    }

    #[test]
    fn bounded_range_is_clamped_to_source() {
        let r = TimeRange { start_secs: 2.0, duration_secs: Some(100.0) };
        assert_eq!(export_window(&r, 10.0), (2.0, 10.0));
        let r = TimeRange { start_secs: 2.0, duration_secs: Some(3.0) };
        assert_eq!(export_window(&r, 10.0), (2.0, 5.0));
    }

    #[test]
    fn unknown_duration_is_unbounded() {
        let (start, end) = export_window(&TimeRange::full(), 0.0);
        assert_eq!(start, 0.0);
        assert!(end.is_infinite());
        assert_eq!(expected_frames(start, end, Rational::new(30, 1)), 1);
    }

    #[test]
    fn start_past_source_end_gives_empty_window() {
        let r = TimeRange { start_secs: 20.0, duration_secs: None };
        assert_eq!(export_window(&r, 10.0), (20.0, 20.0));
    }

    #[test]
    fn expected_frames_rounds_up() {
        assert_eq!(expected_frames(0.0, 10.0, Rational::new(30, 1)), 300);
        assert_eq!(expected_frames(0.0, 0.01, Rational::new(30, 1)), 1);
    }

    #[test]
    fn unset_start_time_is_zero_origin() {
        assert_eq!(container_origin(i64::MIN), 0.0);
        assert_eq!(container_origin(1_400_000), 1.4);
    }

    #[test]
    fn full_window_keeps_frames_of_offset_source() {
        // start_time 1.4s, duration 10s: absolute PTS run 1.4..11.4.
        let origin = container_origin(1_400_000);
        let (start, end) = export_window(&TimeRange::full(), 10.0);
        let last = 11.4 - 1.0 / 30.0;
        assert_eq!(window_pos(last - origin, start, end, 0.5 / 30.0), WindowPos::Inside);
        assert_eq!(window_pos(11.5 - origin, start, end, 0.5 / 30.0), WindowPos::After);
    }

    #[test]
    fn full_window_keeps_leading_negative_pts() {
        let (start, end) = export_window(&TimeRange::full(), 10.0);
        assert_eq!(window_pos(-0.1, start, end, 0.5 / 30.0), WindowPos::Inside);
    }

    #[test]
    fn bounded_window_drops_pre_roll() {
        let r = TimeRange { start_secs: 2.0, duration_secs: Some(1.0) };
        let (start, end) = export_window(&r, 10.0);
        assert_eq!(window_pos(1.0, start, end, 0.05), WindowPos::Before);
        assert_eq!(window_pos(1.96, start, end, 0.05), WindowPos::Inside);
        assert_eq!(window_pos(2.5, start, end, 0.05), WindowPos::Inside);
        assert_eq!(window_pos(3.0, start, end, 0.05), WindowPos::After);
    }

    #[test]
    fn resampler_flush_recovers_buffered_tail() {
        let _ = ffmpeg::init();
        let n = 4800;
        let mut src = AudioFrame::new(Sample::F32(SampleType::Planar), n, ChannelLayoutMask::MONO);
        src.set_rate(48_000);
        unsafe {
            let data = src.data_mut(0);
            std::slice::from_raw_parts_mut(data.as_mut_ptr() as *mut f32, n).fill(0.25);
        }

        let mut fifo = AudioFifo::new(1, 44_100);
        let mut rs = Resampler::new(1, 44_100);
        rs.push(&src, &mut fifo).unwrap();
        let before = fifo.len();
        rs.flush(&mut fifo).unwrap();

        // 0.1 s at 48 kHz is 4410 samples at 44.1 kHz.
        assert!(fifo.len() > before);
        assert!((4400..=4420).contains(&fifo.len()), "got {}", fifo.len());
    }

    #[test]
    fn settings_pick_the_encoders() {
        let s = ExportProfile::low_bandwidth().settings;
        assert_eq!(video_codec_id(s.video_codec), CodecId::H264);
        assert_eq!(audio_codec_id(s.audio_codec), CodecId::AAC);
    }

    #[test]
    fn silent_clip_exports_video_only_mp4_at_profile_size() {
        if !has_h264_encoder() {
            eprintln!("libx264 not available; skipping");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("clipsqueeze_src.mp4");
        write_clip(&source, 160, 120, 40).unwrap();

        let request = ExportRequest {
            job_id:     Uuid::new_v4(),
            source:     source.clone(),
            output:     dir.path().join("clipsqueeze_src_compressed.mp4"),
            settings:   ExportProfile::low_bandwidth().settings,
            time_range: TimeRange::full(),
        };
        let (tx, rx) = crossbeam_channel::unbounded();
        export_file(request.clone(), Arc::new(AtomicBool::new(false)), tx);

        let msgs: Vec<MediaResult> = rx.try_iter().collect();
        let progress: Vec<u64> = msgs
            .iter()
            .filter_map(|m| match m {
                MediaResult::ExportProgress { job_id, frame, .. } if *job_id == request.job_id => Some(*frame),
                _ => None,
            })
            .collect();
        let finished: Vec<&ExportResult> = msgs
            .iter()
            .filter_map(|m| match m {
                MediaResult::ExportFinished(r) => Some(r),
                _ => None,
            })
            .collect();

        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].status, ExportStatus::Completed, "{:?}", finished[0].error);
        assert_eq!(progress, vec![15, 30]);
        assert!(matches!(msgs.last(), Some(MediaResult::ExportFinished(_))));

        let stats = probe_stats(&request.output).unwrap();
        assert_eq!((stats.width, stats.height), (320, 568));

        let ictx = open_input(&request.output).unwrap();
        let video = ictx.streams().best(MediaType::Video).unwrap();
        assert_eq!(video.parameters().id(), CodecId::H264);
        assert!(ictx.streams().best(MediaType::Audio).is_none());

        // faststart puts the index ahead of the media data.
        let bytes = std::fs::read(&request.output).unwrap();
        let moov = box_offset(&bytes, b"moov").unwrap();
        let mdat = box_offset(&bytes, b"mdat").unwrap();
        assert!(moov < mdat);
    }

    #[test]
    fn missing_source_fails_once() {
        let dir = tempfile::tempdir().unwrap();
        let request = ExportRequest {
            job_id:     Uuid::new_v4(),
            source:     dir.path().join("absent.mov"),
            output:     dir.path().join("absent.mp4"),
            settings:   ExportProfile::low_bandwidth().settings,
            time_range: TimeRange::full(),
        };
        let (tx, rx) = crossbeam_channel::unbounded();
        let _ = ffmpeg::init();
        export_file(request, Arc::new(AtomicBool::new(false)), tx);

        let msgs: Vec<MediaResult> = rx.try_iter().collect();
        assert_eq!(msgs.len(), 1);
        assert!(matches!(&msgs[0], MediaResult::ExportFinished(r) if r.status == ExportStatus::Failed));
    }

    #[test]
    fn cancelled_marker_is_detectable_through_anyhow() {
        let e: anyhow::Error = Cancelled.into();
        assert!(e.is::<Cancelled>());
        let other = anyhow!("disk full");
        assert!(!other.is::<Cancelled>());
    }
}
