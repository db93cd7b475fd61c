// crates/clipsqueeze-media/src/test_clip.rs
//
// Synthetic source clips for pipeline tests. MPEG-4 Part 2 video, no audio;
// the encoder is built into libavcodec so no external library is needed.

use std::path::Path;

use anyhow::{anyhow, Context, Result};

use ffmpeg_the_third as ffmpeg;
use ffmpeg::codec::{self, Id as CodecId};
use ffmpeg::encoder;
use ffmpeg::format::{output as open_output, Pixel};
use ffmpeg::util::frame::video::Video as VideoFrame;
use ffmpeg::util::rational::Rational;
use ffmpeg::Packet;

use crate::encode::copy_encoder_params;

pub const CLIP_FPS: i32 = 30;

/// Write `frames` frames of a brightening grey ramp at `w`×`h`, 30 fps.
pub fn write_clip(path: &Path, w: u32, h: u32, frames: i64) -> Result<()> {
    ffmpeg::init().context("ffmpeg init")?;

    let mut octx = open_output(path).with_context(|| format!("open '{}'", path.display()))?;
    let mpeg4 = encoder::find(CodecId::MPEG4).ok_or_else(|| anyhow!("MPEG-4 encoder not found"))?;
    let tb = Rational::new(1, CLIP_FPS);

    let mut ost = octx.add_stream(mpeg4).context("add stream")?;
    ost.set_time_base(tb);

    let mut enc = codec::context::Context::new_with_codec(mpeg4)
        .encoder()
        .video()
        .context("encoder context")?;
    enc.set_width(w);
    enc.set_height(h);
    enc.set_format(Pixel::YUV420P);
    enc.set_time_base(tb);
    enc.set_frame_rate(Some(Rational::new(CLIP_FPS, 1)));
    let mut encoder = enc.open_as_with(mpeg4, ffmpeg::Dictionary::new()).context("open encoder")?;
    copy_encoder_params(&mut octx, 0, &encoder)?;

    octx.write_header().context("write header")?;
    let ost_tb = octx.stream(0).ok_or_else(|| anyhow!("stream vanished"))?.time_base();

    for i in 0..frames {
        let mut frame = VideoFrame::new(Pixel::YUV420P, w, h);
        frame.data_mut(0).fill(16 + (i * 5 % 200) as u8);
        frame.data_mut(1).fill(128);
        frame.data_mut(2).fill(128);
        frame.set_pts(Some(i));
        encoder.send_frame(&frame).context("send frame")?;
        write_packets(&mut encoder, &mut octx, tb, ost_tb)?;
    }
    encoder.send_eof().context("send EOF")?;
    write_packets(&mut encoder, &mut octx, tb, ost_tb)?;

    octx.write_trailer().context("write trailer")?;
    Ok(())
}

fn write_packets(
    encoder: &mut encoder::Video,
    octx:    &mut ffmpeg::format::context::Output,
    tb:      Rational,
    ost_tb:  Rational,
) -> Result<()> {
    let mut pkt = Packet::empty();
    while encoder.receive_packet(&mut pkt).is_ok() {
        pkt.set_stream(0);
        pkt.rescale_ts(tb, ost_tb);
        pkt.write_interleaved(octx).context("write packet")?;
    }
    Ok(())
}

/// The H.264 encoder exports use, if this FFmpeg build has it.
pub fn has_h264_encoder() -> bool {
    let _ = ffmpeg::init();
    encoder::find_by_name("libx264").is_some()
}

/// Byte offset of a top-level MP4 box tag such as `moov` or `mdat`.
pub fn box_offset(bytes: &[u8], tag: &[u8; 4]) -> Option<usize> {
    bytes.windows(4).position(|w| w == tag)
}
