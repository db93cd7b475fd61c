// crates/clipsqueeze-media/src/decode.rs
//
// LiveDecoder: sequential RGBA decoder for the playback window.
// Opens once, then hands out frames in presentation order until EOF.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};

use clipsqueeze_core::helpers::geometry::playback_size;

pub struct LiveDecoder {
    pub path:      PathBuf,
    ictx:          ffmpeg::format::context::Input,
    decoder:       ffmpeg::decoder::video::Video,
    video_idx:     usize,
    pub last_pts:  i64,
    tb_num:        i32,
    tb_den:        i32,
    pub out_w:     u32,
    pub out_h:     u32,
    scaler:        SwsContext,
}

impl LiveDecoder {
    /// Open `path` for playback, scaled to at most `max_w` pixels wide.
    pub fn open(path: &Path, max_w: u32) -> Result<Self> {
        let ictx = input(path)?;
        let (video_idx, tb_num, tb_den, decoder) = {
            let stream = ictx
                .streams()
                .best(Type::Video)
                .ok_or_else(|| anyhow!("no video stream"))?;
            let tb = stream.time_base();
            let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?;
            (stream.index(), tb.numerator(), tb.denominator(), dec_ctx.decoder().video()?)
        };

        let (out_w, out_h) = playback_size(decoder.width(), decoder.height(), max_w);
        let scaler = SwsContext::get(
            decoder.format(), decoder.width(), decoder.height(),
            Pixel::RGBA, out_w, out_h, Flags::BILINEAR,
        )?;

        log::info!("[pb] open {} → {out_w}x{out_h}", path.display());
        Ok(Self {
            path: path.to_path_buf(), ictx, decoder, video_idx,
            last_pts: 0, tb_num, tb_den, out_w, out_h, scaler,
        })
    }

    pub fn pts_to_secs(&self, pts: i64) -> f64 {
        if self.tb_den == 0 {
            return 0.0;
        }
        pts as f64 * self.tb_num as f64 / self.tb_den as f64
    }

    /// Decode the next frame. Returns `(rgba, w, h, ts_secs)` or None at EOF.
    pub fn next_frame(&mut self) -> Option<(Vec<u8>, u32, u32, f64)> {
        // One packet can yield several frames; hand those out first.
        if let Some(frame) = self.receive() {
            return Some(frame);
        }
        for (stream, packet) in self.ictx.packets().flatten() {
            if stream.index() != self.video_idx { continue; }
            if self.decoder.send_packet(&packet).is_err() { continue; }
            if let Some(frame) = self.receive() {
                return Some(frame);
            }
        }
        // Drain frames still buffered in the decoder.
        let _ = self.decoder.send_eof();
        self.receive()
    }

    fn receive(&mut self) -> Option<(Vec<u8>, u32, u32, f64)> {
        let mut decoded = ffmpeg::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return None;
        }
        let pts = decoded.pts().unwrap_or(self.last_pts + 1);
        self.last_pts = pts;

        let mut out = ffmpeg::util::frame::video::Video::empty();
        self.scaler.run(&decoded, &mut out).ok()?;
        let data = destripe(out.data(0), out.stride(0), self.out_w as usize * 4, self.out_h as usize);
        Some((data, self.out_w, self.out_h, self.pts_to_secs(pts)))
    }
}

/// Copy only visible pixels, not stride padding.
pub fn destripe(raw: &[u8], stride: usize, row_bytes: usize, rows: usize) -> Vec<u8> {
    (0..rows)
        .flat_map(|row| &raw[row * stride..row * stride + row_bytes])
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destripe_drops_padding() {
        // 2 rows of 3 visible bytes, stride 4.
        let raw = [1, 2, 3, 0, 4, 5, 6, 0];
        assert_eq!(destripe(&raw, 4, 3, 2), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn destripe_tight_rows_is_identity() {
        let raw = [9u8; 16];
        assert_eq!(destripe(&raw, 8, 8, 2), raw.to_vec());
    }
}
