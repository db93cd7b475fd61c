// crates/clipsqueeze-media/src/fifo.rs
//
// Planar f32 sample FIFO feeding the AAC encoder.
//
// AAC requires exactly `encoder.frame_size()` (typically 1024) samples per
// input frame. Decoded audio arrives in arbitrary chunk sizes, so resampled
// PCM is appended here and full frames are popped from the front. At the end
// of the export the tail is zero-padded and flushed.
//
// The FIFO has a fixed channel count (1 or 2, from the export settings). The
// resampler already converts to that layout; `push_planes` still tolerates a
// short plane list by repeating the last plane.

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::Sample;
use ffmpeg::format::sample::Type as SampleType;
use ffmpeg::util::channel_layout::ChannelLayoutMask;
use ffmpeg::util::frame::audio::Audio as AudioFrame;

pub struct AudioFifo {
    planes: Vec<Vec<f32>>,
    rate:   u32,
}

impl AudioFifo {
    pub fn new(channels: u16, rate: u32) -> Self {
        Self {
            planes: vec![Vec::new(); channels.max(1) as usize],
            rate,
        }
    }

    pub fn channels(&self) -> usize {
        self.planes.len()
    }

    /// Samples buffered per channel.
    pub fn len(&self) -> usize {
        self.planes[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `n` samples from each plane.
    pub fn push_planes(&mut self, src: &[&[f32]]) {
        let Some(last) = src.last() else { return };
        for (ch, plane) in self.planes.iter_mut().enumerate() {
            plane.extend_from_slice(src.get(ch).unwrap_or(last));
        }
    }

    /// Remove up to `n` samples per channel from the front, zero-padded to `n`.
    pub fn take(&mut self, n: usize) -> Vec<Vec<f32>> {
        let available = self.len().min(n);
        self.planes
            .iter_mut()
            .map(|plane| {
                let mut out: Vec<f32> = plane.drain(..available).collect();
                out.resize(n, 0.0);
                out
            })
            .collect()
    }

    /// Append one decoded / resampled FLTP frame.
    pub fn push(&mut self, frame: &AudioFrame) {
        let n = frame.samples();
        if n == 0 {
            return;
        }
        let src_channels = (frame.ch_layout().channels() as usize).max(1);
        let planes: Vec<&[f32]> = (0..src_channels.min(self.channels()))
            .map(|ch| unsafe {
                let bytes = frame.data(ch);
                std::slice::from_raw_parts(bytes.as_ptr() as *const f32, n)
            })
            .collect();
        self.push_planes(&planes);
    }

    /// Pop one encoder-sized frame with PTS `sample_idx` (timebase 1/rate).
    pub fn pop_frame(&mut self, n: usize, sample_idx: i64) -> AudioFrame {
        let mask = if self.channels() == 1 { ChannelLayoutMask::MONO } else { ChannelLayoutMask::STEREO };
        let mut frame = AudioFrame::new(Sample::F32(SampleType::Planar), n, mask);
        frame.set_rate(self.rate);
        frame.set_pts(Some(sample_idx));

        for (ch, samples) in self.take(n).into_iter().enumerate() {
            unsafe {
                let data = frame.data_mut(ch);
                let dst  = std::slice::from_raw_parts_mut(data.as_mut_ptr() as *mut f32, n);
                dst.copy_from_slice(&samples);
            }
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_returns_full_frames_in_order() {
        let mut f = AudioFifo::new(2, 44_100);
        f.push_planes(&[&[1.0, 2.0, 3.0], &[-1.0, -2.0, -3.0]]);
        f.push_planes(&[&[4.0], &[-4.0]]);
        assert_eq!(f.len(), 4);

        let out = f.take(3);
        assert_eq!(out[0], vec![1.0, 2.0, 3.0]);
        assert_eq!(out[1], vec![-1.0, -2.0, -3.0]);
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn short_tail_is_zero_padded() {
        let mut f = AudioFifo::new(1, 44_100);
        f.push_planes(&[&[0.5, 0.25]]);
        let out = f.take(4);
        assert_eq!(out, vec![vec![0.5, 0.25, 0.0, 0.0]]);
        assert!(f.is_empty());
    }

    #[test]
    fn mono_source_fills_both_channels() {
        let mut f = AudioFifo::new(2, 48_000);
        f.push_planes(&[&[0.1, 0.2]]);
        let out = f.take(2);
        assert_eq!(out[0], out[1]);
    }

    #[test]
    fn extra_source_planes_are_ignored() {
        let mut f = AudioFifo::new(1, 44_100);
        f.push_planes(&[&[1.0], &[9.0]]);
        assert_eq!(f.take(1), vec![vec![1.0]]);
    }

    #[test]
    fn zero_channels_clamps_to_mono() {
        let f = AudioFifo::new(0, 44_100);
        assert_eq!(f.channels(), 1);
        assert!(f.is_empty());
    }
}
