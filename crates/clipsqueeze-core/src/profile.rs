// crates/clipsqueeze-core/src/profile.rs
//
// Export settings bundles and the named profiles that carry them.
//
// Two profiles ship built in:
//   low-bandwidth: 320×568, 800 kbps video, 64 kbps stereo audio
//   high-quality:  720×1280, 6.4 Mbps video, 128 kbps mono audio
//
// Both are H.264 + AAC in MP4, 44.1 kHz, optimised for progressive download.
// More profiles can be supplied through config.json (see config.rs); a custom
// profile with a built-in name replaces the built-in.

use serde::{Deserialize, Serialize};

use crate::error::CompressError;

pub const LOW_BANDWIDTH: &str = "low-bandwidth";
pub const HIGH_QUALITY:  &str = "high-quality";

/// Sample rates the AAC encoder accepts.
const AAC_SAMPLE_RATES: &[u32] = &[
    8_000, 11_025, 12_000, 16_000, 22_050, 24_000, 32_000, 44_100, 48_000, 64_000, 88_200, 96_000,
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    #[default]
    H264,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    #[default]
    Aac,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    #[default]
    Mp4,
}

impl Container {
    pub fn extension(self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
        }
    }
}

/// How much detail the before/after report carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportDetail {
    /// Size and dimensions only.
    Basic,
    /// Size, dimensions, bitrate and frame rate.
    #[default]
    Detailed,
}

/// Declarative target for one export. Handed to the export session verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub width:                u32,
    pub height:               u32,
    /// Average video bitrate, bits per second.
    pub video_bitrate:        u64,
    /// AAC bitrate, bits per second.
    pub audio_bitrate:        u64,
    pub sample_rate:          u32,
    pub channels:             u16,
    #[serde(default)]
    pub video_codec:          VideoCodec,
    #[serde(default)]
    pub audio_codec:          AudioCodec,
    #[serde(default)]
    pub container:            Container,
    /// Put the MP4 index in front of the media data.
    #[serde(default = "default_true")]
    pub optimize_for_network: bool,
}

fn default_true() -> bool { true }

impl ExportSettings {
    /// Reject bundles the encoder cannot honour.
    pub fn validate(&self) -> Result<(), CompressError> {
        let invalid = |msg: String| Err(CompressError::InvalidProfile(msg));

        if self.width == 0 || self.height == 0 {
            return invalid(format!("zero dimension {}x{}", self.width, self.height));
        }
        // YUV420P needs even dimensions.
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return invalid(format!("odd dimension {}x{}", self.width, self.height));
        }
        if self.video_bitrate == 0 || self.audio_bitrate == 0 {
            return invalid("bitrates must be non-zero".into());
        }
        if !(1..=2).contains(&self.channels) {
            return invalid(format!("unsupported channel count {}", self.channels));
        }
        if !AAC_SAMPLE_RATES.contains(&self.sample_rate) {
            return invalid(format!("unsupported sample rate {}", self.sample_rate));
        }
        Ok(())
    }
}

/// A named settings bundle, selectable at request time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportProfile {
    pub name:     String,
    pub label:    String,
    pub settings: ExportSettings,
    #[serde(default)]
    pub report:   ReportDetail,
}

impl ExportProfile {
    pub fn low_bandwidth() -> Self {
        Self {
            name:  LOW_BANDWIDTH.into(),
            label: "Low bandwidth (320×568)".into(),
            settings: ExportSettings {
                width:                320,
                height:               568,
                video_bitrate:        800_000,
                audio_bitrate:        64_000,
                sample_rate:          44_100,
                channels:             2,
                video_codec:          VideoCodec::H264,
                audio_codec:          AudioCodec::Aac,
                container:            Container::Mp4,
                optimize_for_network: true,
            },
            report: ReportDetail::Detailed,
        }
    }

    pub fn high_quality() -> Self {
        Self {
            name:  HIGH_QUALITY.into(),
            label: "High quality (720×1280)".into(),
            settings: ExportSettings {
                width:                720,
                height:               1280,
                video_bitrate:        6_400_000,
                audio_bitrate:        128_000,
                sample_rate:          44_100,
                channels:             1,
                video_codec:          VideoCodec::H264,
                audio_codec:          AudioCodec::Aac,
                container:            Container::Mp4,
                optimize_for_network: true,
            },
            report: ReportDetail::Detailed,
        }
    }

    pub fn builtins() -> Vec<Self> {
        vec![Self::low_bandwidth(), Self::high_quality()]
    }
}

impl Default for ExportProfile {
    fn default() -> Self { Self::low_bandwidth() }
}

/// Look up a profile by name, case-insensitively.
pub fn find<'a>(profiles: &'a [ExportProfile], name: &str) -> Option<&'a ExportProfile> {
    profiles.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
