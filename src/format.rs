//! Sample format and channel layout types.
//!
//! A block's format is chosen once at construction and never changes. The
//! format determines the byte size verified against the backend's negotiated
//! sample size after a stream is opened.

use std::str::FromStr;

use crate::AudioBlockError;

/// Logical PCM sample type carried by a block.
///
/// Unrecognized type names are rejected at the parsing boundary rather than
/// falling back to a default format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    /// 32-bit IEEE float samples.
    F32,
    /// 32-bit signed integer samples.
    I32,
    /// 16-bit signed integer samples.
    I16,
    /// 8-bit signed integer samples.
    I8,
    /// 8-bit unsigned integer samples.
    U8,
}

impl SampleType {
    /// Returns the size of one sample in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        match self {
            Self::F32 | Self::I32 => 4,
            Self::I16 => 2,
            Self::I8 | Self::U8 => 1,
        }
    }
}

impl FromStr for SampleType {
    type Err = AudioBlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float32" => Ok(Self::F32),
            "int32" => Ok(Self::I32),
            "int16" => Ok(Self::I16),
            "int8" => Ok(Self::I8),
            "uint8" => Ok(Self::U8),
            other => Err(AudioBlockError::UnknownSampleType {
                name: other.to_string(),
            }),
        }
    }
}

/// Whether multi-channel samples are stored frame-by-frame or as separate
/// per-channel buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelMode {
    /// Samples stored channel-by-channel per frame: `[L0, R0, L1, R1, ...]`.
    #[default]
    Interleaved,
    /// Samples stored as contiguous per-channel buffers.
    Planar,
}

/// The immutable stream format of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    /// Logical sample type.
    pub sample_type: SampleType,
    /// Number of channels. Must be positive.
    pub channels: u16,
    /// Channel layout mode.
    pub mode: ChannelMode,
}

impl StreamFormat {
    /// Creates a stream format.
    pub fn new(sample_type: SampleType, channels: u16, mode: ChannelMode) -> Self {
        Self {
            sample_type,
            channels,
            mode,
        }
    }

    /// Returns `true` if samples are interleaved.
    #[must_use]
    pub fn is_interleaved(&self) -> bool {
        self.mode == ChannelMode::Interleaved
    }

    /// Returns the size of one frame (one sample per channel) in bytes.
    #[must_use]
    pub fn frame_size(&self) -> usize {
        self.sample_type.size_bytes() * self.channels as usize
    }
}
