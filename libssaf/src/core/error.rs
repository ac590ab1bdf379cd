//! error types for the ssaf codec

use thiserror::Error;

/// everything that can go wrong while building, encoding or decoding audio
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SsafError {
    /// container bytes do not follow the ssaf layout
    #[error("Invalid SSAF data: {0}")]
    Format(String),

    /// sample index past the end of the buffer
    #[error("Sample index {index} out of range (buffer holds {len} samples per channel)")]
    SampleOutOfRange { index: usize, len: usize },

    /// channel index past the channel count
    #[error("Channel index {channel} out of range (buffer has {channels} channels)")]
    ChannelOutOfRange { channel: u16, channels: u16 },

    /// value does not fit the signed range of the bit depth
    #[error("Sample value {value} does not fit in {bit_depth}-bit signed PCM")]
    ValueOutOfRange { value: i32, bit_depth: u8 },

    /// bit depth outside 8/16/24/32
    #[error("Unsupported bit depth: {0}")]
    UnsupportedBitDepth(u8),

    /// raw storage that does not describe whole sample frames
    #[error("Invalid sample buffer: {0}")]
    InvalidBuffer(String),
}

impl SsafError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        SsafError::Format(msg.into())
    }

    pub(crate) fn eof() -> Self {
        SsafError::Format("Unexpected end of file".to_string())
    }

    /// true for container/tag errors
    pub fn is_format_error(&self) -> bool {
        matches!(self, SsafError::Format(_))
    }

    /// true for index and value range errors
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            SsafError::SampleOutOfRange { .. }
                | SsafError::ChannelOutOfRange { .. }
                | SsafError::ValueOutOfRange { .. }
        )
    }
}

/// result type for ssaf stuff
pub type SsafResult<T> = Result<T, SsafError>;
