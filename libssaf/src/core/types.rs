//! common types for the ssaf codec

use serde::Serialize;

use super::error::{SsafError, SsafResult};

// constants

/// Magic tag "SSAF"
pub const MAGIC: [u8; 4] = *b"SSAF";

/// channel chunk tag
pub const CHANNEL_TAG: [u8; 4] = *b"chan";

/// zero-run chunk tag (space padded)
pub const ZERO_RUN_TAG: [u8; 4] = *b"zre ";

/// rice parameter chunk tag
pub const RICE_TAG: [u8; 4] = *b"rice";

/// packed residual chunk tag
pub const DATA_TAG: [u8; 4] = *b"data";

/// header size including magic: tag(4) + rate(4) + depth(1) + samples(4) + channels(2)
pub const HEADER_SIZE: usize = 15;

/// residuals per rice block
pub const RICE_BLOCK_SIZE: usize = 4096;

/// shortest zero run stored as a descriptor
pub const MIN_ZERO_RUN: usize = 10;

/// samples quieter than this are dither candidates
pub const DITHER_THRESHOLD: i32 = 4;

// types

/// signed pcm bit depth
///
/// | Code | Bytes | Range                       |
/// |------|-------|-----------------------------|
/// | 8    | 1     | -128 ..= 127                |
/// | 16   | 2     | -32768 ..= 32767            |
/// | 24   | 3     | -8388608 ..= 8388607        |
/// | 32   | 4     | -2147483648 ..= 2147483647  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum BitDepth {
    B8 = 8,
    B16 = 16,
    B24 = 24,
    B32 = 32,
}

impl BitDepth {
    /// parse the header code
    pub fn from_code(code: u8) -> SsafResult<Self> {
        match code {
            8 => Ok(BitDepth::B8),
            16 => Ok(BitDepth::B16),
            24 => Ok(BitDepth::B24),
            32 => Ok(BitDepth::B32),
            other => Err(SsafError::UnsupportedBitDepth(other)),
        }
    }

    /// the header code (number of bits)
    pub fn bits(self) -> u8 {
        self as u8
    }

    pub fn bytes_per_sample(self) -> usize {
        self.bits() as usize / 8
    }

    /// smallest representable sample
    pub fn min_value(self) -> i32 {
        (-(1i64 << (self.bits() - 1))) as i32
    }

    /// largest representable sample
    pub fn max_value(self) -> i32 {
        ((1i64 << (self.bits() - 1)) - 1) as i32
    }

    pub fn contains(self, value: i32) -> bool {
        value >= self.min_value() && value <= self.max_value()
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = SsafError;

    fn try_from(code: u8) -> SsafResult<Self> {
        BitDepth::from_code(code)
    }
}

// data structures

/// top-level ssaf header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub sample_rate: u32,
    pub bit_depth: BitDepth,
    /// samples per channel
    pub samples: u32,
    pub channels: u16,
}

impl Header {
    /// size of the pcm this header describes
    pub fn pcm_size(&self) -> usize {
        self.samples as usize * self.channels as usize * self.bit_depth.bytes_per_sample()
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples as f64 / self.sample_rate as f64
    }
}

/// a run of zero residuals removed from the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZeroRun {
    /// index in the full (uncompacted) residual stream
    pub offset: u32,
    pub length: u32,
}

impl ZeroRun {
    pub fn new(offset: u32, length: u32) -> Self {
        ZeroRun { offset, length }
    }

    /// one past the last zero
    pub fn end(&self) -> u64 {
        self.offset as u64 + self.length as u64
    }
}

/// the four chunks stored for one channel
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChannelChunk {
    /// length of the zero-run compacted residual stream
    pub encoded_samples: u32,
    pub zero_runs: Vec<ZeroRun>,
    /// one rice parameter per block of RICE_BLOCK_SIZE residuals
    pub rice_parameters: Vec<i32>,
    /// packed rice bits, byte aligned
    pub data: Vec<u8>,
}

impl ChannelChunk {
    /// bytes this channel occupies in the container
    pub fn byte_size(&self) -> usize {
        let mut size = 4 + 4; // chan + encoded samples
        size += 4 + 4 + self.zero_runs.len() * 8; // zre + count + pairs
        size += 4 + 4 + self.rice_parameters.len() * 4; // rice + count + params
        size += 4 + self.data.len(); // data tag + bits
        size
    }
}

/// complete parsed ssaf container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsafFile {
    pub header: Header,
    pub channels: Vec<ChannelChunk>,
}

impl SsafFile {
    /// bytes the container occupies when written
    pub fn byte_size(&self) -> usize {
        HEADER_SIZE + self.channels.iter().map(ChannelChunk::byte_size).sum::<usize>()
    }
}
