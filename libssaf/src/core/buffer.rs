//! Interleaved signed PCM storage
//!
//! A `SampleBuffer` owns the raw little-endian bytes of an interleaved
//! multi-channel recording and gives typed, channel-aware access to them.

use blake3::Hasher;

use super::error::{SsafError, SsafResult};
use super::types::{BitDepth, DITHER_THRESHOLD};

/// interleaved pcm samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    sample_rate: u32,
    bit_depth: BitDepth,
    channels: u16,
    data: Vec<u8>,
}

impl SampleBuffer {
    /// wrap raw interleaved pcm bytes
    ///
    /// `data` must hold whole sample frames: its length has to be a multiple
    /// of `channels * bytes_per_sample`.
    pub fn new(sample_rate: u32, bit_depth: BitDepth, channels: u16, data: Vec<u8>) -> SsafResult<Self> {
        if channels == 0 {
            return Err(SsafError::InvalidBuffer("channel count must be non-zero".to_string()));
        }

        let frame_size = channels as usize * bit_depth.bytes_per_sample();
        if data.len() % frame_size != 0 {
            return Err(SsafError::InvalidBuffer(format!(
                "{} bytes is not a whole number of {}-byte frames",
                data.len(),
                frame_size
            )));
        }

        Ok(SampleBuffer {
            sample_rate,
            bit_depth,
            channels,
            data,
        })
    }

    /// zero filled buffer of `samples` frames
    pub fn silent(sample_rate: u32, bit_depth: BitDepth, channels: u16, samples: usize) -> SsafResult<Self> {
        let size = samples * channels as usize * bit_depth.bytes_per_sample();
        Self::new(sample_rate, bit_depth, channels, vec![0; size])
    }

    /// build from interleaved integer samples
    pub fn from_samples(sample_rate: u32, bit_depth: BitDepth, channels: u16, samples: &[i32]) -> SsafResult<Self> {
        if channels == 0 || samples.len() % channels as usize != 0 {
            return Err(SsafError::InvalidBuffer(format!(
                "{} samples cannot be split across {} channels",
                samples.len(),
                channels
            )));
        }

        let bps = bit_depth.bytes_per_sample();
        let mut data = Vec::with_capacity(samples.len() * bps);
        for &value in samples {
            if !bit_depth.contains(value) {
                return Err(SsafError::ValueOutOfRange {
                    value,
                    bit_depth: bit_depth.bits(),
                });
            }
            data.extend_from_slice(&value.to_le_bytes()[..bps]);
        }

        Self::new(sample_rate, bit_depth, channels, data)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.bit_depth.bytes_per_sample()
    }

    /// samples per channel
    pub fn len(&self) -> usize {
        self.data.len() / self.channels as usize / self.bytes_per_sample()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn min_value(&self) -> i32 {
        self.bit_depth.min_value()
    }

    pub fn max_value(&self) -> i32 {
        self.bit_depth.max_value()
    }

    /// raw interleaved bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// byte offset of a sample within the storage
    pub fn index(&self, sample: usize, channel: u16) -> SsafResult<usize> {
        let len = self.len();
        if sample >= len {
            return Err(SsafError::SampleOutOfRange { index: sample, len });
        }
        if channel >= self.channels {
            return Err(SsafError::ChannelOutOfRange {
                channel,
                channels: self.channels,
            });
        }

        let bps = self.bytes_per_sample();
        Ok(sample * bps * self.channels as usize + channel as usize * bps)
    }

    pub fn sample(&self, sample: usize, channel: u16) -> SsafResult<i32> {
        let index = self.index(sample, channel)?;
        Ok(self.read_at(index))
    }

    /// read the sample starting at a byte offset
    pub fn sample_at(&self, index: usize) -> SsafResult<i32> {
        self.check_offset(index)?;
        Ok(self.read_at(index))
    }

    pub fn set_sample(&mut self, sample: usize, channel: u16, value: i32) -> SsafResult<()> {
        let index = self.index(sample, channel)?;
        self.set_sample_at(index, value)
    }

    /// write the sample starting at a byte offset
    pub fn set_sample_at(&mut self, index: usize, value: i32) -> SsafResult<()> {
        self.check_offset(index)?;
        if !self.bit_depth.contains(value) {
            return Err(SsafError::ValueOutOfRange {
                value,
                bit_depth: self.bit_depth.bits(),
            });
        }
        self.store_at(index, value);
        Ok(())
    }

    pub fn sample_normalized(&self, sample: usize, channel: u16) -> SsafResult<f32> {
        Ok(self.normalize(self.sample(sample, channel)?))
    }

    /// all samples, interleaved
    pub fn samples(&self) -> Vec<i32> {
        let bps = self.bytes_per_sample();
        (0..self.data.len() / bps).map(|i| self.read_at(i * bps)).collect()
    }

    /// all samples of one channel
    pub fn channel_samples(&self, channel: u16) -> SsafResult<Vec<i32>> {
        if channel >= self.channels {
            return Err(SsafError::ChannelOutOfRange {
                channel,
                channels: self.channels,
            });
        }

        let bps = self.bytes_per_sample();
        let stride = bps * self.channels as usize;
        let start = channel as usize * bps;
        Ok((0..self.len()).map(|i| self.read_at(start + i * stride)).collect())
    }

    /// all samples mapped to -1.0..=1.0, interleaved
    pub fn samples_normalized(&self) -> Vec<f32> {
        self.samples().into_iter().map(|s| self.normalize(s)).collect()
    }

    pub fn channel_samples_normalized(&self, channel: u16) -> SsafResult<Vec<f32>> {
        Ok(self
            .channel_samples(channel)?
            .into_iter()
            .map(|s| self.normalize(s))
            .collect())
    }

    /// Zero near-silent isolated samples, channel by channel, in place.
    ///
    /// Sample 0 is cleared when it and sample 1 are both quieter than the
    /// threshold. Every interior sample is cleared when it and both of its
    /// neighbours are quieter than the threshold; neighbours are read from
    /// the buffer as it is being rewritten. The last sample is never touched.
    pub fn apply_dither_filter(&mut self) {
        let len = self.len();
        if len < 2 {
            return;
        }

        let bps = self.bytes_per_sample();
        let stride = bps * self.channels as usize;
        let quiet = |v: i32| v.unsigned_abs() < DITHER_THRESHOLD as u32;

        for channel in 0..self.channels as usize {
            let at = |i: usize| channel * bps + i * stride;

            if quiet(self.read_at(at(0))) && quiet(self.read_at(at(1))) {
                self.store_at(at(0), 0);
            }

            for i in 1..len - 1 {
                let current = self.read_at(at(i));
                if current == 0 {
                    continue;
                }

                let prev = self.read_at(at(i - 1));
                let next = self.read_at(at(i + 1));
                if quiet(prev) && quiet(current) && quiet(next) {
                    self.store_at(at(i), 0);
                }
            }
        }
    }

    /// blake3 digest over the format fields and raw pcm, hex encoded
    pub fn fingerprint(&self) -> String {
        let mut hasher = Hasher::new();
        hasher.update(&self.sample_rate.to_le_bytes());
        hasher.update(&[self.bit_depth.bits()]);
        hasher.update(&self.channels.to_le_bytes());
        hasher.update(&(self.data.len() as u64).to_le_bytes());
        hasher.update(&self.data);
        hasher.finalize().to_hex().to_string()
    }

    /// write low bytes without a range check, used when rebuilding decoded audio
    pub(crate) fn store_at(&mut self, index: usize, value: i32) {
        let bps = self.bytes_per_sample();
        self.data[index..index + bps].copy_from_slice(&value.to_le_bytes()[..bps]);
    }

    fn read_at(&self, index: usize) -> i32 {
        let d = &self.data;
        match self.bit_depth {
            BitDepth::B8 => d[index] as i8 as i32,
            BitDepth::B16 => i16::from_le_bytes([d[index], d[index + 1]]) as i32,
            // shift up then back down to sign-extend bit 23
            BitDepth::B24 => i32::from_le_bytes([0, d[index], d[index + 1], d[index + 2]]) >> 8,
            BitDepth::B32 => {
                i32::from_le_bytes([d[index], d[index + 1], d[index + 2], d[index + 3]])
            }
        }
    }

    fn check_offset(&self, index: usize) -> SsafResult<()> {
        let bps = self.bytes_per_sample();
        if index % bps != 0 || index + bps > self.data.len() {
            return Err(SsafError::SampleOutOfRange {
                index: index / bps,
                len: self.data.len() / bps,
            });
        }
        Ok(())
    }

    fn normalize(&self, value: i32) -> f32 {
        let min = self.min_value() as f64;
        let max = self.max_value() as f64;
        ((value as f64 - min) / (max - min) * 2.0 - 1.0) as f32
    }
}
