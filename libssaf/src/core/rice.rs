// Rice coding of residual streams in fixed-size blocks

use super::error::{SsafError, SsafResult};
use super::types::RICE_BLOCK_SIZE;

/// largest parameter the decoder accepts
pub const MAX_RICE_PARAMETER: i32 = 32;

/// Zigzag encode: map signed to unsigned
/// 0 → 0, -1 → 1, 1 → 2, -2 → 3, 2 → 4, ...
///
/// The sign is taken from bit 15, so the mapping is a bijection on 16-bit
/// residuals only.
#[inline]
pub fn zigzag(value: i32) -> u32 {
    (value.wrapping_shl(1) ^ (value >> 15)) as u32
}

/// Zigzag decode
/// 0 → 0, 1 → -1, 2 → 1, 3 → -2, 4 → 2, ...
#[inline]
pub fn unzigzag(value: u32) -> i32 {
    ((value >> 1) as i32) ^ (-((value & 1) as i32))
}

/// Pick k for one block: floor(log2(mean + 1))
///
/// The mean is accumulated in single precision; k is transmitted, so any
/// choice decodes, but this keeps streams identical to existing files.
pub fn block_parameter(zigzags: &[u32]) -> i32 {
    if zigzags.is_empty() {
        return 0;
    }

    let sum: f32 = zigzags.iter().map(|&z| z as f32).sum();
    let mean = sum / zigzags.len() as f32;

    ((mean as f64 + 1.0).log2().floor() as i32).max(0)
}

/// number of rice blocks needed for `len` residuals
pub fn block_count(len: usize) -> usize {
    len.div_ceil(RICE_BLOCK_SIZE)
}

/// Rice encode a residual stream block by block
///
/// Returns one parameter per block and the packed bits.
pub fn encode_blocks(residuals: &[i32]) -> (Vec<i32>, Vec<u8>) {
    let mut bits = BitWriter::new();
    let mut parameters = Vec::with_capacity(block_count(residuals.len()));

    for block in residuals.chunks(RICE_BLOCK_SIZE) {
        let zigzags: Vec<u32> = block.iter().map(|&r| zigzag(r)).collect();
        let k = block_parameter(&zigzags);
        parameters.push(k);

        for &z in &zigzags {
            encode_value(&mut bits, z, k as u32);
        }
    }

    (parameters, bits.into_bytes())
}

fn encode_value(bits: &mut BitWriter, zigzag: u32, k: u32) {
    // only the low 16 bits of the mapped value are coded
    let value = zigzag & 0xFFFF;

    let quotient = value.checked_shr(k).unwrap_or(0);
    bits.write_unary(quotient);
    bits.write_bits(value, k as u8);
}

/// Rice decode `encoded_samples` residuals using the transmitted parameters
pub fn decode_blocks(data: &[u8], parameters: &[i32], encoded_samples: usize) -> SsafResult<Vec<i32>> {
    check_parameters(parameters, encoded_samples)?;

    let mut bits = BitReader::new(data);
    let mut residuals = Vec::with_capacity(encoded_samples);

    for (block, &k) in parameters.iter().enumerate() {
        let len = block_len(block, encoded_samples);
        for _ in 0..len {
            residuals.push(unzigzag(decode_value(&mut bits, k as u32)?));
        }
    }

    Ok(residuals)
}

/// Walk the bitstream without keeping values; returns bytes consumed
///
/// The data chunk carries no length, so this is how the reader finds where
/// one channel's bits stop.
pub fn measure_blocks(data: &[u8], parameters: &[i32], encoded_samples: usize) -> SsafResult<usize> {
    check_parameters(parameters, encoded_samples)?;

    let mut bits = BitReader::new(data);
    for (block, &k) in parameters.iter().enumerate() {
        for _ in 0..block_len(block, encoded_samples) {
            bits.read_unary()?;
            bits.skip_bits(k as usize)?;
        }
    }

    Ok(bits.bytes_consumed())
}

fn decode_value(bits: &mut BitReader, k: u32) -> SsafResult<u32> {
    let quotient = bits.read_unary()? as u64;
    let remainder = if k > 0 { bits.read_bits(k as u8)? as u64 } else { 0 };

    // truncating keeps k = 32 streams well defined
    Ok(((quotient << k) | remainder) as u32)
}

fn block_len(block: usize, encoded_samples: usize) -> usize {
    let start = block * RICE_BLOCK_SIZE;
    RICE_BLOCK_SIZE.min(encoded_samples.saturating_sub(start))
}

fn check_parameters(parameters: &[i32], encoded_samples: usize) -> SsafResult<()> {
    let expected = block_count(encoded_samples);
    if parameters.len() != expected {
        return Err(SsafError::format(format!(
            "{} rice parameters for {} encoded samples (expected {})",
            parameters.len(),
            encoded_samples,
            expected
        )));
    }

    if let Some(&k) = parameters
        .iter()
        .find(|&&k| !(0..=MAX_RICE_PARAMETER).contains(&k))
    {
        return Err(SsafError::format(format!("Invalid rice parameter {}", k)));
    }

    Ok(())
}

/// Bit-level writer, MSB first
pub struct BitWriter {
    bytes: Vec<u8>,
    current_byte: u8,
    bit_pos: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        BitWriter {
            bytes: Vec::new(),
            current_byte: 0,
            bit_pos: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) {
        if bit {
            self.current_byte |= 1 << (7 - self.bit_pos);
        }

        self.bit_pos += 1;
        if self.bit_pos == 8 {
            self.bytes.push(self.current_byte);
            self.current_byte = 0;
            self.bit_pos = 0;
        }
    }

    /// low `num_bits` of `value`, most significant first
    pub fn write_bits(&mut self, value: u32, num_bits: u8) {
        for i in (0..num_bits as u32).rev() {
            let bit = value.checked_shr(i).unwrap_or(0) & 1;
            self.write_bit(bit != 0);
        }
    }

    /// `count` ones followed by a zero
    pub fn write_unary(&mut self, count: u32) {
        for _ in 0..count {
            self.write_bit(true);
        }
        self.write_bit(false);
    }

    /// bits written so far
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + self.bit_pos as usize
    }

    /// packed bytes, last byte zero padded
    pub fn into_bytes(mut self) -> Vec<u8> {
        if self.bit_pos > 0 {
            self.bytes.push(self.current_byte);
        }
        self.bytes
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Bit-level reader, MSB first
pub struct BitReader<'a> {
    bytes: &'a [u8],
    byte_pos: usize,
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        BitReader {
            bytes,
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    pub fn read_bit(&mut self) -> SsafResult<bool> {
        let byte = *self
            .bytes
            .get(self.byte_pos)
            .ok_or_else(|| SsafError::format("Rice data ended mid-stream"))?;

        let bit = (byte >> (7 - self.bit_pos)) & 1;

        self.bit_pos += 1;
        if self.bit_pos == 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }

        Ok(bit != 0)
    }

    pub fn read_bits(&mut self, num_bits: u8) -> SsafResult<u32> {
        let mut value = 0u32;
        for _ in 0..num_bits {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Ok(value)
    }

    /// count ones up to the terminating zero
    pub fn read_unary(&mut self) -> SsafResult<u32> {
        let mut count = 0u32;
        while self.read_bit()? {
            count += 1;
        }
        Ok(count)
    }

    pub fn skip_bits(&mut self, num_bits: usize) -> SsafResult<()> {
        let target = self.bits_consumed() + num_bits;
        if target > self.bytes.len() * 8 {
            return Err(SsafError::format("Rice data ended mid-stream"));
        }
        self.byte_pos = target / 8;
        self.bit_pos = (target % 8) as u8;
        Ok(())
    }

    pub fn bits_consumed(&self) -> usize {
        self.byte_pos * 8 + self.bit_pos as usize
    }

    /// bytes touched so far, counting a partly read byte
    pub fn bytes_consumed(&self) -> usize {
        self.byte_pos + usize::from(self.bit_pos > 0)
    }

    pub fn is_exhausted(&self) -> bool {
        self.byte_pos >= self.bytes.len()
    }
}
