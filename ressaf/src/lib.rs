//! ressaf - Audio converter library for the SSAF lossless container
//!
//! Imports any audio file symphonia can read, converts it to integer PCM
//! and encodes it to SSAF; decodes SSAF back to WAV. Works on native targets
//! and can be compiled to WebAssembly.
//!

pub mod audio;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod wasm;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

pub use audio::{read_audio_file, read_audio_from_bytes, write_wav, write_wav_to_bytes, AudioData};

/// Re-export libssaf types
pub use libssaf_audio::{BitDepth, ChannelInfo, SampleBuffer};

/// Information about an SSAF file
#[derive(Debug, Clone, Serialize)]
pub struct SsafInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: u8,
    pub duration_secs: f64,
    /// samples per channel
    pub samples: u32,
    pub file_size: usize,
    /// size of the decoded pcm
    pub pcm_size: usize,
    pub compression_ratio: f64,
    /// every channel decodes
    pub valid: bool,
    pub channel_info: Vec<ChannelInfo>,
}

/// Get information about an SSAF file
pub fn get_ssaf_info(data: &[u8]) -> Result<SsafInfo> {
    let info = libssaf_audio::container_info(data).map_err(|e| anyhow!("Failed to read SSAF file: {}", e))?;

    Ok(SsafInfo {
        sample_rate: info.sample_rate,
        channels: info.channels,
        bit_depth: info.bit_depth,
        duration_secs: info.duration_secs,
        samples: info.samples,
        file_size: info.file_size,
        pcm_size: info.pcm_size,
        compression_ratio: info.compression_ratio,
        valid: libssaf_audio::is_valid(data),
        channel_info: info.channel_info,
    })
}

/// Validate an SSAF file
///
/// Errors when the container cannot be parsed at all; `Ok(false)` when it
/// parses but a channel fails to decode.
pub fn validate_ssaf(data: &[u8]) -> Result<bool> {
    let info = get_ssaf_info(data)?;
    Ok(info.valid)
}

/// Encoding options for converting audio to SSAF
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Target bit depth, `None` keeps the source depth (or 16)
    pub bits: Option<BitDepth>,
    /// Run the dither filter before encoding
    pub dither: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            bits: None,
            dither: true,
        }
    }
}

impl EncodeOptions {
    /// Set the target bit depth
    pub fn with_bits(mut self, bits: BitDepth) -> Self {
        self.bits = Some(bits);
        self
    }

    /// Encode without the dither pass
    pub fn without_dither(mut self) -> Self {
        self.dither = false;
        self
    }

    fn encoder(&self) -> libssaf_audio::Encoder {
        let encoder = libssaf_audio::Encoder::new();
        if self.dither {
            encoder
        } else {
            encoder.without_dither()
        }
    }
}

/// Encode audio file bytes to SSAF
///
/// # Arguments
/// * `audio_bytes` - Raw bytes of an audio file (MP3, WAV, FLAC, OGG, etc.)
/// * `options` - Encoding options
///
/// # Returns
/// Raw bytes of the SSAF file
pub fn encode_from_audio(audio_bytes: &[u8], options: EncodeOptions) -> Result<Vec<u8>> {
    let audio = audio::read_audio_from_bytes(audio_bytes).context("Failed to read audio file")?;
    let mut buffer = audio.to_buffer(options.bits.unwrap_or_else(|| audio.native_depth()))?;

    encode_buffer(&mut buffer, &options)
}

/// Encode a sample buffer to SSAF
///
/// The buffer goes through the dither filter in place unless the options
/// disable it.
pub fn encode_buffer(buffer: &mut SampleBuffer, options: &EncodeOptions) -> Result<Vec<u8>> {
    if buffer.bit_depth().bits() > 16 {
        warn!(
            bit_depth = buffer.bit_depth().bits(),
            "prediction keeps 16 bits; samples outside the 16-bit range will not round-trip"
        );
    }

    let bytes = options
        .encoder()
        .encode(buffer)
        .map_err(|e| anyhow!("Encoding failed: {}", e))?;

    debug!(
        pcm_bytes = buffer.data().len(),
        ssaf_bytes = bytes.len(),
        "buffer encoded"
    );

    Ok(bytes)
}

/// Decode an SSAF file to a sample buffer
pub fn decode_to_buffer(ssaf_bytes: &[u8]) -> Result<SampleBuffer> {
    libssaf_audio::decode(ssaf_bytes).map_err(|e| anyhow!("Invalid SSAF file: {}", e))
}

/// Decode an SSAF file to WAV format
///
/// # Arguments
/// * `ssaf_bytes` - Raw bytes of an SSAF file
///
/// # Returns
/// Raw bytes of an integer PCM WAV file at the container's bit depth
pub fn decode_to_wav(ssaf_bytes: &[u8]) -> Result<Vec<u8>> {
    let buffer = decode_to_buffer(ssaf_bytes)?;

    audio::write_wav_to_bytes(&buffer).context("Failed to write WAV data")
}

/// Outcome of an encode/decode comparison
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub bit_depth: u8,
    pub pcm_size: usize,
    pub encoded_size: usize,
    /// fingerprint of the buffer as encoded (after dither)
    pub input_fingerprint: String,
    pub decoded_fingerprint: String,
}

impl VerifyReport {
    pub fn is_lossless(&self) -> bool {
        self.input_fingerprint == self.decoded_fingerprint
    }

    pub fn compression_ratio(&self) -> f64 {
        if self.encoded_size == 0 {
            return 0.0;
        }
        self.pcm_size as f64 / self.encoded_size as f64
    }
}

/// Encode audio, decode it again and compare blake3 fingerprints
pub fn verify_round_trip(audio_bytes: &[u8], options: EncodeOptions) -> Result<VerifyReport> {
    let audio = audio::read_audio_from_bytes(audio_bytes).context("Failed to read audio file")?;
    let mut buffer = audio.to_buffer(options.bits.unwrap_or_else(|| audio.native_depth()))?;

    verify_buffer(&mut buffer, &options)
}

/// Same as [`verify_round_trip`] for a buffer that is already in memory
pub fn verify_buffer(buffer: &mut SampleBuffer, options: &EncodeOptions) -> Result<VerifyReport> {
    let encoded = encode_buffer(buffer, options)?;
    let decoded = decode_to_buffer(&encoded)?;

    let report = VerifyReport {
        bit_depth: buffer.bit_depth().bits(),
        pcm_size: buffer.data().len(),
        encoded_size: encoded.len(),
        input_fingerprint: buffer.fingerprint(),
        decoded_fingerprint: decoded.fingerprint(),
    };

    info!(lossless = report.is_lossless(), "round trip verified");
    Ok(report)
}
