//! SSAF lossless PCM codec
//!
//! Encodes an interleaved signed PCM buffer (8/16/24/32-bit) into the SSAF
//! container and decodes it back. Per channel the encoder runs second-order
//! prediction, collapses long zero runs and rice codes the rest in blocks of
//! 4096 residuals, each with its own parameter.
//!
//! ```
//! use libssaf_audio::{decode, encode, BitDepth, SampleBuffer};
//!
//! let pcm: Vec<i32> = (0..1000).map(|i| ((i as f32 * 0.05).sin() * 8000.0) as i32).collect();
//! let mut buffer = SampleBuffer::from_samples(44100, BitDepth::B16, 1, &pcm).unwrap();
//!
//! let bytes = encode(&mut buffer).unwrap();
//! let decoded = decode(&bytes).unwrap();
//! assert_eq!(decoded.data(), buffer.data());
//! ```

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod core;
pub mod lossless;

mod reader;
mod writer;

pub use crate::core::{
    rice, BitDepth, ChannelChunk, Header, SampleBuffer, SsafError, SsafFile, SsafResult, ZeroRun,
    DITHER_THRESHOLD, HEADER_SIZE, MAGIC, MIN_ZERO_RUN, RICE_BLOCK_SIZE,
};
pub use lossless::{predictor, zero_run, Decoder, Encoder};
pub use reader::Reader;
pub use writer::Writer;

// native api

/// dither `buffer` in place and encode it to ssaf bytes
pub fn encode(buffer: &mut SampleBuffer) -> SsafResult<Vec<u8>> {
    Encoder::new().encode(buffer)
}

/// decode ssaf bytes into a new sample buffer
pub fn decode(data: &[u8]) -> SsafResult<SampleBuffer> {
    Decoder::new().decode(data)
}

/// parse only the top-level header
pub fn read_header(data: &[u8]) -> SsafResult<Header> {
    Reader::new().read_header_only(data)
}

// container info

/// per-channel summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelInfo {
    /// residuals left after zero-run collapsing
    pub encoded_samples: u32,
    pub zero_runs: usize,
    /// zeros covered by the descriptors
    pub zero_run_samples: u64,
    pub rice_blocks: usize,
    pub data_bytes: usize,
}

/// summary of an ssaf container
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerInfo {
    pub sample_rate: u32,
    pub bit_depth: u8,
    pub channels: u16,
    /// samples per channel
    pub samples: u32,
    pub duration_secs: f64,
    /// size of the raw pcm the container decodes to
    pub pcm_size: usize,
    pub file_size: usize,
    /// pcm size / file size
    pub compression_ratio: f64,
    pub channel_info: Vec<ChannelInfo>,
}

/// parse a container and summarise it without decoding audio
pub fn container_info(data: &[u8]) -> SsafResult<ContainerInfo> {
    let file = Reader::new().read(data)?;
    let header = &file.header;

    let pcm_size = header.pcm_size();
    let compression_ratio = if !data.is_empty() {
        pcm_size as f64 / data.len() as f64
    } else {
        0.0
    };

    let channel_info = file
        .channels
        .iter()
        .map(|ch| ChannelInfo {
            encoded_samples: ch.encoded_samples,
            zero_runs: ch.zero_runs.len(),
            zero_run_samples: ch.zero_runs.iter().map(|r| r.length as u64).sum(),
            rice_blocks: ch.rice_parameters.len(),
            data_bytes: ch.data.len(),
        })
        .collect();

    Ok(ContainerInfo {
        sample_rate: header.sample_rate,
        bit_depth: header.bit_depth.bits(),
        channels: header.channels,
        samples: header.samples,
        duration_secs: header.duration_secs(),
        pcm_size,
        file_size: data.len(),
        compression_ratio,
        channel_info,
    })
}

/// true when the whole container decodes
pub fn is_valid(data: &[u8]) -> bool {
    decode(data).is_ok()
}

// wasm api

/// decoded audio handed back to js
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Bits per sample
    pub bit_depth: u8,
    /// Number of channels
    pub channels: u16,
    #[wasm_bindgen(skip)]
    pub buffer: SampleBuffer,
}

#[wasm_bindgen]
impl DecodedAudio {
    /// raw interleaved little-endian pcm
    #[wasm_bindgen(getter)]
    pub fn pcm(&self) -> Vec<u8> {
        self.buffer.data().to_vec()
    }

    /// interleaved samples mapped to -1.0..=1.0
    #[wasm_bindgen(getter)]
    pub fn samples(&self) -> Vec<f32> {
        self.buffer.samples_normalized()
    }
}

/// turn an error into js
fn to_js_err(e: SsafError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// encode raw pcm to ssaf
///
/// # Arguments
/// * `pcm` - Interleaved little-endian signed PCM bytes
/// * `sample_rate` - Sample rate in Hz (e.g., 44100)
/// * `bit_depth` - Bits per sample (8, 16, 24 or 32)
/// * `channels` - Number of channels
///
/// # Returns
/// SSAF container bytes
#[wasm_bindgen(js_name = encode)]
pub fn encode_pcm(pcm: Vec<u8>, sample_rate: u32, bit_depth: u8, channels: u16) -> Result<Vec<u8>, JsValue> {
    let bit_depth = BitDepth::from_code(bit_depth).map_err(to_js_err)?;
    let mut buffer = SampleBuffer::new(sample_rate, bit_depth, channels, pcm).map_err(to_js_err)?;
    encode(&mut buffer).map_err(to_js_err)
}

/// decode ssaf bytes
#[wasm_bindgen(js_name = decode)]
pub fn decode_pcm(data: &[u8]) -> Result<DecodedAudio, JsValue> {
    let buffer = decode(data).map_err(to_js_err)?;
    Ok(DecodedAudio {
        sample_rate: buffer.sample_rate(),
        bit_depth: buffer.bit_depth().bits(),
        channels: buffer.channels(),
        buffer,
    })
}

/// container summary as a plain js object
#[wasm_bindgen]
pub fn info(data: &[u8]) -> Result<JsValue, JsValue> {
    let info = container_info(data).map_err(to_js_err)?;
    serde_wasm_bindgen::to_value(&info).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// does the container decode?
#[wasm_bindgen]
pub fn validate(data: &[u8]) -> bool {
    is_valid(data)
}

/// get lib version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
