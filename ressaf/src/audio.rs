use anyhow::{bail, Context, Result};
use libssaf_audio::{BitDepth, SampleBuffer};
use std::io::{Cursor, Write};
use std::path::Path;
use symphonia::core::audio::SampleBuffer as PcmBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Audio decoded from a source file
///
/// Samples are interleaved and scaled to the full `i32` range whatever the
/// source depth was, so any target depth is a plain right shift away.
#[derive(Debug, Clone)]
pub struct AudioData {
    pub samples: Vec<i32>,
    pub sample_rate: u32,
    pub channels: u16,
    /// bits per sample reported by the source codec, if any
    pub source_bits: Option<u32>,
    // Source format (e.g., "MP3", "FLAC", "WAV")
    pub source_format: Option<String>,
}

impl AudioData {
    /// frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// the source depth when ssaf can store it, otherwise 16
    pub fn native_depth(&self) -> BitDepth {
        self.source_bits
            .and_then(|bits| u8::try_from(bits).ok())
            .and_then(|bits| BitDepth::from_code(bits).ok())
            .unwrap_or(BitDepth::B16)
    }

    /// requantise to `depth` and wrap in a sample buffer
    pub fn to_buffer(&self, depth: BitDepth) -> Result<SampleBuffer> {
        let shift = 32 - depth.bits() as u32;
        let samples: Vec<i32> = self.samples.iter().map(|&s| s >> shift).collect();

        SampleBuffer::from_samples(self.sample_rate, depth, self.channels, &samples)
            .context("Failed to build sample buffer")
    }
}

/// Read an audio file from disk
pub fn read_audio_file(path: &Path) -> Result<AudioData> {
    let file = std::fs::File::open(path).context("Failed to open audio file")?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    read_from_source(mss, path.extension().and_then(|e| e.to_str()))
}

/// Read audio from bytes (for cross-platform/WASM support)
pub fn read_audio_from_bytes(bytes: &[u8]) -> Result<AudioData> {
    let cursor = Cursor::new(bytes.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());
    read_from_source(mss, None)
}

fn read_from_source(mss: MediaSourceStream, extension: Option<&str>) -> Result<AudioData> {
    // Create hint from file extension
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    // Probe the format
    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .context("Unsupported audio format")?;

    let mut format = probed.format;

    // Find the first audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio track found")?;

    let source_format = extension
        .map(|ext| ext.to_uppercase())
        .or_else(|| Some(codec_name(track.codec_params.codec).to_string()));

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Unknown sample rate")?;
    let channel_count = track
        .codec_params
        .channels
        .context("Unknown channel count")?
        .count();
    let channels = u16::try_from(channel_count).context("Too many channels")?;
    let source_bits = track.codec_params.bits_per_sample;

    // Create decoder
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder")?;

    let mut samples = Vec::new();

    // Decode all packets
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(e) => return Err(e).context("Error reading packet"),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                warn!("skipping undecodable packet: {}", e);
                continue;
            }
            Err(e) => return Err(e).context("Error decoding packet"),
        };

        // convert whatever the codec produced to full-scale i32
        let mut pcm = PcmBuffer::<i32>::new(decoded.capacity() as u64, *decoded.spec());
        pcm.copy_interleaved_ref(decoded);
        samples.extend_from_slice(pcm.samples());
    }

    debug!(
        sample_rate,
        channels,
        source_bits = ?source_bits,
        samples = samples.len(),
        "audio read"
    );

    Ok(AudioData {
        samples,
        sample_rate,
        channels,
        source_bits,
        source_format,
    })
}

fn codec_name(codec: symphonia::core::codecs::CodecType) -> &'static str {
    use symphonia::core::codecs::*;

    match codec {
        CODEC_TYPE_FLAC => "FLAC",
        CODEC_TYPE_PCM_U8
        | CODEC_TYPE_PCM_S16LE
        | CODEC_TYPE_PCM_S16BE
        | CODEC_TYPE_PCM_S24LE
        | CODEC_TYPE_PCM_S32LE
        | CODEC_TYPE_PCM_F32LE => "WAV",
        CODEC_TYPE_MP3 => "MP3",
        CODEC_TYPE_VORBIS => "OGG",
        CODEC_TYPE_AAC => "AAC",
        _ => "UNKNOWN",
    }
}

/// Write a sample buffer to a WAV file
pub fn write_wav(path: &Path, buffer: &SampleBuffer) -> Result<()> {
    let bytes = write_wav_to_bytes(buffer)?;
    std::fs::write(path, bytes).context("Failed to write WAV file")
}

/// Write a sample buffer as integer PCM WAV in memory (for cross-platform/WASM support)
pub fn write_wav_to_bytes(buffer: &SampleBuffer) -> Result<Vec<u8>> {
    let bits = buffer.bit_depth().bits() as u16;
    let bytes_per_sample = buffer.bytes_per_sample() as u32;
    let channels = buffer.channels();
    let pcm = buffer.data();

    let data_size = u32::try_from(pcm.len()).ok().filter(|&n| n <= u32::MAX - 36);
    let Some(data_size) = data_size else {
        bail!("{} bytes of audio do not fit in a WAV file", pcm.len());
    };
    let file_size = 36 + data_size; // 44 byte header - 8 + data_size

    // WAV file format (RIFF)
    let mut out = Vec::with_capacity(44 + pcm.len());

    // RIFF header
    out.write_all(b"RIFF")?;
    out.write_all(&file_size.to_le_bytes())?;
    out.write_all(b"WAVE")?;

    // fmt chunk
    out.write_all(b"fmt ")?;
    out.write_all(&16u32.to_le_bytes())?; // chunk size
    out.write_all(&1u16.to_le_bytes())?; // format = integer PCM
    out.write_all(&channels.to_le_bytes())?;
    out.write_all(&buffer.sample_rate().to_le_bytes())?;
    let byte_rate = buffer.sample_rate() as u64 * channels as u64 * bytes_per_sample as u64;
    out.write_all(&(byte_rate as u32).to_le_bytes())?;
    let block_align = channels.wrapping_mul(bytes_per_sample as u16);
    out.write_all(&block_align.to_le_bytes())?;
    out.write_all(&bits.to_le_bytes())?; // bits per sample

    // data chunk
    out.write_all(b"data")?;
    out.write_all(&data_size.to_le_bytes())?;

    if buffer.bit_depth() == BitDepth::B8 {
        // 8-bit WAV is unsigned
        out.extend(pcm.iter().map(|&b| b ^ 0x80));
    } else {
        out.write_all(pcm)?;
    }

    Ok(out)
}
