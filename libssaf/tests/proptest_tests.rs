//! Property-based tests for the ssaf pipeline.
//!
//! Uses proptest to check that each stage inverts exactly and that whole
//! containers survive encode/decode.

use libssaf_audio::predictor::{decode_residuals, encode_residuals};
use libssaf_audio::rice::{decode_blocks, encode_blocks, measure_blocks, unzigzag, zigzag, BitReader, BitWriter};
use libssaf_audio::zero_run::{decode_zero_runs, encode_zero_runs};
use libssaf_audio::{decode, BitDepth, Encoder, Reader, SampleBuffer, MIN_ZERO_RUN};
use proptest::prelude::*;

/// i16-range samples with a bias toward zero so zero runs actually appear
fn residual_like() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(
        prop_oneof![
            3 => Just(0i32),
            2 => -64i32..64,
            1 => (i16::MIN as i32)..=(i16::MAX as i32),
        ],
        0..3000,
    )
}

fn bit_depth() -> impl Strategy<Value = BitDepth> {
    prop_oneof![Just(BitDepth::B16), Just(BitDepth::B24), Just(BitDepth::B32)]
}

// =============================================================================
// Stage round trips
// =============================================================================

proptest! {
    #[test]
    fn zigzag_roundtrip(value in (i16::MIN as i32)..=(i16::MAX as i32)) {
        let z = zigzag(value);
        prop_assert!(z <= 0xFFFF);
        prop_assert_eq!(unzigzag(z), value);
    }

    #[test]
    fn predictor_roundtrip(samples in residual_like()) {
        let residuals = encode_residuals(&samples);
        prop_assert_eq!(decode_residuals(&residuals), samples);
    }

    #[test]
    fn zero_run_roundtrip(residuals in residual_like()) {
        let (runs, compacted) = encode_zero_runs(&residuals);

        for run in &runs {
            prop_assert!(run.length as usize >= MIN_ZERO_RUN);
        }
        let covered: usize = runs.iter().map(|r| r.length as usize).sum();
        prop_assert_eq!(covered + compacted.len(), residuals.len());

        let restored = decode_zero_runs(&runs, &compacted, residuals.len()).unwrap();
        prop_assert_eq!(restored, residuals);
    }

    #[test]
    fn rice_roundtrip(residuals in residual_like()) {
        let (params, bytes) = encode_blocks(&residuals);
        prop_assert_eq!(params.len(), residuals.len().div_ceil(4096));

        let decoded = decode_blocks(&bytes, &params, residuals.len()).unwrap();
        prop_assert_eq!(decoded, residuals.clone());
        prop_assert_eq!(measure_blocks(&bytes, &params, residuals.len()).unwrap(), bytes.len());
    }

    #[test]
    fn bits_roundtrip(value in any::<u32>(), width in 0u8..=32, unary in 0u32..200) {
        let masked = if width == 32 { value } else { value & ((1u32 << width) - 1) };

        let mut writer = BitWriter::new();
        writer.write_unary(unary);
        writer.write_bits(masked, width);
        let bytes = writer.into_bytes();

        let mut reader = BitReader::new(&bytes);
        prop_assert_eq!(reader.read_unary().unwrap(), unary);
        prop_assert_eq!(reader.read_bits(width).unwrap(), masked);
    }
}

// =============================================================================
// Container round trips
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn container_roundtrip_without_dither(
        channels in 1u16..=4,
        depth in bit_depth(),
        frames in prop::collection::vec(residual_like(), 1..=4),
    ) {
        // one generated stream per channel, trimmed to a common length
        let len = frames.iter().map(Vec::len).min().unwrap_or(0);
        let mut samples = Vec::with_capacity(len * channels as usize);
        for i in 0..len {
            for c in 0..channels as usize {
                samples.push(frames[c % frames.len()][i]);
            }
        }

        let mut buffer = SampleBuffer::from_samples(48000, depth, channels, &samples).unwrap();
        let original = buffer.clone();
        let bytes = Encoder::new().without_dither().encode(&mut buffer).unwrap();

        prop_assert_eq!(&buffer, &original);
        prop_assert_eq!(decode(&bytes).unwrap(), original);
    }

    #[test]
    fn container_roundtrip_with_dither(samples in residual_like()) {
        let mut buffer = SampleBuffer::from_samples(44100, BitDepth::B16, 1, &samples).unwrap();
        let bytes = Encoder::new().encode(&mut buffer).unwrap();

        // the dithered buffer is what comes back
        prop_assert_eq!(decode(&bytes).unwrap(), buffer);
    }

    #[test]
    fn container_accounting(samples in residual_like()) {
        let mut buffer = SampleBuffer::from_samples(44100, BitDepth::B16, 1, &samples).unwrap();
        let bytes = Encoder::new().encode(&mut buffer).unwrap();
        let file = Reader::new().read(&bytes).unwrap();

        prop_assert_eq!(file.byte_size(), bytes.len());
        for channel in &file.channels {
            let zeros: u64 = channel.zero_runs.iter().map(|r| r.length as u64).sum();
            prop_assert_eq!(channel.encoded_samples as u64 + zeros, samples.len() as u64);
            prop_assert!(channel.rice_parameters.iter().all(|&k| (0..=32).contains(&k)));
        }
    }

    #[test]
    fn decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = decode(&bytes);
    }

    #[test]
    fn decode_never_panics_after_valid_header(tail in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"SSAF");
        bytes.extend_from_slice(&8000u32.to_le_bytes());
        bytes.push(16);
        bytes.extend_from_slice(&64u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(b"chan");
        bytes.extend_from_slice(&tail);

        let _ = decode(&bytes);
    }
}
