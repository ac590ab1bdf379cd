//! Sample buffer and dither filter tests

use libssaf_audio::{BitDepth, SampleBuffer, SsafError};

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_derives_shape() {
    let buffer = SampleBuffer::new(44100, BitDepth::B16, 2, vec![0; 16]).unwrap();

    assert_eq!(buffer.bytes_per_sample(), 2);
    assert_eq!(buffer.len(), 4);
    assert_eq!(buffer.min_value(), -32768);
    assert_eq!(buffer.max_value(), 32767);
}

#[test]
fn test_new_rejects_partial_frames() {
    let err = SampleBuffer::new(44100, BitDepth::B24, 2, vec![0; 7]).unwrap_err();
    assert!(matches!(err, SsafError::InvalidBuffer(_)));
}

#[test]
fn test_new_rejects_zero_channels() {
    assert!(SampleBuffer::new(44100, BitDepth::B16, 0, vec![]).is_err());
}

#[test]
fn test_from_samples_rejects_out_of_range() {
    let err = SampleBuffer::from_samples(8000, BitDepth::B8, 1, &[0, 128]).unwrap_err();
    assert_eq!(
        err,
        SsafError::ValueOutOfRange {
            value: 128,
            bit_depth: 8
        }
    );
}

// ============================================================================
// Addressing
// ============================================================================

#[test]
fn test_index_layout() {
    let buffer = SampleBuffer::silent(48000, BitDepth::B24, 3, 10).unwrap();

    assert_eq!(buffer.index(0, 0).unwrap(), 0);
    assert_eq!(buffer.index(0, 2).unwrap(), 6);
    assert_eq!(buffer.index(4, 1).unwrap(), 4 * 9 + 3);
}

#[test]
fn test_index_out_of_range() {
    let buffer = SampleBuffer::silent(48000, BitDepth::B16, 2, 10).unwrap();

    let err = buffer.index(10, 0).unwrap_err();
    assert_eq!(err, SsafError::SampleOutOfRange { index: 10, len: 10 });
    assert!(err.is_range_error());

    let err = buffer.index(0, 2).unwrap_err();
    assert_eq!(
        err,
        SsafError::ChannelOutOfRange {
            channel: 2,
            channels: 2
        }
    );
}

// ============================================================================
// Typed reads and writes
// ============================================================================

#[test]
fn test_read_every_depth() {
    let b8 = SampleBuffer::new(8000, BitDepth::B8, 1, vec![0x80, 0x7F, 0xFF]).unwrap();
    assert_eq!(b8.samples(), vec![-128, 127, -1]);

    let b16 = SampleBuffer::new(8000, BitDepth::B16, 1, vec![0x00, 0x80, 0x34, 0x12]).unwrap();
    assert_eq!(b16.samples(), vec![-32768, 0x1234]);

    let b24 = SampleBuffer::new(8000, BitDepth::B24, 1, vec![0xFF, 0xFF, 0x7F, 0x01, 0x00, 0x80]).unwrap();
    assert_eq!(b24.samples(), vec![8_388_607, -8_388_607]);

    let b32 = SampleBuffer::new(8000, BitDepth::B32, 1, (-5i32).to_le_bytes().to_vec()).unwrap();
    assert_eq!(b32.samples(), vec![-5]);
}

#[test]
fn test_set_sample_writes_little_endian() {
    let mut buffer = SampleBuffer::silent(44100, BitDepth::B24, 1, 2).unwrap();
    buffer.set_sample(1, 0, -2).unwrap();

    assert_eq!(buffer.data(), &[0, 0, 0, 0xFE, 0xFF, 0xFF]);
    assert_eq!(buffer.sample(1, 0).unwrap(), -2);
}

#[test]
fn test_set_sample_rejects_out_of_range() {
    let mut buffer = SampleBuffer::silent(44100, BitDepth::B16, 1, 4).unwrap();

    assert!(buffer.set_sample(0, 0, 32767).is_ok());
    assert!(buffer.set_sample(0, 0, -32768).is_ok());

    let err = buffer.set_sample(0, 0, 32768).unwrap_err();
    assert!(err.is_range_error());
    let err = buffer.set_sample(0, 0, -32769).unwrap_err();
    assert!(err.is_range_error());

    // failed writes leave storage untouched
    assert_eq!(buffer.sample(0, 0).unwrap(), -32768);
}

#[test]
fn test_sample_at_checks_alignment() {
    let buffer = SampleBuffer::from_samples(44100, BitDepth::B16, 1, &[7, 9]).unwrap();

    assert_eq!(buffer.sample_at(2).unwrap(), 9);
    assert!(buffer.sample_at(1).is_err());
    assert!(buffer.sample_at(4).is_err());
}

// ============================================================================
// Bulk extraction
// ============================================================================

#[test]
fn test_interleaved_and_channel_extraction() {
    let samples = [1, -1, 2, -2, 3, -3];
    let buffer = SampleBuffer::from_samples(44100, BitDepth::B16, 2, &samples).unwrap();

    assert_eq!(buffer.samples(), samples.to_vec());
    assert_eq!(buffer.channel_samples(0).unwrap(), vec![1, 2, 3]);
    assert_eq!(buffer.channel_samples(1).unwrap(), vec![-1, -2, -3]);
    assert!(buffer.channel_samples(2).is_err());
}

#[test]
fn test_normalized_maps_range_to_unit() {
    let buffer = SampleBuffer::from_samples(8000, BitDepth::B8, 1, &[-128, 127]).unwrap();
    let normalized = buffer.samples_normalized();

    assert!((normalized[0] + 1.0).abs() < 1e-6);
    assert!((normalized[1] - 1.0).abs() < 1e-6);

    let first = buffer.sample_normalized(0, 0).unwrap();
    assert!((first + 1.0).abs() < 1e-6);
}

#[test]
fn test_channel_normalized() {
    let buffer = SampleBuffer::from_samples(44100, BitDepth::B16, 2, &[-32768, 32767]).unwrap();
    let right = buffer.channel_samples_normalized(1).unwrap();
    assert_eq!(right.len(), 1);
    assert!((right[0] - 1.0).abs() < 1e-6);
}

// ============================================================================
// Dither filter
// ============================================================================

#[test]
fn test_dither_zeroes_quiet_stretches() {
    let mut buffer =
        SampleBuffer::from_samples(44100, BitDepth::B16, 1, &[2, 3, 1, -2, 100, 1, 2, 3]).unwrap();
    buffer.apply_dither_filter();

    // last sample is never touched
    assert_eq!(buffer.samples(), vec![0, 0, 0, -2, 100, 1, 0, 3]);
}

#[test]
fn test_dither_uses_magnitude() {
    let mut buffer =
        SampleBuffer::from_samples(44100, BitDepth::B16, 1, &[-1000, -2000, -3000]).unwrap();
    buffer.apply_dither_filter();

    assert_eq!(buffer.samples(), vec![-1000, -2000, -3000]);
}

#[test]
fn test_dither_threshold_is_exclusive() {
    let mut buffer = SampleBuffer::from_samples(44100, BitDepth::B16, 1, &[4, 3, 3, 3, 4]).unwrap();
    buffer.apply_dither_filter();

    // 4 is not quiet, so only the middle sample qualifies
    assert_eq!(buffer.samples(), vec![4, 3, 0, 3, 4]);
}

#[test]
fn test_dither_channels_are_independent() {
    // left is quiet, right is loud
    let samples = [1, 500, -1, -500, 2, 500, 1, -500];
    let mut buffer = SampleBuffer::from_samples(44100, BitDepth::B16, 2, &samples).unwrap();
    buffer.apply_dither_filter();

    assert_eq!(buffer.channel_samples(0).unwrap(), vec![0, 0, 0, 1]);
    assert_eq!(buffer.channel_samples(1).unwrap(), vec![500, -500, 500, -500]);
}

#[test]
fn test_dither_short_buffers() {
    let mut single = SampleBuffer::from_samples(44100, BitDepth::B16, 1, &[1]).unwrap();
    single.apply_dither_filter();
    assert_eq!(single.samples(), vec![1]);

    let mut pair = SampleBuffer::from_samples(44100, BitDepth::B16, 1, &[1, 2]).unwrap();
    pair.apply_dither_filter();
    assert_eq!(pair.samples(), vec![0, 2]);

    let mut empty = SampleBuffer::silent(44100, BitDepth::B16, 1, 0).unwrap();
    empty.apply_dither_filter();
    assert!(empty.is_empty());
}

#[test]
fn test_dither_leaves_loud_audio_alone() {
    let samples: Vec<i32> = (0..2000).map(|i| 5000 + ((i as f32 * 0.05).sin() * 3000.0) as i32).collect();
    let mut buffer = SampleBuffer::from_samples(44100, BitDepth::B16, 1, &samples).unwrap();
    let before = buffer.clone();

    buffer.apply_dither_filter();
    assert_eq!(buffer, before);
}

// ============================================================================
// Fingerprint
// ============================================================================

#[test]
fn test_fingerprint_tracks_content_and_format() {
    let a = SampleBuffer::from_samples(44100, BitDepth::B16, 1, &[1, 2, 3, 4]).unwrap();
    let b = SampleBuffer::from_samples(44100, BitDepth::B16, 1, &[1, 2, 3, 4]).unwrap();
    let c = SampleBuffer::from_samples(44100, BitDepth::B16, 1, &[1, 2, 3, 5]).unwrap();
    let d = SampleBuffer::from_samples(48000, BitDepth::B16, 1, &[1, 2, 3, 4]).unwrap();

    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
    assert_ne!(a.fingerprint(), d.fingerprint());
    assert_eq!(a.fingerprint().len(), 64);
}
