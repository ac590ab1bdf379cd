use tracing::{debug, debug_span};

use crate::core::{rice, ChannelChunk, SampleBuffer, SsafError, SsafFile, SsafResult};
use crate::Reader;

use super::predictor::decode_residuals;
use super::zero_run::decode_zero_runs;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// ssaf decoder
pub struct Decoder;

impl Decoder {
    pub fn new() -> Self {
        Decoder
    }

    /// decode ssaf bytes to a fresh sample buffer
    pub fn decode(&self, data: &[u8]) -> SsafResult<SampleBuffer> {
        let reader = Reader::new();
        let file = reader.read(data)?;
        self.decode_file(&file)
    }

    /// decode from a parsed container
    pub fn decode_file(&self, file: &SsafFile) -> SsafResult<SampleBuffer> {
        let header = &file.header;
        let total = header.samples as usize;

        if file.channels.len() != header.channels as usize {
            return Err(SsafError::format(format!(
                "header declares {} channels but {} were parsed",
                header.channels,
                file.channels.len()
            )));
        }

        let decode_one = |(index, chunk): (usize, &ChannelChunk)| -> SsafResult<Vec<i32>> {
            decode_channel(index, chunk, total)
        };

        #[cfg(feature = "parallel")]
        let channels = file
            .channels
            .par_iter()
            .enumerate()
            .map(decode_one)
            .collect::<SsafResult<Vec<_>>>()?;

        #[cfg(not(feature = "parallel"))]
        let channels = file
            .channels
            .iter()
            .enumerate()
            .map(decode_one)
            .collect::<SsafResult<Vec<_>>>()?;

        let mut buffer =
            SampleBuffer::silent(header.sample_rate, header.bit_depth, header.channels, total)?;

        // interleave: channel c of sample i lives at (i * channels + c) * bps
        let bps = buffer.bytes_per_sample();
        let stride = bps * header.channels as usize;
        for (c, samples) in channels.iter().enumerate() {
            for (i, &sample) in samples.iter().enumerate() {
                buffer.store_at(i * stride + c * bps, sample);
            }
        }

        Ok(buffer)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// undo rice -> zero-run -> prediction for one channel
pub fn decode_channel(index: usize, chunk: &ChannelChunk, total_samples: usize) -> SsafResult<Vec<i32>> {
    let _span = debug_span!("decode_channel", channel = index).entered();

    let compacted = rice::decode_blocks(
        &chunk.data,
        &chunk.rice_parameters,
        chunk.encoded_samples as usize,
    )?;
    let residuals = decode_zero_runs(&chunk.zero_runs, &compacted, total_samples)?;
    let samples = decode_residuals(&residuals);

    debug!(
        samples = samples.len(),
        encoded = compacted.len(),
        zero_runs = chunk.zero_runs.len(),
        "channel decoded"
    );

    Ok(samples)
}
