use tracing::{debug, debug_span};

use crate::core::{rice, ChannelChunk, Header, SampleBuffer, SsafError, SsafFile, SsafResult};
use crate::Writer;

use super::predictor::encode_residuals;
use super::zero_run::encode_zero_runs;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// ssaf encoder
///
/// Runs the dither filter over the buffer, then for every channel:
/// prediction -> zero-run collapsing -> rice coding.
pub struct Encoder {
    dither: bool,
}

impl Encoder {
    pub fn new() -> Self {
        Encoder { dither: true }
    }

    /// Skip the dither pass. The buffer is left untouched and the round trip
    /// is exact for 16-bit-range content, at the cost of shorter zero runs.
    /// Files written this way decode with any ssaf decoder.
    pub fn without_dither(mut self) -> Self {
        self.dither = false;
        self
    }

    /// encode a buffer to ssaf bytes
    ///
    /// The buffer is dithered in place first; treat it as modified afterwards.
    pub fn encode(&self, buffer: &mut SampleBuffer) -> SsafResult<Vec<u8>> {
        let file = self.encode_file(buffer)?;
        Ok(Writer::new().write(&file))
    }

    /// encode to the parsed container model without serialising it
    pub fn encode_file(&self, buffer: &mut SampleBuffer) -> SsafResult<SsafFile> {
        if self.dither {
            buffer.apply_dither_filter();
        }

        let samples = u32::try_from(buffer.len()).map_err(|_| {
            SsafError::InvalidBuffer(format!("{} samples per channel do not fit the header", buffer.len()))
        })?;

        let header = Header {
            sample_rate: buffer.sample_rate(),
            bit_depth: buffer.bit_depth(),
            samples,
            channels: buffer.channels(),
        };

        let buffer: &SampleBuffer = buffer;
        let encode_one = |channel: u16| -> SsafResult<ChannelChunk> {
            let samples = buffer.channel_samples(channel)?;
            Ok(encode_channel(channel, &samples))
        };

        #[cfg(feature = "parallel")]
        let channels = (0..header.channels)
            .into_par_iter()
            .map(encode_one)
            .collect::<SsafResult<Vec<_>>>()?;

        #[cfg(not(feature = "parallel"))]
        let channels = (0..header.channels)
            .map(encode_one)
            .collect::<SsafResult<Vec<_>>>()?;

        Ok(SsafFile { header, channels })
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder::new()
    }
}

/// encode one channel's samples into its four chunks
pub fn encode_channel(channel: u16, samples: &[i32]) -> ChannelChunk {
    let _span = debug_span!("encode_channel", channel).entered();

    let residuals = encode_residuals(samples);
    let (zero_runs, compacted) = encode_zero_runs(&residuals);
    let (rice_parameters, data) = rice::encode_blocks(&compacted);

    debug!(
        samples = samples.len(),
        encoded = compacted.len(),
        zero_runs = zero_runs.len(),
        blocks = rice_parameters.len(),
        bytes = data.len(),
        "channel encoded"
    );

    ChannelChunk {
        encoded_samples: compacted.len() as u32,
        zero_runs,
        rice_parameters,
        data,
    }
}
