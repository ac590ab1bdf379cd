use crate::core::{ChannelChunk, Header, SsafFile, CHANNEL_TAG, DATA_TAG, MAGIC, RICE_TAG, ZERO_RUN_TAG};

/// binary writer for the ssaf container
pub struct Writer {
    buffer: Vec<u8>,
}

impl Writer {
    /// new writer
    pub fn new() -> Self {
        Writer { buffer: Vec::new() }
    }

    /// write a complete ssaf container
    pub fn write(mut self, file: &SsafFile) -> Vec<u8> {
        self.buffer.reserve(file.byte_size());

        self.write_header(&file.header);
        for channel in &file.channels {
            self.write_channel(channel);
        }

        self.buffer
    }

    fn write_header(&mut self, header: &Header) {
        // Magic "SSAF"
        self.buffer.extend_from_slice(&MAGIC);

        // Sample Rate (u32 LE)
        self.buffer.extend_from_slice(&header.sample_rate.to_le_bytes());

        // Bit Depth (u8)
        self.buffer.push(header.bit_depth.bits());

        // Samples per channel (u32 LE)
        self.buffer.extend_from_slice(&header.samples.to_le_bytes());

        // Channels (u16 LE)
        self.buffer.extend_from_slice(&header.channels.to_le_bytes());
    }

    fn write_channel(&mut self, channel: &ChannelChunk) {
        // channel chunk
        self.buffer.extend_from_slice(&CHANNEL_TAG);
        self.buffer.extend_from_slice(&channel.encoded_samples.to_le_bytes());

        // zero-run chunk
        self.buffer.extend_from_slice(&ZERO_RUN_TAG);
        self.buffer
            .extend_from_slice(&(channel.zero_runs.len() as u32).to_le_bytes());
        for run in &channel.zero_runs {
            self.buffer.extend_from_slice(&run.offset.to_le_bytes());
            self.buffer.extend_from_slice(&run.length.to_le_bytes());
        }

        // rice chunk
        self.buffer.extend_from_slice(&RICE_TAG);
        self.buffer
            .extend_from_slice(&(channel.rice_parameters.len() as u32).to_le_bytes());
        for &k in &channel.rice_parameters {
            self.buffer.extend_from_slice(&k.to_le_bytes());
        }

        // data chunk, no length: the rice parameters say how many bits follow
        self.buffer.extend_from_slice(&DATA_TAG);
        self.buffer.extend_from_slice(&channel.data);
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}
