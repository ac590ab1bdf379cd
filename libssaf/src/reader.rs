use crate::core::{
    rice, BitDepth, ChannelChunk, Header, SsafError, SsafFile, SsafResult, ZeroRun, CHANNEL_TAG,
    DATA_TAG, MAGIC, RICE_TAG, ZERO_RUN_TAG,
};

/// binary reader for the ssaf container
pub struct Reader;

impl Reader {
    /// new reader
    pub fn new() -> Self {
        Reader
    }

    /// read and parse an ssaf container
    pub fn read(&self, data: &[u8]) -> SsafResult<SsafFile> {
        let mut cursor = Cursor::new(data);

        let header = self.read_header(&mut cursor)?;

        // chunk order is fixed, so channels are read back to back
        let mut channels = Vec::with_capacity(header.channels as usize);
        for index in 0..header.channels {
            let channel = self
                .read_channel(&mut cursor, header.samples)
                .map_err(|e| match e {
                    SsafError::Format(msg) => {
                        SsafError::Format(format!("channel {}: {}", index, msg))
                    }
                    other => other,
                })?;
            channels.push(channel);
        }

        Ok(SsafFile { header, channels })
    }

    /// parse only the top-level header
    pub fn read_header_only(&self, data: &[u8]) -> SsafResult<Header> {
        let mut cursor = Cursor::new(data);
        self.read_header(&mut cursor)
    }

    fn read_header(&self, cursor: &mut Cursor) -> SsafResult<Header> {
        // magic
        cursor.expect_tag(&MAGIC, "file")?;

        Ok(Header {
            sample_rate: cursor.read_u32_le()?,
            bit_depth: BitDepth::from_code(cursor.read_u8()?)?,
            samples: cursor.read_u32_le()?,
            channels: cursor.read_u16_le()?,
        })
    }

    fn read_channel(&self, cursor: &mut Cursor, total_samples: u32) -> SsafResult<ChannelChunk> {
        // channel chunk
        cursor.expect_tag(&CHANNEL_TAG, "channel")?;
        let encoded_samples = cursor.read_u32_le()?;

        if encoded_samples > total_samples {
            return Err(SsafError::format(format!(
                "{} encoded samples exceed {} total samples",
                encoded_samples, total_samples
            )));
        }

        // zero-run chunk
        cursor.expect_tag(&ZERO_RUN_TAG, "zero-run")?;
        let run_count = cursor.read_u32_le()? as usize;
        cursor.ensure_remaining(run_count.saturating_mul(8))?;

        let mut zero_runs = Vec::with_capacity(run_count);
        for _ in 0..run_count {
            let offset = cursor.read_u32_le()?;
            let length = cursor.read_u32_le()?;
            zero_runs.push(ZeroRun::new(offset, length));
        }

        // rice chunk
        cursor.expect_tag(&RICE_TAG, "rice")?;
        let param_count = cursor.read_u32_le()? as usize;
        cursor.ensure_remaining(param_count.saturating_mul(4))?;

        let mut rice_parameters = Vec::with_capacity(param_count);
        for _ in 0..param_count {
            rice_parameters.push(cursor.read_i32_le()?);
        }

        // data chunk: find its end by walking the rice bits
        cursor.expect_tag(&DATA_TAG, "data")?;
        let data_len = rice::measure_blocks(
            cursor.remaining(),
            &rice_parameters,
            encoded_samples as usize,
        )?;
        let data = cursor.read_bytes(data_len)?;

        Ok(ChannelChunk {
            encoded_samples,
            zero_runs,
            rice_parameters,
            data,
        })
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

// cursor helper

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn ensure_remaining(&self, count: usize) -> SsafResult<()> {
        if self.data.len() - self.pos < count {
            return Err(SsafError::eof());
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> SsafResult<[u8; N]> {
        self.ensure_remaining(N)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(bytes)
    }

    fn read_bytes(&mut self, count: usize) -> SsafResult<Vec<u8>> {
        self.ensure_remaining(count)?;
        let bytes = self.data[self.pos..self.pos + count].to_vec();
        self.pos += count;
        Ok(bytes)
    }

    /// read a 4-byte tag and compare it with the expected literal
    fn expect_tag(&mut self, expected: &[u8; 4], chunk: &str) -> SsafResult<()> {
        let tag = self.read_array::<4>()?;
        if &tag != expected {
            return Err(SsafError::format(format!(
                "bad {} tag: expected {:?}, found {:?}",
                chunk,
                String::from_utf8_lossy(expected),
                String::from_utf8_lossy(&tag)
            )));
        }
        Ok(())
    }

    fn read_u8(&mut self) -> SsafResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    fn read_u16_le(&mut self) -> SsafResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    fn read_u32_le(&mut self) -> SsafResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    fn read_i32_le(&mut self) -> SsafResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }
}
