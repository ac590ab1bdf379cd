pub mod buffer;
pub mod error;
pub mod rice;
pub mod types;

pub use buffer::SampleBuffer;
pub use error::{SsafError, SsafResult};

pub use rice::{
    decode_blocks as rice_decode_blocks, encode_blocks as rice_encode_blocks,
    measure_blocks as rice_measure_blocks, unzigzag, zigzag, BitReader, BitWriter,
};

pub use types::*;
