//! Lossless encoding for SSAF
//!
//! Second-order prediction, zero-run collapsing and block-adaptive rice
//! coding. Every stage is exactly invertible; only the optional dither pass
//! in front of the encoder may change samples.

pub mod decoder;
pub mod encoder;
pub mod predictor;
pub mod zero_run;

pub use predictor::{decode_residuals, encode_residuals};
pub use zero_run::{decode_zero_runs, encode_zero_runs};

pub use decoder::Decoder;
pub use encoder::Encoder;
