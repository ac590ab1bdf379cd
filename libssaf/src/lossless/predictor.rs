//! Second-order fixed prediction
//!
//! prediction[i] = 2*s[i-1] - s[i-2], residual[i] = s[i] - prediction[i].
//! Both directions truncate to 16 bits, so reconstruction is exact for any
//! stream whose samples fit in i16 regardless of the buffer's bit depth.

/// number of leading samples stored verbatim
pub const WARMUP: usize = 2;

#[inline]
fn prediction(prev: i32, prev2: i32) -> i32 {
    prev.wrapping_mul(2).wrapping_sub(prev2)
}

/// samples -> residuals
pub fn encode_residuals(samples: &[i32]) -> Vec<i32> {
    let mut residuals = Vec::with_capacity(samples.len());

    // warm-up: nothing to predict from yet
    residuals.extend_from_slice(&samples[..WARMUP.min(samples.len())]);

    for i in WARMUP..samples.len() {
        let pred = prediction(samples[i - 1], samples[i - 2]);
        residuals.push(samples[i].wrapping_sub(pred) as i16 as i32);
    }

    residuals
}

/// residuals -> samples
pub fn decode_residuals(residuals: &[i32]) -> Vec<i32> {
    let mut samples = Vec::with_capacity(residuals.len());

    samples.extend_from_slice(&residuals[..WARMUP.min(residuals.len())]);

    for i in WARMUP..residuals.len() {
        // s[i] = r[i] + 2*s[i-1] - s[i-2], wrapped to 16 bits
        let pred = prediction(samples[i - 1], samples[i - 2]) as i16;
        samples.push(pred.wrapping_add(residuals[i] as i16) as i32);
    }

    samples
}
