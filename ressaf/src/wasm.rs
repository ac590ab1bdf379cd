use wasm_bindgen::prelude::*;

use crate::{BitDepth, EncodeOptions};

fn to_js_err(e: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", e))
}

fn options(bits: Option<u8>, dither: bool) -> Result<EncodeOptions, JsValue> {
    let mut options = EncodeOptions::default();
    if let Some(bits) = bits {
        let depth = BitDepth::from_code(bits).map_err(|e| JsValue::from_str(&e.to_string()))?;
        options = options.with_bits(depth);
    }
    if !dither {
        options = options.without_dither();
    }
    Ok(options)
}

/// encode any supported audio file to ssaf
#[wasm_bindgen]
pub fn encode_audio_to_ssaf(audio_bytes: &[u8], bits: Option<u8>, dither: bool) -> Result<Vec<u8>, JsValue> {
    crate::encode_from_audio(audio_bytes, options(bits, dither)?).map_err(to_js_err)
}

#[wasm_bindgen]
pub fn decode_ssaf_to_wav(ssaf_bytes: &[u8]) -> Result<Vec<u8>, JsValue> {
    crate::decode_to_wav(ssaf_bytes).map_err(to_js_err)
}

#[wasm_bindgen]
pub fn decode_ssaf_to_samples(ssaf_bytes: &[u8]) -> Result<JsValue, JsValue> {
    let buffer = crate::decode_to_buffer(ssaf_bytes).map_err(to_js_err)?;

    // Create a JS object with the results
    let obj = js_sys::Object::new();
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("samples"),
        &js_sys::Float32Array::from(&buffer.samples_normalized()[..]).into(),
    )?;
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("sampleRate"),
        &JsValue::from_f64(buffer.sample_rate() as f64),
    )?;
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("channels"),
        &JsValue::from_f64(buffer.channels() as f64),
    )?;
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("bitDepth"),
        &JsValue::from_f64(buffer.bit_depth().bits() as f64),
    )?;
    Ok(obj.into())
}

/// container summary as a plain object
#[wasm_bindgen]
pub fn get_ssaf_file_info(ssaf_bytes: &[u8]) -> Result<JsValue, JsValue> {
    let info = crate::get_ssaf_info(ssaf_bytes).map_err(to_js_err)?;
    serde_wasm_bindgen::to_value(&info).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn get_audio_file_info(audio_bytes: &[u8]) -> Result<JsValue, JsValue> {
    let audio = crate::read_audio_from_bytes(audio_bytes).map_err(to_js_err)?;

    let obj = js_sys::Object::new();
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("sampleRate"),
        &JsValue::from_f64(audio.sample_rate as f64),
    )?;
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("channels"),
        &JsValue::from_f64(audio.channels as f64),
    )?;
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("bitDepth"),
        &JsValue::from_f64(audio.native_depth().bits() as f64),
    )?;
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("durationSecs"),
        &JsValue::from_f64(audio.duration_secs()),
    )?;
    Ok(obj.into())
}

#[wasm_bindgen]
pub fn validate_ssaf_file(ssaf_bytes: &[u8]) -> Result<bool, JsValue> {
    crate::validate_ssaf(ssaf_bytes).map_err(to_js_err)
}

/// encode, decode and compare; returns the report as a plain object
#[wasm_bindgen]
pub fn verify_audio(audio_bytes: &[u8], bits: Option<u8>, dither: bool) -> Result<JsValue, JsValue> {
    let report = crate::verify_round_trip(audio_bytes, options(bits, dither)?).map_err(to_js_err)?;
    serde_wasm_bindgen::to_value(&report).map_err(|e| JsValue::from_str(&e.to_string()))
}

// Initialize wasm-bindgen panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}
