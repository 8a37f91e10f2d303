//! WASM bindings for in-browser conversion.
//!
//! This module exposes the conversion pipeline to JavaScript via wasm-bindgen.

use wasm_bindgen::prelude::*;

use crate::convert::content_to_liquid_json;
use crate::options::RenderOptions;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Convert a content tree to Liquid.
///
/// Takes the content JSON, the model name, and an options JSON object (an
/// empty string means defaults). Returns
/// `{"html": ..., "css": ..., "diagnostics": [...]}` as JSON; `css` is omitted
/// unless `extractCss` is set and `diagnostics` when there are none.
#[wasm_bindgen]
pub fn content_to_liquid(json: &str, model_name: &str, options_json: &str) -> Result<String, JsValue> {
    let options = if options_json.trim().is_empty() {
        RenderOptions::default()
    } else {
        RenderOptions::from_json(options_json).map_err(|e| JsValue::from_str(&e.to_string()))?
    };

    let result = content_to_liquid_json(json, model_name, &options)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}
