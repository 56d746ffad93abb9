//! JavaScript bindings.
//!
//! A browser front end hands over the raw file bytes and a color count and
//! gets back plain JS values; palettes travel back in as `#rrggbb` strings.

use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

use crate::{Palette, PaletteError, PaletteExtractor};

fn to_js(err: PaletteError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn palette_from_js(hexes: &Array) -> Result<Palette, JsValue> {
    let mut values = Vec::with_capacity(hexes.length() as usize);
    for val in hexes.iter() {
        let s = val
            .as_string()
            .ok_or_else(|| JsValue::from_str("Palette values must be strings"))?;
        values.push(s);
    }
    Palette::from_hex(&values).map_err(to_js)
}

/// Extract `k` colors from an encoded image.
///
/// Returns an array of `{ hex, text }` objects in palette order, where
/// `text` is `"white"` or `"black"`.
#[wasm_bindgen(js_name = extractPalette)]
pub fn extract_palette(input: Vec<u8>, k: usize) -> Result<Array, JsValue> {
    let palette = PaletteExtractor::default()
        .extract_bytes(&input, k)
        .map_err(to_js)?;

    let out = Array::new();
    for swatch in palette.swatches() {
        let entry = Object::new();
        Reflect::set(&entry, &JsValue::from_str("hex"), &JsValue::from_str(&swatch.hex))?;
        Reflect::set(&entry, &JsValue::from_str("text"), &JsValue::from_str(swatch.text.as_str()))?;
        out.push(&entry);
    }
    Ok(out)
}

/// GIMP palette text for the given `#rrggbb` colors.
#[wasm_bindgen(js_name = encodeGpl)]
pub fn encode_gpl(hexes: Array) -> Result<String, JsValue> {
    crate::encode_gpl(&palette_from_js(&hexes)?).map_err(to_js)
}

/// PNG swatch strip for the given `#rrggbb` colors.
#[wasm_bindgen(js_name = encodeSwatchPng)]
pub fn encode_swatch_png(hexes: Array, scale: u32) -> Result<Uint8Array, JsValue> {
    let png = crate::encode_swatch_png(&palette_from_js(&hexes)?, scale).map_err(to_js)?;
    Ok(Uint8Array::from(png.as_slice()))
}
