//! Cropkit WASM - WebAssembly bindings for Cropkit
//!
//! This crate provides WASM bindings to expose the cropkit-core
//! functionality to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for pixel data
//! - `render` - The crop/rotate render engine
//! - `decode` - Image decoding bindings (bytes and data URLs)
//! - `encode` - PNG and base64 encoding bindings
//! - `session` - The interactive crop session
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropSession } from '@cropkit/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const session = JsCropSession.from_bytes(bytes, { aspect: 1, outputType: 'base64' });
//! session.set_viewport(400, 400);
//! const dataUrl = session.commit();
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod logger;
mod render;
mod session;
mod types;

// Re-export public types
pub use decode::{decode_data_url, decode_image, image_orientation};
pub use encode::{encode_base64, encode_png};
pub use render::render_crop;
pub use session::JsCropSession;
pub use types::JsPixelSurface;

/// Initialize the WASM module (called automatically on load)
///
/// Installs the console logger. Debug builds log at `debug`, release
/// builds at `info`.
#[wasm_bindgen(start)]
pub fn init() {
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    logger::install(level);
}

/// Change the console log level (`off`, `error`, `warn`, `info`, `debug`, `trace`).
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter = logger::parse_level(level).ok_or_else(|| JsValue::from_str(&format!("Unknown log level: {}", level)))?;
    logger::install(filter);
    Ok(())
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
