//! WASM bindings for the crop session controller.
//!
//! # Example
//!
//! ```typescript
//! const session = new JsCropSession(url, { aspect: 1, outputType: 'file' });
//! const token = session.load_token();
//! const bytes = new Uint8Array(await (await fetch(url, { mode: 'cors' })).arrayBuffer());
//! session.complete_load_bytes(token, bytes);
//!
//! session.set_viewport(container.clientWidth, container.clientHeight);
//! session.on_crop((result) => upload(result, session.state));
//!
//! zoomIn.onclick = () => session.zoom_in();
//! save.onclick = () => session.commit();
//! ```

use std::cell::RefCell;

use cropkit_core::decode::{decode_image, DecodeError};
use cropkit_core::{
    ConfigError, CropConfig, CropOutput, CropRect, CropSession, ImageReference, LoadOutcome, LoadToken,
    OutputType, SessionState,
};
use wasm_bindgen::prelude::*;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Convert a commit result into what JS callers receive: a file-like
/// `{name, type, bytes}` object, a base64 string, or `undefined`.
fn output_to_js(output: Option<CropOutput>) -> Result<JsValue, JsValue> {
    let file = match output {
        None => return Ok(JsValue::UNDEFINED),
        Some(CropOutput::Base64(url)) => return Ok(JsValue::from_str(&url)),
        Some(CropOutput::File(file)) => file,
    };

    let obj = js_sys::Object::new();
    js_sys::Reflect::set(&obj, &JsValue::from_str("name"), &JsValue::from_str(&file.name))?;
    js_sys::Reflect::set(&obj, &JsValue::from_str("type"), &JsValue::from_str(&file.mime_type))?;
    let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
    js_sys::Reflect::set(&obj, &JsValue::from_str("bytes"), &bytes)?;
    Ok(obj.into())
}

fn state_name(state: SessionState) -> &'static str {
    match state {
        SessionState::Loading => "loading",
        SessionState::Ready => "ready",
        SessionState::Failed => "failed",
        SessionState::Finished => "finished",
        SessionState::Cancelled => "cancelled",
    }
}

fn parse_output_type(name: &str) -> Option<OutputType> {
    match name {
        "file" => Some(OutputType::File),
        "base64" => Some(OutputType::Base64),
        _ => None,
    }
}

/// An interactive crop session.
///
/// Methods take `&self` so the crop callback may call back into the
/// session. No borrow of the inner session is held while JS code runs.
#[wasm_bindgen]
pub struct JsCropSession {
    inner: RefCell<CropSession>,
    on_crop: RefCell<Option<js_sys::Function>>,
}

impl JsCropSession {
    fn with_config(reference: ImageReference, config: CropConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: RefCell::new(CropSession::new(reference, config)?),
            on_crop: RefCell::new(None),
        })
    }

    /// Decode data URLs and bytes in place. Remote URLs are left for the
    /// caller to fetch.
    fn load_local(&self) -> Result<(), String> {
        let mut inner = self.inner.borrow_mut();
        inner.load_local();
        match inner.load_error() {
            Some(e) => Err(e.to_string()),
            None => Ok(()),
        }
    }

    /// Swap in a new image and decode it if it is local.
    fn replace_image(&self, reference: ImageReference) -> Result<u32, String> {
        self.inner.borrow_mut().set_image(reference);
        self.load_local()?;
        Ok(self.inner.borrow().load_token().raw())
    }

    fn create(reference: ImageReference, config: JsValue) -> Result<JsCropSession, JsValue> {
        let config = config_from_js(config)?;
        let session = Self::with_config(reference, config).map_err(js_error)?;
        session.load_local().map_err(js_error)?;
        Ok(session)
    }

    /// Hand a commit result to the registered callback.
    fn deliver(&self, value: &JsValue) {
        // Cloned so the callback may register a new one
        let callback = self.on_crop.borrow().clone();
        if let Some(callback) = callback {
            if let Err(e) = callback.call1(&JsValue::NULL, value) {
                log::warn!("Crop callback failed: {:?}", e);
            }
        }
    }
}

fn config_from_js(config: JsValue) -> Result<CropConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(CropConfig::default());
    }
    serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&format!("Invalid crop config: {}", e)))
}

#[wasm_bindgen]
impl JsCropSession {
    /// Create a session for an image URL.
    ///
    /// `config` is an optional object with camelCase fields (`aspect`,
    /// `scaleFactor`, `zoomStep`, `sliderStep`, `outputType`, `rotation`,
    /// `filter`, `limits`). `data:` URLs are decoded immediately and a
    /// decode failure is thrown. Other URLs must be fetched by the caller
    /// and passed to `complete_load_bytes`.
    #[wasm_bindgen(constructor)]
    pub fn new(url: String, config: JsValue) -> Result<JsCropSession, JsValue> {
        Self::create(ImageReference::Url(url), config)
    }

    /// Create a session for file bytes, decoded immediately.
    pub fn from_bytes(bytes: Vec<u8>, config: JsValue) -> Result<JsCropSession, JsValue> {
        Self::create(ImageReference::Bytes(bytes), config)
    }

    /// Register the function called with every commit result.
    pub fn on_crop(&self, callback: js_sys::Function) {
        *self.on_crop.borrow_mut() = Some(callback);
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Replace the image with a URL. Returns the load token to pass to
    /// `complete_load_bytes` or `fail_load`. Throws if a `data:` URL fails
    /// to decode.
    pub fn set_image_url(&self, url: String) -> Result<u32, JsValue> {
        self.replace_image(ImageReference::Url(url)).map_err(js_error)
    }

    /// Replace the image with file bytes and decode them.
    pub fn set_image_bytes(&self, bytes: Vec<u8>) -> Result<(), JsValue> {
        self.replace_image(ImageReference::Bytes(bytes))
            .map(|_| ())
            .map_err(js_error)
    }

    /// Token for the image currently being loaded.
    pub fn load_token(&self) -> u32 {
        self.inner.borrow().load_token().raw()
    }

    /// Hand over fetched bytes for the image identified by `token`.
    ///
    /// Returns `false` if the image has been replaced since the token was
    /// issued. A decode failure moves the session to the `failed` state.
    pub fn complete_load_bytes(&self, token: u32, bytes: &[u8]) -> bool {
        let result = decode_image(bytes);
        self.inner.borrow_mut().complete_load(LoadToken::from_raw(token), result) == LoadOutcome::Applied
    }

    /// Report that fetching or reading back the image failed.
    ///
    /// Set `cross_origin` when the failure came from a tainted canvas or a
    /// CORS rejection.
    pub fn fail_load(&self, token: u32, message: String, cross_origin: bool) -> bool {
        let error = if cross_origin {
            DecodeError::CrossOriginDenied(message)
        } else {
            DecodeError::CorruptedFile(message)
        };
        self.inner.borrow_mut().complete_load(LoadToken::from_raw(token), Err(error)) == LoadOutcome::Applied
    }

    /// Message of the last load failure, if any.
    pub fn load_error(&self) -> Option<String> {
        self.inner.borrow().load_error().map(|e| e.to_string())
    }

    /// One of `loading`, `ready`, `failed`, `finished`, `cancelled`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        state_name(self.inner.borrow().state()).to_string()
    }

    /// True while a commit is in flight, including while the crop
    /// callback runs.
    #[wasm_bindgen(getter)]
    pub fn is_loading(&self) -> bool {
        self.inner.borrow().is_loading()
    }

    // ------------------------------------------------------------------
    // Geometry and configuration
    // ------------------------------------------------------------------

    pub fn set_viewport(&self, width: f64, height: f64) {
        self.inner.borrow_mut().set_viewport(width, height);
    }

    pub fn set_aspect(&self, aspect: f64) -> Result<(), JsValue> {
        self.inner.borrow_mut().set_aspect(aspect).map_err(js_error)
    }

    pub fn set_scale_factor(&self, scale_factor: f64) -> Result<(), JsValue> {
        self.inner.borrow_mut().set_scale_factor(scale_factor).map_err(js_error)
    }

    /// Select `file` or `base64` output.
    pub fn set_output_type(&self, output_type: &str) -> Result<(), JsValue> {
        let output_type = parse_output_type(output_type)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown output type: {}", output_type)))?;
        self.inner.borrow_mut().set_output_type(output_type);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Zoom, pan and rotation
    // ------------------------------------------------------------------

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f64 {
        self.inner.borrow().zoom()
    }

    pub fn set_zoom(&self, zoom: f64) {
        self.inner.borrow_mut().set_zoom(zoom);
    }

    pub fn zoom_in(&self) -> f64 {
        self.inner.borrow_mut().zoom_in()
    }

    pub fn zoom_out(&self) -> f64 {
        self.inner.borrow_mut().zoom_out()
    }

    /// `{min, max}` of the allowed zoom.
    pub fn zoom_bounds(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.borrow().zoom_bounds()).map_err(js_error)
    }

    /// `{min, max, step, value}` for a zoom slider.
    pub fn slider(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.borrow().slider()).map_err(js_error)
    }

    pub fn set_pan(&self, x: f64, y: f64) {
        self.inner.borrow_mut().set_pan(x, y);
    }

    #[wasm_bindgen(getter)]
    pub fn rotation(&self) -> f64 {
        self.inner.borrow().rotation().degrees()
    }

    pub fn set_rotation(&self, degrees: f64) {
        self.inner.borrow_mut().set_rotation(degrees);
    }

    // ------------------------------------------------------------------
    // Crop and commit
    // ------------------------------------------------------------------

    /// `{x, y, width, height}` in source pixels, or `undefined`.
    pub fn crop_rect(&self) -> Result<JsValue, JsValue> {
        match self.inner.borrow().crop_rect() {
            Some(rect) => serde_wasm_bindgen::to_value(&rect).map_err(js_error),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Accept the pixel rectangle reported by a crop widget.
    pub fn set_crop_area_pixels(&self, x: i32, y: i32, width: u32, height: u32) {
        self.inner.borrow_mut().set_crop_area_pixels(CropRect::new(x, y, width, height));
    }

    /// Render and encode the crop.
    ///
    /// Resolves to `{name, type, bytes}` for file output, a data URL string
    /// for base64 output, or `undefined` when there is nothing to commit or
    /// the commit failed. The crop callback receives the same value before
    /// `is_loading` is cleared.
    pub fn commit(&self) -> Result<JsValue, JsValue> {
        let Some(job) = self.inner.borrow_mut().begin_commit() else {
            return Ok(JsValue::UNDEFINED);
        };
        let output = self.inner.borrow_mut().settle_commit(job.run());

        let value = output_to_js(output);
        if let Ok(value) = &value {
            self.deliver(value);
        }

        self.inner.borrow_mut().end_commit();
        value
    }

    /// Discard the session without producing output.
    pub fn cancel(&self) {
        self.inner.borrow_mut().cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropkit_core::{encode_png, PixelSurface};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        encode_png(&PixelSurface::solid(width, height, [0, 128, 255, 255])).unwrap()
    }

    fn remote_session(url: &str) -> JsCropSession {
        JsCropSession::with_config(ImageReference::Url(url.to_string()), CropConfig::default()).unwrap()
    }

    #[test]
    fn test_bytes_session_loads_immediately() {
        let session = JsCropSession::with_config(ImageReference::Bytes(png_bytes(20, 10)), CropConfig::default())
            .unwrap();
        assert_eq!(session.load_local(), Ok(()));
        assert_eq!(session.state(), "ready");
    }

    #[test]
    fn test_garbage_bytes_report_load_error() {
        let session = JsCropSession::with_config(ImageReference::Bytes(vec![0x00, 0x01, 0x02, 0x03]), CropConfig::default())
            .unwrap();

        let error = session.load_local().unwrap_err();
        assert!(!error.is_empty());
        assert_eq!(session.state(), "failed");
        assert_eq!(session.load_error(), Some(error));
    }

    #[test]
    fn test_bad_data_url_replacement_reports_error() {
        let session = remote_session("https://example.com/a.png");

        assert!(session.replace_image(ImageReference::Url("data:image/png;base64,!!!".to_string())).is_err());
        assert_eq!(session.state(), "failed");

        let token = session.replace_image(ImageReference::Bytes(png_bytes(4, 4))).unwrap();
        assert_eq!(token, session.load_token());
        assert_eq!(session.state(), "ready");
    }

    #[test]
    fn test_remote_session_waits_for_bytes() {
        let session = remote_session("https://example.com/a.png");
        assert_eq!(session.load_local(), Ok(()));
        assert_eq!(session.state(), "loading");

        let token = session.load_token();
        assert!(session.complete_load_bytes(token, &png_bytes(800, 600)));
        session.set_viewport(400.0, 400.0);

        assert_eq!(session.state(), "ready");
        assert!((session.zoom() - 400.0 / 600.0).abs() < 1e-12);
    }

    #[test]
    fn test_stale_token_ignored() {
        let session = remote_session("https://example.com/a.png");
        let old = session.load_token();
        let new = session.replace_image(ImageReference::Url("https://example.com/b.png".to_string())).unwrap();

        assert_ne!(old, new);
        assert!(!session.complete_load_bytes(old, &png_bytes(4, 4)));
        assert_eq!(session.state(), "loading");
    }

    #[test]
    fn test_fail_load_cross_origin() {
        let session = remote_session("https://other.example/a.png");
        let token = session.load_token();
        assert!(session.fail_load(token, "tainted canvas".to_string(), true));

        assert_eq!(session.state(), "failed");
        assert!(session.load_error().unwrap().contains("tainted canvas"));
    }

    #[test]
    fn test_zoom_steps() {
        let session = JsCropSession::with_config(ImageReference::Bytes(png_bytes(100, 100)), CropConfig::default())
            .unwrap();
        session.load_local().unwrap();
        session.set_viewport(400.0, 400.0);

        // min zoom 4, max 20
        assert_eq!(session.zoom_in(), 4.5);
        assert_eq!(session.zoom_out(), 4.0);
        assert_eq!(session.zoom_out(), 4.0);
    }

    #[test]
    fn test_parse_output_type() {
        assert_eq!(parse_output_type("file"), Some(OutputType::File));
        assert_eq!(parse_output_type("base64"), Some(OutputType::Base64));
        assert_eq!(parse_output_type("blob"), None);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = CropConfig::default();
        config.scale_factor = 0.0;
        assert!(JsCropSession::with_config(ImageReference::Bytes(vec![]), config).is_err());
    }
}
