//! The crop session controller.
//!
//! A [`CropSession`] owns everything an interactive crop needs: the image
//! reference, the decoded surface once it arrives, the derived zoom
//! geometry, the current pan/zoom/rotation and the resulting pixel crop
//! rectangle. The host drives it with explicit calls; every change to the
//! image or configuration re-derives the initial geometry.
//!
//! # Loading
//!
//! Decoding is asynchronous on the host side. [`CropSession::load_token`]
//! hands out a token for the current image; [`CropSession::complete_load`]
//! applies a decoded surface only if the token still matches. Results for
//! an image that has since been replaced are dropped.
//!
//! # Committing
//!
//! A commit is split in three so the expensive part can run off the
//! interaction thread:
//!
//! ```text
//! begin_commit()  -> Option<CommitJob>   gate, sets is_loading
//! CommitJob::run  -> Result<CropOutput>  render + encode, Send
//! finish_commit() -> Option<CropOutput>  notifies, then clears is_loading
//! ```
//!
//! [`CropSession::commit`] runs all three in place. Hosts that deliver the
//! result themselves call [`CropSession::settle_commit`], hand the output
//! over, then call [`CropSession::end_commit`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, CropConfig};
use crate::decode::{load_reference, DecodeError, ImageReference};
use crate::encode::{encode_output, CropOutput, EncodeError, OutputType};
use crate::geometry::{
    crop_area_pixels, derive_initial_geometry, restrict_pan, CropFrame, CropRect, MediaDescriptor,
    Pan, RotationAngle, Viewport, ZoomBounds,
};
use crate::render::{render, RenderError, RenderOptions};
use crate::surface::PixelSurface;

/// Callback receiving the result of every commit that reached the engine.
pub type CropCallback = Box<dyn FnMut(Option<CropOutput>)>;

/// Errors from running a commit job.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommitError {
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    #[error("Encode failed: {0}")]
    Encode(#[from] EncodeError),
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Waiting for the current image to decode.
    Loading,
    /// An image is loaded; the session is interactive.
    Ready,
    /// The current image failed to load.
    Failed,
    /// A commit succeeded and the session was discarded.
    Finished,
    /// The session was cancelled.
    Cancelled,
}

impl SessionState {
    /// Finished and cancelled sessions accept no further work.
    pub fn is_discarded(self) -> bool {
        matches!(self, SessionState::Finished | SessionState::Cancelled)
    }
}

/// Identifies the image a load result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadToken(u32);

impl LoadToken {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Whether a load result was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Stale,
}

/// What a zoom slider widget needs to render itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderInfo {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
}

/// A snapshot of everything a commit needs, detached from the session.
#[derive(Debug, Clone)]
pub struct CommitJob {
    surface: Arc<PixelSurface>,
    crop: CropRect,
    rotation: RotationAngle,
    options: RenderOptions,
    output_type: OutputType,
}

impl CommitJob {
    /// The rectangle this job renders.
    pub fn crop(&self) -> CropRect {
        self.crop
    }

    /// Render and encode the crop.
    pub fn run(self) -> Result<CropOutput, CommitError> {
        let rendered = render(&self.surface, &self.crop, self.rotation, &self.options)?;
        let output = encode_output(&rendered, self.output_type)?;
        Ok(output)
    }
}

/// An interactive crop of one image.
pub struct CropSession {
    config: CropConfig,
    reference: ImageReference,
    generation: u32,
    surface: Option<Arc<PixelSurface>>,
    media: Option<MediaDescriptor>,
    load_error: Option<DecodeError>,
    viewport: Option<Viewport>,
    zoom: f64,
    bounds: ZoomBounds,
    frame: Option<CropFrame>,
    pan: Pan,
    rotation: RotationAngle,
    crop: Option<CropRect>,
    is_loading: bool,
    state: SessionState,
    on_crop: Option<CropCallback>,
}

impl fmt::Debug for CropSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CropSession")
            .field("reference", &self.reference.describe())
            .field("generation", &self.generation)
            .field("media", &self.media)
            .field("zoom", &self.zoom)
            .field("bounds", &self.bounds)
            .field("rotation", &self.rotation)
            .field("crop", &self.crop)
            .field("is_loading", &self.is_loading)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl CropSession {
    /// Create a session for `reference`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn new(reference: impl Into<ImageReference>, config: CropConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let reference = reference.into();
        log::info!("Crop session created for {}", reference.describe());

        Ok(Self {
            rotation: RotationAngle::from_degrees(config.rotation),
            config,
            reference,
            generation: 0,
            surface: None,
            media: None,
            load_error: None,
            viewport: None,
            zoom: ZoomBounds::default().min,
            bounds: ZoomBounds::default(),
            frame: None,
            pan: Pan::default(),
            crop: None,
            is_loading: false,
            state: SessionState::Loading,
            on_crop: None,
        })
    }

    /// Attach the callback that receives commit results.
    pub fn with_on_crop(mut self, callback: impl FnMut(Option<CropOutput>) + 'static) -> Self {
        self.set_on_crop(callback);
        self
    }

    /// Replace the callback that receives commit results.
    pub fn set_on_crop(&mut self, callback: impl FnMut(Option<CropOutput>) + 'static) {
        self.on_crop = Some(Box::new(callback));
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    pub fn reference(&self) -> &ImageReference {
        &self.reference
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True while a commit is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// The error from the most recent failed load, if any.
    pub fn load_error(&self) -> Option<&DecodeError> {
        self.load_error.as_ref()
    }

    // ========================================================================
    // Image loading
    // ========================================================================

    /// Replace the image. Anything derived from the previous image is
    /// dropped and loads still pending for it become stale.
    pub fn set_image(&mut self, reference: impl Into<ImageReference>) {
        if self.state.is_discarded() {
            log::warn!("Ignoring image change on a {:?} session", self.state);
            return;
        }

        self.reference = reference.into();
        self.generation = self.generation.wrapping_add(1);
        self.surface = None;
        self.media = None;
        self.load_error = None;
        self.crop = None;
        self.frame = None;
        self.pan = Pan::default();
        self.state = SessionState::Loading;

        log::info!("Image changed to {}", self.reference.describe());
    }

    /// Token for the image currently being loaded.
    pub fn load_token(&self) -> LoadToken {
        LoadToken(self.generation)
    }

    /// Apply the result of decoding the image identified by `token`.
    pub fn complete_load(
        &mut self,
        token: LoadToken,
        result: Result<PixelSurface, DecodeError>,
    ) -> LoadOutcome {
        if self.state.is_discarded() || token.0 != self.generation {
            log::warn!(
                "Dropping stale load result (token {}, current {})",
                token.0,
                self.generation
            );
            return LoadOutcome::Stale;
        }

        match result {
            Ok(surface) if surface.is_empty() => self.fail_load(DecodeError::EmptyImage),
            Ok(surface) => {
                let media = MediaDescriptor::new(surface.width, surface.height);
                log::info!(
                    "Image loaded: {}x{} from {}",
                    media.width,
                    media.height,
                    self.reference.describe()
                );

                self.surface = Some(Arc::new(surface));
                self.media = Some(media);
                self.load_error = None;
                self.state = SessionState::Ready;
                self.on_image_changed();
            }
            Err(e) => self.fail_load(e),
        }

        LoadOutcome::Applied
    }

    fn fail_load(&mut self, error: DecodeError) {
        log::warn!("Image load failed for {}: {}", self.reference.describe(), error);
        self.surface = None;
        self.media = None;
        self.crop = None;
        self.frame = None;
        self.load_error = Some(error);
        self.state = SessionState::Failed;
    }

    /// Decode the current reference in-process.
    ///
    /// Returns `None` for remote URLs, which the host must fetch and pass to
    /// [`complete_load`](Self::complete_load).
    pub fn load_local(&mut self) -> Option<LoadOutcome> {
        if self.reference.is_remote() {
            return None;
        }
        let token = self.load_token();
        let result = load_reference(&self.reference);
        Some(self.complete_load(token, result))
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    pub fn media(&self) -> Option<MediaDescriptor> {
        self.media
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn crop_frame(&self) -> Option<CropFrame> {
        self.frame
    }

    /// Set the size of the container hosting the crop frame.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Some(Viewport::new(width, height));
        self.on_image_changed();
    }

    /// Change the crop aspect ratio.
    pub fn set_aspect(&mut self, aspect: f64) -> Result<(), ConfigError> {
        let mut config = self.config.clone();
        config.aspect = aspect;
        config.validate()?;
        self.config = config;
        self.on_image_changed();
        Ok(())
    }

    /// Change the maximum zoom multiplier.
    pub fn set_scale_factor(&mut self, scale_factor: f64) -> Result<(), ConfigError> {
        let mut config = self.config.clone();
        config.scale_factor = scale_factor;
        config.validate()?;
        self.config = config;
        self.on_image_changed();
        Ok(())
    }

    pub fn set_output_type(&mut self, output_type: OutputType) {
        self.config.output_type = output_type;
    }

    /// Re-derive zoom, bounds and frame from the media, viewport and config.
    fn on_image_changed(&mut self) {
        let (Some(media), Some(viewport)) = (self.media, self.viewport) else {
            return;
        };

        match derive_initial_geometry(media, viewport, self.config.aspect, self.config.scale_factor) {
            Some(geometry) => {
                self.zoom = geometry.zoom;
                self.bounds = geometry.bounds;
                self.frame = Some(CropFrame::from_crop_size(geometry.crop_size, self.config.aspect));
                self.pan = Pan::default();
                self.update_crop();
            }
            None => {
                log::warn!("Viewport {}x{} cannot host a crop frame", viewport.width, viewport.height);
                self.frame = None;
                self.crop = None;
            }
        }
    }

    /// Recompute the pixel crop from the frame, pan, zoom and rotation.
    fn update_crop(&mut self) {
        let (Some(media), Some(frame)) = (self.media, self.frame) else {
            return;
        };

        self.pan = restrict_pan(self.pan, media, frame, self.zoom, self.rotation);
        self.crop = crop_area_pixels(media, frame, self.pan, self.zoom, self.rotation, self.config.aspect);
    }

    // ========================================================================
    // Zoom, pan and rotation
    // ========================================================================

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn zoom_bounds(&self) -> ZoomBounds {
        self.bounds
    }

    /// Set the zoom from a slider; the value is clamped to the bounds.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = self.bounds.clamp(zoom);
        self.update_crop();
    }

    /// Step the zoom up, stopping at the maximum.
    pub fn zoom_in(&mut self) -> f64 {
        self.zoom = self.bounds.step_up(self.zoom, self.config.zoom_step);
        self.update_crop();
        self.zoom
    }

    /// Step the zoom down, stopping at the minimum.
    pub fn zoom_out(&mut self) -> f64 {
        self.zoom = self.bounds.step_down(self.zoom, self.config.zoom_step);
        self.update_crop();
        self.zoom
    }

    pub fn slider(&self) -> SliderInfo {
        SliderInfo {
            min: self.bounds.min,
            max: self.bounds.max,
            step: self.config.slider_step,
            value: self.zoom,
        }
    }

    pub fn pan(&self) -> Pan {
        self.pan
    }

    /// Pan the image. The pan is restricted so the frame stays on the image.
    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.pan = Pan::new(x, y);
        self.update_crop();
    }

    pub fn rotation(&self) -> RotationAngle {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = RotationAngle::from_degrees(degrees);
        self.update_crop();
    }

    // ========================================================================
    // Crop rectangle
    // ========================================================================

    pub fn crop_rect(&self) -> Option<CropRect> {
        self.crop
    }

    /// Accept a pixel rectangle reported by an external crop widget.
    ///
    /// The rectangle is clamped to the bounding box of the image at the
    /// current rotation. Ignored until an image is loaded.
    pub fn set_crop_area_pixels(&mut self, rect: CropRect) {
        match self.media {
            Some(media) => self.crop = Some(rect.clamp_to_rotated(media, self.rotation)),
            None => log::warn!("Ignoring crop area reported before the image loaded"),
        }
    }

    // ========================================================================
    // Commit
    // ========================================================================

    /// Start a commit if the session can produce one.
    ///
    /// Returns `None` without side effects when no image is loaded, no crop
    /// rectangle exists, a commit is already in flight, or the session has
    /// been discarded.
    pub fn begin_commit(&mut self) -> Option<CommitJob> {
        if self.state != SessionState::Ready {
            log::warn!("Commit rejected: session is {:?}", self.state);
            return None;
        }
        if self.is_loading {
            log::warn!("Commit rejected: another commit is in flight");
            return None;
        }
        let Some(surface) = self.surface.clone() else {
            log::warn!("Commit rejected: no decoded image");
            return None;
        };
        let Some(crop) = self.crop else {
            log::warn!("Commit rejected: no crop rectangle");
            return None;
        };

        self.is_loading = true;
        log::info!(
            "Committing crop {}x{} at ({}, {}), rotation {}",
            crop.width,
            crop.height,
            crop.x,
            crop.y,
            self.rotation.degrees()
        );

        Some(CommitJob {
            surface,
            crop,
            rotation: self.rotation,
            options: self.config.render_options(),
            output_type: self.config.output_type,
        })
    }

    /// Deliver the result of a commit job to the callback.
    ///
    /// `is_loading` stays set while the callback runs and is cleared on
    /// every path afterwards. On success the session is discarded. On
    /// failure it stays interactive so the user can retry.
    pub fn finish_commit(&mut self, result: Result<CropOutput, CommitError>) -> Option<CropOutput> {
        let output = self.settle_commit(result);

        if let Some(callback) = self.on_crop.as_mut() {
            callback(output.clone());
        }

        self.end_commit();
        output
    }

    /// Apply a commit result to the session state without notifying anyone.
    ///
    /// `is_loading` is left set until [`CropSession::end_commit`].
    pub fn settle_commit(&mut self, result: Result<CropOutput, CommitError>) -> Option<CropOutput> {
        match result {
            Ok(output) => {
                log::info!("Crop committed as {:?} output", output.output_type());
                self.state = SessionState::Finished;
                self.surface = None;
                Some(output)
            }
            Err(e) => {
                log::warn!("Crop commit failed: {}", e);
                None
            }
        }
    }

    /// Mark the in-flight commit as delivered.
    pub fn end_commit(&mut self) {
        self.is_loading = false;
    }

    /// Begin, run and finish a commit in place.
    pub fn commit(&mut self) -> Option<CropOutput> {
        let job = self.begin_commit()?;
        let result = job.run();
        self.finish_commit(result)
    }

    /// Discard the session without producing output.
    pub fn cancel(&mut self) {
        log::info!("Crop session cancelled");
        self.generation = self.generation.wrapping_add(1);
        self.surface = None;
        self.crop = None;
        self.is_loading = false;
        self.state = SessionState::Cancelled;
    }
}
