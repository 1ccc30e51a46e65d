//! Cropkit Core - Image crop and rotate library
//!
//! This crate provides the core functionality for Cropkit: the crop/rotate
//! render engine, crop geometry, image decoding, PNG output and the
//! interactive crop session that ties them together.

pub mod config;
pub mod decode;
pub mod encode;
pub mod geometry;
pub mod render;
pub mod session;
pub mod surface;

pub use config::{ConfigError, CropConfig};
pub use decode::{load_reference, DecodeError, ImageReference};
pub use encode::{encode_output, encode_png, CropOutput, CroppedFile, EncodeError, OutputType};
pub use geometry::{
    crop_area_pixels, derive_initial_geometry, CropFrame, CropRect, InitialGeometry, MediaDescriptor, Pan,
    RotationAngle, Viewport, ZoomBounds,
};
pub use render::{render, render_crop, InterpolationFilter, RenderError, RenderOptions, SurfaceLimits};
pub use session::{
    CommitError, CommitJob, CropCallback, CropSession, LoadOutcome, LoadToken, SessionState, SliderInfo,
};
pub use surface::{PixelSurface, SurfaceError};
