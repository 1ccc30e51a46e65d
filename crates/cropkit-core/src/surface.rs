//! Owned RGBA pixel surfaces.
//!
//! A [`PixelSurface`] is the unit of ownership passed between the decode,
//! render and encode stages. Every stage takes the surface it reads by
//! reference and hands back a freshly allocated one, so no surface is ever
//! shared mutably between two steps.

use thiserror::Error;

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Errors raised when a surface cannot be allocated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    /// Width or height is zero.
    #[error("Invalid surface dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The byte size of the surface does not fit in memory addressing.
    #[error("Surface {width}x{height} is too large to address")]
    Overflow { width: u32, height: u32 },

    /// The allocator refused the pixel buffer.
    #[error("Failed to allocate {bytes} bytes for surface")]
    AllocationFailed { bytes: usize },
}

/// A 2D grid of RGBA8 pixels in row-major order.
///
/// Alpha is straight (not premultiplied). A blank surface is fully
/// transparent: every byte is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSurface {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel). Length is width * height * 4.
    pub pixels: Vec<u8>,
}

impl PixelSurface {
    /// Create a surface from existing pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * BYTES_PER_PIXEL,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Allocate a fully transparent surface.
    ///
    /// Allocation is fallible: an oversized request returns an error
    /// instead of aborting the process.
    pub fn blank(width: u32, height: u32) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::InvalidDimensions { width, height });
        }

        let bytes = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or(SurfaceError::Overflow { width, height })?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(bytes)
            .map_err(|_| SurfaceError::AllocationFailed { bytes })?;
        pixels.resize(bytes, 0);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a surface filled with a single color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * BYTES_PER_PIXEL);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a surface from an `image::RgbaImage`.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an `image::RgbaImage`.
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Byte offset of the pixel at (x, y). Caller guarantees bounds.
    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }

    /// Read a pixel, or `None` when (x, y) is outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.offset(x, y);
        let p = self.pixels.get(idx..idx + BYTES_PER_PIXEL)?;
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Write a pixel. Writes outside the surface are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.offset(x, y);
        if let Some(p) = self.pixels.get_mut(idx..idx + BYTES_PER_PIXEL) {
            p.copy_from_slice(&rgba);
        }
    }

    /// Copy `src` into this surface with its top-left corner at (dx, dy).
    ///
    /// Destination pixels are replaced, not blended. Parts of `src` that land
    /// outside this surface are dropped; destination pixels that `src` does
    /// not cover keep their current value. Nothing is copied if either
    /// buffer does not match its dimensions.
    pub fn put_surface(&mut self, src: &PixelSurface, dx: i64, dy: i64) {
        if !self.is_well_formed() || !src.is_well_formed() {
            log::warn!(
                "Skipping put of malformed {}x{} surface ({} bytes)",
                src.width,
                src.height,
                src.pixels.len()
            );
            return;
        }

        let dst_w = self.width as i64;
        let dst_h = self.height as i64;

        // Destination span covered by src, clipped to this surface
        let x_start = dx.max(0);
        let x_end = (dx + src.width as i64).min(dst_w);
        let y_start = dy.max(0);
        let y_end = (dy + src.height as i64).min(dst_h);

        if x_start >= x_end || y_start >= y_end {
            return;
        }

        let row_bytes = (x_end - x_start) as usize * BYTES_PER_PIXEL;

        for y in y_start..y_end {
            let src_y = (y - dy) as u32;
            let src_x = (x_start - dx) as u32;
            let src_idx = src.offset(src_x, src_y);
            let dst_idx = self.offset(x_start as u32, y as u32);

            self.pixels[dst_idx..dst_idx + row_bytes]
                .copy_from_slice(&src.pixels[src_idx..src_idx + row_bytes]);
        }
    }

    /// Check that the buffer holds exactly `width * height` RGBA pixels.
    pub fn is_well_formed(&self) -> bool {
        self.pixel_count() * BYTES_PER_PIXEL as u64 == self.pixels.len() as u64
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty surface.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
