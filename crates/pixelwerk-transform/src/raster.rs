// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster buffer — a dense pixel grid in one of three color models, with
// bounds-checked access and the shared 16-bit sample view used by the
// intensity converters and channel masks.

use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgba, RgbaImage};
use pixelwerk_core::error::{PixelwerkError, Result};
use pixelwerk_core::ColorModel;

/// Single-channel 16-bit image.
pub type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Luma weights over 16-bit samples; they sum to 65536.
const LUMA_R: u32 = 19595;
const LUMA_G: u32 = 38470;
const LUMA_B: u32 = 7471;

/// A single pixel value, shaped by its color model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pixel {
    Gray8(u8),
    Gray16(u16),
    Rgba8([u8; 4]),
}

impl Pixel {
    pub fn color_model(&self) -> ColorModel {
        match self {
            Pixel::Gray8(_) => ColorModel::Gray8,
            Pixel::Gray16(_) => ColorModel::Gray16,
            Pixel::Rgba8(_) => ColorModel::Rgba8,
        }
    }
}

/// Owned pixel grid. Every cell inside `bounds()` is defined.
///
/// Transforms never mutate their input; each one allocates and returns a
/// fresh `Raster` (or typed buffer), so one source can feed many branches.
#[derive(Debug, Clone, PartialEq)]
pub enum Raster {
    Gray8(GrayImage),
    Gray16(Gray16Image),
    Rgba8(RgbaImage),
}

impl Raster {
    // -- Construction ---------------------------------------------------------

    /// Allocate a zero-filled buffer.
    pub fn new(model: ColorModel, width: u32, height: u32) -> Self {
        match model {
            ColorModel::Gray8 => Raster::Gray8(GrayImage::new(width, height)),
            ColorModel::Gray16 => Raster::Gray16(Gray16Image::new(width, height)),
            ColorModel::Rgba8 => Raster::Rgba8(RgbaImage::new(width, height)),
        }
    }

    /// Wrap a decoded image. 8- and 16-bit luma keep their model; every
    /// other layout is converted to RGBA8.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(buf) => Raster::Gray8(buf),
            DynamicImage::ImageLuma16(buf) => Raster::Gray16(buf),
            DynamicImage::ImageRgba8(buf) => Raster::Rgba8(buf),
            other => Raster::Rgba8(other.to_rgba8()),
        }
    }

    /// Convert into the `image` crate's dynamic representation for encoding.
    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            Raster::Gray8(buf) => DynamicImage::ImageLuma8(buf),
            Raster::Gray16(buf) => DynamicImage::ImageLuma16(buf),
            Raster::Rgba8(buf) => DynamicImage::ImageRgba8(buf),
        }
    }

    // -- Accessors ------------------------------------------------------------

    /// `(width, height)` in pixels.
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            Raster::Gray8(buf) => buf.dimensions(),
            Raster::Gray16(buf) => buf.dimensions(),
            Raster::Rgba8(buf) => buf.dimensions(),
        }
    }

    pub fn width(&self) -> u32 {
        self.bounds().0
    }

    pub fn height(&self) -> u32 {
        self.bounds().1
    }

    /// True when the buffer has no pixels at all.
    pub fn is_empty(&self) -> bool {
        let (width, height) = self.bounds();
        width == 0 || height == 0
    }

    pub fn color_model(&self) -> ColorModel {
        match self {
            Raster::Gray8(_) => ColorModel::Gray8,
            Raster::Gray16(_) => ColorModel::Gray16,
            Raster::Rgba8(_) => ColorModel::Rgba8,
        }
    }

    /// Read the pixel at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Result<Pixel> {
        self.check_bounds(x, y)?;
        Ok(match self {
            Raster::Gray8(buf) => Pixel::Gray8(buf.get_pixel(x, y).0[0]),
            Raster::Gray16(buf) => Pixel::Gray16(buf.get_pixel(x, y).0[0]),
            Raster::Rgba8(buf) => Pixel::Rgba8(buf.get_pixel(x, y).0),
        })
    }

    /// Overwrite the pixel at `(x, y)`. The pixel must match the buffer's model.
    pub fn set(&mut self, x: u32, y: u32, pixel: Pixel) -> Result<()> {
        self.check_bounds(x, y)?;
        match (self, pixel) {
            (Raster::Gray8(buf), Pixel::Gray8(v)) => buf.put_pixel(x, y, Luma([v])),
            (Raster::Gray16(buf), Pixel::Gray16(v)) => buf.put_pixel(x, y, Luma([v])),
            (Raster::Rgba8(buf), Pixel::Rgba8(v)) => buf.put_pixel(x, y, Rgba(v)),
            (raster, pixel) => {
                return Err(PixelwerkError::ColorModelMismatch {
                    expected: raster.color_model(),
                    actual: pixel.color_model(),
                });
            }
        }
        Ok(())
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<()> {
        let (width, height) = self.bounds();
        if x >= width || y >= height {
            return Err(PixelwerkError::OutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        Ok(())
    }

    // -- Sample views ---------------------------------------------------------

    /// The pixel as four 16-bit channels `[r, g, b, a]`.
    ///
    /// 8-bit samples are expanded by 257 so that 255 maps to 65535; gray
    /// models replicate their intensity and report opaque alpha. Callers
    /// must stay inside `bounds()`.
    pub(crate) fn rgba16_at(&self, x: u32, y: u32) -> [u16; 4] {
        match self {
            Raster::Gray8(buf) => {
                let v = expand8(buf.get_pixel(x, y).0[0]);
                [v, v, v, u16::MAX]
            }
            Raster::Gray16(buf) => {
                let v = buf.get_pixel(x, y).0[0];
                [v, v, v, u16::MAX]
            }
            Raster::Rgba8(buf) => {
                let [r, g, b, a] = buf.get_pixel(x, y).0;
                [expand8(r), expand8(g), expand8(b), expand8(a)]
            }
        }
    }

    /// The pixel narrowed to four 8-bit channels. Narrowing truncates.
    pub(crate) fn rgba8_at(&self, x: u32, y: u32) -> [u8; 4] {
        self.rgba16_at(x, y).map(narrow16)
    }

    /// Weighted luma of the pixel on the 16-bit scale, rounded.
    pub(crate) fn luma16_at(&self, x: u32, y: u32) -> u16 {
        match self {
            Raster::Gray16(buf) => buf.get_pixel(x, y).0[0],
            _ => {
                let [r, g, b, _] = self.rgba16_at(x, y);
                luma16(r, g, b)
            }
        }
    }

    /// Weighted luma of the pixel on the 8-bit scale.
    pub(crate) fn luma8_at(&self, x: u32, y: u32) -> u8 {
        match self {
            Raster::Gray8(buf) => buf.get_pixel(x, y).0[0],
            _ => narrow16(self.luma16_at(x, y)),
        }
    }

    // -- Conversions ----------------------------------------------------------

    /// Copy into an RGBA8 buffer (gray replicated, alpha opaque).
    pub fn to_rgba8(&self) -> RgbaImage {
        match self {
            Raster::Rgba8(buf) => buf.clone(),
            _ => {
                let (width, height) = self.bounds();
                RgbaImage::from_fn(width, height, |x, y| Rgba(self.rgba8_at(x, y)))
            }
        }
    }
}

impl From<GrayImage> for Raster {
    fn from(buf: GrayImage) -> Self {
        Raster::Gray8(buf)
    }
}

impl From<Gray16Image> for Raster {
    fn from(buf: Gray16Image) -> Self {
        Raster::Gray16(buf)
    }
}

impl From<RgbaImage> for Raster {
    fn from(buf: RgbaImage) -> Self {
        Raster::Rgba8(buf)
    }
}

/// Widen an 8-bit sample to 16 bits (`v * 257`).
#[inline]
pub(crate) fn expand8(v: u8) -> u16 {
    (v as u16) << 8 | v as u16
}

/// Drop the low byte of a 16-bit sample.
#[inline]
pub(crate) fn narrow16(v: u16) -> u8 {
    (v >> 8) as u8
}

#[inline]
fn luma16(r: u16, g: u16, b: u16) -> u16 {
    let y = (LUMA_R * r as u32 + LUMA_G * g as u32 + LUMA_B * b as u32 + (1 << 15)) >> 16;
    y as u16
}
