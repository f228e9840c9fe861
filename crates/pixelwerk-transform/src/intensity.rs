// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Intensity converters — grayscale projection, polarity inversion and binary
// thresholding. All are single-pass and size-preserving.

use image::{GrayImage, Luma, Rgba, RgbaImage};
use tracing::{debug, instrument};

use crate::raster::{Gray16Image, Raster};

/// Project every pixel onto 16-bit luma.
#[instrument(skip_all, fields(width = src.width(), height = src.height()))]
pub fn to_grayscale(src: &Raster) -> Gray16Image {
    let (width, height) = src.bounds();
    let gray = Gray16Image::from_fn(width, height, |x, y| Luma([src.luma16_at(x, y)]));
    debug!("Grayscale projection complete");
    gray
}

/// Invert the color channels: `255 - v` for R, G and B.
///
/// Channels are read as 16-bit samples and narrowed to 8 bits by truncation
/// before inverting. Alpha is carried through unchanged.
#[instrument(skip_all, fields(width = src.width(), height = src.height()))]
pub fn invert(src: &Raster) -> RgbaImage {
    let (width, height) = src.bounds();
    let inverted = RgbaImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = src.rgba8_at(x, y);
        Rgba([255 - r, 255 - g, 255 - b, a])
    });
    debug!("Inversion complete");
    inverted
}

/// Binarise on 8-bit luma: `255` where `threshold <= luma`, else `0`.
#[instrument(skip(src), fields(width = src.width(), height = src.height()))]
pub fn threshold(src: &Raster, threshold: u8) -> GrayImage {
    let (width, height) = src.bounds();
    let binary = GrayImage::from_fn(width, height, |x, y| {
        let value = if threshold <= src.luma8_at(x, y) { 255u8 } else { 0u8 };
        Luma([value])
    });
    debug!("Threshold complete");
    binary
}
