// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pixelwerk-transform — Raster buffers and the fixed image-transform battery.
//
// Provides intensity converters (grayscale, inversion, threshold), resolution
// pyramids, binary morphology over a 3x3 cross, channel masks, the lazy
// pipeline that runs them all over one input, and the PNG codec.

pub mod codec;
pub mod intensity;
pub mod mask;
pub mod morphology;
pub mod pipeline;
pub mod pyramid;
pub mod raster;

// Re-export the primary types so callers can use `pixelwerk_transform::Pipeline` etc.
pub use codec::{decode_png, encode_png};
pub use morphology::{BinaryImage, Morphology};
pub use pipeline::{NamedRaster, Outputs, Pipeline};
pub use raster::{Gray16Image, Pixel, Raster};
