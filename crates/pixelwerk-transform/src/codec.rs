// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PNG codec — decodes input files into rasters and encodes pipeline outputs
// losslessly in their own color model.

use std::io::Cursor;

use image::ImageFormat;
use pixelwerk_core::error::{PixelwerkError, Result};
use tracing::{debug, instrument};

use crate::raster::Raster;

/// Decode PNG bytes. Gray8 and Gray16 files keep their model; every other
/// layout becomes RGBA8.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode_png(data: &[u8]) -> Result<Raster> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Png)
        .map_err(|err| PixelwerkError::Decode(format!("failed to decode png: {}", err)))?;
    let raster = Raster::from_dynamic(img);
    debug!(
        width = raster.width(),
        height = raster.height(),
        model = %raster.color_model(),
        "PNG decoded"
    );
    Ok(raster)
}

/// Encode a raster as PNG without changing its color model or bit depth.
#[instrument(skip(raster), fields(width = raster.width(), height = raster.height()))]
pub fn encode_png(raster: &Raster) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    let written = match raster {
        Raster::Gray8(buf) => buf.write_to(&mut cursor, ImageFormat::Png),
        Raster::Gray16(buf) => buf.write_to(&mut cursor, ImageFormat::Png),
        Raster::Rgba8(buf) => buf.write_to(&mut cursor, ImageFormat::Png),
    };
    written.map_err(|err| PixelwerkError::Encode(format!("png encoding failed: {}", err)))?;
    debug!(bytes = buffer.len(), "PNG encoded");
    Ok(buffer)
}
