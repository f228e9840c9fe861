// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resolution pyramid — chains of independent Lanczos3 resampling passes that
// shrink then regrow (contraction) or grow then shrink (expansion) an image.

use image::imageops::{self, FilterType};
use tracing::{debug, instrument};

use crate::raster::Raster;

/// Height that keeps the aspect ratio when `width x height` is resampled to
/// `target_width`. Rounds like the legacy resampler (`0.7` bias) and never
/// returns less than one row.
pub fn auto_height(width: u32, height: u32, target_width: u32) -> u32 {
    if width == 0 {
        return height;
    }
    let scale = width as f64 / target_width as f64;
    ((0.7 + height as f64 / scale) as u32).max(1)
}

/// Resample `src` to `width x height` with a Lanczos3 filter.
///
/// A `height` of zero selects [`auto_height`]. A zero `width` is treated as
/// one column. An empty source has nothing to sample and is returned as-is.
pub fn resample(src: &Raster, width: u32, height: u32) -> Raster {
    if src.is_empty() {
        return src.clone();
    }
    let width = width.max(1);
    let height = if height == 0 {
        auto_height(src.width(), src.height(), width)
    } else {
        height
    };
    debug!(
        from_w = src.width(),
        from_h = src.height(),
        to_w = width,
        to_h = height,
        "Resampling"
    );
    match src {
        Raster::Gray8(buf) => Raster::Gray8(imageops::resize(buf, width, height, FilterType::Lanczos3)),
        Raster::Gray16(buf) => {
            Raster::Gray16(imageops::resize(buf, width, height, FilterType::Lanczos3))
        }
        Raster::Rgba8(buf) => Raster::Rgba8(imageops::resize(buf, width, height, FilterType::Lanczos3)),
    }
}

/// Run `src` through one aspect-preserving resample per entry of `widths`.
///
/// Each step is a full pass over the previous step's output.
pub fn run_schedule(src: &Raster, widths: &[u32]) -> Raster {
    let mut current = src.clone();
    for &width in widths {
        current = resample(&current, width, 0);
    }
    current
}

/// Destroy then partially restore detail (default `200 -> 80 -> 200 -> 320`).
#[instrument(skip(src), fields(width = src.width(), height = src.height()))]
pub fn contract(src: &Raster, widths: &[u32]) -> Raster {
    run_schedule(src, widths)
}

/// Upsample then downsample (default `640 -> 1280 -> 640 -> 320`).
#[instrument(skip(src), fields(width = src.width(), height = src.height()))]
pub fn expand(src: &Raster, widths: &[u32]) -> Raster {
    run_schedule(src, widths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};
    use pixelwerk_core::{ColorModel, PipelineConfig};

    fn checkerboard(width: u32, height: u32) -> Raster {
        Raster::Rgba8(RgbaImage::from_fn(width, height, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        }))
    }

    #[test]
    fn auto_height_preserves_aspect() {
        assert_eq!(auto_height(640, 480, 320), 240);
        assert_eq!(auto_height(320, 240, 200), 150);
        assert_eq!(auto_height(320, 240, 80), 60);
    }

    #[test]
    fn auto_height_never_collapses_to_zero() {
        assert_eq!(auto_height(1000, 1, 320), 1);
        assert_eq!(auto_height(1, 1, 320), 320);
    }

    #[test]
    fn resample_with_explicit_height() {
        let out = resample(&checkerboard(32, 32), 10, 7);
        assert_eq!(out.bounds(), (10, 7));
        assert_eq!(out.color_model(), ColorModel::Rgba8);
    }

    #[test]
    fn resample_keeps_gray_models() {
        let src = Raster::Gray8(GrayImage::from_pixel(20, 10, Luma([128])));
        let out = resample(&src, 40, 0);
        assert_eq!(out.bounds(), (40, 20));
        assert_eq!(out.color_model(), ColorModel::Gray8);
    }

    #[test]
    fn resample_of_empty_source_is_identity() {
        let src = Raster::new(ColorModel::Rgba8, 0, 0);
        assert_eq!(resample(&src, 320, 0), src);
    }

    #[test]
    fn contract_and_expand_end_at_working_width() {
        let config = PipelineConfig::default();
        let src = checkerboard(320, 240);

        let contracted = contract(&src, &config.contraction);
        assert_eq!(contracted.bounds(), (320, 240));

        let expanded = expand(&src, &config.expansion);
        assert_eq!(expanded.bounds(), (320, 240));
    }

    #[test]
    fn contraction_loses_detail() {
        let src = checkerboard(320, 240);
        let contracted = contract(&src, &PipelineConfig::default().contraction);
        assert_ne!(contracted, src);
    }

    #[test]
    fn uniform_image_survives_the_pyramid() {
        let src = Raster::Gray8(GrayImage::from_pixel(64, 48, Luma([200])));
        let out = run_schedule(&src, &[32, 16, 64]);
        let Raster::Gray8(buf) = out else {
            panic!("model changed");
        };
        assert!(buf.pixels().all(|p| p.0[0].abs_diff(200) <= 1));
    }
}
