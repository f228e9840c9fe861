// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binary morphology engine — dilation, erosion and their compositions over a
// fixed 3x3 neighbourhood.
//
// Inputs are expected to be binary (every sample 0 or 255), typically the
// output of `intensity::threshold`. The engine does not check this: cells are
// classified by exact equality with 0 or 255, so other values simply never
// count as a hit. Use `BinaryImage` to validate up front.

use std::ops::Deref;

use image::{GrayImage, Luma};
use imageproc::map::map_colors2;
use pixelwerk_core::config::{BorderPolicy, PipelineConfig, Subtraction};
use pixelwerk_core::error::{PixelwerkError, Result};
use tracing::{debug, instrument};

/// Neighbourhood offsets along each axis; the kernel is their cross product.
const KERNEL: [i64; 3] = [-1, 0, 1];

const WHITE: u8 = 255;
const BLACK: u8 = 0;

/// Morphology operators bound to a border policy and a subtraction mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Morphology {
    border: BorderPolicy,
    subtraction: Subtraction,
}

impl Morphology {
    pub fn new(border: BorderPolicy, subtraction: Subtraction) -> Self {
        Self {
            border,
            subtraction,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.border, config.subtraction)
    }

    pub fn border(&self) -> BorderPolicy {
        self.border
    }

    pub fn subtraction(&self) -> Subtraction {
        self.subtraction
    }

    /// `255` where any cell of the 3x3 neighbourhood (centre included) is
    /// `255`, else `0`.
    #[instrument(skip(self, src), fields(width = src.width(), height = src.height()))]
    pub fn dilate(&self, src: &GrayImage) -> GrayImage {
        let out = self.scan(src, WHITE, WHITE, BLACK);
        debug!("Dilation complete");
        out
    }

    /// `0` where any cell of the 3x3 neighbourhood (centre included) is `0`,
    /// else `255`.
    #[instrument(skip(self, src), fields(width = src.width(), height = src.height()))]
    pub fn erode(&self, src: &GrayImage) -> GrayImage {
        let out = self.scan(src, BLACK, BLACK, WHITE);
        debug!("Erosion complete");
        out
    }

    /// Erosion followed by dilation; removes small bright specks.
    pub fn open(&self, src: &GrayImage) -> GrayImage {
        self.dilate(&self.erode(src))
    }

    /// Dilation followed by erosion; fills small dark gaps.
    pub fn close(&self, src: &GrayImage) -> GrayImage {
        self.erode(&self.dilate(src))
    }

    /// `dilate(src) - erode(src)`, highlighting boundaries.
    pub fn gradient(&self, src: &GrayImage) -> GrayImage {
        self.subtract(&self.dilate(src), &self.erode(src))
    }

    /// `src - open(src)`, keeping bright features smaller than the kernel.
    pub fn tophat(&self, src: &GrayImage) -> GrayImage {
        self.subtract(src, &self.open(src))
    }

    /// Per-pixel `lhs - rhs` under the configured subtraction mode.
    pub fn subtract(&self, lhs: &GrayImage, rhs: &GrayImage) -> GrayImage {
        let mode = self.subtraction;
        map_colors2(lhs, rhs, |a: Luma<u8>, b: Luma<u8>| {
            let diff = match mode {
                Subtraction::Wrapping => a.0[0].wrapping_sub(b.0[0]),
                Subtraction::Saturating => a.0[0].saturating_sub(b.0[0]),
            };
            Luma([diff])
        })
    }

    /// Write `on_hit` wherever the neighbourhood contains `target`, else
    /// `on_miss`. Cells outside the evaluated region stay at zero.
    fn scan(&self, src: &GrayImage, target: u8, on_hit: u8, on_miss: u8) -> GrayImage {
        let (width, height) = src.dimensions();
        let mut out = GrayImage::new(width, height);

        let (xs, ys) = match self.border {
            BorderPolicy::Skip => (1..width.saturating_sub(1), 1..height.saturating_sub(1)),
            BorderPolicy::Clamp => (0..width, 0..height),
        };

        for y in ys {
            for x in xs.clone() {
                let hit = match self.border {
                    BorderPolicy::Skip => interior_hit(src, x, y, target),
                    BorderPolicy::Clamp => clamped_hit(src, x, y, target),
                };
                out.put_pixel(x, y, Luma([if hit { on_hit } else { on_miss }]));
            }
        }
        out
    }
}

/// Kernel test for a cell whose whole neighbourhood lies inside the buffer.
fn interior_hit(src: &GrayImage, x: u32, y: u32, target: u8) -> bool {
    KERNEL.iter().any(|&dx| {
        KERNEL.iter().any(|&dy| {
            let nx = (x as i64 + dx) as u32;
            let ny = (y as i64 + dy) as u32;
            src.get_pixel(nx, ny).0[0] == target
        })
    })
}

/// Kernel test with neighbour coordinates clamped to the buffer edges.
fn clamped_hit(src: &GrayImage, x: u32, y: u32, target: u8) -> bool {
    let max_x = src.width() as i64 - 1;
    let max_y = src.height() as i64 - 1;
    KERNEL.iter().any(|&dx| {
        KERNEL.iter().any(|&dy| {
            let nx = (x as i64 + dx).clamp(0, max_x) as u32;
            let ny = (y as i64 + dy).clamp(0, max_y) as u32;
            src.get_pixel(nx, ny).0[0] == target
        })
    })
}

// -- Default-policy shorthands ------------------------------------------------

/// Dilation with the border ring skipped.
pub fn dilate(src: &GrayImage) -> GrayImage {
    Morphology::default().dilate(src)
}

/// Erosion with the border ring skipped.
pub fn erode(src: &GrayImage) -> GrayImage {
    Morphology::default().erode(src)
}

pub fn open(src: &GrayImage) -> GrayImage {
    Morphology::default().open(src)
}

pub fn close(src: &GrayImage) -> GrayImage {
    Morphology::default().close(src)
}

/// Morphological gradient with wrapping subtraction.
pub fn gradient(src: &GrayImage) -> GrayImage {
    Morphology::default().gradient(src)
}

/// Top-hat with wrapping subtraction.
pub fn tophat(src: &GrayImage) -> GrayImage {
    Morphology::default().tophat(src)
}

// -- Validation ---------------------------------------------------------------

/// A gray buffer whose every sample is verified to be 0 or 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage(GrayImage);

impl BinaryImage {
    pub fn into_inner(self) -> GrayImage {
        self.0
    }
}

impl TryFrom<GrayImage> for BinaryImage {
    type Error = PixelwerkError;

    /// Fails on the first non-binary sample in row-major order.
    fn try_from(image: GrayImage) -> Result<Self> {
        if let Some((x, y, pixel)) = image
            .enumerate_pixels()
            .find(|(_, _, p)| p.0[0] != BLACK && p.0[0] != WHITE)
        {
            return Err(PixelwerkError::NotBinary {
                x,
                y,
                value: pixel.0[0],
            });
        }
        Ok(Self(image))
    }
}

impl Deref for BinaryImage {
    type Target = GrayImage;

    fn deref(&self) -> &GrayImage {
        &self.0
    }
}

// -- Tests --------------------------------------------------------------------
