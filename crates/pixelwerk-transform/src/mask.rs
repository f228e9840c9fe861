// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Channel mask filter — keeps pixels whose channels fall inside a per-channel
// range and blacks out the rest, leaving alpha untouched.

use image::{Rgba, RgbaImage};
use pixelwerk_core::config::{ChannelRange, ChannelTest};
use tracing::{debug, instrument};

use crate::raster::Raster;

/// Whether `[r, g, b]` lies inside `range`.
///
/// Under [`ChannelTest::Legacy`] the third test reproduces the historical
/// defect: it checks `low.b <= r` and `g <= high.b` instead of the blue sample.
pub fn contains(rgb: [u8; 3], range: &ChannelRange, test: ChannelTest) -> bool {
    let [r, g, b] = rgb;
    let (low, high) = (range.low, range.high);
    let red = low[0] <= r && r <= high[0];
    let green = low[1] <= g && g <= high[1];
    let blue = match test {
        ChannelTest::Strict => low[2] <= b && b <= high[2],
        ChannelTest::Legacy => low[2] <= r && g <= high[2],
    };
    red && green && blue
}

/// Keep `(r, g, b, a)` where the pixel is inside `range`, else emit `(0, 0, 0, a)`.
///
/// Channels are narrowed from 16-bit samples by truncation, as in
/// [`crate::intensity::invert`].
#[instrument(skip(src), fields(width = src.width(), height = src.height()))]
pub fn mask_channel(src: &Raster, range: &ChannelRange, test: ChannelTest) -> RgbaImage {
    let (width, height) = src.bounds();
    let mut kept = 0usize;
    let masked = RgbaImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = src.rgba8_at(x, y);
        if contains([r, g, b], range, test) {
            kept += 1;
            Rgba([r, g, b, a])
        } else {
            Rgba([0, 0, 0, a])
        }
    });
    debug!(kept, "Channel mask complete");
    masked
}
