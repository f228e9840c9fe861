// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PixelwerkError, Result};

/// Inclusive per-channel bounds for the channel mask filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRange {
    /// Lower bounds as `[r, g, b]`.
    pub low: [u8; 3],
    /// Upper bounds as `[r, g, b]`.
    pub high: [u8; 3],
}

impl ChannelRange {
    pub const fn new(low: [u8; 3], high: [u8; 3]) -> Self {
        Self { low, high }
    }

    /// Red-dominant pixels.
    pub const RED: Self = Self::new([100, 0, 0], [255, 100, 100]);
    /// Green-dominant pixels.
    pub const GREEN: Self = Self::new([0, 100, 0], [100, 255, 100]);
    /// Blue-dominant pixels.
    pub const BLUE: Self = Self::new([0, 0, 100], [100, 100, 255]);

    /// Whether any channel has `low > high`, which matches nothing.
    pub fn is_inverted(&self) -> bool {
        self.low.iter().zip(self.high.iter()).any(|(l, h)| l > h)
    }
}

/// How the channel mask tests the blue channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelTest {
    /// Every channel is tested against its own bounds.
    #[default]
    Strict,
    /// Legacy behaviour: the blue test checks `low.b <= r && g <= high.b`.
    Legacy,
}

/// Per-pixel subtraction used by the morphological gradient and top-hat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subtraction {
    /// Modular 8-bit subtraction (legacy output).
    #[default]
    Wrapping,
    /// Negative differences clamp to zero.
    Saturating,
}

/// Treatment of the outermost 1-pixel ring by dilation and erosion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderPolicy {
    /// Border cells are not evaluated and stay at zero.
    #[default]
    Skip,
    /// Border cells are evaluated with neighbour lookups clamped to the buffer.
    Clamp,
}

/// Parameters of the transform battery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Width every input is resampled to before the branches run.
    pub working_width: u32,
    /// Binary threshold; intensities `>= threshold` become white.
    pub threshold: u8,
    /// Successive target widths of the contraction pyramid.
    pub contraction: Vec<u32>,
    /// Successive target widths of the expansion pyramid.
    pub expansion: Vec<u32>,
    pub red: ChannelRange,
    pub green: ChannelRange,
    pub blue: ChannelRange,
    pub channel_test: ChannelTest,
    pub subtraction: Subtraction,
    pub border: BorderPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            working_width: 320,
            threshold: 125,
            contraction: vec![200, 80, 200, 320],
            expansion: vec![640, 1280, 640, 320],
            red: ChannelRange::RED,
            green: ChannelRange::GREEN,
            blue: ChannelRange::BLUE,
            channel_test: ChannelTest::default(),
            subtraction: Subtraction::default(),
            border: BorderPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Settings that reproduce the legacy output bit for bit.
    pub fn legacy() -> Self {
        Self {
            channel_test: ChannelTest::Legacy,
            subtraction: Subtraction::Wrapping,
            border: BorderPolicy::Skip,
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file. Absent fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the transforms rely on.
    ///
    /// Inverted channel ranges are accepted and only logged.
    pub fn validate(&self) -> Result<()> {
        if self.working_width == 0 {
            return Err(PixelwerkError::InvalidConfig(
                "working_width must be positive".into(),
            ));
        }
        for (name, schedule) in [("contraction", &self.contraction), ("expansion", &self.expansion)] {
            if schedule.is_empty() {
                return Err(PixelwerkError::InvalidConfig(format!(
                    "{name} schedule is empty"
                )));
            }
            if schedule.contains(&0) {
                return Err(PixelwerkError::InvalidConfig(format!(
                    "{name} schedule contains a zero width"
                )));
            }
        }
        for (name, range) in [("red", &self.red), ("green", &self.green), ("blue", &self.blue)] {
            if range.is_inverted() {
                warn!(mask = name, ?range, "channel range has low > high; mask will be empty");
            }
        }
        Ok(())
    }
}
