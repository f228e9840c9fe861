// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Pixelwerk transform pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pixel layout of a raster buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorModel {
    /// One 8-bit intensity sample.
    Gray8,
    /// One 16-bit intensity sample.
    Gray16,
    /// Four independent 8-bit channels, alpha not premultiplied.
    Rgba8,
}

impl std::fmt::Display for ColorModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Gray8 => "gray8",
            Self::Gray16 => "gray16",
            Self::Rgba8 => "rgba8",
        };
        f.write_str(name)
    }
}

/// One labelled output of the pipeline, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Origin,
    Gray,
    Bitwise,
    Red,
    Blue,
    Green,
    Contraction,
    Expansion,
    Threshold,
    Dilation,
    Erosion,
    Opening,
    Closing,
    MorphologyGradient,
    TopHat,
}

impl Stage {
    /// Every stage, in the order the pipeline emits them.
    pub const ALL: [Stage; 15] = [
        Stage::Origin,
        Stage::Gray,
        Stage::Bitwise,
        Stage::Red,
        Stage::Blue,
        Stage::Green,
        Stage::Contraction,
        Stage::Expansion,
        Stage::Threshold,
        Stage::Dilation,
        Stage::Erosion,
        Stage::Opening,
        Stage::Closing,
        Stage::MorphologyGradient,
        Stage::TopHat,
    ];

    /// Fixed display label of this stage.
    pub fn label(self) -> &'static str {
        match self {
            Self::Origin => "origin",
            Self::Gray => "gray",
            Self::Bitwise => "bitwise",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Contraction => "contraction",
            Self::Expansion => "expansion",
            Self::Threshold => "threshold",
            Self::Dilation => "dilation",
            Self::Erosion => "erosion",
            Self::Opening => "opening",
            Self::Closing => "closing",
            Self::MorphologyGradient => "morphology-gradient",
            Self::TopHat => "top-hat",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
