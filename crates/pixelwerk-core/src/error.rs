// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pixelwerk.

use thiserror::Error;

use crate::types::ColorModel;

/// Top-level error type for all Pixelwerk operations.
#[derive(Debug, Error)]
pub enum PixelwerkError {
    // -- Codec errors --
    #[error("image decoding failed: {0}")]
    Decode(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    // -- Buffer errors --
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("pixel ({x}, {y}) is outside a {width}x{height} buffer")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("expected a {expected} pixel, got {actual}")]
    ColorModelMismatch {
        expected: ColorModel,
        actual: ColorModel,
    },

    #[error("pixel ({x}, {y}) holds {value}, which is neither 0 nor 255")]
    NotBinary { x: u32, y: u32, value: u8 },

    // -- Configuration --
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PixelwerkError>;
