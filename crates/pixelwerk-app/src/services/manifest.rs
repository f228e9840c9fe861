// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run manifest — a JSON record of what one pipeline run wrote, with a SHA-256
// fingerprint per output file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use pixelwerk_core::error::Result;
use pixelwerk_core::{ColorModel, RunId, Stage};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// One written output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub label: Stage,
    /// File name relative to the manifest's directory.
    pub file: String,
    pub width: u32,
    pub height: u32,
    pub color_model: ColorModel,
    pub sha256: String,
}

/// Everything one run over one input produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub run_id: RunId,
    pub generated_at: DateTime<Utc>,
    pub source: PathBuf,
    pub working_width: u32,
    pub working_height: u32,
    pub entries: Vec<ManifestEntry>,
    /// Stages whose result could not be encoded and was not written.
    pub dropped: Vec<Stage>,
}

impl Manifest {
    pub fn new(source: &Path, working_width: u32, working_height: u32) -> Self {
        Self {
            run_id: RunId::new(),
            generated_at: Utc::now(),
            source: source.to_path_buf(),
            working_width,
            working_height,
            entries: Vec::new(),
            dropped: Vec::new(),
        }
    }

    /// Write the manifest as pretty JSON into `dir`, returning the file path.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}
