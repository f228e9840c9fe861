// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch processing — decode one input, run the pipeline, write each labelled
// result as a PNG next to a manifest.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use pixelwerk_core::error::Result;
use pixelwerk_transform::{NamedRaster, Pipeline, decode_png, encode_png};
use tracing::{info, instrument, warn};

use super::manifest::{Manifest, ManifestEntry, hash_bytes};

/// One output directory under `out_root` per input, in input order.
///
/// Directories are named after the input stem. A stem already claimed by an
/// earlier input gets a `-2`, `-3`, ... suffix, so no two runs share a
/// directory.
pub fn output_dirs(out_root: &Path, inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let stem = input
                .file_stem()
                .unwrap_or(OsStr::new("input"))
                .to_string_lossy()
                .into_owned();
            let mut name = stem.clone();
            let mut suffix = 2;
            while !taken.insert(name.clone()) {
                name = format!("{stem}-{suffix}");
                suffix += 1;
            }
            out_root.join(name)
        })
        .collect()
}

/// `NN-<label>.png`, numbered from 01 in stage order.
pub fn output_file_name(index: usize, output: &NamedRaster) -> String {
    format!("{:02}-{}.png", index + 1, output.label())
}

/// Process one input file end to end, writing into `dir`.
///
/// `dir` must be owned by this run alone; see [`output_dirs`]. A decode failure or an empty image rejects the whole input. An encode
/// failure drops only that result; it is logged and listed in the manifest.
#[instrument(skip(pipeline, input), fields(input = %input.display()))]
pub fn process_input(pipeline: &Pipeline, input: &Path, dir: &Path) -> Result<Manifest> {
    let data = std::fs::read(input)?;
    let src = decode_png(&data)?;
    let outputs = pipeline.run(&src)?;
    let (working_width, working_height) = outputs.working().bounds();

    std::fs::create_dir_all(dir)?;

    let mut manifest = Manifest::new(input, working_width, working_height);
    write_outputs(dir, outputs, &mut manifest)?;
    let path = manifest.write(dir)?;

    info!(
        written = manifest.entries.len(),
        dropped = manifest.dropped.len(),
        manifest = %path.display(),
        "Input processed"
    );
    Ok(manifest)
}

/// Encode and write each output into `dir`, recording it in `manifest`.
///
/// File numbering follows the position in `outputs`, so a dropped result
/// leaves a gap rather than shifting later names.
pub fn write_outputs(
    dir: &Path,
    outputs: impl IntoIterator<Item = NamedRaster>,
    manifest: &mut Manifest,
) -> Result<()> {
    for (index, output) in outputs.into_iter().enumerate() {
        let bytes = match encode_png(&output.raster) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(stage = output.label(), error = %err, "Result dropped");
                manifest.dropped.push(output.stage);
                continue;
            }
        };
        let file = output_file_name(index, &output);
        std::fs::write(dir.join(&file), &bytes)?;
        manifest.entries.push(ManifestEntry {
            label: output.stage,
            file,
            width: output.raster.width(),
            height: output.raster.height(),
            color_model: output.raster.color_model(),
            sha256: hash_bytes(&bytes),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use pixelwerk_core::{ColorModel, PipelineConfig, PixelwerkError, Stage};
    use pixelwerk_transform::Raster;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let src = Raster::Rgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 3) as u8, (y * 5) as u8, 200, 255])
        }));
        write_raster(dir, name, &src)
    }

    fn write_raster(dir: &Path, name: &str, src: &Raster) -> PathBuf {
        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, encode_png(src).unwrap()).unwrap();
        path
    }

    fn solid(pixel: [u8; 4]) -> Raster {
        Raster::Rgba8(RgbaImage::from_pixel(16, 12, Rgba(pixel)))
    }

    fn assert_manifest_matches_disk(dir: &Path, manifest: &Manifest) {
        let recorded: Manifest =
            serde_json::from_str(&std::fs::read_to_string(dir.join("manifest.json")).unwrap())
                .unwrap();
        assert_eq!(&recorded, manifest);
        for entry in &manifest.entries {
            let bytes = std::fs::read(dir.join(&entry.file)).unwrap();
            assert_eq!(entry.sha256, hash_bytes(&bytes), "{}", entry.file);
        }
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(PipelineConfig::default()).unwrap()
    }

    #[test]
    fn output_dirs_use_the_input_stem() {
        let dirs = output_dirs(
            Path::new("/out"),
            &[PathBuf::from("/photos/cat.png"), PathBuf::from("dog.png")],
        );
        assert_eq!(dirs, [PathBuf::from("/out/cat"), PathBuf::from("/out/dog")]);
    }

    #[test]
    fn output_dirs_suffix_repeated_stems() {
        let inputs = [
            PathBuf::from("a/img.png"),
            PathBuf::from("b/img.png"),
            PathBuf::from("img-2.png"),
            PathBuf::from("c/img.png"),
        ];
        let dirs = output_dirs(Path::new("out"), &inputs);
        assert_eq!(
            dirs,
            [
                PathBuf::from("out/img"),
                PathBuf::from("out/img-2"),
                PathBuf::from("out/img-2-2"),
                PathBuf::from("out/img-3"),
            ]
        );
    }

    #[test]
    fn same_stem_inputs_keep_separate_outputs() {
        let tmp = tempfile::tempdir().unwrap();
        let red = write_raster(&tmp.path().join("a"), "img.png", &solid([220, 20, 20, 255]));
        let blue = write_raster(&tmp.path().join("b"), "img.png", &solid([20, 20, 220, 255]));
        let out_root = tmp.path().join("out");
        let dirs = output_dirs(&out_root, &[red.clone(), blue.clone()]);
        assert_ne!(dirs[0], dirs[1]);

        let pipeline = pipeline();
        let first = process_input(&pipeline, &red, &dirs[0]).unwrap();
        let second = process_input(&pipeline, &blue, &dirs[1]).unwrap();

        assert_eq!(first.source, red);
        assert_eq!(second.source, blue);
        assert_ne!(first.entries[0].sha256, second.entries[0].sha256);
        assert_manifest_matches_disk(&dirs[0], &first);
        assert_manifest_matches_disk(&dirs[1], &second);
    }

    #[test]
    fn process_input_writes_every_stage_and_a_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let input = write_png(tmp.path(), "scene.png", 64, 48);
        let dir = tmp.path().join("out").join("scene");

        let manifest = process_input(&pipeline(), &input, &dir).unwrap();

        assert_eq!(manifest.entries.len(), 15);
        assert!(manifest.dropped.is_empty());
        assert_eq!((manifest.working_width, manifest.working_height), (320, 240));

        assert_eq!(manifest.entries[0].file, "01-origin.png");
        assert_eq!(manifest.entries[14].file, "15-top-hat.png");
        assert_eq!(manifest.entries[1].color_model, ColorModel::Gray16);
        assert_manifest_matches_disk(&dir, &manifest);
    }

    #[test]
    fn written_files_decode_to_their_recorded_shape() {
        let tmp = tempfile::tempdir().unwrap();
        let input = write_png(tmp.path(), "shape.png", 40, 20);
        let dir = tmp.path().join("shape");
        let manifest = process_input(&pipeline(), &input, &dir).unwrap();

        let entry = &manifest.entries[8];
        assert_eq!(entry.label, Stage::Threshold);
        let bytes = std::fs::read(dir.join(&entry.file)).unwrap();
        let decoded = decode_png(&bytes).unwrap();
        assert_eq!(decoded.bounds(), (entry.width, entry.height));
        assert_eq!(decoded.color_model(), ColorModel::Gray8);
    }

    #[test]
    fn undecodable_input_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("broken.png");
        std::fs::write(&input, b"not a png at all").unwrap();

        let dir = tmp.path().join("broken");
        let err = process_input(&pipeline(), &input, &dir).unwrap_err();
        assert!(matches!(err, PixelwerkError::Decode(_)));
        assert!(!dir.exists());
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nope");
        let err = process_input(&pipeline(), &tmp.path().join("nope.png"), &dir).unwrap_err();
        assert!(matches!(err, PixelwerkError::Io(_)));
    }

    #[test]
    fn encode_failure_drops_only_that_result() {
        let tmp = tempfile::tempdir().unwrap();
        let outputs = vec![
            NamedRaster {
                stage: Stage::Origin,
                raster: Raster::new(ColorModel::Rgba8, 2, 2),
            },
            // Zero-area buffers cannot be written as PNG.
            NamedRaster {
                stage: Stage::Gray,
                raster: Raster::new(ColorModel::Gray16, 0, 0),
            },
            NamedRaster {
                stage: Stage::Bitwise,
                raster: Raster::new(ColorModel::Rgba8, 2, 2),
            },
        ];
        let mut manifest = Manifest::new(Path::new("x.png"), 2, 2);

        write_outputs(tmp.path(), outputs, &mut manifest).unwrap();

        assert_eq!(manifest.dropped, vec![Stage::Gray]);
        let files: Vec<&str> = manifest.entries.iter().map(|e| e.file.as_str()).collect();
        assert_eq!(files, ["01-origin.png", "03-bitwise.png"]);
        assert!(!tmp.path().join("02-gray.png").exists());
    }
}
