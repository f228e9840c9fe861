// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline orchestrator — normalises an input to the working width and yields
// the fixed battery of labelled outputs, one stage at a time.

use image::GrayImage;
use pixelwerk_core::config::PipelineConfig;
use pixelwerk_core::error::{PixelwerkError, Result};
use pixelwerk_core::Stage;
use tracing::{debug, info, instrument};

use crate::intensity;
use crate::mask;
use crate::morphology::Morphology;
use crate::pyramid;
use crate::raster::Raster;

/// One labelled pipeline output.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedRaster {
    pub stage: Stage,
    pub raster: Raster,
}

impl NamedRaster {
    pub fn label(&self) -> &'static str {
        self.stage.label()
    }
}

/// The transform battery, parameterised by a validated [`PipelineConfig`].
///
/// A `Pipeline` holds no per-run state, so one instance can serve any number
/// of independent runs.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    morphology: Morphology,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let morphology = Morphology::from_config(&config);
        Ok(Self { config, morphology })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Resample `src` to the working width as RGBA8.
    ///
    /// Empty inputs are rejected here, before any transform runs.
    #[instrument(skip(self, src), fields(width = src.width(), height = src.height()))]
    pub fn prepare(&self, src: &Raster) -> Result<Raster> {
        if src.is_empty() {
            let (width, height) = src.bounds();
            return Err(PixelwerkError::EmptyImage { width, height });
        }
        let rgba = Raster::Rgba8(src.to_rgba8());
        let working = pyramid::resample(&rgba, self.config.working_width, 0);
        info!(
            working_w = working.width(),
            working_h = working.height(),
            "Working buffer prepared"
        );
        Ok(working)
    }

    /// Start a run over `src`. Outputs are produced lazily in [`Stage::ALL`] order.
    pub fn run(&self, src: &Raster) -> Result<Outputs<'_>> {
        let working = self.prepare(src)?;
        Ok(Outputs {
            pipeline: self,
            working,
            threshold: None,
            next: 0,
        })
    }

    /// Run every stage and collect all outputs.
    pub fn run_all(&self, src: &Raster) -> Result<Vec<NamedRaster>> {
        Ok(self.run(src)?.collect())
    }
}

/// Lazy sequence of a run's outputs.
///
/// The threshold buffer is computed once, on first need, and shared by the
/// six morphology stages.
#[derive(Debug)]
pub struct Outputs<'a> {
    pipeline: &'a Pipeline,
    working: Raster,
    threshold: Option<GrayImage>,
    next: usize,
}

impl Outputs<'_> {
    /// The resampled buffer every branch reads from.
    pub fn working(&self) -> &Raster {
        &self.working
    }

    fn binary(&mut self) -> &GrayImage {
        let threshold = self.pipeline.config.threshold;
        let working = &self.working;
        self.threshold
            .get_or_insert_with(|| intensity::threshold(working, threshold))
    }

    fn render(&mut self, stage: Stage) -> Raster {
        let pipeline = self.pipeline;
        let config = &pipeline.config;
        let morphology = pipeline.morphology;
        let src = &self.working;
        match stage {
            Stage::Origin => src.clone(),
            Stage::Gray => intensity::to_grayscale(src).into(),
            Stage::Bitwise => intensity::invert(src).into(),
            Stage::Red => mask::mask_channel(src, &config.red, config.channel_test).into(),
            Stage::Blue => mask::mask_channel(src, &config.blue, config.channel_test).into(),
            Stage::Green => mask::mask_channel(src, &config.green, config.channel_test).into(),
            Stage::Contraction => pyramid::contract(src, &config.contraction),
            Stage::Expansion => pyramid::expand(src, &config.expansion),
            Stage::Threshold => self.binary().clone().into(),
            Stage::Dilation => morphology.dilate(self.binary()).into(),
            Stage::Erosion => morphology.erode(self.binary()).into(),
            Stage::Opening => morphology.open(self.binary()).into(),
            Stage::Closing => morphology.close(self.binary()).into(),
            Stage::MorphologyGradient => morphology.gradient(self.binary()).into(),
            Stage::TopHat => morphology.tophat(self.binary()).into(),
        }
    }
}

impl Iterator for Outputs<'_> {
    type Item = NamedRaster;

    fn next(&mut self) -> Option<NamedRaster> {
        let stage = *Stage::ALL.get(self.next)?;
        self.next += 1;
        let raster = self.render(stage);
        debug!(
            stage = stage.label(),
            width = raster.width(),
            height = raster.height(),
            "Stage complete"
        );
        Some(NamedRaster { stage, raster })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = Stage::ALL.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Outputs<'_> {}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba, RgbaImage};
    use pixelwerk_core::ColorModel;

    fn gradient_image(width: u32, height: u32) -> Raster {
        Raster::Rgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
                255,
            ])
        }))
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(PipelineConfig::default()).unwrap()
    }

    #[test]
    fn run_yields_fifteen_outputs_in_order() {
        let outputs = pipeline().run_all(&gradient_image(64, 48)).unwrap();
        let stages: Vec<Stage> = outputs.iter().map(|o| o.stage).collect();
        assert_eq!(stages, Stage::ALL);
    }

    #[test]
    fn outputs_share_the_working_size() {
        let outputs = pipeline().run_all(&gradient_image(640, 480)).unwrap();
        for output in &outputs {
            assert_eq!(output.raster.bounds(), (320, 240), "{}", output.label());
        }
    }

    #[test]
    fn outputs_have_the_expected_color_models() {
        let outputs = pipeline().run_all(&gradient_image(32, 32)).unwrap();
        let model = |stage: Stage| {
            outputs
                .iter()
                .find(|o| o.stage == stage)
                .map(|o| o.raster.color_model())
                .unwrap()
        };
        assert_eq!(model(Stage::Origin), ColorModel::Rgba8);
        assert_eq!(model(Stage::Gray), ColorModel::Gray16);
        assert_eq!(model(Stage::Bitwise), ColorModel::Rgba8);
        assert_eq!(model(Stage::Red), ColorModel::Rgba8);
        assert_eq!(model(Stage::Threshold), ColorModel::Gray8);
        assert_eq!(model(Stage::TopHat), ColorModel::Gray8);
    }

    #[test]
    fn morphology_stages_derive_from_threshold() {
        let pipeline = pipeline();
        let outputs = pipeline.run_all(&gradient_image(50, 50)).unwrap();
        let Raster::Gray8(binary) = &outputs[8].raster else {
            panic!("threshold is not gray8");
        };
        let morphology = Morphology::default();
        assert_eq!(outputs[9].raster, Raster::Gray8(morphology.dilate(binary)));
        assert_eq!(outputs[10].raster, Raster::Gray8(morphology.erode(binary)));
        assert_eq!(outputs[13].raster, Raster::Gray8(morphology.gradient(binary)));
        assert_eq!(outputs[14].raster, Raster::Gray8(morphology.tophat(binary)));
    }

    #[test]
    fn outputs_are_lazy_and_sized() {
        let pipeline = pipeline();
        let mut outputs = pipeline.run(&gradient_image(16, 16)).unwrap();
        assert_eq!(outputs.len(), 15);
        let first = outputs.next().unwrap();
        assert_eq!(first.stage, Stage::Origin);
        assert_eq!(&first.raster, outputs.working());
        assert_eq!(outputs.len(), 14);
        assert_eq!(outputs.by_ref().count(), 14);
        assert!(outputs.next().is_none());
    }

    #[test]
    fn skipping_to_morphology_still_thresholds() {
        let pipeline = pipeline();
        let dilation = pipeline
            .run(&gradient_image(16, 16))
            .unwrap()
            .find(|o| o.stage == Stage::Dilation)
            .unwrap();
        assert_eq!(dilation.raster.color_model(), ColorModel::Gray8);
    }

    #[test]
    fn single_pixel_input_does_not_crash() {
        let src = Raster::Gray8(image::GrayImage::from_pixel(1, 1, Luma([255])));
        let outputs = pipeline().run_all(&src).unwrap();
        assert_eq!(outputs.len(), 15);
        // A uniform white input: the working buffer is 320x320 and the
        // threshold is all white, so erosion leaves only the border ring dark.
        let Raster::Gray8(erosion) = &outputs[10].raster else {
            panic!("erosion is not gray8");
        };
        assert_eq!(erosion.dimensions(), (320, 320));
        assert_eq!(erosion.get_pixel(0, 0).0[0], 0);
        assert_eq!(erosion.get_pixel(160, 160).0[0], 255);
    }

    #[test]
    fn empty_input_is_rejected_before_any_stage() {
        let src = Raster::new(ColorModel::Rgba8, 0, 5);
        let err = pipeline().run(&src).unwrap_err();
        assert!(matches!(err, PixelwerkError::EmptyImage { width: 0, height: 5 }));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PipelineConfig {
            working_width: 0,
            ..PipelineConfig::default()
        };
        assert!(Pipeline::new(config).is_err());
    }

    #[test]
    fn custom_threshold_flows_through() {
        let config = PipelineConfig {
            threshold: 0,
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::new(config).unwrap();
        let threshold = pipeline
            .run(&gradient_image(8, 8))
            .unwrap()
            .nth(8)
            .unwrap();
        let Raster::Gray8(binary) = threshold.raster else {
            panic!("threshold is not gray8");
        };
        assert!(binary.pixels().all(|p| p.0[0] == 255));
    }
}
