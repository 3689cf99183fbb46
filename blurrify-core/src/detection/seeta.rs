//! Concrete detector backed by the rustface multi-scale classifier.
//!
//! The detection parameters are policy constants carried over from the
//! original cascade configuration, not computed from content.

use super::{Detector, DetectorLoader, Region};
use crate::error::{CoreError, CoreResult};
use image::GrayImage;
use rustface::ImageData;
use std::path::PathBuf;

/// Minimum side length of a detected region, in pixels.
const MIN_REGION_SIZE: u32 = 25;
/// Scale step between pyramid levels (~= 1/1.1).
const PYRAMID_SCALE_FACTOR: f32 = 0.91;
/// Sliding-window step, in pixels, on both axes.
const SLIDE_WINDOW_STEP: u32 = 4;
/// Classifier score below which candidate windows are rejected.
const SCORE_THRESHOLD: f64 = 2.0;

/// Loads rustface detectors from a model file on disk.
#[derive(Debug, Clone)]
pub struct SeetaDetectorLoader {
    model_path: PathBuf,
}

impl SeetaDetectorLoader {
    pub fn new(model_path: PathBuf) -> Self {
        Self { model_path }
    }
}

impl DetectorLoader for SeetaDetectorLoader {
    fn load(&self) -> CoreResult<Box<dyn Detector>> {
        let path = self
            .model_path
            .to_str()
            .ok_or_else(|| CoreError::InvalidPath(self.model_path.display().to_string()))?;
        let mut inner = rustface::create_detector(path).map_err(|e| {
            CoreError::Detector(format!(
                "could not load model '{}': {e}",
                self.model_path.display()
            ))
        })?;
        inner.set_min_face_size(MIN_REGION_SIZE);
        inner.set_score_thresh(SCORE_THRESHOLD);
        inner.set_pyramid_scale_factor(PYRAMID_SCALE_FACTOR);
        inner.set_slide_window_step(SLIDE_WINDOW_STEP, SLIDE_WINDOW_STEP);
        Ok(Box::new(SeetaDetector { inner }))
    }
}

struct SeetaDetector {
    inner: Box<dyn rustface::Detector>,
}

impl Detector for SeetaDetector {
    fn detect(&mut self, image: &GrayImage) -> Vec<Region> {
        let (width, height) = image.dimensions();
        let mut data = ImageData::new(image.as_raw(), width, height);
        self.inner
            .detect(&mut data)
            .into_iter()
            .map(|info| {
                let bbox = info.bbox();
                Region {
                    // The classifier can report windows slightly off-canvas.
                    x: bbox.x().max(0) as u32,
                    y: bbox.y().max(0) as u32,
                    width: bbox.width(),
                    height: bbox.height(),
                }
            })
            .collect()
    }
}
