//! Region detection and in-place blurring of frame images.
//!
//! The detector itself is a black box behind the [`Detector`] trait: a
//! grayscale image goes in, a list of bounding boxes comes out. A
//! [`DetectorLoader`] is the model handle handed to the worker pool; each
//! worker loads its own detector instance from it once per worker lifetime.
//! This mirrors how the rest of the crate keeps external collaborators
//! behind trait seams so tests can substitute them.

use crate::error::CoreResult;
use image::{GrayImage, RgbImage, imageops};
use std::path::Path;

pub mod pool;
pub mod seeta;

pub use pool::run_batch;
pub use seeta::SeetaDetectorLoader;

/// Gaussian sigma used when blurring a detected region. Matches the
/// strength of the original 51x51 kernel (sigma ~= 0.3*((k-1)*0.5 - 1) + 0.8).
pub const BLUR_SIGMA: f32 = 8.3;

/// Axis-aligned bounding box of a detected region, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Black-box region classifier: image in, bounding boxes out.
///
/// An empty result is a success case, not an error.
pub trait Detector {
    fn detect(&mut self, image: &GrayImage) -> Vec<Region>;
}

/// The model handle given to the worker pool. Workers call `load` once per
/// worker lifetime, never per frame.
pub trait DetectorLoader: Send + Sync {
    fn load(&self) -> CoreResult<Box<dyn Detector>>;
}

/// Blurs exactly the given rectangular regions of `image`, clamped to the
/// image bounds. Pixels outside the regions are left untouched.
pub fn blur_regions(image: &mut RgbImage, regions: &[Region]) {
    let (img_width, img_height) = image.dimensions();
    for region in regions {
        if region.x >= img_width || region.y >= img_height {
            continue;
        }
        let width = region.width.min(img_width - region.x);
        let height = region.height.min(img_height - region.y);
        if width == 0 || height == 0 {
            continue;
        }
        let roi = imageops::crop_imm(image, region.x, region.y, width, height).to_image();
        let blurred = imageops::blur(&roi, BLUR_SIGMA);
        imageops::replace(image, &blurred, i64::from(region.x), i64::from(region.y));
    }
}

/// Processes one frame file: read, detect on the grayscale form, blur any
/// detected regions and overwrite the file. A frame with zero detections is
/// left byte-for-byte untouched (no needless re-encode).
///
/// Returns `None` on success or an error description for this file;
/// per-frame failures never abort the batch.
pub fn process_frame(path: &Path, detector: &mut dyn Detector) -> Option<String> {
    let decoded = match image::open(path) {
        Ok(decoded) => decoded,
        Err(e) => return Some(format!("could not read image '{}': {e}", path.display())),
    };

    let gray = decoded.to_luma8();
    let regions = detector.detect(&gray);
    if regions.is_empty() {
        return None;
    }

    let mut frame = decoded.into_rgb8();
    blur_regions(&mut frame, &regions);
    if let Err(e) = frame.save(path) {
        return Some(format!("could not write image '{}': {e}", path.display()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Stub detector returning a fixed set of regions.
    struct FixedDetector(Vec<Region>);

    impl Detector for FixedDetector {
        fn detect(&mut self, _image: &GrayImage) -> Vec<Region> {
            self.0.clone()
        }
    }

    /// 16x16 checkerboard so a blur actually changes pixel values.
    fn checkerboard() -> RgbImage {
        RgbImage::from_fn(16, 16, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        })
    }

    #[test]
    fn test_blur_changes_only_the_region() {
        let original = checkerboard();
        let mut image = original.clone();
        let region = Region {
            x: 4,
            y: 4,
            width: 6,
            height: 6,
        };
        blur_regions(&mut image, &[region]);

        let mut inside_changed = false;
        for (x, y, pixel) in image.enumerate_pixels() {
            let in_region =
                x >= region.x && x < region.x + region.width && y >= region.y && y < region.y + region.height;
            if in_region {
                inside_changed |= pixel != original.get_pixel(x, y);
            } else {
                assert_eq!(pixel, original.get_pixel(x, y), "pixel outside region moved");
            }
        }
        assert!(inside_changed, "blur had no effect inside the region");
    }

    #[test]
    fn test_blur_clamps_out_of_bounds_regions() {
        let mut image = checkerboard();
        blur_regions(
            &mut image,
            &[
                Region { x: 12, y: 12, width: 50, height: 50 },
                Region { x: 100, y: 100, width: 4, height: 4 },
                Region { x: 2, y: 2, width: 0, height: 3 },
            ],
        );
        // No panic; the fully out-of-bounds and empty regions are no-ops.
        assert_eq!(image.dimensions(), (16, 16));
    }

    #[test]
    fn test_zero_detections_leave_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.bmp");
        checkerboard().save(&path).unwrap();
        let before = std::fs::read(&path).unwrap();

        let mut detector = FixedDetector(Vec::new());
        assert_eq!(process_frame(&path, &mut detector), None);

        assert_eq!(std::fs::read(&path).unwrap(), before, "file was rewritten");
    }

    #[test]
    fn test_detection_overwrites_file_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.bmp");
        checkerboard().save(&path).unwrap();
        let before = std::fs::read(&path).unwrap();

        let mut detector = FixedDetector(vec![Region { x: 0, y: 0, width: 8, height: 8 }]);
        assert_eq!(process_frame(&path, &mut detector), None);

        assert_ne!(std::fs::read(&path).unwrap(), before, "file was not modified");
    }

    #[test]
    fn test_unreadable_image_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.bmp");
        let mut detector = FixedDetector(Vec::new());
        let error = process_frame(&path, &mut detector);
        assert!(error.is_some());
        assert!(error.unwrap().contains("could not read image"));
    }
}
