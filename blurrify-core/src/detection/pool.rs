//! Bounded worker pool for per-frame detection tasks.
//!
//! A fixed set of worker threads drains an atomic-index work queue, so no
//! two workers can ever claim the same frame file; file-level disjointness
//! is the only synchronization the rest of the design relies on. Results
//! travel back over a channel and are re-aligned to input order, one entry
//! per input, regardless of completion order.

use super::{DetectorLoader, process_frame};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

/// Runs detection over `files` with `workers` parallel workers.
///
/// Each worker loads its own detector instance from `loader` once per
/// worker lifetime. A worker whose load fails keeps draining the queue and
/// reports a load error for every task it claims, rather than silently
/// skipping those files.
///
/// The returned vector has exactly one entry per input file, in input
/// order: `None` for success, `Some(description)` for a per-file error.
pub fn run_batch(
    files: &[PathBuf],
    loader: &dyn DetectorLoader,
    workers: usize,
) -> Vec<Option<String>> {
    if files.is_empty() {
        return Vec::new();
    }
    let workers = workers.clamp(1, files.len());

    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, Option<String>)>();

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move || {
                let (mut detector, load_error) = match loader.load() {
                    Ok(detector) => (Some(detector), None),
                    Err(e) => (None, Some(format!("failed to load detector: {e}"))),
                };
                loop {
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    if index >= files.len() {
                        break;
                    }
                    let result = match detector.as_deref_mut() {
                        Some(detector) => process_frame(&files[index], detector),
                        None => load_error.clone(),
                    };
                    // The receiver outlives the scope; send cannot fail.
                    let _ = tx.send((index, result));
                }
            });
        }
    });
    drop(tx);

    let mut results: Vec<Option<String>> = vec![None; files.len()];
    for (index, result) in rx {
        results[index] = result;
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{Detector, Region};
    use crate::error::{CoreError, CoreResult};
    use image::{GrayImage, Rgb, RgbImage};
    use std::collections::HashSet;
    use std::path::Path;

    /// Loader handing out fixed-output detectors while counting loads.
    struct CountingLoader {
        regions: Vec<Region>,
        loads: AtomicUsize,
    }

    impl CountingLoader {
        fn new(regions: Vec<Region>) -> Self {
            Self {
                regions,
                loads: AtomicUsize::new(0),
            }
        }
    }

    struct FixedDetector(Vec<Region>);

    impl Detector for FixedDetector {
        fn detect(&mut self, _image: &GrayImage) -> Vec<Region> {
            self.0.clone()
        }
    }

    impl DetectorLoader for CountingLoader {
        fn load(&self) -> CoreResult<Box<dyn Detector>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FixedDetector(self.regions.clone())))
        }
    }

    struct FailingLoader;

    impl DetectorLoader for FailingLoader {
        fn load(&self) -> CoreResult<Box<dyn Detector>> {
            Err(CoreError::Detector("bad model".into()))
        }
    }

    fn write_frames(dir: &Path, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.join(format!("FRAME_{i:09}.bmp"));
                RgbImage::from_pixel(8, 8, Rgb([i as u8, 0, 0]))
                    .save(&path)
                    .unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_every_input_accounted_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_frames(dir.path(), 23);
        let loader = CountingLoader::new(Vec::new());

        let results = run_batch(&files, &loader, 4);

        assert_eq!(results.len(), files.len());
        assert!(results.iter().all(|r| r.is_none()));
    }

    #[test]
    fn test_one_detector_load_per_worker() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_frames(dir.path(), 12);
        let loader = CountingLoader::new(Vec::new());

        run_batch(&files, &loader, 3);
        assert_eq!(loader.loads.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_worker_count_clamped_to_task_count() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_frames(dir.path(), 2);
        let loader = CountingLoader::new(Vec::new());

        let results = run_batch(&files, &loader, 16);
        assert_eq!(results.len(), 2);
        assert!(loader.loads.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_load_failure_reports_error_for_every_task() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_frames(dir.path(), 5);

        let results = run_batch(&files, &FailingLoader, 2);

        assert_eq!(results.len(), 5);
        for result in results {
            let message = result.expect("load failure must surface per task");
            assert!(message.contains("failed to load detector"));
        }
    }

    #[test]
    fn test_unreadable_file_does_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = write_frames(dir.path(), 3);
        files.insert(1, dir.path().join("not-there.bmp"));
        let loader = CountingLoader::new(Vec::new());

        let results = run_batch(&files, &loader, 2);

        assert_eq!(results.len(), 4);
        assert!(results[1].as_deref().unwrap().contains("could not read image"));
        for (i, result) in results.iter().enumerate() {
            if i != 1 {
                assert!(result.is_none(), "entry {i} unexpectedly failed");
            }
        }
    }

    #[test]
    fn test_disjoint_writes() {
        // Each frame file is written by at most one worker: give every file
        // a detection so every file is rewritten, then check all files were
        // rewritten exactly as the (deterministic) detector output dictates.
        let dir = tempfile::tempdir().unwrap();
        let files = write_frames(dir.path(), 10);
        let loader = CountingLoader::new(vec![Region { x: 0, y: 0, width: 8, height: 8 }]);

        let results = run_batch(&files, &loader, 5);
        assert!(results.iter().all(|r| r.is_none()));

        let mut contents = HashSet::new();
        for file in &files {
            contents.insert(std::fs::read(file).unwrap().len());
            assert!(image::open(file).is_ok(), "frame left unreadable");
        }
        // All frames were re-encoded to the same dimensions.
        assert_eq!(contents.len(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let loader = CountingLoader::new(Vec::new());
        assert!(run_batch(&[], &loader, 4).is_empty());
        assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
    }
}
