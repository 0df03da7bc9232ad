mod detection_processing;
mod utils;
pub mod annotate;
pub mod common;
pub mod detection_runners;
pub mod detectors;
pub mod validation;

use std::time::Instant;
use crate::common::{ImcbDetection, ImcbImage, ModelConfig};
use crate::detection_runners::OrtDetector;
use crate::detectors::Detector;
use crate::validation::{ImageAnalysis, ValidationOutcome};

/// Loads the detection model once. The returned detector is the process-wide
/// dependency handed to every subsequent call; nothing here is a singleton.
pub fn init_detector(model_details: &ModelConfig) -> anyhow::Result<OrtDetector> {
    log::info!("Initializing detector\n{}", model_details.summary());
    OrtDetector::new(model_details)
}

/// One synchronous forward pass over one image.
pub fn run_detection<D: Detector>(detector: &mut D, image: &ImcbImage) -> anyhow::Result<Vec<ImcbDetection>> {
    let now = Instant::now();

    let detections = detector.detect(image)?;

    log::debug!("Processing time: {:?} ({} detections)", now.elapsed(), detections.len());

    Ok(detections)
}

/// Full per-upload pipeline: detect, aggregate the best certificate
/// candidate, classify. The caller annotates/renders from the result.
pub fn validate_image<D: Detector>(detector: &mut D, image: &ImcbImage) -> anyhow::Result<ImageAnalysis> {
    let detections = run_detection(detector, image)?;
    let outcome = ValidationOutcome::evaluate(&detections);

    Ok(ImageAnalysis { detections, outcome })
}
