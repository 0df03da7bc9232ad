use crate::common::{ImcbDetection, ImcbImage};

/// Anything that can produce detections for a single image.
///
/// The validation pipeline only ever talks to this boundary, so tests can
/// substitute a detector returning fixed detection sets for the real
/// ORT-backed one.
pub trait Detector {
    fn detect(&mut self, image: &ImcbImage) -> anyhow::Result<Vec<ImcbDetection>>;
}
