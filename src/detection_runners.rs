
mod ort_detector;

pub use ort_detector::OrtDetector;
