extern crate imcb_detect;

use image::DynamicImage;
use imcb_detect::annotate::Annotator;
use imcb_detect::common::{ImcbBox, ImcbDetection, ImcbImage, ObjectClass};
use imcb_detect::detectors::Detector;
use imcb_detect::validation::ValidationOutcome;

struct FixedDetector {
    detections: Vec<ImcbDetection>,
}

impl Detector for FixedDetector {
    fn detect(&mut self, _image: &ImcbImage) -> anyhow::Result<Vec<ImcbDetection>> {
        Ok(self.detections.clone())
    }
}

#[test]
fn no_detections_at_all() {
    let mut detector = FixedDetector { detections: vec![] };
    let image = ImcbImage::from(DynamicImage::new_rgb8(128, 128));

    let analysis = imcb_detect::validate_image(&mut detector, &image).unwrap();

    assert!(analysis.detections.is_empty());
    assert_eq!(analysis.outcome, ValidationOutcome::NoCertificate);
    assert_eq!(analysis.outcome.label(), "No certificate detected");
}

#[test]
fn logo_without_certificate_is_not_a_certificate() {
    // A confident logo on its own proves nothing.
    let mut detector = FixedDetector {
        detections: vec![ImcbDetection::new(
            ObjectClass::Logo,
            ImcbBox::new(20., 20., 60., 60.),
            0.9,
        )],
    };
    let image = ImcbImage::from(DynamicImage::new_rgb8(128, 128));

    let analysis = imcb_detect::validate_image(&mut detector, &image).unwrap();

    assert_eq!(analysis.detections.len(), 1);
    assert_eq!(analysis.outcome, ValidationOutcome::NoCertificate);
    assert!(analysis.outcome.verdict().is_none());

    // The logo box still gets drawn; there is just no verdict stroke.
    let annotated = Annotator::new().annotate(&image, &analysis.detections, &analysis.outcome);
    assert_eq!(annotated.dimensions(), (128, 128));
    assert_ne!(annotated.get_pixel(20, 20), &image::Rgb([0u8, 0, 0]));
}
