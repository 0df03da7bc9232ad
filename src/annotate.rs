use std::path::Path;
use ab_glyph::{FontVec, PxScale};
use anyhow::{anyhow, Context};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use crate::common::{ImcbBox, ImcbDetection, ImcbImage, ObjectClass};
use crate::validation::{ValidationOutcome, Verdict};

pub fn class_colour(class: ObjectClass) -> Rgb<u8> {
    match class {
        ObjectClass::Certificate => Rgb([57, 255, 20]),
        ObjectClass::Logo => Rgb([0, 191, 255]),
        ObjectClass::Title => Rgb([255, 165, 0]),
    }
}

/// The fixed result palette: neon green / amber / red.
pub fn verdict_colour(verdict: Verdict) -> Rgb<u8> {
    match verdict {
        Verdict::Valid => Rgb([57, 255, 20]),
        Verdict::Generic => Rgb([241, 196, 15]),
        Verdict::Other => Rgb([231, 76, 60]),
    }
}

/// Draws detection boxes over the uploaded image. Labels are only drawn
/// when a font has been supplied; the crate ships no font of its own.
pub struct Annotator {
    font: Option<FontVec>,
    thickness: i32,
    label_height: f32,
}

impl Default for Annotator {
    fn default() -> Self {
        Self {
            font: None,
            thickness: 2,
            label_height: 20.,
        }
    }
}

impl Annotator {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_font_path<P: AsRef<Path>>(mut self, path: P) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .with_context(|| format!("Failed to read font {}", path.as_ref().display()))?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|_| anyhow!("Invalid font file {}", path.as_ref().display()))?;
        self.font = Some(font);
        Ok(self)
    }

    pub fn with_thickness(mut self, thickness: i32) -> Self {
        self.thickness = thickness.max(1);
        self
    }

    pub fn with_label_height(mut self, label_height: f32) -> Self {
        self.label_height = label_height;
        self
    }

    /// Every detection box in its class colour, then the winning certificate
    /// box re-stroked in the verdict colour so the result reads at a glance.
    pub fn annotate(&self, image: &ImcbImage, detections: &[ImcbDetection], outcome: &ValidationOutcome) -> RgbImage {
        let mut annotated = image.to_rgb8();

        for detection in detections {
            let label = format!("{}: {:.2}", detection.label(), detection.confidence);
            self.draw_box(&mut annotated, &detection.bbox, class_colour(detection.class), &label);
        }

        if let ValidationOutcome::Classified { verdict, candidate } = outcome {
            self.draw_box(&mut annotated, &candidate.bbox, verdict_colour(*verdict), verdict.label());
        }

        annotated
    }

    fn draw_box(&self, image: &mut RgbImage, bbox: &ImcbBox, colour: Rgb<u8>, label: &str) {
        let (img_width, img_height) = (image.width() as i32, image.height() as i32);
        if img_width == 0 || img_height == 0 {
            return;
        }

        let (x, y, w, h) = bbox.as_xy_wh_i32();
        let x = x.clamp(0, img_width - 1);
        let y = y.clamp(0, img_height - 1);
        let w = w.min(img_width - x).max(1);
        let h = h.min(img_height - y).max(1);

        for t in 0..self.thickness {
            if w - 2 * t < 1 || h - 2 * t < 1 {
                break;
            }
            let rect = Rect::at(x + t, y + t).of_size((w - 2 * t) as u32, (h - 2 * t) as u32);
            draw_hollow_rect_mut(image, rect, colour);
        }

        if let Some(font) = &self.font {
            let scale = PxScale {
                x: self.label_height * 2.0,
                y: self.label_height,
            };
            let text_y = (y - self.label_height as i32).max(0);
            draw_text_mut(image, colour, x, text_y, scale, font, label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;
    use crate::common::ImcbDetection;

    #[test]
    fn class_colours_are_distinct() {
        let colours = [
            class_colour(ObjectClass::Certificate),
            class_colour(ObjectClass::Logo),
            class_colour(ObjectClass::Title),
        ];
        assert_ne!(colours[0], colours[1]);
        assert_ne!(colours[1], colours[2]);
        assert_ne!(colours[0], colours[2]);
    }

    #[test]
    fn draws_box_edges_in_class_colour() {
        let image = ImcbImage::from(DynamicImage::new_rgb8(100, 100));
        let detections = [ImcbDetection::new(
            ObjectClass::Logo,
            ImcbBox::new(10., 10., 50., 40.),
            0.9,
        )];

        let annotated = Annotator::new().annotate(&image, &detections, &ValidationOutcome::NoCertificate);

        assert_eq!(annotated.get_pixel(10, 10), &class_colour(ObjectClass::Logo));
        assert_eq!(annotated.get_pixel(49, 39), &class_colour(ObjectClass::Logo));
        // Interior untouched
        assert_eq!(annotated.get_pixel(30, 25), &Rgb([0, 0, 0]));
    }

    #[test]
    fn out_of_bounds_boxes_are_clamped() {
        let image = ImcbImage::from(DynamicImage::new_rgb8(64, 64));
        let detections = [ImcbDetection::new(
            ObjectClass::Title,
            ImcbBox::new(-20., -20., 200., 200.),
            0.9,
        )];

        let annotated = Annotator::new().annotate(&image, &detections, &ValidationOutcome::NoCertificate);
        assert_eq!(annotated.dimensions(), (64, 64));
    }

    #[test]
    fn missing_font_file_is_an_error() {
        assert!(Annotator::new().with_font_path("/nonexistent/font.ttf").is_err());
    }
}
