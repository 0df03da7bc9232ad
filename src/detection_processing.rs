use anyhow::ensure;
use image::imageops::FilterType;
use ndarray::{Array, ArrayD, Ix4};
use rayon::prelude::*;
use crate::common::{ImcbBox, ImcbDetection, ImcbImage, ObjectClass};

/// Resizes the upload to the model input resolution and packs it into a
/// normalized NCHW f32 tensor. Returns the original dimensions alongside so
/// postprocessing can scale boxes back.
pub fn process_image(imcb_image: &ImcbImage, width: u32, height: u32) -> anyhow::Result<(u32, u32, Array<f32, Ix4>)> {
    let (img_width, img_height) = imcb_image.dimensions();

    let mut resizer = fast_image_resize::Resizer::new();
    let options = fast_image_resize::ResizeOptions {
        algorithm: fast_image_resize::ResizeAlg::Convolution(
            fast_image_resize::FilterType::Bilinear,
        ),
        ..Default::default()
    };

    let mut resized = image::DynamicImage::new(width, height, imcb_image.image.color());
    if let Err(err) = resizer.resize(&imcb_image.image, &mut resized, &options) {
        log::warn!("Failed to use `fast_image_resize` ({}). Falling back.", err);
        resized = image::imageops::resize(&imcb_image.image, width, height, FilterType::Nearest).into();
    }

    let rgb = resized.to_rgb8();
    let buf = rgb.as_raw();
    let hw = width as usize * height as usize;

    let mut flat = vec![0f32; 3 * hw];
    let (r_plane, rest) = flat.split_at_mut(hw);
    let (g_plane, b_plane) = rest.split_at_mut(hw);

    r_plane
        .par_iter_mut()
        .zip_eq(g_plane.par_iter_mut())
        .zip_eq(b_plane.par_iter_mut())
        .enumerate()
        .for_each(|(i, ((r, g), b))| {
            *r = buf[3 * i] as f32 / 255.;
            *g = buf[3 * i + 1] as f32 / 255.;
            *b = buf[3 * i + 2] as f32 / 255.;
        });

    let input = Array::from_shape_vec((1, 3, height as usize, width as usize), flat)?;

    Ok((img_width, img_height, input))
}

/// Decodes model output rows of `(cx, cy, w, h, confidence, class_id)` in
/// model-input scale into detections in original-image pixels, then applies
/// confidence-ordered IoU suppression.
pub(crate) fn process_predictions(output: &ArrayD<f32>,
                                  model_width: f32, model_height: f32,
                                  img_width: f32, img_height: f32,
                                  conf_threshold: f32, iou_threshold: f32) -> anyhow::Result<Vec<ImcbDetection>> {
    ensure!(
        output.len() % 6 == 0,
        "Unexpected model output length {} (expected rows of 6)",
        output.len()
    );

    let rows = output.len() / 6;
    let preds = output.to_shape((rows, 6))?;

    let mut boxes: Vec<(ImcbBox, ObjectClass, f32)> = Vec::new();

    for detection in preds.outer_iter() {
        let conf = detection[4];
        if conf < conf_threshold {
            continue;
        }

        let class_id = detection[5] as usize;
        let class = match ObjectClass::from_id(class_id) {
            Some(class) => class,
            None => {
                log::debug!("Skipping detection with unknown class id {}", class_id);
                continue;
            }
        };

        let xc = detection[0] / model_width * img_width;
        let yc = detection[1] / model_height * img_height;
        let w = detection[2] / model_width * img_width;
        let h = detection[3] / model_height * img_height;

        boxes.push((
            ImcbBox::new(xc - w / 2.0, yc - h / 2.0, xc + w / 2.0, yc + h / 2.0),
            class,
            conf,
        ));
    }

    boxes.sort_by(|box1, box2| box2.2.total_cmp(&box1.2));

    let mut detections: Vec<ImcbDetection> = Vec::new();

    while !boxes.is_empty() {
        let (bbox, class, conf) = boxes.remove(0);
        boxes.retain(|(other, _, _)| bbox.iou(other) < iou_threshold);
        detections.push(ImcbDetection::new(class, bbox, conf));
    }

    Ok(detections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use ndarray::IxDyn;

    fn output_tensor(rows: &[[f32; 6]]) -> ArrayD<f32> {
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        ArrayD::from_shape_vec(IxDyn(&[1, rows.len(), 6]), flat).unwrap()
    }

    #[test]
    fn decodes_centre_format_rows_to_pixel_corners() {
        let output = output_tensor(&[[100., 100., 40., 20., 0.9, 0.]]);
        let detections = process_predictions(&output, 640., 640., 640., 640., 0.25, 0.7).unwrap();

        assert_eq!(detections.len(), 1);
        let det = &detections[0];
        assert_eq!(det.class, ObjectClass::Certificate);
        assert_eq!(det.bbox.as_x1y1_x2y2_i32(), (80, 90, 120, 110));
    }

    #[test]
    fn scales_boxes_back_to_original_image() {
        let output = output_tensor(&[[320., 320., 64., 64., 0.8, 1.]]);
        let detections = process_predictions(&output, 640., 640., 1280., 1280., 0.25, 0.7).unwrap();

        assert_eq!(detections[0].class, ObjectClass::Logo);
        assert_eq!(detections[0].bbox.as_x1y1_x2y2_i32(), (576, 576, 704, 704));
    }

    #[test]
    fn drops_rows_below_threshold_and_unknown_classes() {
        let output = output_tensor(&[
            [100., 100., 40., 20., 0.1, 0.],
            [100., 100., 40., 20., 0.9, 7.],
            [300., 300., 40., 20., 0.9, 2.],
        ]);
        let detections = process_predictions(&output, 640., 640., 640., 640., 0.25, 0.7).unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].class, ObjectClass::Title);
    }

    #[test]
    fn suppresses_overlapping_boxes_keeping_highest_confidence() {
        let output = output_tensor(&[
            [100., 100., 40., 40., 0.7, 0.],
            [102., 102., 40., 40., 0.9, 0.],
            [400., 400., 40., 40., 0.6, 1.],
        ]);
        let detections = process_predictions(&output, 640., 640., 640., 640., 0.25, 0.7).unwrap();

        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].confidence, 0.9);
        assert_eq!(detections[0].class, ObjectClass::Certificate);
        assert_eq!(detections[1].class, ObjectClass::Logo);
    }

    #[test]
    fn empty_output_is_no_detections() {
        let output = ArrayD::from_shape_vec(IxDyn(&[1, 0, 6]), vec![]).unwrap();
        let detections = process_predictions(&output, 640., 640., 640., 640., 0.25, 0.7).unwrap();
        assert!(detections.is_empty());
    }

    #[test]
    fn rejects_malformed_output() {
        let output = ArrayD::from_shape_vec(IxDyn(&[5]), vec![0.; 5]).unwrap();
        assert!(process_predictions(&output, 640., 640., 640., 640., 0.25, 0.7).is_err());
    }

    #[test]
    fn input_tensor_is_normalized_nchw() {
        let mut rgb = RgbImage::new(8, 8);
        for pixel in rgb.pixels_mut() {
            *pixel = Rgb([255, 128, 0]);
        }
        let image = ImcbImage::from(DynamicImage::from(rgb));

        let (img_width, img_height, input) = process_image(&image, 4, 4).unwrap();

        assert_eq!((img_width, img_height), (8, 8));
        assert_eq!(input.shape(), &[1, 3, 4, 4]);
        assert!((input[[0, 0, 2, 2]] - 1.0).abs() < 1e-6);
        assert!((input[[0, 1, 2, 2]] - 128. / 255.).abs() < 1e-2);
        assert!(input[[0, 2, 2, 2]].abs() < 1e-6);
    }
}
