use std::time::Instant;
use anyhow::bail;
use ort::{inputs, CUDAExecutionProvider, ExecutionProvider, Session, SessionOutputs, TensorRTExecutionProvider};
use crate::common::{ImcbDetection, ImcbImage, InferenceDevice, ModelConfig};
use crate::detection_processing;
use crate::detectors::Detector;
use crate::utils;

/// Onnxruntime-backed detector. The session is created once and reused
/// read-only across sequential detect calls.
pub struct OrtDetector {
    session: Session,
    input_name: String,
    output_name: String,
    model_details: ModelConfig,
}

impl OrtDetector {
    pub fn new(model_details: &ModelConfig) -> anyhow::Result<Self> {
        // Dynamically load the runtime library from the configured path
        ort::init_from(&model_details.ort_lib_path).commit()?;

        let session_builder = Session::builder()?;

        match model_details.inference_device {
            InferenceDevice::CPU => {},
            InferenceDevice::CUDA(_) => {
                let cuda = CUDAExecutionProvider::default();
                match cuda.register(&session_builder) {
                    Ok(_) => log::info!("CUDA device successfully registered"),
                    Err(e) => bail!("Failed to register CUDA device: {}", e),
                }
            },
            InferenceDevice::TensorRT(_) => {
                let tensor_rt = TensorRTExecutionProvider::default();
                match tensor_rt.register(&session_builder) {
                    Ok(_) => log::info!("TensorRT device successfully registered"),
                    Err(e) => bail!("Failed to register TensorRT device: {}", e),
                }
            },
        };

        log::info!("Initializing ORT session with ({}) execution provider", model_details.inference_device);
        let session = session_builder.commit_from_file(&model_details.weights_path)?;

        let input_name = session.inputs[0].name.clone();
        let output_name = session.outputs[0].name.clone();

        Ok(Self {
            session,
            input_name,
            output_name,
            model_details: model_details.clone(),
        })
    }
}

impl Detector for OrtDetector {
    fn detect(&mut self, image: &ImcbImage) -> anyhow::Result<Vec<ImcbDetection>> {
        let detect_time = Instant::now();

        let (img_width, img_height, input) = detection_processing::process_image(
            image, self.model_details.width, self.model_details.height)?;

        let mut _detect_elapsed = utils::trace("Preprocessing input", detect_time, detect_time.elapsed());

        let outputs: SessionOutputs = self.session.run(inputs![self.input_name.as_str() => input.view()]?)?;

        _detect_elapsed = utils::trace("Detection run", detect_time, _detect_elapsed);

        let output = outputs[self.output_name.as_str()].try_extract_tensor::<f32>()?.into_owned();

        let detections = detection_processing::process_predictions(
            &output,
            self.model_details.width as f32, self.model_details.height as f32,
            img_width as f32, img_height as f32,
            self.model_details.conf_threshold, self.model_details.iou_threshold)?;

        _detect_elapsed = utils::trace("Postprocessing", detect_time, _detect_elapsed);

        Ok(detections)
    }
}
