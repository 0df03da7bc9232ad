use std::env;
use std::fs;
use std::path::Path;
use anyhow::Context;
use serde::Deserialize;
use crate::common::inference_device::InferenceDevice;

fn default_conf_threshold() -> f32 {
    0.25
}

fn default_iou_threshold() -> f32 {
    0.7
}

fn default_input_size() -> u32 {
    640
}

/// Where the model lives and how to run it. Loaded once, passed into the
/// pipeline explicitly; nothing in the crate hardcodes an artifact path.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub weights_path: String,
    pub ort_lib_path: String,
    #[serde(default)]
    pub inference_device: InferenceDevice,
    /// Minimum confidence for a detection to be kept at all. This sits well
    /// below the verdict threshold so weak certificates still surface.
    #[serde(default = "default_conf_threshold")]
    pub conf_threshold: f32,
    #[serde(default = "default_iou_threshold")]
    pub iou_threshold: f32,
    #[serde(default = "default_input_size")]
    pub width: u32,
    #[serde(default = "default_input_size")]
    pub height: u32,
}

impl ModelConfig {
    pub fn new(weights_path: String, ort_lib_path: String) -> Self {
        Self {
            weights_path,
            ort_lib_path,
            inference_device: InferenceDevice::default(),
            conf_threshold: default_conf_threshold(),
            iou_threshold: default_iou_threshold(),
            width: default_input_size(),
            height: default_input_size(),
        }
    }

    /// Reads a JSON config file. Only the two paths are required.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read model config {}", path.as_ref().display()))?;
        let config: ModelConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse model config {}", path.as_ref().display()))?;
        Ok(config)
    }

    /// Builds a config from `IMCB_DETECT_MODEL`, `IMCB_DETECT_ORT_LIB` and
    /// the optional `IMCB_DETECT_DEVICE`.
    pub fn from_env() -> anyhow::Result<Self> {
        let weights_path = env::var("IMCB_DETECT_MODEL")
            .context("IMCB_DETECT_MODEL is not set")?;
        let ort_lib_path = env::var("IMCB_DETECT_ORT_LIB")
            .context("IMCB_DETECT_ORT_LIB is not set")?;

        let mut config = Self::new(weights_path, ort_lib_path);
        if let Ok(device) = env::var("IMCB_DETECT_DEVICE") {
            config.inference_device = InferenceDevice::from_str(&device, 0)
                .with_context(|| format!("Unknown inference device: {}", device))?;
        }
        Ok(config)
    }

    pub fn with_device(mut self, device: InferenceDevice) -> Self {
        self.inference_device = device;
        self
    }

    pub fn with_conf_threshold(mut self, conf_threshold: f32) -> Self {
        self.conf_threshold = conf_threshold;
        self
    }

    pub fn with_iou_threshold(mut self, iou_threshold: f32) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }

    pub fn with_input_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn summary(&self) -> String {
        format!("Weights File Path: {}\n\
        OnnxRuntime Lib Path: {}\n\
        Inference Device: {}\n\
        Model Input Resolution: {}x{}\n\
        Detection Threshold: {}\n\
        NMS IoU Threshold: {}",
                self.weights_path, self.ort_lib_path, self.inference_device,
                self.width, self.height, self.conf_threshold, self.iou_threshold)
    }
}
