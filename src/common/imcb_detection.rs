use serde::{Deserialize, Serialize};
use crate::common::{ImcbBox, ObjectClass};

/// One raw output of the detection model for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImcbDetection {
    pub class: ObjectClass,
    pub bbox: ImcbBox,
    pub confidence: f32,
}

impl ImcbDetection {
    pub fn new(class: ObjectClass, bbox: ImcbBox, confidence: f32) -> Self {
        Self {
            class,
            bbox,
            confidence,
        }
    }

    pub fn label(&self) -> &'static str {
        self.class.name()
    }

    /// Computes the intersection over union (IoU) between this detection and another.
    pub fn iou(&self, other: &ImcbDetection) -> f32 {
        self.bbox.iou(&other.bbox)
    }
}
