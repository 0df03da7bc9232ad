
mod imcb_box;
mod imcb_detection;
mod imcb_image;
mod inference_device;
mod model_config;
mod object_class;

pub use imcb_box::*;
pub use imcb_detection::*;
pub use imcb_image::*;
pub use inference_device::*;
pub use model_config::*;
pub use object_class::*;
