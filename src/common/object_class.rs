use serde::{Deserialize, Serialize};

/// Display names for the model's classes, indexed by class id.
pub const CLASS_NAMES: [&str; 3] = ["certificate", "logo", "title"];

// The model is trained on exactly these three classes. Anything else coming
// out of a session is a mismatched weights file and gets skipped upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectClass {
    Certificate,
    Logo,
    Title,
}

impl ObjectClass {
    pub fn from_id(class_id: usize) -> Option<Self> {
        match class_id {
            0 => Some(ObjectClass::Certificate),
            1 => Some(ObjectClass::Logo),
            2 => Some(ObjectClass::Title),
            _ => None,
        }
    }

    pub fn id(&self) -> usize {
        match self {
            ObjectClass::Certificate => 0,
            ObjectClass::Logo => 1,
            ObjectClass::Title => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        CLASS_NAMES[self.id()]
    }
}
