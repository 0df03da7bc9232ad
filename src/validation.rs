use serde::{Deserialize, Serialize};
use crate::common::{ImcbBox, ImcbDetection, ObjectClass};

/// Minimum certificate confidence for a positive verdict. Fixed policy.
pub const CERT_CONF_THRESHOLD: f32 = 0.65;

/// All detections for one image, grouped by class in model output order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionSet {
    certificates: Vec<ImcbDetection>,
    logos: Vec<ImcbDetection>,
    titles: Vec<ImcbDetection>,
}

impl DetectionSet {
    pub fn from_detections(detections: &[ImcbDetection]) -> Self {
        let mut set = DetectionSet::default();
        for detection in detections {
            match detection.class {
                ObjectClass::Certificate => set.certificates.push(detection.clone()),
                ObjectClass::Logo => set.logos.push(detection.clone()),
                ObjectClass::Title => set.titles.push(detection.clone()),
            }
        }
        set
    }

    pub fn certificates(&self) -> &[ImcbDetection] {
        &self.certificates
    }

    pub fn has_logo(&self) -> bool {
        !self.logos.is_empty()
    }

    pub fn has_title(&self) -> bool {
        !self.titles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.certificates.len() + self.logos.len() + self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selects the certificate detection with the highest confidence, along
    /// with the logo/title context needed to classify it. Ties keep the
    /// first detection in model output order. `None` when the image had no
    /// certificate detection at all.
    pub fn best_certificate(&self) -> Option<CertCandidate> {
        let mut best: Option<&ImcbDetection> = None;
        for detection in &self.certificates {
            match best {
                Some(current) if detection.confidence <= current.confidence => {}
                _ => best = Some(detection),
            }
        }

        best.map(|detection| CertCandidate {
            confidence: detection.confidence,
            bbox: detection.bbox,
            has_logo: self.has_logo(),
            has_title: self.has_title(),
        })
    }
}

/// The best certificate detection for one image plus co-occurrence evidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CertCandidate {
    pub confidence: f32,
    pub bbox: ImcbBox,
    pub has_logo: bool,
    pub has_title: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Valid,
    Generic,
    Other,
}

impl Verdict {
    /// Applies the fixed decision rule. Rules are evaluated in order and the
    /// first match wins; total over any confidence in [0, 1].
    pub fn classify(candidate: &CertCandidate) -> Verdict {
        if candidate.confidence >= CERT_CONF_THRESHOLD && (candidate.has_logo || candidate.has_title) {
            Verdict::Valid
        } else if candidate.confidence >= CERT_CONF_THRESHOLD {
            Verdict::Generic
        } else {
            Verdict::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Valid => "IMCB Certificate",
            Verdict::Generic => "Generic Certificate",
            Verdict::Other => "Other Object",
        }
    }

    pub fn hex_colour(&self) -> &'static str {
        match self {
            Verdict::Valid => "#39ff14",
            Verdict::Generic => "#f1c40f",
            Verdict::Other => "#e74c3c",
        }
    }
}

/// What the user is shown for one image: a verdict with its evidence, or
/// the legitimate no-certificate outcome. Never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Classified {
        verdict: Verdict,
        candidate: CertCandidate,
    },
    NoCertificate,
}

impl ValidationOutcome {
    pub fn evaluate(detections: &[ImcbDetection]) -> Self {
        Self::from_set(&DetectionSet::from_detections(detections))
    }

    pub fn from_set(set: &DetectionSet) -> Self {
        match set.best_certificate() {
            Some(candidate) => {
                let verdict = Verdict::classify(&candidate);
                log::debug!(
                    "Verdict: {} (confidence={:.3}, has_logo={}, has_title={})",
                    verdict.label(), candidate.confidence, candidate.has_logo, candidate.has_title
                );
                ValidationOutcome::Classified { verdict, candidate }
            }
            None => {
                log::debug!("No certificate detection in image");
                ValidationOutcome::NoCertificate
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ValidationOutcome::Classified { verdict, .. } => verdict.label(),
            ValidationOutcome::NoCertificate => "No certificate detected",
        }
    }

    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            ValidationOutcome::Classified { verdict, .. } => Some(*verdict),
            ValidationOutcome::NoCertificate => None,
        }
    }

    pub fn candidate(&self) -> Option<&CertCandidate> {
        match self {
            ValidationOutcome::Classified { candidate, .. } => Some(candidate),
            ValidationOutcome::NoCertificate => None,
        }
    }
}

/// Everything the pipeline produced for one image: the raw detections (for
/// annotation) and the outcome shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub detections: Vec<ImcbDetection>,
    pub outcome: ValidationOutcome,
}
