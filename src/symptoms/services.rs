use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::recommendations;
use crate::inference::{InferenceError, SeverityClassifier};

pub const MIN_SYMPTOM_CHARS: usize = 10;
pub const DISCLAIMER: &str =
    "This is an AI-assisted analysis. Always consult healthcare professionals for medical decisions.";

/// Class names in class-id order of the severity head.
pub const SEVERITY_LABELS: [&str; 4] = ["Mild", "Moderate", "Severe", "Critical"];

#[derive(Debug, Error)]
pub enum SymptomError {
    #[error("Please provide more detail.")]
    TooShort,

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("classifier returned no scores")]
    NoScores,

    #[error("classifier predicted unknown class {0}")]
    UnexpectedClass(usize),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    Critical,
}

impl Severity {
    pub fn from_class_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Severity::Mild),
            1 => Some(Severity::Moderate),
            2 => Some(Severity::Severe),
            3 => Some(Severity::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        SEVERITY_LABELS[*self as usize]
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub severity: Severity,
    /// Softmax probability of the predicted class, in percent.
    pub confidence: f64,
}

/// Arg-max class plus its softmax probability. NaN scores never win; the
/// first maximum wins ties.
pub fn severity_from_logits(logits: &[f32]) -> Result<Prediction, SymptomError> {
    let scores: Vec<f64> = logits
        .iter()
        .map(|&l| if l.is_nan() { f64::NEG_INFINITY } else { l as f64 })
        .collect();

    let (idx, max) = scores
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, s)| match best {
            Some((_, b)) if b >= s => best,
            _ => Some((i, s)),
        })
        .ok_or(SymptomError::NoScores)?;
    if max == f64::NEG_INFINITY {
        return Err(SymptomError::NoScores);
    }

    let severity = Severity::from_class_index(idx).ok_or(SymptomError::UnexpectedClass(idx))?;
    // An infinite winner takes all of the mass; inf - inf would poison the sum.
    let confidence = if max == f64::INFINITY {
        100.0
    } else {
        let denom: f64 = scores.iter().map(|s| (s - max).exp()).sum();
        (100.0 / denom).clamp(0.0, 100.0)
    };

    Ok(Prediction {
        severity,
        confidence,
    })
}

/// Body of the `"Analysis Results"` object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResults {
    #[serde(rename = "Severity")]
    pub severity: Severity,
    #[serde(rename = "Confidence")]
    pub confidence: String,
    #[serde(rename = "Recommendations")]
    pub recommendations: Vec<String>,
    #[serde(rename = "⚠️ Note")]
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    #[serde(rename = "Analysis Results")]
    pub results: AnalysisResults,
    #[serde(skip)]
    pub confidence: f64,
}

impl AnalysisReport {
    pub fn severity(&self) -> Severity {
        self.results.severity
    }
}

pub fn format_confidence(confidence: f64) -> String {
    format!("{:.2}%", confidence)
}

pub fn build_report<R: Rng + ?Sized>(prediction: Prediction, rng: &mut R) -> AnalysisReport {
    AnalysisReport {
        results: AnalysisResults {
            severity: prediction.severity,
            confidence: format_confidence(prediction.confidence),
            recommendations: recommendations::select(prediction.severity.as_str(), rng),
            note: DISCLAIMER.to_string(),
        },
        confidence: prediction.confidence,
    }
}

/// Trims the description and rejects anything shorter than ten characters.
pub fn validate_symptoms(text: &str) -> Result<&str, SymptomError> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_SYMPTOM_CHARS {
        return Err(SymptomError::TooShort);
    }
    Ok(trimmed)
}

/// Runs the classifier and turns its output into a full report.
pub async fn analyze_symptoms(
    classifier: &dyn SeverityClassifier,
    text: &str,
) -> Result<AnalysisReport, SymptomError> {
    let text = validate_symptoms(text)?;
    let logits = classifier.logits(text).await?;
    debug!(?logits, "severity logits");

    let prediction = severity_from_logits(&logits)?;
    info!(
        severity = prediction.severity.as_str(),
        confidence = prediction.confidence,
        "symptoms classified"
    );
    Ok(build_report(prediction, &mut rand::thread_rng()))
}
