//! Model inference seams.
//!
//! Pipelines only see the two traits below; the concrete backend (a Hugging
//! Face Inference-compatible HTTP endpoint) is picked once at startup and
//! stored in `AppState`.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub mod hf;

pub use hf::{HfClassifier, HfInference, HfSummarizer};

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Network(String),

    #[error("inference endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode inference response: {0}")]
    Decode(String),

    #[error("classifier returned unexpected label {0}")]
    UnexpectedLabel(String),
}

/// Generation settings for one summarization call.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryParams {
    pub max_length: u32,
    pub min_length: u32,
    pub num_beams: u32,
    pub no_repeat_ngram_size: u32,
    pub repetition_penalty: f32,
    pub early_stopping: bool,
    pub truncation: bool,
}

impl Default for SummaryParams {
    fn default() -> Self {
        Self {
            max_length: 250,
            min_length: 120,
            num_beams: 6,
            no_repeat_ngram_size: 3,
            repetition_penalty: 2.0,
            early_stopping: true,
            truncation: true,
        }
    }
}

/// Sequence classifier over symptom descriptions.
#[async_trait]
pub trait SeverityClassifier: Send + Sync {
    /// Raw per-class logits, indexed by class id.
    async fn logits(&self, text: &str) -> Result<Vec<f32>, InferenceError>;
}

/// Abstractive summarizer for one chunk of text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<String, InferenceError>;
}
