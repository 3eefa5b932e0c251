use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::extract::{extract_pdf_text, ExtractionError};
use super::text::{chunk_text, clean_text, extract_key_points, remove_duplicate_sentences, strip_references};
use crate::inference::{InferenceError, SummaryParams, Summarizer};

pub const NO_SUMMARY: &str = "No summary generated.";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("background task failed: {0}")]
    Task(String),
}

/// Knobs of the paper pipeline.
#[derive(Debug, Clone)]
pub struct ResearchOptions {
    pub chunk_size: usize,
    pub max_chunks: usize,
    pub num_key_points: usize,
    pub strip_references: bool,
    pub summary: SummaryParams,
}

impl Default for ResearchOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            max_chunks: 2,
            num_key_points: 8,
            strip_references: true,
            summary: SummaryParams::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResearchAnalysis {
    pub summary: String,
    pub key_points: Vec<String>,
}

/// Summarizes the leading chunks and dedups the combined output.
///
/// A chunk that fails is skipped; the call only fails when every attempted
/// chunk failed. Empty input never reaches the model.
pub async fn multi_chunk_summarize(
    summarizer: &dyn Summarizer,
    text: &str,
    opts: &ResearchOptions,
) -> Result<String, InferenceError> {
    let chunks = chunk_text(text, opts.chunk_size);
    let attempted = chunks.len().min(opts.max_chunks);
    if attempted == 0 {
        return Ok(String::new());
    }

    let mut summaries = Vec::with_capacity(attempted);
    let mut last_err = None;
    for (i, chunk) in chunks.into_iter().take(opts.max_chunks).enumerate() {
        match summarizer.summarize(chunk, &opts.summary).await {
            Ok(s) => summaries.push(s),
            Err(e) => {
                warn!(chunk = i, error = %e, "chunk summarization failed");
                last_err = Some(e);
            }
        }
    }

    match (summaries.is_empty(), last_err) {
        (true, Some(e)) => Err(e),
        _ => Ok(remove_duplicate_sentences(&summaries.join(" "))),
    }
}

/// Cleans already-extracted text and runs summary plus key points on it.
pub async fn analyze_text(
    summarizer: &dyn Summarizer,
    raw: &str,
    opts: &ResearchOptions,
) -> Result<ResearchAnalysis, InferenceError> {
    let body = if opts.strip_references {
        strip_references(raw)
    } else {
        raw
    };
    let text = clean_text(body);
    debug!(chars = text.chars().count(), "paper text normalized");

    let summary = multi_chunk_summarize(summarizer, &text, opts).await?;
    let key_points = extract_key_points(&text, opts.num_key_points);

    Ok(ResearchAnalysis {
        summary: if summary.is_empty() {
            NO_SUMMARY.to_string()
        } else {
            summary
        },
        key_points,
    })
}

/// Full paper pipeline: PDF bytes in, summary and key points out.
pub async fn analyze_paper(
    summarizer: &dyn Summarizer,
    pdf: bytes::Bytes,
    opts: &ResearchOptions,
) -> Result<ResearchAnalysis, AnalysisError> {
    let raw = tokio::task::spawn_blocking(move || extract_pdf_text(&pdf))
        .await
        .map_err(|e| AnalysisError::Task(e.to_string()))??;

    let analysis = analyze_text(summarizer, &raw, opts).await?;
    info!(key_points = analysis.key_points.len(), "paper analyzed");
    Ok(analysis)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::research::extract::tests::make_pdf;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records its inputs and answers with a canned summary per call.
    #[derive(Default)]
    pub(crate) struct ScriptedSummarizer {
        pub calls: Mutex<Vec<String>>,
        pub replies: Mutex<Vec<Result<String, InferenceError>>>,
    }

    impl ScriptedSummarizer {
        pub(crate) fn replying(replies: Vec<Result<String, InferenceError>>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                replies: Mutex::new(replies.into_iter().rev().collect()),
            }
        }
    }

    #[async_trait]
    impl Summarizer for ScriptedSummarizer {
        async fn summarize(&self, text: &str, _params: &SummaryParams) -> Result<String, InferenceError> {
            self.calls.lock().unwrap().push(text.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok("Fallback summary.".to_string()))
        }
    }

    fn opts(chunk_size: usize) -> ResearchOptions {
        ResearchOptions {
            chunk_size,
            ..ResearchOptions::default()
        }
    }

    #[tokio::test]
    async fn summarizes_only_leading_chunks_in_order() {
        let s = ScriptedSummarizer::replying(vec![
            Ok("Alpha finding. Shared point.".into()),
            Ok("shared point. Beta finding.".into()),
        ]);
        let text = "a".repeat(25);
        let out = multi_chunk_summarize(&s, &text, &opts(10)).await.unwrap();

        assert_eq!(out, "Alpha finding. Shared point. Beta finding.");
        let calls = s.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], "a".repeat(10));
    }

    #[tokio::test]
    async fn empty_text_skips_model() {
        let s = ScriptedSummarizer::default();
        let out = multi_chunk_summarize(&s, "", &opts(10)).await.unwrap();
        assert_eq!(out, "");
        assert!(s.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_chunk_is_skipped() {
        let s = ScriptedSummarizer::replying(vec![
            Err(InferenceError::Network("reset".into())),
            Ok("Second chunk summary.".into()),
        ]);
        let out = multi_chunk_summarize(&s, &"b".repeat(20), &opts(10)).await.unwrap();
        assert_eq!(out, "Second chunk summary.");
    }

    #[tokio::test]
    async fn all_chunks_failing_is_an_error() {
        let s = ScriptedSummarizer::replying(vec![
            Err(InferenceError::Network("down".into())),
            Err(InferenceError::Network("down".into())),
        ]);
        let err = multi_chunk_summarize(&s, &"c".repeat(20), &opts(10)).await.unwrap_err();
        assert!(matches!(err, InferenceError::Network(_)));
    }

    #[tokio::test]
    async fn analyze_text_strips_references_before_summarizing() {
        let s = ScriptedSummarizer::replying(vec![Ok("Summary.".into())]);
        let raw = "Body   text\nhere. References\n[1] Someone et al.";
        let out = analyze_text(&s, raw, &ResearchOptions::default()).await.unwrap();

        assert_eq!(out.summary, "Summary.");
        assert_eq!(s.calls.lock().unwrap()[0], "Body text here.");
    }

    #[tokio::test]
    async fn analyze_text_keeps_references_when_disabled() {
        let s = ScriptedSummarizer::replying(vec![Ok("Summary.".into())]);
        let o = ResearchOptions {
            strip_references: false,
            ..ResearchOptions::default()
        };
        analyze_text(&s, "Body. References x", &o).await.unwrap();
        assert_eq!(s.calls.lock().unwrap()[0], "Body. References x");
    }

    #[tokio::test]
    async fn document_without_text_gets_placeholder() {
        let s = ScriptedSummarizer::default();
        let pdf = make_pdf(&[None]);
        let out = analyze_paper(&s, bytes::Bytes::from(pdf), &ResearchOptions::default())
            .await
            .unwrap();
        assert_eq!(out.summary, NO_SUMMARY);
        assert!(out.key_points.is_empty());
        assert!(s.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_pdf_is_an_extraction_error() {
        let s = ScriptedSummarizer::default();
        let err = analyze_paper(&s, bytes::Bytes::from_static(b"not a pdf at all"), &ResearchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Extraction(_)));
    }
}
