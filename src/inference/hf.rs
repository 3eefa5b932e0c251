use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use super::{InferenceError, SeverityClassifier, SummaryParams, Summarizer};

const MAX_ERROR_BODY: usize = 512;

/// HTTP client for a Hugging Face Inference-compatible endpoint
/// (`POST {base_url}/{model}` with `{"inputs", "parameters"}`).
#[derive(Clone)]
pub struct HfInference {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HfInference {
    pub fn new(base_url: &str, api_token: Option<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("build inference http client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        })
    }

    async fn post(&self, model: &str, body: &Value) -> Result<String, InferenceError> {
        let url = format!("{}/{}", self.base_url, model);
        debug!(url = %url, "calling inference endpoint");

        let mut req = self.client.post(&url).json(body);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.map_err(|e| {
            error!(error = %e, model, "inference request failed");
            InferenceError::Network(e.to_string())
        })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| InferenceError::Network(e.to_string()))?;
        if !status.is_success() {
            error!(status = %status, model, "inference endpoint error");
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body: truncate(&text, MAX_ERROR_BODY),
            });
        }
        Ok(text)
    }
}

/// Severity classifier served by [`HfInference`].
pub struct HfClassifier {
    http: HfInference,
    model: String,
    labels: Vec<String>,
    max_length: usize,
}

impl HfClassifier {
    /// `labels` are the class names in class-id order; the endpoint may
    /// answer with either `LABEL_<id>` or one of these names.
    pub fn new(http: HfInference, model: &str, labels: &[&str]) -> Self {
        info!(model, classes = labels.len(), "severity classifier configured");
        Self {
            http,
            model: model.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            max_length: 128,
        }
    }
}

#[async_trait]
impl SeverityClassifier for HfClassifier {
    async fn logits(&self, text: &str) -> Result<Vec<f32>, InferenceError> {
        let body = json!({
            "inputs": text,
            "parameters": {
                "function_to_apply": "none",
                "top_k": self.labels.len(),
                "truncation": true,
                "max_length": self.max_length,
            }
        });
        let raw = self.http.post(&self.model, &body).await?;
        logits_from_response(&raw, &self.labels)
    }
}

/// Summarizer served by [`HfInference`].
pub struct HfSummarizer {
    http: HfInference,
    model: String,
}

impl HfSummarizer {
    pub fn new(http: HfInference, model: &str) -> Self {
        info!(model, "summarizer configured");
        Self {
            http,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Summarizer for HfSummarizer {
    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<String, InferenceError> {
        let body = json!({ "inputs": text, "parameters": params });
        let raw = self.http.post(&self.model, &body).await?;
        summary_from_response(&raw)
    }
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

fn label_index(label: &str, labels: &[String]) -> Option<usize> {
    if let Some(id) = label.strip_prefix("LABEL_") {
        return id.parse().ok();
    }
    labels.iter().position(|l| l.eq_ignore_ascii_case(label))
}

/// Turns `[{label, score}]` (optionally nested once) into a dense logit
/// vector. Classes the endpoint left out get `-inf`.
fn logits_from_response(raw: &str, labels: &[String]) -> Result<Vec<f32>, InferenceError> {
    let parsed: ClassificationResponse =
        serde_json::from_str(raw).map_err(|e| InferenceError::Decode(e.to_string()))?;
    let scores = match parsed {
        ClassificationResponse::Nested(mut rows) => {
            if rows.is_empty() {
                Vec::new()
            } else {
                rows.swap_remove(0)
            }
        }
        ClassificationResponse::Flat(scores) => scores,
    };
    if scores.is_empty() {
        return Err(InferenceError::Decode("no class scores".into()));
    }

    let mut logits = vec![f32::NEG_INFINITY; labels.len()];
    for s in scores {
        if !s.score.is_finite() {
            return Err(InferenceError::Decode(format!(
                "non-finite score for {}",
                s.label
            )));
        }
        match label_index(&s.label, labels) {
            Some(idx) if idx < logits.len() => logits[idx] = s.score,
            _ => return Err(InferenceError::UnexpectedLabel(s.label)),
        }
    }
    Ok(logits)
}

fn summary_from_response(raw: &str) -> Result<String, InferenceError> {
    let parsed: Vec<SummaryOutput> =
        serde_json::from_str(raw).map_err(|e| InferenceError::Decode(e.to_string()))?;
    parsed
        .into_iter()
        .next()
        .map(|o| o.summary_text)
        .ok_or_else(|| InferenceError::Decode("empty summarization response".into()))
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, routing::post, Json, Router};

    fn tiers() -> Vec<String> {
        ["Mild", "Moderate", "Severe", "Critical"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn parses_nested_label_scores() {
        let raw = r#"[[{"label":"LABEL_2","score":3.5},{"label":"LABEL_0","score":-1.0}]]"#;
        let logits = logits_from_response(raw, &tiers()).unwrap();
        assert_eq!(logits.len(), 4);
        assert_eq!(logits[2], 3.5);
        assert_eq!(logits[0], -1.0);
        assert!(logits[1].is_infinite());
    }

    #[test]
    fn parses_flat_named_labels() {
        let raw = r#"[{"label":"critical","score":0.9},{"label":"Mild","score":0.1}]"#;
        let logits = logits_from_response(raw, &tiers()).unwrap();
        assert_eq!(logits[3], 0.9);
        assert_eq!(logits[0], 0.1);
    }

    #[test]
    fn rejects_out_of_range_score() {
        let raw = r#"[{"label":"LABEL_0","score":1e39},{"label":"LABEL_1","score":0.2}]"#;
        let err = logits_from_response(raw, &tiers()).unwrap_err();
        assert!(matches!(err, InferenceError::Decode(_)), "{err:?}");
    }

    #[test]
    fn rejects_label_outside_head() {
        let raw = r#"[{"label":"LABEL_7","score":1.0}]"#;
        let err = logits_from_response(raw, &tiers()).unwrap_err();
        assert!(matches!(err, InferenceError::UnexpectedLabel(l) if l == "LABEL_7"));
    }

    #[test]
    fn rejects_empty_scores() {
        assert!(matches!(
            logits_from_response("[]", &tiers()),
            Err(InferenceError::Decode(_))
        ));
    }

    #[test]
    fn summary_takes_first_output() {
        let raw = r#"[{"summary_text":"First."},{"summary_text":"Second."}]"#;
        assert_eq!(summary_from_response(raw).unwrap(), "First.");
        assert!(summary_from_response("[]").is_err());
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("héllo", 2), "hé...");
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[tokio::test]
    async fn classifier_posts_to_model_path_with_token() {
        let router = Router::new().route(
            "/acme/clf",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(
                    headers.get("authorization").and_then(|v| v.to_str().ok()),
                    Some("Bearer secret")
                );
                assert_eq!(body["parameters"]["function_to_apply"], "none");
                assert_eq!(body["inputs"], "chest pain");
                Json(json!([[{"label":"LABEL_3","score":4.0},{"label":"LABEL_1","score":0.5}]]))
            }),
        );
        let base = serve(router).await;
        let http = HfInference::new(&base, Some("secret".into()), 5).unwrap();
        let clf = HfClassifier::new(http, "acme/clf", &["Mild", "Moderate", "Severe", "Critical"]);

        let logits = clf.logits("chest pain").await.unwrap();
        assert_eq!(logits[3], 4.0);
        assert_eq!(logits[1], 0.5);
    }

    #[tokio::test]
    async fn summarizer_sends_generation_params() {
        let router = Router::new().route(
            "/acme/sum",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["parameters"]["num_beams"], 6);
                assert_eq!(body["parameters"]["max_length"], 250);
                Json(json!([{"summary_text": "A short summary."}]))
            }),
        );
        let base = serve(router).await;
        let http = HfInference::new(&format!("{}/", base), None, 5).unwrap();
        let sum = HfSummarizer::new(http, "acme/sum");

        let out = sum.summarize("text", &SummaryParams::default()).await.unwrap();
        assert_eq!(out, "A short summary.");
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let router = Router::new().route(
            "/acme/sum",
            post(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "model loading") }),
        );
        let base = serve(router).await;
        let http = HfInference::new(&base, None, 5).unwrap();
        let sum = HfSummarizer::new(http, "acme/sum");

        let err = sum.summarize("text", &SummaryParams::default()).await.unwrap_err();
        assert!(matches!(err, InferenceError::Status { status: 503, ref body } if body == "model loading"));
    }
}
