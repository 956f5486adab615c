//! Disease-prediction service client
//!
//! Asks the external symptom analyzer for candidate diseases and a triage
//! hint. The analyzer is optional: every failure is reported to the caller
//! as an error and intake carries on without a prediction.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::model::{PredictionConfig, PredictionResult};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PredictionError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Analyzer found no symptoms: {0}")]
    NoSymptoms(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Source of disease predictions for free-text symptoms
#[async_trait]
pub trait PredictionSource: Send + Sync {
    async fn predict(&self, symptoms: &str) -> Result<PredictionResult, PredictionError>;
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    symptoms: &'a str,
}

/// Envelope returned by `/analyze`
#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    result: PredictionResult,
}

fn default_success() -> bool {
    true
}

/// Client for the symptom analyzer HTTP API
pub struct PredictionClient {
    client: Client,
    base_url: String,
}

impl PredictionClient {
    /// Create a new client with the configured base URL and request timeout
    pub fn new(config: &PredictionConfig) -> Result<Self, PredictionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl PredictionSource for PredictionClient {
    async fn predict(&self, symptoms: &str) -> Result<PredictionResult, PredictionError> {
        let url = format!("{}/analyze", self.base_url);

        tracing::debug!(url = %url, "Requesting disease prediction");

        let response = self
            .client
            .post(&url)
            .json(&AnalyzeRequest { symptoms })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PredictionError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let result = parse_analyze_response(&body)?;

        tracing::debug!(
            triage_hint = ?result.triage_level,
            candidates = result.predictions.len(),
            method = ?result.prediction_method,
            "Received disease prediction"
        );

        Ok(result)
    }
}

fn parse_analyze_response(body: &str) -> Result<PredictionResult, PredictionError> {
    let envelope: AnalyzeResponse = serde_json::from_str(body)
        .map_err(|e| PredictionError::ParseError(format!("Failed to deserialize prediction: {}", e)))?;

    if !envelope.success {
        return Err(PredictionError::NoSymptoms(
            envelope.message.unwrap_or_else(|| "no message".to_string()),
        ));
    }

    Ok(envelope.result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_response() {
        let body = r#"{
            "success": true,
            "input_text": "high fever and rash",
            "extracted_symptoms": ["high_fever", "skin_rash"],
            "severity_score": 9,
            "triage_level": "YELLOW",
            "prediction_method": "Machine Learning (Random Forest)",
            "predictions": [
                {"disease": "Dengue", "confidence": 61.0, "description": "Viral infection", "precautions": ["drink fluids"]},
                {"disease": "Chicken pox", "confidence": 22.5, "description": "", "precautions": []}
            ]
        }"#;

        let result = parse_analyze_response(body).unwrap();
        assert_eq!(result.triage_level.as_deref(), Some("YELLOW"));
        assert_eq!(result.predictions.len(), 2);
        assert_eq!(result.predictions[0].disease, "Dengue");
        assert_eq!(result.extracted_symptoms, vec!["high_fever", "skin_rash"]);
        assert_eq!(result.severity_score, Some(9.0));
    }

    #[test]
    fn test_parse_no_symptoms_response() {
        let body = r#"{"success": false, "message": "No symptoms detected."}"#;
        let err = parse_analyze_response(body).unwrap_err();
        assert!(matches!(err, PredictionError::NoSymptoms(ref m) if m == "No symptoms detected."));
    }

    #[test]
    fn test_parse_garbage_response() {
        let err = parse_analyze_response("<html>oops</html>").unwrap_err();
        assert!(matches!(err, PredictionError::ParseError(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = PredictionConfig {
            base_url: "http://analyzer:5000/".to_string(),
            ..PredictionConfig::default()
        };
        let client = PredictionClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://analyzer:5000");
    }

    #[tokio::test]
    #[ignore] // Requires the analyzer service running locally
    async fn test_predict_against_local_analyzer() {
        let client = PredictionClient::new(&PredictionConfig::default()).unwrap();
        let result = client
            .predict("I have high fever, headache, and skin rash.")
            .await;
        assert!(result.is_ok());
    }
}
