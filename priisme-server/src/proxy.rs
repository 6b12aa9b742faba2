//! The analyze operation: validate the request, forward the image to the
//! gateway once, and coerce the reply into JSON.

use axum::http::StatusCode;
use priisme_core::image::ensure_data_uri;
use priisme_core::{parse_model_reply, StyleAnalysis, StyleModelClient};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ProxyError;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "imageBase64")]
    pub image_base64: Option<Value>,
}

impl AnalyzeRequest {
    /// The image string, if present, a string and not empty.
    pub fn image(&self) -> Option<&str> {
        self.image_base64
            .as_ref()
            .and_then(Value::as_str)
            .filter(|image| !image.is_empty())
    }
}

/// Inner analyze: raw request body in, `(status, json_body)` out.
///
/// `gateway` is `None` when no credential is configured.
pub async fn analyze_inner(
    gateway: Option<&StyleModelClient>,
    body: &[u8],
) -> (StatusCode, Value) {
    match analyze(gateway, body).await {
        Ok(analysis) => (StatusCode::OK, json!({ "analysis": analysis })),
        Err(e) => {
            tracing::debug!(status = e.status().as_u16(), error = %e, "Analysis request failed");
            (e.status(), e.body())
        }
    }
}

async fn analyze(gateway: Option<&StyleModelClient>, body: &[u8]) -> Result<Value, ProxyError> {
    let request: AnalyzeRequest = serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "Undecodable analyze request body");
        ProxyError::InvalidBody
    })?;

    let image = request.image().ok_or(ProxyError::NoImage)?;

    let Some(gateway) = gateway else {
        tracing::error!("AI gateway API key not configured");
        return Err(ProxyError::NotConfigured);
    };

    let image_url = ensure_data_uri(image);
    tracing::info!(model = %gateway.model(), "Calling AI gateway for style analysis");

    let content = gateway.analyze_image(&image_url).await?.ok_or_else(|| {
        tracing::error!("No content in AI response");
        ProxyError::EmptyReply
    })?;

    let analysis = parse_model_reply(&content).map_err(|e| {
        tracing::error!(error = %e, raw = %e.raw, "Failed to parse AI response as JSON");
        ProxyError::from(e)
    })?;

    for issue in StyleAnalysis::from_value(&analysis).vocabulary_issues() {
        tracing::warn!(%issue, "Analysis outside the documented vocabulary");
    }

    tracing::info!("Style analysis completed successfully");
    Ok(analysis)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // TEST 1: body without imageBase64 is rejected before anything else
    // ========================================================================
    #[tokio::test]
    async fn test_missing_image_returns_400() {
        let (status, body) = analyze_inner(None, br#"{"other": 1}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No image provided" }));
    }

    // ========================================================================
    // TEST 2: empty and non-string images count as missing
    // ========================================================================
    #[tokio::test]
    async fn test_empty_or_non_string_image_returns_400() {
        for payload in [
            &br#"{"imageBase64": ""}"#[..],
            &br#"{"imageBase64": null}"#[..],
            &br#"{"imageBase64": 42}"#[..],
        ] {
            let (status, body) = analyze_inner(None, payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "No image provided");
        }
    }

    // ========================================================================
    // TEST 3: undecodable body
    // ========================================================================
    #[tokio::test]
    async fn test_invalid_json_returns_400() {
        let (status, body) = analyze_inner(None, b"not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");

        let (status, _) = analyze_inner(None, b"").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // ========================================================================
    // TEST 4: no credential → 500 without an upstream call
    // ========================================================================
    #[tokio::test]
    async fn test_not_configured_returns_500() {
        let (status, body) = analyze_inner(None, br#"{"imageBase64": "AAAA"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "AI service not configured" }));
    }

    #[test]
    fn test_request_image_accessor() {
        let req: AnalyzeRequest =
            serde_json::from_value(json!({ "imageBase64": "data:image/png;base64,AA" })).unwrap();
        assert_eq!(req.image(), Some("data:image/png;base64,AA"));
    }
}
