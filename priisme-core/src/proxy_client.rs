//! Client side of the proxy contract.
//!
//! Every proxy failure carries a `{error: string}` body; [`HttpAnalysisProxy`]
//! turns those, transport failures and malformed bodies into one
//! [`ProxyCallError`] whose `Display` is the message to show the user.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyCallError {
    /// The proxy answered with an `{error}` body.
    #[error("{message}")]
    Proxy { status: u16, message: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Analysis service returned status {0}")]
    Status(u16),

    #[error("Analysis service returned no analysis")]
    MissingAnalysis,
}

/// Anything that can turn an encoded image into an analysis payload.
#[async_trait]
pub trait AnalysisProxy: Send + Sync {
    async fn analyze(&self, image: &str) -> Result<Value, ProxyCallError>;
}

#[derive(Debug, Deserialize)]
struct ProxyReply {
    analysis: Option<Value>,
    error: Option<String>,
}

/// Calls the analysis proxy over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAnalysisProxy {
    client: Client,
    url: String,
}

impl HttpAnalysisProxy {
    pub fn new(url: impl Into<String>) -> Result<Self, ProxyCallError> {
        Ok(Self {
            client: Client::builder().build()?,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AnalysisProxy for HttpAnalysisProxy {
    async fn analyze(&self, image: &str) -> Result<Value, ProxyCallError> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "imageBase64": image }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let reply = serde_json::from_str::<ProxyReply>(&body).ok();

        if let Some(message) = reply.as_ref().and_then(|r| r.error.clone()) {
            return Err(ProxyCallError::Proxy {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            return Err(ProxyCallError::Status(status.as_u16()));
        }

        reply
            .and_then(|r| r.analysis)
            .filter(|analysis| !analysis.is_null())
            .ok_or(ProxyCallError::MissingAnalysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_analyze_posts_image_and_returns_analysis() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "imageBase64": "data:image/png;base64,AA" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "analysis": { "face_shape": "round" } })),
            )
            .mount(&server)
            .await;

        let proxy = HttpAnalysisProxy::new(server.uri()).unwrap();
        let analysis = proxy.analyze("data:image/png;base64,AA").await.unwrap();
        assert_eq!(analysis["face_shape"], "round");
    }

    #[tokio::test]
    async fn test_error_body_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(json!({ "error": "Rate limit exceeded. Please try again in a moment." })),
            )
            .mount(&server)
            .await;

        let proxy = HttpAnalysisProxy::new(server.uri()).unwrap();
        let err = proxy.analyze("x").await.unwrap_err();
        assert_eq!(err.to_string(), "Rate limit exceeded. Please try again in a moment.");
        assert!(matches!(err, ProxyCallError::Proxy { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_error_field_on_200_is_still_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "nope" })))
            .mount(&server)
            .await;

        let proxy = HttpAnalysisProxy::new(server.uri()).unwrap();
        assert_eq!(proxy.analyze("x").await.unwrap_err().to_string(), "nope");
    }

    #[tokio::test]
    async fn test_non_json_failure_maps_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let proxy = HttpAnalysisProxy::new(server.uri()).unwrap();
        assert!(matches!(
            proxy.analyze("x").await,
            Err(ProxyCallError::Status(502))
        ));
    }

    #[tokio::test]
    async fn test_success_without_analysis_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let proxy = HttpAnalysisProxy::new(server.uri()).unwrap();
        assert!(matches!(
            proxy.analyze("x").await,
            Err(ProxyCallError::MissingAnalysis)
        ));
    }
}
