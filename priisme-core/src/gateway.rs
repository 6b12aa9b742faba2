//! Client for the external multimodal chat-completions gateway.
//!
//! One call to [`StyleModelClient::analyze_image`] issues exactly one upstream
//! request: no retries, no timeout override, no caching. Rate limiting (429)
//! and credit exhaustion (402) are surfaced as distinct errors so the proxy
//! can pass them through.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GatewayConfig;

/// Fixed system instruction: the schema, the allowed values and the
/// JSON-only directive.
pub const SYSTEM_PROMPT: &str = r#"You are PRIISME's AI Style Analyst, an expert in fashion, beauty, and personal styling. You analyze photos to provide personalized style recommendations.

When analyzing a photo, you must provide a comprehensive style analysis in the following JSON format:

{
  "face_shape": "oval | round | square | heart | oblong | diamond",
  "skin_tone": "fair | light | medium | olive | tan | dark | deep",
  "skin_undertone": "warm | cool | neutral",
  "body_type": "hourglass | pear | apple | rectangle | inverted_triangle",
  "style_personality": "classic | bohemian | minimalist | glamorous | edgy | romantic | sporty | artistic",
  "recommended_colors": ["color1", "color2", "color3", "color4", "color5"],
  "avoid_colors": ["color1", "color2"],
  "clothing_recommendations": [
    {"type": "tops", "suggestions": ["suggestion1", "suggestion2"]},
    {"type": "bottoms", "suggestions": ["suggestion1", "suggestion2"]},
    {"type": "dresses", "suggestions": ["suggestion1", "suggestion2"]},
    {"type": "outerwear", "suggestions": ["suggestion1", "suggestion2"]},
    {"type": "accessories", "suggestions": ["suggestion1", "suggestion2"]}
  ],
  "hairstyle_recommendations": ["style1", "style2", "style3"],
  "makeup_recommendations": [
    {"type": "foundation", "suggestion": "description"},
    {"type": "lips", "suggestion": "description"},
    {"type": "eyes", "suggestion": "description"},
    {"type": "blush", "suggestion": "description"}
  ],
  "overall_summary": "A brief 2-3 sentence summary of the person's style profile and key recommendations."
}

Be specific and personalized in your recommendations. Consider the person's visible features and provide actionable, helpful advice. If you cannot clearly see certain features, make reasonable assumptions based on what is visible.

IMPORTANT: Respond ONLY with valid JSON, no additional text."#;

/// Text part of the user turn that accompanies the image.
pub const USER_INSTRUCTION: &str = "Please analyze this photo and provide a comprehensive style analysis. Return your analysis as JSON only.";

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Missing API key")]
    MissingApiKey,

    #[error("Gateway rate limit exceeded: {body}")]
    RateLimited { body: String },

    #[error("Gateway credits exhausted: {body}")]
    CreditsExhausted { body: String },

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },
}

/// Resolved gateway settings, credential included.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl GatewaySettings {
    /// Resolve from config; the key comes from the environment and may be absent.
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            api_key: config.api_key().unwrap_or_default(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        }
    }
}

// ============================================================================
// Chat-completions wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<MessagePart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MessagePart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

// ============================================================================
// StyleModelClient
// ============================================================================

#[derive(Debug, Clone)]
pub struct StyleModelClient {
    client: Client,
    settings: GatewaySettings,
}

impl StyleModelClient {
    pub fn new(settings: GatewaySettings) -> Result<Self, GatewayError> {
        if settings.api_key.is_empty() {
            return Err(GatewayError::MissingApiKey);
        }

        let client = Client::builder().build()?;
        Ok(Self { client, settings })
    }

    /// Same as [`StyleModelClient::new`] but pointed at another gateway
    /// (tests, self-hosted gateways).
    pub fn with_base_url(
        settings: GatewaySettings,
        base_url: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        Self::new(GatewaySettings {
            base_url: base_url.into(),
            ..settings
        })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    /// Ask the model to analyze `image_url` (a data URI or a plain URL).
    ///
    /// Returns the first choice's message content, or `None` when the
    /// gateway answered without any (or with an empty string).
    pub async fn analyze_image(&self, image_url: &str) -> Result<Option<String>, GatewayError> {
        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(SYSTEM_PROMPT),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        MessagePart::Text {
                            text: USER_INSTRUCTION,
                        },
                        MessagePart::ImageUrl {
                            image_url: ImageUrl { url: image_url },
                        },
                    ]),
                },
            ],
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "AI gateway error");

            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => GatewayError::RateLimited { body },
                StatusCode::PAYMENT_REQUIRED => GatewayError::CreditsExhausted { body },
                _ => GatewayError::Api {
                    code: status.as_u16(),
                    message: body,
                },
            });
        }

        let completion: ChatCompletion = response.json().await?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty()))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BodyType, ClothingCategory, FaceShape, MakeupCategory, SkinTone, SkinUndertone,
        StylePersonality,
    };
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_settings(api_key: &str) -> GatewaySettings {
        GatewaySettings {
            api_key: api_key.to_string(),
            model: "google/gemini-2.5-flash".to_string(),
            base_url: "http://unused".to_string(),
        }
    }

    fn completion(content: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
    }

    #[test]
    fn test_system_prompt_lists_every_vocabulary_value() {
        let values = FaceShape::ALL
            .iter()
            .map(|v| v.as_str())
            .chain(SkinTone::ALL.iter().map(|v| v.as_str()))
            .chain(SkinUndertone::ALL.iter().map(|v| v.as_str()))
            .chain(BodyType::ALL.iter().map(|v| v.as_str()))
            .chain(StylePersonality::ALL.iter().map(|v| v.as_str()))
            .chain(ClothingCategory::ALL.iter().map(|v| v.as_str()))
            .chain(MakeupCategory::ALL.iter().map(|v| v.as_str()));

        for value in values {
            assert!(SYSTEM_PROMPT.contains(value), "prompt is missing {value}");
        }
        assert!(SYSTEM_PROMPT.ends_with("Respond ONLY with valid JSON, no additional text."));
    }

    #[test]
    fn test_new_fails_with_missing_api_key() {
        match StyleModelClient::new(test_settings("")) {
            Err(GatewayError::MissingApiKey) => {}
            other => panic!("Expected MissingApiKey, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_analyze_image_sends_multimodal_request() {
        let mock_server = MockServer::start().await;
        let client =
            StyleModelClient::with_base_url(test_settings("test-key"), mock_server.uri()).unwrap();

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "google/gemini-2.5-flash",
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    {
                        "role": "user",
                        "content": [
                            { "type": "text", "text": USER_INSTRUCTION },
                            { "type": "image_url", "image_url": { "url": "data:image/jpeg;base64,AAAA" } }
                        ]
                    }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("{\"a\":1}".into())))
            .expect(1)
            .mount(&mock_server)
            .await;

        let content = client
            .analyze_image("data:image/jpeg;base64,AAAA")
            .await
            .unwrap();
        assert_eq!(content.as_deref(), Some("{\"a\":1}"));
    }

    #[tokio::test]
    async fn test_429_maps_to_rate_limited_without_retry() {
        let mock_server = MockServer::start().await;
        let client =
            StyleModelClient::with_base_url(test_settings("test-key"), mock_server.uri()).unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .expect(1)
            .mount(&mock_server)
            .await;

        match client.analyze_image("data:image/png;base64,AA").await {
            Err(GatewayError::RateLimited { body }) => assert_eq!(body, "slow down"),
            other => panic!("Expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_402_maps_to_credits_exhausted() {
        let mock_server = MockServer::start().await;
        let client =
            StyleModelClient::with_base_url(test_settings("test-key"), mock_server.uri()).unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(402))
            .mount(&mock_server)
            .await;

        assert!(matches!(
            client.analyze_image("x").await,
            Err(GatewayError::CreditsExhausted { .. })
        ));
    }

    #[tokio::test]
    async fn test_other_status_maps_to_api_error() {
        let mock_server = MockServer::start().await;
        let client =
            StyleModelClient::with_base_url(test_settings("test-key"), mock_server.uri()).unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&mock_server)
            .await;

        match client.analyze_image("x").await {
            Err(GatewayError::Api { code, message }) => {
                assert_eq!(code, 503);
                assert_eq!(message, "down");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_or_missing_content_is_none() {
        let mock_server = MockServer::start().await;
        let client =
            StyleModelClient::with_base_url(test_settings("test-key"), mock_server.uri()).unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("".into())))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
            .mount(&mock_server)
            .await;

        assert!(client.analyze_image("x").await.unwrap().is_none());
        assert!(client.analyze_image("x").await.unwrap().is_none());
    }
}
