//! Failure taxonomy of the analysis proxy.
//!
//! Every variant maps to one status code and an `{error}` body; the client
//! reads the message from that one field whatever went wrong.

use axum::http::StatusCode;
use priisme_core::{GatewayError, ReplyParseError};
use serde_json::{json, Value};
use thiserror::Error;

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Invalid request body")]
    InvalidBody,

    #[error("No image provided")]
    NoImage,

    #[error("AI service not configured")]
    NotConfigured,

    #[error("Rate limit exceeded. Please try again in a moment.")]
    RateLimited,

    #[error("Service credits exhausted. Please try again later.")]
    CreditsExhausted,

    #[error("Failed to analyze image")]
    Upstream { status: u16 },

    #[error("No analysis generated")]
    EmptyReply,

    #[error("Failed to parse analysis results")]
    Unparsable(#[from] ReplyParseError),

    /// Transport failures and anything else not classified above.
    #[error("{0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidBody | ProxyError::NoImage => StatusCode::BAD_REQUEST,
            ProxyError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ProxyError::CreditsExhausted => StatusCode::PAYMENT_REQUIRED,
            ProxyError::NotConfigured
            | ProxyError::Upstream { .. }
            | ProxyError::EmptyReply
            | ProxyError::Unparsable(_)
            | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `{error}` body; parse failures also carry the raw model text.
    pub fn body(&self) -> Value {
        match self {
            ProxyError::Unparsable(e) => json!({
                "error": self.to_string(),
                "raw": e.raw,
            }),
            ProxyError::Internal(message) if message.trim().is_empty() => json!({
                "error": UNEXPECTED_ERROR,
            }),
            _ => json!({ "error": self.to_string() }),
        }
    }
}

impl From<GatewayError> for ProxyError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::MissingApiKey => ProxyError::NotConfigured,
            GatewayError::RateLimited { .. } => ProxyError::RateLimited,
            GatewayError::CreditsExhausted { .. } => ProxyError::CreditsExhausted,
            GatewayError::Api { code, .. } => ProxyError::Upstream { status: code },
            GatewayError::Http(e) => ProxyError::Internal(e.to_string()),
        }
    }
}
