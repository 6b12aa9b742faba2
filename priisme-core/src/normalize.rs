//! Coercion of a free-text model reply into JSON.
//!
//! Models asked for "JSON only" still wrap their answer in markdown fences
//! often enough that every fence marker (optionally tagged `json`, plus the
//! newline right after it) is removed before parsing. This is a heuristic:
//! anything else around the JSON still fails to parse and is reported with the
//! original text attached.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\n?").expect("fence pattern is valid"));

#[derive(Error, Debug)]
#[error("reply is not valid JSON: {source}")]
pub struct ReplyParseError {
    /// The reply exactly as the model produced it, before fence stripping.
    pub raw: String,
    #[source]
    pub source: serde_json::Error,
}

/// Remove every fence marker and trim surrounding whitespace.
pub fn strip_code_fences(reply: &str) -> String {
    FENCE.replace_all(reply, "").trim().to_string()
}

/// Strip fences from `reply` and parse what is left as JSON.
///
/// Any JSON value is accepted; schema conformance is not checked here.
pub fn parse_model_reply(reply: &str) -> Result<Value, ReplyParseError> {
    let stripped = strip_code_fences(reply);
    serde_json::from_str(&stripped).map_err(|source| ReplyParseError {
        raw: reply.to_string(),
        source,
    })
}
