use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::vocabulary::{BodyType, FaceShape, SkinTone, SkinUndertone, StylePersonality};

/// One clothing category and its suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothingRecommendation {
    #[serde(rename = "type")]
    pub kind: String,
    pub suggestions: Vec<String>,
}

/// One makeup category and its suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeupRecommendation {
    #[serde(rename = "type")]
    pub kind: String,
    pub suggestion: String,
}

/// A style profile as returned by the model.
///
/// The payload comes straight from a language model, so every field is
/// optional and [`StyleAnalysis::from_value`] never fails: absent fields stay
/// `None`/empty and wrongly-typed entries are dropped. The untouched payload is
/// kept in `raw` so it can be persisted exactly as received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleAnalysis {
    pub face_shape: Option<String>,
    pub skin_tone: Option<String>,
    pub skin_undertone: Option<String>,
    pub body_type: Option<String>,
    pub style_personality: Option<String>,
    pub recommended_colors: Vec<String>,
    pub avoid_colors: Vec<String>,
    pub clothing_recommendations: Vec<ClothingRecommendation>,
    pub hairstyle_recommendations: Vec<String>,
    pub makeup_recommendations: Vec<MakeupRecommendation>,
    pub overall_summary: Option<String>,
    pub raw: Value,
}

impl StyleAnalysis {
    pub fn from_value(value: &Value) -> Self {
        Self {
            face_shape: text_field(value, "face_shape"),
            skin_tone: text_field(value, "skin_tone"),
            skin_undertone: text_field(value, "skin_undertone"),
            body_type: text_field(value, "body_type"),
            style_personality: text_field(value, "style_personality"),
            recommended_colors: text_list(value.get("recommended_colors")),
            avoid_colors: text_list(value.get("avoid_colors")),
            clothing_recommendations: entries(value, "clothing_recommendations")
                .filter_map(|entry| {
                    Some(ClothingRecommendation {
                        kind: text_field(entry, "type")?,
                        suggestions: text_list(entry.get("suggestions")),
                    })
                })
                .collect(),
            hairstyle_recommendations: text_list(value.get("hairstyle_recommendations")),
            makeup_recommendations: entries(value, "makeup_recommendations")
                .filter_map(|entry| {
                    Some(MakeupRecommendation {
                        kind: text_field(entry, "type")?,
                        suggestion: text_field(entry, "suggestion").unwrap_or_default(),
                    })
                })
                .collect(),
            overall_summary: text_field(value, "overall_summary"),
            raw: value.clone(),
        }
    }

    /// Fields whose value falls outside the vocabulary the model was asked
    /// to use. Purely informational; callers log these and move on.
    pub fn vocabulary_issues(&self) -> Vec<String> {
        let checks: [(&str, &Option<String>, fn(&str) -> bool); 5] = [
            ("face_shape", &self.face_shape, |v| FaceShape::parse(v).is_some()),
            ("skin_tone", &self.skin_tone, |v| SkinTone::parse(v).is_some()),
            ("skin_undertone", &self.skin_undertone, |v| {
                SkinUndertone::parse(v).is_some()
            }),
            ("body_type", &self.body_type, |v| BodyType::parse(v).is_some()),
            ("style_personality", &self.style_personality, |v| {
                StylePersonality::parse(v).is_some()
            }),
        ];

        checks
            .iter()
            .filter_map(|(name, value, known)| match value {
                None => Some(format!("{name} is missing")),
                Some(v) if !known(v.as_str()) => Some(format!("{name} has unexpected value {v:?}")),
                Some(_) => None,
            })
            .collect()
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn text_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn entries<'a>(value: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|entry| entry.is_object())
}
