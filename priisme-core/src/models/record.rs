use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StyleAnalysis;

/// A saved analysis. Rows are written once and never updated; the photo
/// itself is never part of the record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredAnalysis {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub face_shape: Option<String>,
    pub skin_tone: Option<String>,
    pub skin_undertone: Option<String>,
    pub body_type: Option<String>,
    pub style_personality: Option<String>,
    pub overall_summary: Option<String>,
    pub recommended_colors: Vec<String>,
    pub avoid_colors: Vec<String>,
    pub hairstyle_recommendations: Vec<String>,
    pub clothing_recommendations: serde_json::Value,
    pub makeup_recommendations: serde_json::Value,
    pub full_analysis: serde_json::Value,
}

impl StoredAnalysis {
    /// The stored full object, re-read leniently.
    pub fn analysis(&self) -> StyleAnalysis {
        StyleAnalysis::from_value(&self.full_analysis)
    }

    /// History label, e.g. "Classic Style".
    pub fn label(&self) -> String {
        let personality = self.style_personality.as_deref().unwrap_or("unknown");
        format!("{} Style", crate::render::capitalize(personality))
    }
}

/// Insert payload: every structured field individually plus the full object.
#[derive(Debug, Clone)]
pub struct NewAnalysisRecord {
    pub user_id: Uuid,
    pub face_shape: Option<String>,
    pub skin_tone: Option<String>,
    pub skin_undertone: Option<String>,
    pub body_type: Option<String>,
    pub style_personality: Option<String>,
    pub overall_summary: Option<String>,
    pub recommended_colors: Vec<String>,
    pub avoid_colors: Vec<String>,
    pub hairstyle_recommendations: Vec<String>,
    pub clothing_recommendations: serde_json::Value,
    pub makeup_recommendations: serde_json::Value,
    pub full_analysis: serde_json::Value,
}

impl NewAnalysisRecord {
    pub fn from_analysis(user_id: Uuid, analysis: &StyleAnalysis) -> Self {
        Self {
            user_id,
            face_shape: analysis.face_shape.clone(),
            skin_tone: analysis.skin_tone.clone(),
            skin_undertone: analysis.skin_undertone.clone(),
            body_type: analysis.body_type.clone(),
            style_personality: analysis.style_personality.clone(),
            overall_summary: analysis.overall_summary.clone(),
            recommended_colors: analysis.recommended_colors.clone(),
            avoid_colors: analysis.avoid_colors.clone(),
            hairstyle_recommendations: analysis.hairstyle_recommendations.clone(),
            clothing_recommendations: serde_json::to_value(&analysis.clothing_recommendations)
                .unwrap_or_default(),
            makeup_recommendations: serde_json::to_value(&analysis.makeup_recommendations)
                .unwrap_or_default(),
            full_analysis: analysis.raw.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_analysis_keeps_full_object_verbatim() {
        let raw = json!({
            "style_personality": "edgy",
            "recommended_colors": ["black"],
            "clothing_recommendations": [{"type": "tops", "suggestions": ["leather"]}],
            "extra": "kept"
        });
        let analysis = StyleAnalysis::from_value(&raw);
        let user = Uuid::new_v4();
        let record = NewAnalysisRecord::from_analysis(user, &analysis);

        assert_eq!(record.user_id, user);
        assert_eq!(record.style_personality.as_deref(), Some("edgy"));
        assert_eq!(record.full_analysis, raw);
        assert_eq!(
            record.clothing_recommendations,
            json!([{"type": "tops", "suggestions": ["leather"]}])
        );
        assert_eq!(record.makeup_recommendations, json!([]));
    }
}
