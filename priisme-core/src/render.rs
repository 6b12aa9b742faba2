//! Display model for a style analysis.
//!
//! [`ResultView`] groups the fields the way the result screen shows them:
//! summary, key attribute cards, color palette, clothing, hairstyle, makeup.
//! It only iterates over what the analysis provides.

use std::fmt;

use crate::models::StyleAnalysis;

const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeCard {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub recommended: Vec<String>,
    /// `None` when there is nothing to avoid; the subsection is then omitted.
    pub avoid: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationGroup {
    pub title: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub summary: Option<String>,
    pub attributes: Vec<AttributeCard>,
    pub palette: Palette,
    pub clothing: Vec<RecommendationGroup>,
    pub hairstyles: Vec<String>,
    pub makeup: Vec<RecommendationGroup>,
}

impl ResultView {
    pub fn new(analysis: &StyleAnalysis) -> Self {
        let or_unknown = |v: &Option<String>| v.clone().unwrap_or_else(|| UNKNOWN.to_string());

        let skin = format!(
            "{} ({})",
            or_unknown(&analysis.skin_tone),
            or_unknown(&analysis.skin_undertone)
        );

        Self {
            summary: analysis.overall_summary.clone(),
            attributes: vec![
                AttributeCard {
                    label: "Face Shape",
                    value: or_unknown(&analysis.face_shape),
                },
                AttributeCard {
                    label: "Skin Tone",
                    value: skin,
                },
                AttributeCard {
                    label: "Body Type",
                    value: or_unknown(&analysis.body_type),
                },
                AttributeCard {
                    label: "Style Personality",
                    value: or_unknown(&analysis.style_personality),
                },
            ],
            palette: Palette {
                recommended: analysis.recommended_colors.clone(),
                avoid: (!analysis.avoid_colors.is_empty()).then(|| analysis.avoid_colors.clone()),
            },
            clothing: analysis
                .clothing_recommendations
                .iter()
                .map(|rec| RecommendationGroup {
                    title: capitalize(&rec.kind),
                    items: rec.suggestions.clone(),
                })
                .collect(),
            hairstyles: analysis.hairstyle_recommendations.clone(),
            makeup: analysis
                .makeup_recommendations
                .iter()
                .map(|rec| RecommendationGroup {
                    title: capitalize(&rec.kind),
                    items: vec![rec.suggestion.clone()],
                })
                .collect(),
        }
    }
}

impl From<&StyleAnalysis> for ResultView {
    fn from(analysis: &StyleAnalysis) -> Self {
        Self::new(analysis)
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Your Style Profile")?;
        if let Some(summary) = &self.summary {
            writeln!(f, "  {summary}")?;
        }

        writeln!(f)?;
        for card in &self.attributes {
            writeln!(f, "  {:<18} {}", format!("{}:", card.label), capitalize(&card.value))?;
        }

        writeln!(f)?;
        writeln!(f, "Your Color Palette")?;
        writeln!(f, "  Recommended Colors: {}", badges(&self.palette.recommended))?;
        if let Some(avoid) = &self.palette.avoid {
            writeln!(f, "  Colors to Avoid:    {}", badges(avoid))?;
        }

        write_groups(f, "Clothing Recommendations", &self.clothing)?;

        writeln!(f)?;
        writeln!(f, "Hairstyle Recommendations")?;
        writeln!(f, "  {}", badges(&self.hairstyles))?;

        write_groups(f, "Makeup Recommendations", &self.makeup)
    }
}

fn write_groups(f: &mut fmt::Formatter<'_>, heading: &str, groups: &[RecommendationGroup]) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{heading}")?;
    for group in groups {
        writeln!(f, "  {}", group.title)?;
        for item in &group.items {
            writeln!(f, "    • {item}")?;
        }
    }
    Ok(())
}

fn badges(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("[{}]", capitalize(item)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-case the first letter of every word ("forest green" → "Forest Green").
pub fn capitalize(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn oval_profile() -> StyleAnalysis {
        StyleAnalysis::from_value(&json!({
            "face_shape": "oval",
            "skin_tone": "olive",
            "skin_undertone": "warm",
            "body_type": "pear",
            "style_personality": "minimalist",
            "recommended_colors": ["navy", "cream", "forest green", "burgundy", "camel"],
            "avoid_colors": [],
            "clothing_recommendations": [
                {"type": "tops", "suggestions": ["boat necks", "structured shoulders"]}
            ],
            "hairstyle_recommendations": ["long bob", "curtain bangs", "sleek ponytail"],
            "makeup_recommendations": [{"type": "lips", "suggestion": "terracotta"}],
            "overall_summary": "Clean lines suit you."
        }))
    }

    #[test]
    fn test_scenario_four_cards_five_colors_no_avoid_section() {
        let view = ResultView::new(&oval_profile());

        assert_eq!(view.attributes.len(), 4);
        assert_eq!(view.attributes[1].value, "olive (warm)");
        assert_eq!(view.palette.recommended.len(), 5);
        assert!(view.palette.avoid.is_none());

        let text = view.to_string();
        assert!(text.contains("[Forest Green]"));
        assert!(!text.contains("Colors to Avoid"));
    }

    #[test]
    fn test_avoid_section_shown_when_present() {
        let mut analysis = oval_profile();
        analysis.avoid_colors = vec!["neon yellow".to_string()];
        let view = ResultView::new(&analysis);
        assert_eq!(view.palette.avoid, Some(vec!["neon yellow".to_string()]));
        assert!(view.to_string().contains("Colors to Avoid:    [Neon Yellow]"));
    }

    #[test]
    fn test_empty_analysis_renders_without_panicking() {
        let view = ResultView::new(&StyleAnalysis::from_value(&json!({})));
        assert_eq!(view.attributes[0].value, "unknown");
        assert_eq!(view.attributes[1].value, "unknown (unknown)");
        assert!(view.clothing.is_empty());
        assert!(view.to_string().starts_with("Your Style Profile"));
    }

    #[test]
    fn test_groups_are_titled() {
        let view = ResultView::new(&oval_profile());
        assert_eq!(view.clothing[0].title, "Tops");
        assert_eq!(view.makeup[0].items, vec!["terracotta".to_string()]);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("inverted_triangle"), "Inverted_triangle");
        assert_eq!(capitalize("forest green"), "Forest Green");
        assert_eq!(capitalize(""), "");
    }
}
