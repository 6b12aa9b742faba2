//! Value sets the model is instructed to answer with.
//!
//! Nothing enforces them: replies are passed through as received, and these
//! enums only back the advisory check in [`super::StyleAnalysis::vocabulary_issues`].

use serde::{Deserialize, Serialize};

macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Case-insensitive lookup; surrounding whitespace is ignored.
            pub fn parse(value: &str) -> Option<Self> {
                let value = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(value))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary!(FaceShape {
    Oval => "oval",
    Round => "round",
    Square => "square",
    Heart => "heart",
    Oblong => "oblong",
    Diamond => "diamond",
});

vocabulary!(SkinTone {
    Fair => "fair",
    Light => "light",
    Medium => "medium",
    Olive => "olive",
    Tan => "tan",
    Dark => "dark",
    Deep => "deep",
});

vocabulary!(SkinUndertone {
    Warm => "warm",
    Cool => "cool",
    Neutral => "neutral",
});

vocabulary!(BodyType {
    Hourglass => "hourglass",
    Pear => "pear",
    Apple => "apple",
    Rectangle => "rectangle",
    InvertedTriangle => "inverted_triangle",
});

vocabulary!(StylePersonality {
    Classic => "classic",
    Bohemian => "bohemian",
    Minimalist => "minimalist",
    Glamorous => "glamorous",
    Edgy => "edgy",
    Romantic => "romantic",
    Sporty => "sporty",
    Artistic => "artistic",
});

vocabulary!(
    /// Categories of `clothing_recommendations`.
    ClothingCategory {
        Tops => "tops",
        Bottoms => "bottoms",
        Dresses => "dresses",
        Outerwear => "outerwear",
        Accessories => "accessories",
    }
);

vocabulary!(
    /// Categories of `makeup_recommendations`.
    MakeupCategory {
        Foundation => "foundation",
        Lips => "lips",
        Eyes => "eyes",
        Blush => "blush",
    }
);
