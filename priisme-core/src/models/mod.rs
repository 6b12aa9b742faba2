pub mod analysis;
pub mod record;
pub mod vocabulary;

pub use analysis::{ClothingRecommendation, MakeupRecommendation, StyleAnalysis};
pub use record::{NewAnalysisRecord, StoredAnalysis};
pub use vocabulary::{
    BodyType, ClothingCategory, FaceShape, MakeupCategory, SkinTone, SkinUndertone,
    StylePersonality,
};
