//! User-scoped analysis history.
//!
//! Only insert and "most recent N for a user" are needed; records are never
//! updated or deleted.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::PriismeError;
use crate::models::{NewAnalysisRecord, StoredAnalysis};

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn insert(&self, record: NewAnalysisRecord) -> Result<StoredAnalysis, PriismeError>;

    /// Up to `limit` records owned by `user_id`, newest first.
    async fn recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<StoredAnalysis>, PriismeError>;
}

// ============================================================================
// Postgres
// ============================================================================

#[derive(Debug, Clone)]
pub struct PgAnalysisStore {
    pool: PgPool,
}

impl PgAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn insert(&self, record: NewAnalysisRecord) -> Result<StoredAnalysis, PriismeError> {
        let stored = sqlx::query_as::<_, StoredAnalysis>(
            r#"
            INSERT INTO style_analyses (
                id, user_id, face_shape, skin_tone, skin_undertone, body_type,
                style_personality, overall_summary, recommended_colors, avoid_colors,
                hairstyle_recommendations, clothing_recommendations,
                makeup_recommendations, full_analysis
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(record.user_id)
        .bind(record.face_shape)
        .bind(record.skin_tone)
        .bind(record.skin_undertone)
        .bind(record.body_type)
        .bind(record.style_personality)
        .bind(record.overall_summary)
        .bind(record.recommended_colors)
        .bind(record.avoid_colors)
        .bind(record.hairstyle_recommendations)
        .bind(record.clothing_recommendations)
        .bind(record.makeup_recommendations)
        .bind(record.full_analysis)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id = %stored.id, user_id = %stored.user_id, "Saved style analysis");
        Ok(stored)
    }

    async fn recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<StoredAnalysis>, PriismeError> {
        let rows = sqlx::query_as::<_, StoredAnalysis>(
            r#"
            SELECT * FROM style_analyses
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// ============================================================================
// In-process
// ============================================================================

/// History kept in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryAnalysisStore {
    records: Mutex<Vec<StoredAnalysis>>,
}

impl MemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record as if it had been written earlier.
    pub fn push(&self, record: StoredAnalysis) -> Result<(), PriismeError> {
        self.lock()?.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredAnalysis>>, PriismeError> {
        self.records
            .lock()
            .map_err(|_| PriismeError::Other("analysis store lock poisoned".to_string()))
    }
}

#[async_trait]
impl AnalysisStore for MemoryAnalysisStore {
    async fn insert(&self, record: NewAnalysisRecord) -> Result<StoredAnalysis, PriismeError> {
        let stored = StoredAnalysis {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            created_at: Utc::now(),
            face_shape: record.face_shape,
            skin_tone: record.skin_tone,
            skin_undertone: record.skin_undertone,
            body_type: record.body_type,
            style_personality: record.style_personality,
            overall_summary: record.overall_summary,
            recommended_colors: record.recommended_colors,
            avoid_colors: record.avoid_colors,
            hairstyle_recommendations: record.hairstyle_recommendations,
            clothing_recommendations: record.clothing_recommendations,
            makeup_recommendations: record.makeup_recommendations,
            full_analysis: record.full_analysis,
        };
        self.lock()?.push(stored.clone());
        Ok(stored)
    }

    async fn recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<StoredAnalysis>, PriismeError> {
        let mut rows: Vec<StoredAnalysis> = self
            .lock()?
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for identical timestamps; reverse
        // afterwards so the later insert wins.
        rows.sort_by_key(|r| r.created_at);
        rows.reverse();
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }
}
