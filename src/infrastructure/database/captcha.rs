use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    domain::captcha::{AttemptStats, CaptchaAttempt},
    infrastructure::error::AppResult,
};

#[derive(Clone)]
pub struct CaptchaAttemptRepository {
    pool: SqlitePool,
}

impl CaptchaAttemptRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, a: &CaptchaAttempt) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO captcha_attempts (
                id, user_id, image_hash, detected_x, actual_x, success, confidence, provider, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(a.id)
        .bind(a.user_id)
        .bind(&a.image_hash)
        .bind(a.detected_x)
        .bind(a.actual_x)
        .bind(a.success)
        .bind(a.confidence)
        .bind(&a.provider)
        .bind(a.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<CaptchaAttempt>> {
        let rows = sqlx::query_as::<_, CaptchaAttempt>(
            r#"
            SELECT id, user_id, image_hash, detected_x, actual_x, success, confidence, provider, created_at
            FROM captcha_attempts
            WHERE user_id = ?
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<CaptchaAttempt>> {
        let row = sqlx::query_as::<_, CaptchaAttempt>(
            r#"
            SELECT id, user_id, image_hash, detected_x, actual_x, success, confidence, provider, created_at
            FROM captcha_attempts
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn stats(&self, user_id: Uuid) -> AppResult<AttemptStats> {
        let (total, successes, average_confidence): (i64, i64, f64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(CASE WHEN success THEN 1 ELSE 0 END), 0),
                   COALESCE(AVG(confidence), 0.0)
            FROM captcha_attempts
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let success_rate = if total > 0 {
            successes as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Ok(AttemptStats {
            total,
            successes,
            success_rate,
            average_confidence,
        })
    }

    pub async fn delete_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM captcha_attempts WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
