// core/captcha_service.rs
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::domain::captcha::{
    is_success, AttemptStats, CaptchaAttempt, DatasetStats, NewCaptchaAttempt, NewTrainingSample,
    TrainingSample,
};
use crate::infrastructure::captcha_dataset::CaptchaDataset;
use crate::infrastructure::database::Database;
use crate::infrastructure::error::{AppError, AppResult};
use crate::utils::security::sha256_hex;
use crate::utils::{validate_non_negative_number, validate_unit_interval};

const MAX_LIST_LIMIT: i64 = 500;

/// Accepte le base64 brut ou une data URL (`data:image/png;base64,...`)
fn decode_image(encoded: &str) -> AppResult<Vec<u8>> {
    let payload = match encoded.split_once(',') {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };
    let bytes = general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| AppError::Validation(format!("image base64 invalide: {}", e)))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("image vide".to_string()));
    }
    Ok(bytes)
}

/// Suivi des tentatives de captcha et constitution du jeu d'entraînement
pub struct CaptchaService {
    db: Database,
    dataset: CaptchaDataset,
}

impl CaptchaService {
    pub fn new(db: Database, dataset: CaptchaDataset) -> Self {
        Self { db, dataset }
    }

    pub async fn record_attempt(
        &self,
        user_id: Uuid,
        data: NewCaptchaAttempt,
    ) -> AppResult<CaptchaAttempt> {
        data.validate()?;
        validate_unit_interval(data.confidence, "La confiance")?;
        if let Some(actual) = data.actual_x {
            validate_non_negative_number(actual, "La position réelle")?;
        }

        let image = decode_image(&data.image_base64)?;
        let attempt = CaptchaAttempt {
            id: Uuid::new_v4(),
            user_id,
            image_hash: sha256_hex(&image),
            detected_x: data.detected_x,
            actual_x: data.actual_x,
            success: is_success(data.detected_x, data.actual_x),
            confidence: data.confidence,
            provider: data.provider.trim().to_string(),
            created_at: Utc::now(),
        };
        self.db.captcha_attempts().insert(&attempt).await?;

        info!(
            user_id = %user_id,
            attempt_id = %attempt.id,
            success = attempt.success,
            "🧩 Tentative de captcha enregistrée"
        );
        Ok(attempt)
    }

    pub async fn list_attempts(&self, user_id: Uuid, limit: Option<i64>) -> AppResult<Vec<CaptchaAttempt>> {
        let limit = limit.unwrap_or(50).clamp(1, MAX_LIST_LIMIT);
        self.db.captcha_attempts().list(user_id, limit).await
    }

    pub async fn attempt_stats(&self, user_id: Uuid) -> AppResult<AttemptStats> {
        self.db.captcha_attempts().stats(user_id).await
    }

    /// Ajoute un échantillon annoté; la tentative liée doit appartenir à l'utilisateur
    pub async fn add_training_sample(
        &self,
        user_id: Uuid,
        data: NewTrainingSample,
    ) -> AppResult<TrainingSample> {
        data.validate()?;
        if data.gap_x > data.width as f64 || data.gap_y > data.height as f64 {
            return Err(AppError::Validation(
                "la position du trou dépasse les dimensions de l'image".to_string(),
            ));
        }
        if let Some(attempt_id) = data.attempt_id {
            if self.db.captcha_attempts().find(user_id, attempt_id).await?.is_none() {
                return Err(AppError::NotFound("Tentative de captcha".to_string()));
            }
        }

        let image = decode_image(&data.image_base64)?;
        let id = Uuid::new_v4();
        let sample = TrainingSample {
            id,
            attempt_id: data.attempt_id,
            image_file: format!("{}.png", id),
            gap_x: data.gap_x,
            gap_y: data.gap_y,
            width: data.width,
            height: data.height,
            created_at: Utc::now(),
        };
        self.dataset.save(&sample, &image).await?;

        info!(
            user_id = %user_id,
            sample_id = %sample.id,
            attempt_id = ?sample.attempt_id,
            "🖼️ Échantillon d'entraînement ajouté"
        );
        Ok(sample)
    }

    pub async fn dataset_stats(&self) -> AppResult<DatasetStats> {
        self.dataset.stats().await
    }
}
