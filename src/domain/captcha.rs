use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Tolérance (en pixels) entre la position détectée et la position réelle
pub const SUCCESS_TOLERANCE_PX: f64 = 5.0;

/// Tentative de résolution d'un captcha à glissière
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CaptchaAttempt {
    pub id: Uuid,
    pub user_id: Uuid,
    /// SHA-256 hexadécimal de l'image soumise
    pub image_hash: String,
    pub detected_x: f64,
    pub actual_x: Option<f64>,
    pub success: bool,
    pub confidence: f64,
    pub provider: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCaptchaAttempt {
    #[validate(length(min = 1, message = "L'image est requise"))]
    pub image_base64: String,
    #[validate(range(min = 0.0, message = "La position détectée ne peut pas être négative"))]
    pub detected_x: f64,
    #[serde(default)]
    pub actual_x: Option<f64>,
    pub confidence: f64,
    #[validate(length(min = 1, max = 64, message = "Le fournisseur est requis"))]
    pub provider: String,
}

/// Une tentative réussit quand l'écart reste dans la tolérance; sans vérité
/// terrain elle est comptée comme un échec
pub fn is_success(detected_x: f64, actual_x: Option<f64>) -> bool {
    match actual_x {
        Some(actual) => (detected_x - actual).abs() <= SUCCESS_TOLERANCE_PX,
        None => false,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AttemptStats {
    pub total: i64,
    pub successes: i64,
    pub success_rate: f64,
    pub average_confidence: f64,
}

/// Échantillon annoté du jeu de données d'entraînement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub id: Uuid,
    pub attempt_id: Option<Uuid>,
    pub image_file: String,
    pub gap_x: f64,
    pub gap_y: f64,
    pub width: u32,
    pub height: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTrainingSample {
    #[validate(length(min = 1, message = "L'image est requise"))]
    pub image_base64: String,
    #[validate(range(min = 0.0))]
    pub gap_x: f64,
    #[validate(range(min = 0.0))]
    pub gap_y: f64,
    #[validate(range(min = 1, message = "La largeur doit être positive"))]
    pub width: u32,
    #[validate(range(min = 1, message = "La hauteur doit être positive"))]
    pub height: u32,
    #[serde(default)]
    pub attempt_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DatasetStats {
    pub images: usize,
    pub annotations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_within_tolerance() {
        assert!(is_success(100.0, Some(104.0)));
        assert!(is_success(100.0, Some(95.0)));
        assert!(!is_success(100.0, Some(106.0)));
        assert!(!is_success(100.0, None));
    }
}
