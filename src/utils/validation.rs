// utils/validation.rs
use crate::infrastructure::error::{AppError, AppResult};

/// Valider une chaîne non vide
pub fn validate_non_empty_string(value: &str, field_name: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} ne peut pas être vide", field_name)));
    }
    Ok(())
}

/// Valider un nombre positif ou nul
pub fn validate_non_negative_number(value: f64, field_name: &str) -> AppResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Validation(format!("{} ne peut pas être négatif", field_name)));
    }
    Ok(())
}

/// Valider un score de confiance (0-1)
pub fn validate_unit_interval(value: f64, field_name: &str) -> AppResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(AppError::Validation(format!("{} doit être compris entre 0 et 1", field_name)));
    }
    Ok(())
}
