use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::infrastructure::error::AppError;

/// Services tiers dont l'utilisateur peut enregistrer un jeton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Vinted,
    Superbuy,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Vinted, Provider::Superbuy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Vinted => "vinted",
            Provider::Superbuy => "superbuy",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vinted" => Ok(Provider::Vinted),
            "superbuy" => Ok(Provider::Superbuy),
            other => Err(AppError::BadRequest(format!(
                "Fournisseur inconnu: {}. Valeurs acceptées: vinted, superbuy",
                other
            ))),
        }
    }
}

/// Jeton tiers chiffré (AES-256-GCM) au repos
#[derive(Debug, Clone, FromRow)]
pub struct IntegrationCredential {
    pub user_id: Uuid,
    pub provider: Provider,
    pub encrypted_secret: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StoreCredential {
    #[validate(length(min = 1, max = 4096, message = "Le secret ne peut pas être vide"))]
    pub secret: String,
}

/// État d'une intégration tel qu'exposé à l'utilisateur (secret masqué)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrationStatus {
    pub provider: Provider,
    pub configured: bool,
    pub hint: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
