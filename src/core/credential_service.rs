// core/credential_service.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::domain::integration::{
    IntegrationCredential, IntegrationStatus, Provider, StoreCredential,
};
use crate::infrastructure::database::Database;
use crate::infrastructure::error::{AppError, AppResult};
use crate::utils::security::{decrypt_secret, encrypt_secret, mask_secret};
use crate::utils::Config;

/// Jetons tiers des utilisateurs, chiffrés au repos
pub struct CredentialService {
    db: Database,
    config: Arc<Config>,
}

impl CredentialService {
    pub fn new(db: Database, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    pub async fn store(
        &self,
        user_id: Uuid,
        provider: Provider,
        data: StoreCredential,
    ) -> AppResult<IntegrationStatus> {
        data.validate()?;
        let secret = data.secret.trim();

        let credential = IntegrationCredential {
            user_id,
            provider,
            encrypted_secret: encrypt_secret(secret, &self.config.secret_encryption_key)?,
            updated_at: Utc::now(),
        };
        self.db.credentials().upsert(&credential).await?;

        info!(user_id = %user_id, provider = %provider, "🔐 Identifiant d'intégration enregistré");
        Ok(IntegrationStatus {
            provider,
            configured: true,
            hint: Some(mask_secret(secret)),
            updated_at: Some(credential.updated_at),
        })
    }

    /// État de chaque fournisseur connu, secret masqué
    pub async fn status(&self, user_id: Uuid) -> AppResult<Vec<IntegrationStatus>> {
        let stored = self.db.credentials().list(user_id).await?;

        Provider::ALL
            .iter()
            .map(|provider| match stored.iter().find(|c| c.provider == *provider) {
                Some(credential) => {
                    let secret =
                        decrypt_secret(&credential.encrypted_secret, &self.config.secret_encryption_key)?;
                    Ok(IntegrationStatus {
                        provider: *provider,
                        configured: true,
                        hint: Some(mask_secret(&secret)),
                        updated_at: Some(credential.updated_at),
                    })
                }
                None => Ok(IntegrationStatus {
                    provider: *provider,
                    configured: false,
                    hint: None,
                    updated_at: None,
                }),
            })
            .collect()
    }

    pub async fn delete(&self, user_id: Uuid, provider: Provider) -> AppResult<()> {
        if !self.db.credentials().delete(user_id, provider).await? {
            return Err(AppError::NotFound(format!("Identifiant {}", provider)));
        }
        info!(user_id = %user_id, provider = %provider, "🗑️ Identifiant d'intégration supprimé");
        Ok(())
    }

    /// Secret en clair; réservé aux services internes, jamais exposé par l'API
    pub async fn reveal(&self, user_id: Uuid, provider: Provider) -> AppResult<Option<String>> {
        match self.db.credentials().find(user_id, provider).await? {
            Some(credential) => Ok(Some(decrypt_secret(
                &credential.encrypted_secret,
                &self.config.secret_encryption_key,
            )?)),
            None => Ok(None),
        }
    }
}
