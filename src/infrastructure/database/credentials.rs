use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    domain::integration::{IntegrationCredential, Provider},
    infrastructure::error::AppResult,
};

/// Stockage des secrets d'intégration (déjà chiffrés par l'appelant)
#[derive(Clone)]
pub struct CredentialRepository {
    pool: SqlitePool,
}

impl CredentialRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, c: &IntegrationCredential) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO integration_credentials (user_id, provider, encrypted_secret, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id, provider) DO UPDATE SET
                encrypted_secret = excluded.encrypted_secret,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(c.user_id)
        .bind(c.provider)
        .bind(&c.encrypted_secret)
        .bind(c.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find(
        &self,
        user_id: Uuid,
        provider: Provider,
    ) -> AppResult<Option<IntegrationCredential>> {
        let row = sqlx::query_as::<_, IntegrationCredential>(
            "SELECT user_id, provider, encrypted_secret, updated_at FROM integration_credentials \
             WHERE user_id = ? AND provider = ?",
        )
        .bind(user_id)
        .bind(provider)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<IntegrationCredential>> {
        let rows = sqlx::query_as::<_, IntegrationCredential>(
            "SELECT user_id, provider, encrypted_secret, updated_at FROM integration_credentials \
             WHERE user_id = ? ORDER BY provider",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn delete(&self, user_id: Uuid, provider: Provider) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM integration_credentials WHERE user_id = ? AND provider = ?")
                .bind(user_id)
                .bind(provider)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::infrastructure::database::{test_support::seed_user, Database};

    #[tokio::test]
    async fn upsert_replaces_secret() {
        let db = Database::in_memory().await.unwrap();
        let alice = seed_user(&db, "alice").await;
        let repo = db.credentials();

        for secret in ["v1", "v2"] {
            repo.upsert(&IntegrationCredential {
                user_id: alice.id,
                provider: Provider::Vinted,
                encrypted_secret: secret.into(),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
        }

        let stored = repo.find(alice.id, Provider::Vinted).await.unwrap().unwrap();
        assert_eq!(stored.encrypted_secret, "v2");
        assert_eq!(repo.list(alice.id).await.unwrap().len(), 1);
        assert!(repo.find(alice.id, Provider::Superbuy).await.unwrap().is_none());
        assert!(repo.delete(alice.id, Provider::Vinted).await.unwrap());
        assert!(!repo.delete(alice.id, Provider::Vinted).await.unwrap());
    }
}
