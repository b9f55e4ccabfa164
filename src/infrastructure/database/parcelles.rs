use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{domain::parcelle::Parcelle, infrastructure::error::AppResult};

const PARCELLE_COLUMNS: &str = "id, user_id, numero, transporteur, poids_grammes, prix_total, \
     prix_par_gramme, statut, superbuy_id, created_at, updated_at";

/// Repository des parcelles; toutes les lectures sont filtrées par propriétaire
#[derive(Clone)]
pub struct ParcelleRepository {
    pool: SqlitePool,
}

impl ParcelleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, p: &Parcelle) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO parcelles (
                id, user_id, numero, transporteur, poids_grammes, prix_total,
                prix_par_gramme, statut, superbuy_id, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(p.id)
        .bind(p.user_id)
        .bind(&p.numero)
        .bind(&p.transporteur)
        .bind(p.poids_grammes)
        .bind(p.prix_total)
        .bind(p.prix_par_gramme)
        .bind(p.statut)
        .bind(&p.superbuy_id)
        .bind(p.created_at)
        .bind(p.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Parcelle>> {
        let parcelle = sqlx::query_as::<_, Parcelle>(&format!(
            "SELECT {} FROM parcelles WHERE id = ? AND user_id = ?",
            PARCELLE_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(parcelle)
    }

    pub async fn find_by_superbuy_id(
        &self,
        user_id: Uuid,
        superbuy_id: &str,
    ) -> AppResult<Option<Parcelle>> {
        let parcelle = sqlx::query_as::<_, Parcelle>(&format!(
            "SELECT {} FROM parcelles WHERE user_id = ? AND superbuy_id = ?",
            PARCELLE_COLUMNS
        ))
        .bind(user_id)
        .bind(superbuy_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(parcelle)
    }

    /// Parcelles de l'utilisateur, les plus récentes d'abord
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<Parcelle>> {
        let parcelles = sqlx::query_as::<_, Parcelle>(&format!(
            "SELECT {} FROM parcelles WHERE user_id = ? ORDER BY created_at DESC",
            PARCELLE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(parcelles)
    }

    /// Enregistre l'état complet de la parcelle (dernier écrit gagnant)
    pub async fn update(&self, p: &Parcelle) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE parcelles
            SET numero = ?, transporteur = ?, poids_grammes = ?, prix_total = ?,
                prix_par_gramme = ?, statut = ?, superbuy_id = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&p.numero)
        .bind(&p.transporteur)
        .bind(p.poids_grammes)
        .bind(p.prix_total)
        .bind(p.prix_par_gramme)
        .bind(p.statut)
        .bind(&p.superbuy_id)
        .bind(p.updated_at)
        .bind(p.id)
        .bind(p.user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM parcelles WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Nombre de produits rattachés à la parcelle
    pub async fn count_linked_produits(&self, id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM produits WHERE parcelle_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
