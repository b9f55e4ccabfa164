use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    domain::produit::{Produit, ProduitFilter},
    infrastructure::error::AppResult,
};

const PRODUIT_COLUMNS: &str = "id, user_id, parcelle_id, nom, prix_achat, poids_grammes, vendu, \
     prix_vente, date_vente, plateforme, created_at, updated_at";

#[derive(Clone)]
pub struct ProduitRepository {
    pool: SqlitePool,
}

impl ProduitRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, p: &Produit) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO produits (
                id, user_id, parcelle_id, nom, prix_achat, poids_grammes, vendu,
                prix_vente, date_vente, plateforme, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(p.id)
        .bind(p.user_id)
        .bind(p.parcelle_id)
        .bind(&p.nom)
        .bind(p.prix_achat)
        .bind(p.poids_grammes)
        .bind(p.vendu)
        .bind(p.prix_vente)
        .bind(p.date_vente)
        .bind(&p.plateforme)
        .bind(p.created_at)
        .bind(p.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Produit>> {
        let produit = sqlx::query_as::<_, Produit>(&format!(
            "SELECT {} FROM produits WHERE id = ? AND user_id = ?",
            PRODUIT_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(produit)
    }

    /// Produits de l'utilisateur, les plus récents d'abord, filtres optionnels
    pub async fn list(&self, user_id: Uuid, filter: &ProduitFilter) -> AppResult<Vec<Produit>> {
        let produits = sqlx::query_as::<_, Produit>(&format!(
            r#"
            SELECT {} FROM produits
            WHERE user_id = ?
              AND (? IS NULL OR vendu = ?)
              AND (? IS NULL OR parcelle_id = ?)
            ORDER BY created_at DESC
            "#,
            PRODUIT_COLUMNS
        ))
        .bind(user_id)
        .bind(filter.vendu)
        .bind(filter.vendu)
        .bind(filter.parcelle_id)
        .bind(filter.parcelle_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(produits)
    }

    pub async fn update(&self, p: &Produit) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE produits
            SET parcelle_id = ?, nom = ?, prix_achat = ?, poids_grammes = ?, vendu = ?,
                prix_vente = ?, date_vente = ?, plateforme = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(p.parcelle_id)
        .bind(&p.nom)
        .bind(p.prix_achat)
        .bind(p.poids_grammes)
        .bind(p.vendu)
        .bind(p.prix_vente)
        .bind(p.date_vente)
        .bind(&p.plateforme)
        .bind(p.updated_at)
        .bind(p.id)
        .bind(p.user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM produits WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parcelle::{NewParcelle, Parcelle, ParcelleStatut};
    use crate::domain::produit::{NewProduit, VenteProduit};
    use crate::infrastructure::database::{test_support::seed_user, Database};

    #[tokio::test]
    async fn list_applies_filters() {
        let db = Database::in_memory().await.unwrap();
        let alice = seed_user(&db, "alice").await;
        let parcelle = Parcelle::new(
            alice.id,
            NewParcelle {
                numero: "P1".into(),
                transporteur: "DHL".into(),
                poids_grammes: 1000.0,
                prix_total: 10.0,
                statut: ParcelleStatut::Livree,
                superbuy_id: None,
            },
        );
        db.parcelles().insert(&parcelle).await.unwrap();

        let repo = db.produits();
        let mut sold = Produit::new(
            alice.id,
            NewProduit {
                nom: "Veste".into(),
                prix_achat: 12.0,
                poids_grammes: 500.0,
                parcelle_id: Some(parcelle.id),
            },
        );
        sold.mark_sold(VenteProduit {
            prix_vente: 30.0,
            date_vente: None,
            plateforme: Some("Vinted".into()),
        });
        let unsold = Produit::new(
            alice.id,
            NewProduit {
                nom: "Casquette".into(),
                prix_achat: 4.0,
                poids_grammes: 0.0,
                parcelle_id: None,
            },
        );
        repo.insert(&sold).await.unwrap();
        repo.insert(&unsold).await.unwrap();

        assert_eq!(repo.list(alice.id, &ProduitFilter::default()).await.unwrap().len(), 2);

        let vendus = repo
            .list(alice.id, &ProduitFilter { vendu: Some(true), parcelle_id: None })
            .await
            .unwrap();
        assert_eq!(vendus.len(), 1);
        assert_eq!(vendus[0].nom, "Veste");
        assert_eq!(vendus[0].prix_vente, Some(30.0));

        let in_parcel = repo
            .list(alice.id, &ProduitFilter { vendu: None, parcelle_id: Some(parcelle.id) })
            .await
            .unwrap();
        assert_eq!(in_parcel.len(), 1);

        assert_eq!(db.parcelles().count_linked_produits(parcelle.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let db = Database::in_memory().await.unwrap();
        let alice = seed_user(&db, "alice").await;
        let repo = db.produits();
        let mut produit = Produit::new(
            alice.id,
            NewProduit {
                nom: "Jean".into(),
                prix_achat: 8.0,
                poids_grammes: 600.0,
                parcelle_id: None,
            },
        );
        repo.insert(&produit).await.unwrap();
        produit.nom = "Jean brut".into();
        assert!(repo.update(&produit).await.unwrap());
        let stored = repo.find(alice.id, produit.id).await.unwrap().unwrap();
        assert_eq!(stored.nom, "Jean brut");
        assert!(repo.delete(alice.id, produit.id).await.unwrap());
        assert!(repo.find(alice.id, produit.id).await.unwrap().is_none());
    }
}
