// core/produit_service.rs
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::domain::produit::{
    NewProduit, Produit, ProduitDetail, ProduitFilter, ProduitUpdate, VenteProduit,
};
use crate::infrastructure::database::Database;
use crate::infrastructure::error::{AppError, AppResult};
use crate::utils::validate_non_empty_string;

/// Gestion des produits et de leurs ventes
pub struct ProduitService {
    db: Database,
}

impl ProduitService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Prix au gramme de la parcelle du produit (0 sans parcelle)
    async fn prix_par_gramme(&self, produit: &Produit) -> AppResult<f64> {
        match produit.parcelle_id {
            Some(parcelle_id) => Ok(self
                .db
                .parcelles()
                .find(produit.user_id, parcelle_id)
                .await?
                .map(|p| p.prix_par_gramme)
                .unwrap_or(0.0)),
            None => Ok(0.0),
        }
    }

    async fn detail(&self, produit: Produit) -> AppResult<ProduitDetail> {
        let prix_par_gramme = self.prix_par_gramme(&produit).await?;
        Ok(produit.into_detail(prix_par_gramme))
    }

    async fn ensure_parcelle(&self, user_id: Uuid, parcelle_id: Option<Uuid>) -> AppResult<()> {
        if let Some(parcelle_id) = parcelle_id {
            if self.db.parcelles().find(user_id, parcelle_id).await?.is_none() {
                return Err(AppError::NotFound("Parcelle".to_string()));
            }
        }
        Ok(())
    }

    async fn load(&self, user_id: Uuid, id: Uuid) -> AppResult<Produit> {
        self.db
            .produits()
            .find(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Produit".to_string()))
    }

    async fn save(&self, produit: &Produit) -> AppResult<()> {
        if !self.db.produits().update(produit).await? {
            return Err(AppError::NotFound("Produit".to_string()));
        }
        Ok(())
    }

    pub async fn create(&self, user_id: Uuid, data: NewProduit) -> AppResult<ProduitDetail> {
        data.validate()?;
        validate_non_empty_string(&data.nom, "Le nom du produit")?;
        self.ensure_parcelle(user_id, data.parcelle_id).await?;

        let produit = Produit::new(user_id, data);
        self.db.produits().insert(&produit).await?;

        info!(user_id = %user_id, produit_id = %produit.id, "🏷️ Produit créé");
        self.detail(produit).await
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> AppResult<ProduitDetail> {
        let produit = self.load(user_id, id).await?;
        self.detail(produit).await
    }

    pub async fn list(&self, user_id: Uuid, filter: ProduitFilter) -> AppResult<Vec<ProduitDetail>> {
        let produits = self.db.produits().list(user_id, &filter).await?;
        let parcelles = self.db.parcelles().list(user_id).await?;

        Ok(produits
            .into_iter()
            .map(|produit| {
                let prix_par_gramme = produit
                    .parcelle_id
                    .and_then(|pid| parcelles.iter().find(|p| p.id == pid))
                    .map(|p| p.prix_par_gramme)
                    .unwrap_or(0.0);
                produit.into_detail(prix_par_gramme)
            })
            .collect())
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: ProduitUpdate,
    ) -> AppResult<ProduitDetail> {
        update.validate()?;
        if let Some(nom) = &update.nom {
            validate_non_empty_string(nom, "Le nom du produit")?;
        }
        self.ensure_parcelle(user_id, update.parcelle_id.flatten()).await?;

        let mut produit = self.load(user_id, id).await?;
        produit.apply(update);
        self.save(&produit).await?;

        info!(user_id = %user_id, produit_id = %id, "✏️ Produit mis à jour");
        self.detail(produit).await
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        if !self.db.produits().delete(user_id, id).await? {
            return Err(AppError::NotFound("Produit".to_string()));
        }
        info!(user_id = %user_id, produit_id = %id, "🗑️ Produit supprimé");
        Ok(())
    }

    pub async fn mark_sold(
        &self,
        user_id: Uuid,
        id: Uuid,
        vente: VenteProduit,
    ) -> AppResult<ProduitDetail> {
        vente.validate()?;
        let mut produit = self.load(user_id, id).await?;
        produit.mark_sold(vente);
        self.save(&produit).await?;

        info!(
            user_id = %user_id,
            produit_id = %id,
            prix_vente = produit.prix_vente.unwrap_or_default(),
            "💶 Produit vendu"
        );
        self.detail(produit).await
    }

    pub async fn mark_unsold(&self, user_id: Uuid, id: Uuid) -> AppResult<ProduitDetail> {
        let mut produit = self.load(user_id, id).await?;
        produit.mark_unsold();
        self.save(&produit).await?;

        info!(user_id = %user_id, produit_id = %id, "↩️ Vente annulée");
        self.detail(produit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parcelle_service::ParcelleService;
    use crate::domain::parcelle::{NewParcelle, ParcelleStatut};
    use crate::infrastructure::database::test_support::seed_user;

    async fn setup() -> (Database, Uuid, Uuid) {
        let db = Database::in_memory().await.unwrap();
        let alice = seed_user(&db, "alice").await;
        let parcelle = ParcelleService::new(db.clone())
            .create(
                alice.id,
                NewParcelle {
                    numero: "P-1".into(),
                    transporteur: "DHL".into(),
                    poids_grammes: 1000.0,
                    prix_total: 20.0,
                    statut: ParcelleStatut::Livree,
                    superbuy_id: None,
                },
            )
            .await
            .unwrap();
        (db, alice.id, parcelle.id)
    }

    fn new_produit(parcelle_id: Option<Uuid>) -> NewProduit {
        NewProduit {
            nom: "Baskets".into(),
            prix_achat: 25.0,
            poids_grammes: 500.0,
            parcelle_id,
        }
    }

    #[tokio::test]
    async fn sale_lifecycle_with_derived_figures() {
        let (db, user_id, parcelle_id) = setup().await;
        let svc = ProduitService::new(db);

        let created = svc.create(user_id, new_produit(Some(parcelle_id))).await.unwrap();
        assert_eq!(created.finances.cout_livraison, 10.0);
        assert_eq!(created.finances.cout_total, 35.0);
        assert_eq!(created.finances.benefice, None);

        let sold = svc
            .mark_sold(
                user_id,
                created.produit.id,
                VenteProduit { prix_vente: 70.0, date_vente: None, plateforme: Some("Vinted".into()) },
            )
            .await
            .unwrap();
        assert!(sold.produit.vendu);
        assert_eq!(sold.finances.benefice, Some(35.0));
        assert_eq!(sold.finances.marge_pourcentage, Some(100.0));

        let vendus = svc
            .list(user_id, ProduitFilter { vendu: Some(true), parcelle_id: None })
            .await
            .unwrap();
        assert_eq!(vendus.len(), 1);
        assert_eq!(vendus[0].finances.cout_livraison, 10.0);

        let unsold = svc.mark_unsold(user_id, created.produit.id).await.unwrap();
        assert!(!unsold.produit.vendu);
        assert!(unsold.produit.prix_vente.is_none());
    }

    #[tokio::test]
    async fn unknown_parcelle_is_not_found() {
        let (db, user_id, _) = setup().await;
        let svc = ProduitService::new(db);
        let err = svc.create(user_id, new_produit(Some(Uuid::new_v4()))).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn invalid_sale_price_is_rejected() {
        let (db, user_id, _) = setup().await;
        let svc = ProduitService::new(db);
        let created = svc.create(user_id, new_produit(None)).await.unwrap();
        let err = svc
            .mark_sold(
                user_id,
                created.produit.id,
                VenteProduit { prix_vente: 0.0, date_vente: None, plateforme: None },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationErrors(_)));
    }

    #[tokio::test]
    async fn update_and_delete() {
        let (db, user_id, _) = setup().await;
        let svc = ProduitService::new(db);
        let created = svc.create(user_id, new_produit(None)).await.unwrap();
        let updated = svc
            .update(
                user_id,
                created.produit.id,
                ProduitUpdate { prix_achat: Some(30.0), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(updated.finances.cout_total, 30.0);

        svc.delete(user_id, created.produit.id).await.unwrap();
        let err = svc.delete(user_id, created.produit.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn blank_name_is_rejected_on_update() {
        let (db, user_id, _) = setup().await;
        let svc = ProduitService::new(db);
        let created = svc.create(user_id, new_produit(None)).await.unwrap();
        let err = svc
            .update(
                user_id,
                created.produit.id,
                ProduitUpdate { nom: Some("   ".into()), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(svc.get(user_id, created.produit.id).await.unwrap().produit.nom, "Baskets");
    }

    #[tokio::test]
    async fn product_can_be_detached_from_its_parcelle() {
        let (db, user_id, parcelle_id) = setup().await;
        let svc = ProduitService::new(db);
        let created = svc.create(user_id, new_produit(Some(parcelle_id))).await.unwrap();

        let unchanged = svc
            .update(user_id, created.produit.id, ProduitUpdate { prix_achat: Some(20.0), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(unchanged.produit.parcelle_id, Some(parcelle_id));

        let detached = svc
            .update(user_id, created.produit.id, ProduitUpdate { parcelle_id: Some(None), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(detached.produit.parcelle_id, None);
        assert_eq!(detached.finances.cout_livraison, 0.0);
        assert_eq!(detached.finances.cout_total, 20.0);
    }
}
