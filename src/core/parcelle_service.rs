// core/parcelle_service.rs
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::parcelle::{NewParcelle, Parcelle, ParcelleUpdate};
use crate::infrastructure::database::Database;
use crate::infrastructure::error::{AppError, AppResult};
use crate::utils::validate_non_empty_string;

/// Gestion des parcelles d'un utilisateur
pub struct ParcelleService {
    db: Database,
}

impl ParcelleService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: Uuid, data: NewParcelle) -> AppResult<Parcelle> {
        data.validate()?;
        validate_non_empty_string(&data.numero, "Le numéro")?;
        validate_non_empty_string(&data.transporteur, "Le transporteur")?;

        let parcelle = Parcelle::new(user_id, data);
        self.db
            .parcelles()
            .insert(&parcelle)
            .await
            .map_err(duplicate_numero)?;

        info!(user_id = %user_id, parcelle_id = %parcelle.id, numero = %parcelle.numero, "📦 Parcelle créée");
        Ok(parcelle)
    }

    /// Une parcelle d'un autre utilisateur est traitée comme inexistante
    pub async fn get(&self, user_id: Uuid, id: Uuid) -> AppResult<Parcelle> {
        self.db
            .parcelles()
            .find(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Parcelle".to_string()))
    }

    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<Parcelle>> {
        self.db.parcelles().list(user_id).await
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: ParcelleUpdate,
    ) -> AppResult<Parcelle> {
        update.validate()?;
        if let Some(numero) = &update.numero {
            validate_non_empty_string(numero, "Le numéro")?;
        }
        if let Some(transporteur) = &update.transporteur {
            validate_non_empty_string(transporteur, "Le transporteur")?;
        }
        let mut parcelle = self.get(user_id, id).await?;
        parcelle.apply(update);

        if !self.db.parcelles().update(&parcelle).await.map_err(duplicate_numero)? {
            return Err(AppError::NotFound("Parcelle".to_string()));
        }

        info!(user_id = %user_id, parcelle_id = %id, "✏️ Parcelle mise à jour");
        Ok(parcelle)
    }

    /// Refuse la suppression tant que des produits y sont rattachés
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        let parcelle = self.get(user_id, id).await?;

        let linked = self.db.parcelles().count_linked_produits(parcelle.id).await?;
        if linked > 0 {
            warn!(user_id = %user_id, parcelle_id = %id, linked, "⛔ Suppression refusée");
            return Err(AppError::Conflict(format!(
                "{} produit(s) sont rattachés à cette parcelle",
                linked
            )));
        }

        self.db.parcelles().delete(user_id, id).await?;
        info!(user_id = %user_id, parcelle_id = %id, "🗑️ Parcelle supprimée");
        Ok(())
    }
}

fn duplicate_numero(err: AppError) -> AppError {
    match err {
        AppError::Conflict(_) => {
            AppError::Conflict("une parcelle avec ce numéro existe déjà".to_string())
        }
        other => other,
    }
}
