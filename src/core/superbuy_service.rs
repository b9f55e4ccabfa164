// core/superbuy_service.rs
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::credential_service::CredentialService;
use crate::domain::integration::Provider;
use crate::domain::parcelle::{prix_par_gramme, NewParcelle, Parcelle, ParcelleStatut};
use crate::infrastructure::database::Database;
use crate::infrastructure::error::{AppError, AppResult};
use crate::infrastructure::superbuy::{ParcelSource, SuperbuyParcel};
use crate::utils::Config;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

fn map_status(status: Option<&str>) -> ParcelleStatut {
    match status.map(|s| s.trim().to_lowercase()).as_deref() {
        Some("delivered" | "received" | "signed") => ParcelleStatut::Livree,
        Some("shipped" | "in_transit" | "transit" | "sent") => ParcelleStatut::EnTransit,
        Some("lost") => ParcelleStatut::Perdue,
        _ => ParcelleStatut::EnAttente,
    }
}

fn numero_for(parcel: &SuperbuyParcel) -> String {
    parcel
        .tracking_number
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&parcel.package_id)
        .to_string()
}

fn transporteur_for(parcel: &SuperbuyParcel) -> String {
    parcel
        .carrier
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("Superbuy")
        .to_string()
}

/// Importe les colis Superbuy dans les parcelles de l'utilisateur
pub struct SuperbuyService {
    db: Database,
    config: Arc<Config>,
    source: Arc<dyn ParcelSource>,
}

impl SuperbuyService {
    pub fn new(db: Database, config: Arc<Config>, source: Arc<dyn ParcelSource>) -> Self {
        Self { db, config, source }
    }

    pub async fn sync(&self, user_id: Uuid) -> AppResult<SyncReport> {
        let token = CredentialService::new(self.db.clone(), self.config.clone())
            .reveal(user_id, Provider::Superbuy)
            .await?
            .ok_or_else(|| AppError::Unauthorized("aucun token Superbuy configuré".to_string()))?;

        let parcels = self.source.fetch_parcels(&token).await?;
        let repo = self.db.parcelles();
        let mut report = SyncReport::default();

        for parcel in parcels {
            if !parcel.weight.is_finite() || parcel.weight <= 0.0 || parcel.shipping_fee < 0.0 {
                warn!(package_id = %parcel.package_id, weight = parcel.weight, "⏭️ Colis ignoré");
                report.skipped += 1;
                continue;
            }

            match repo.find_by_superbuy_id(user_id, &parcel.package_id).await? {
                Some(mut existing) => {
                    existing.numero = numero_for(&parcel);
                    existing.transporteur = transporteur_for(&parcel);
                    existing.poids_grammes = parcel.weight;
                    existing.prix_total = parcel.shipping_fee;
                    existing.prix_par_gramme = prix_par_gramme(parcel.shipping_fee, parcel.weight);
                    existing.statut = map_status(parcel.status.as_deref());
                    existing.updated_at = chrono::Utc::now();
                    match repo.update(&existing).await {
                        Ok(_) => report.updated += 1,
                        Err(AppError::Conflict(_)) => {
                            warn!(package_id = %parcel.package_id, "⏭️ Numéro déjà utilisé, mise à jour ignorée");
                            report.skipped += 1;
                        }
                        Err(e) => return Err(e),
                    }
                }
                None => {
                    let parcelle = Parcelle::new(
                        user_id,
                        NewParcelle {
                            numero: numero_for(&parcel),
                            transporteur: transporteur_for(&parcel),
                            poids_grammes: parcel.weight,
                            prix_total: parcel.shipping_fee,
                            statut: map_status(parcel.status.as_deref()),
                            superbuy_id: Some(parcel.package_id.clone()),
                        },
                    );
                    match repo.insert(&parcelle).await {
                        Ok(()) => report.created += 1,
                        Err(AppError::Conflict(_)) => {
                            warn!(package_id = %parcel.package_id, "⏭️ Numéro déjà utilisé, colis ignoré");
                            report.skipped += 1;
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        info!(
            user_id = %user_id,
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            "🔄 Synchronisation Superbuy terminée"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::integration::StoreCredential;
    use crate::infrastructure::database::test_support::seed_user;

    struct StaticSource(Vec<SuperbuyParcel>);

    #[async_trait]
    impl ParcelSource for StaticSource {
        async fn fetch_parcels(&self, token: &str) -> AppResult<Vec<SuperbuyParcel>> {
            assert_eq!(token, "sb-token");
            Ok(self.0.clone())
        }
    }

    fn parcel(id: &str, weight: f64, fee: f64, status: &str) -> SuperbuyParcel {
        SuperbuyParcel {
            package_id: id.into(),
            tracking_number: Some(format!("TRK-{}", id)),
            carrier: Some("EMS".into()),
            weight,
            shipping_fee: fee,
            status: Some(status.into()),
        }
    }

    #[tokio::test]
    async fn sync_creates_updates_and_skips() {
        let db = Database::in_memory().await.unwrap();
        let alice = seed_user(&db, "alice").await;
        let config = Arc::new(Config::default());
        CredentialService::new(db.clone(), config.clone())
            .store(alice.id, Provider::Superbuy, StoreCredential { secret: "sb-token".into() })
            .await
            .unwrap();

        let first = SuperbuyService::new(
            db.clone(),
            config.clone(),
            Arc::new(StaticSource(vec![parcel("A", 1000.0, 20.0, "shipped"), parcel("B", 0.0, 5.0, "shipped")])),
        );
        assert_eq!(first.sync(alice.id).await.unwrap(), SyncReport { created: 1, updated: 0, skipped: 1 });

        let second = SuperbuyService::new(
            db.clone(),
            config,
            Arc::new(StaticSource(vec![parcel("A", 1000.0, 30.0, "delivered"), parcel("C", 500.0, 10.0, "pending")])),
        );
        assert_eq!(second.sync(alice.id).await.unwrap(), SyncReport { created: 1, updated: 1, skipped: 0 });

        let a = db.parcelles().find_by_superbuy_id(alice.id, "A").await.unwrap().unwrap();
        assert_eq!(a.statut, ParcelleStatut::Livree);
        assert!((a.prix_par_gramme - 0.03).abs() < 1e-9);
        assert_eq!(a.numero, "TRK-A");
        assert_eq!(db.parcelles().list(alice.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn clashing_tracking_number_on_update_is_skipped() {
        let db = Database::in_memory().await.unwrap();
        let alice = seed_user(&db, "alice").await;
        let config = Arc::new(Config::default());
        CredentialService::new(db.clone(), config.clone())
            .store(alice.id, Provider::Superbuy, StoreCredential { secret: "sb-token".into() })
            .await
            .unwrap();

        let first = SuperbuyService::new(
            db.clone(),
            config.clone(),
            Arc::new(StaticSource(vec![parcel("A", 1000.0, 20.0, "shipped"), parcel("B", 800.0, 16.0, "shipped")])),
        );
        assert_eq!(first.sync(alice.id).await.unwrap(), SyncReport { created: 2, updated: 0, skipped: 0 });

        let mut moved = parcel("A", 1000.0, 25.0, "delivered");
        moved.tracking_number = Some("TRK-B".into());
        let second = SuperbuyService::new(
            db.clone(),
            config,
            Arc::new(StaticSource(vec![
                moved,
                parcel("B", 800.0, 16.0, "delivered"),
                parcel("C", 500.0, 10.0, "pending"),
            ])),
        );
        assert_eq!(second.sync(alice.id).await.unwrap(), SyncReport { created: 1, updated: 1, skipped: 1 });

        let a = db.parcelles().find_by_superbuy_id(alice.id, "A").await.unwrap().unwrap();
        assert_eq!(a.numero, "TRK-A");
        assert_eq!(a.prix_total, 20.0);
        assert!(db.parcelles().find_by_superbuy_id(alice.id, "C").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn sync_without_credential_is_unauthorized() {
        let db = Database::in_memory().await.unwrap();
        let alice = seed_user(&db, "alice").await;
        let svc = SuperbuyService::new(db, Arc::new(Config::default()), Arc::new(StaticSource(vec![])));
        assert!(matches!(svc.sync(alice.id).await, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn status_mapping() {
        assert_eq!(map_status(Some("Delivered")), ParcelleStatut::Livree);
        assert_eq!(map_status(Some("in_transit")), ParcelleStatut::EnTransit);
        assert_eq!(map_status(Some("lost")), ParcelleStatut::Perdue);
        assert_eq!(map_status(None), ParcelleStatut::EnAttente);
    }
}
