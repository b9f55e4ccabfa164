// core/statistics_service.rs
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::domain::parcelle::Parcelle;
use crate::domain::produit::{round2, Produit};
use crate::infrastructure::database::Database;
use crate::infrastructure::error::AppResult;

const TOP_PRODUITS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlateformeStats {
    pub ventes: usize,
    pub chiffre_affaires: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProduit {
    pub id: Uuid,
    pub nom: String,
    pub benefice: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParcelleRoi {
    pub parcelle_id: Uuid,
    pub numero: String,
    pub cout: f64,
    pub benefice: f64,
    pub roi_pourcentage: f64,
}

/// Tableau de bord agrégé d'un utilisateur
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dashboard {
    pub nombre_parcelles: usize,
    pub poids_total_grammes: f64,
    pub cout_total_parcelles: f64,
    pub nombre_produits: usize,
    pub produits_vendus: usize,
    /// Coût total des produits encore en stock
    pub valeur_stock: f64,
    pub chiffre_affaires: f64,
    pub benefice_total: f64,
    pub marge_moyenne: f64,
    pub taux_vente: f64,
    pub ventes_par_plateforme: BTreeMap<String, PlateformeStats>,
    pub top_produits: Vec<TopProduit>,
    pub roi_par_parcelle: Vec<ParcelleRoi>,
}

/// Calcule le tableau de bord à partir des parcelles et produits
pub fn compute_dashboard(parcelles: &[Parcelle], produits: &[Produit]) -> Dashboard {
    let prix_par_gramme: HashMap<Uuid, f64> =
        parcelles.iter().map(|p| (p.id, p.prix_par_gramme)).collect();

    let mut dashboard = Dashboard {
        nombre_parcelles: parcelles.len(),
        poids_total_grammes: parcelles.iter().map(|p| p.poids_grammes).sum(),
        cout_total_parcelles: round2(parcelles.iter().map(|p| p.prix_total).sum()),
        nombre_produits: produits.len(),
        ..Default::default()
    };

    let mut marges = Vec::new();
    let mut benefice_par_parcelle: HashMap<Uuid, f64> = HashMap::new();
    let mut top = Vec::new();

    for produit in produits {
        let ppg = produit
            .parcelle_id
            .and_then(|id| prix_par_gramme.get(&id).copied())
            .unwrap_or(0.0);
        let finances = produit.finances(ppg);

        match (finances.benefice, produit.prix_vente) {
            (Some(benefice), Some(prix_vente)) => {
                dashboard.produits_vendus += 1;
                dashboard.chiffre_affaires += prix_vente;
                dashboard.benefice_total += benefice;
                marges.extend(finances.marge_pourcentage);

                let plateforme = produit
                    .plateforme
                    .clone()
                    .unwrap_or_else(|| "Non renseignée".to_string());
                let stats = dashboard.ventes_par_plateforme.entry(plateforme).or_default();
                stats.ventes += 1;
                stats.chiffre_affaires = round2(stats.chiffre_affaires + prix_vente);

                if let Some(parcelle_id) = produit.parcelle_id {
                    *benefice_par_parcelle.entry(parcelle_id).or_default() += benefice;
                }
                top.push(TopProduit {
                    id: produit.id,
                    nom: produit.nom.clone(),
                    benefice,
                });
            }
            _ => dashboard.valeur_stock += finances.cout_total,
        }
    }

    dashboard.valeur_stock = round2(dashboard.valeur_stock);
    dashboard.chiffre_affaires = round2(dashboard.chiffre_affaires);
    dashboard.benefice_total = round2(dashboard.benefice_total);
    if !marges.is_empty() {
        dashboard.marge_moyenne = round2(marges.iter().sum::<f64>() / marges.len() as f64);
    }
    if dashboard.nombre_produits > 0 {
        dashboard.taux_vente = round2(
            dashboard.produits_vendus as f64 / dashboard.nombre_produits as f64 * 100.0,
        );
    }

    top.sort_by(|a, b| b.benefice.total_cmp(&a.benefice));
    top.truncate(TOP_PRODUITS);
    dashboard.top_produits = top;

    dashboard.roi_par_parcelle = parcelles
        .iter()
        .map(|p| {
            let benefice = round2(benefice_par_parcelle.get(&p.id).copied().unwrap_or(0.0));
            let roi_pourcentage = if p.prix_total > 0.0 {
                round2(benefice / p.prix_total * 100.0)
            } else {
                0.0
            };
            ParcelleRoi {
                parcelle_id: p.id,
                numero: p.numero.clone(),
                cout: p.prix_total,
                benefice,
                roi_pourcentage,
            }
        })
        .collect();

    dashboard
}

pub struct StatisticsService {
    db: Database,
}

impl StatisticsService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn dashboard(&self, user_id: Uuid) -> AppResult<Dashboard> {
        let parcelles = self.db.parcelles().list(user_id).await?;
        let produits = self.db.produits().list(user_id, &Default::default()).await?;
        let dashboard = compute_dashboard(&parcelles, &produits);
        info!(user_id = %user_id, produits = dashboard.nombre_produits, "📊 Tableau de bord calculé");
        Ok(dashboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parcelle::{NewParcelle, ParcelleStatut};
    use crate::domain::produit::{NewProduit, VenteProduit};

    fn parcelle(user_id: Uuid) -> Parcelle {
        Parcelle::new(
            user_id,
            NewParcelle {
                numero: "P-1".into(),
                transporteur: "DHL".into(),
                poids_grammes: 1000.0,
                prix_total: 20.0,
                statut: ParcelleStatut::Livree,
                superbuy_id: None,
            },
        )
    }

    fn produit(user_id: Uuid, nom: &str, prix_achat: f64, parcelle_id: Option<Uuid>) -> Produit {
        Produit::new(
            user_id,
            NewProduit { nom: nom.into(), prix_achat, poids_grammes: 500.0, parcelle_id },
        )
    }

    fn sell(p: &mut Produit, prix: f64, plateforme: &str) {
        p.mark_sold(VenteProduit {
            prix_vente: prix,
            date_vente: None,
            plateforme: Some(plateforme.into()),
        });
    }

    #[test]
    fn empty_dashboard_is_all_zero() {
        let dashboard = compute_dashboard(&[], &[]);
        assert_eq!(dashboard, Dashboard::default());
    }

    #[test]
    fn dashboard_aggregates_sales_and_roi() {
        let user_id = Uuid::new_v4();
        let parcelle = parcelle(user_id);

        // cout_livraison = 500 g × 0.02 = 10
        let mut a = produit(user_id, "A", 10.0, Some(parcelle.id));
        sell(&mut a, 40.0, "Vinted");
        let mut b = produit(user_id, "B", 30.0, Some(parcelle.id));
        sell(&mut b, 50.0, "Leboncoin");
        let c = produit(user_id, "C", 5.0, None);

        let d = compute_dashboard(&[parcelle.clone()], &[a, b, c]);
        assert_eq!(d.nombre_parcelles, 1);
        assert_eq!(d.nombre_produits, 3);
        assert_eq!(d.produits_vendus, 2);
        assert_eq!(d.chiffre_affaires, 90.0);
        assert_eq!(d.benefice_total, 30.0);
        assert_eq!(d.valeur_stock, 5.0);
        assert_eq!(d.marge_moyenne, 62.5);
        assert_eq!(d.taux_vente, 66.67);
        assert_eq!(d.ventes_par_plateforme["Vinted"].ventes, 1);
        assert_eq!(d.top_produits[0].nom, "A");
        assert_eq!(d.roi_par_parcelle[0].benefice, 30.0);
        assert_eq!(d.roi_par_parcelle[0].roi_pourcentage, 150.0);
    }
}
