use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Statut d'acheminement d'une parcelle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ParcelleStatut {
    EnAttente,
    EnTransit,
    Livree,
    Perdue,
}

impl Default for ParcelleStatut {
    fn default() -> Self {
        ParcelleStatut::EnAttente
    }
}

/// Une parcelle (colis) expédiée, suivie pour son coût, son poids et son transporteur
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Parcelle {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Numéro de suivi ou référence interne, unique par utilisateur
    pub numero: String,
    pub transporteur: String,
    pub poids_grammes: f64,
    /// Coût total du colis (frais de port inclus), en euros
    pub prix_total: f64,
    /// Toujours égal à `prix_total / poids_grammes`
    pub prix_par_gramme: f64,
    pub statut: ParcelleStatut,
    /// Identifiant du colis côté Superbuy quand il a été synchronisé
    pub superbuy_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Données requises pour créer une parcelle
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewParcelle {
    #[validate(length(min = 1, max = 128, message = "Le numéro de parcelle est requis"))]
    pub numero: String,
    #[validate(length(min = 1, max = 64, message = "Le transporteur est requis"))]
    pub transporteur: String,
    #[validate(range(min = 0.001, message = "Le poids doit être strictement positif"))]
    pub poids_grammes: f64,
    #[validate(range(min = 0.0, message = "Le prix ne peut pas être négatif"))]
    pub prix_total: f64,
    #[serde(default)]
    pub statut: ParcelleStatut,
    #[serde(default)]
    pub superbuy_id: Option<String>,
}

/// Mise à jour partielle d'une parcelle
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ParcelleUpdate {
    #[validate(length(min = 1, max = 128, message = "Le numéro de parcelle ne peut pas être vide"))]
    pub numero: Option<String>,
    #[validate(length(min = 1, max = 64, message = "Le transporteur ne peut pas être vide"))]
    pub transporteur: Option<String>,
    #[validate(range(min = 0.001, message = "Le poids doit être strictement positif"))]
    pub poids_grammes: Option<f64>,
    #[validate(range(min = 0.0, message = "Le prix ne peut pas être négatif"))]
    pub prix_total: Option<f64>,
    pub statut: Option<ParcelleStatut>,
}

/// Calcule le prix au gramme d'une parcelle
pub fn prix_par_gramme(prix_total: f64, poids_grammes: f64) -> f64 {
    if poids_grammes <= 0.0 {
        return 0.0;
    }
    prix_total / poids_grammes
}

impl Parcelle {
    /// Construit une nouvelle parcelle pour un utilisateur
    pub fn new(user_id: Uuid, data: NewParcelle) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            numero: data.numero.trim().to_string(),
            transporteur: data.transporteur.trim().to_string(),
            poids_grammes: data.poids_grammes,
            prix_total: data.prix_total,
            prix_par_gramme: prix_par_gramme(data.prix_total, data.poids_grammes),
            statut: data.statut,
            superbuy_id: data.superbuy_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applique une mise à jour partielle et recalcule le prix au gramme
    pub fn apply(&mut self, update: ParcelleUpdate) {
        if let Some(numero) = update.numero {
            self.numero = numero.trim().to_string();
        }
        if let Some(transporteur) = update.transporteur {
            self.transporteur = transporteur.trim().to_string();
        }
        if let Some(poids) = update.poids_grammes {
            self.poids_grammes = poids;
        }
        if let Some(prix) = update.prix_total {
            self.prix_total = prix;
        }
        if let Some(statut) = update.statut {
            self.statut = statut;
        }
        self.prix_par_gramme = prix_par_gramme(self.prix_total, self.poids_grammes);
        self.updated_at = Utc::now();
    }
}
