use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Un article destiné à la revente, éventuellement rattaché à une parcelle
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Produit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub parcelle_id: Option<Uuid>,
    pub nom: String,
    /// Prix d'achat de l'article, hors livraison
    pub prix_achat: f64,
    pub poids_grammes: f64,
    pub vendu: bool,
    pub prix_vente: Option<f64>,
    pub date_vente: Option<DateTime<Utc>>,
    pub plateforme: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Données requises pour créer un produit
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProduit {
    #[validate(length(min = 1, max = 256, message = "Le nom du produit est requis"))]
    pub nom: String,
    #[validate(range(min = 0.0, message = "Le prix d'achat ne peut pas être négatif"))]
    pub prix_achat: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Le poids ne peut pas être négatif"))]
    pub poids_grammes: f64,
    #[serde(default)]
    pub parcelle_id: Option<Uuid>,
}

/// Mise à jour partielle d'un produit
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProduitUpdate {
    #[validate(length(min = 1, max = 256, message = "Le nom du produit ne peut pas être vide"))]
    pub nom: Option<String>,
    #[validate(range(min = 0.0, message = "Le prix d'achat ne peut pas être négatif"))]
    pub prix_achat: Option<f64>,
    #[validate(range(min = 0.0, message = "Le poids ne peut pas être négatif"))]
    pub poids_grammes: Option<f64>,
    /// Absent: inchangé; `null`: détache le produit de sa parcelle
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub parcelle_id: Option<Option<Uuid>>,
}

/// Informations de vente d'un produit
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VenteProduit {
    #[validate(range(min = 0.01, message = "Le prix de vente doit être strictement positif"))]
    pub prix_vente: f64,
    #[serde(default)]
    pub date_vente: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 64, message = "La plateforme ne peut pas être vide"))]
    pub plateforme: Option<String>,
}

/// Filtres de liste des produits
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProduitFilter {
    pub vendu: Option<bool>,
    pub parcelle_id: Option<Uuid>,
}

/// Chiffres dérivés d'un produit (coûts, bénéfice, marge)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProduitFinances {
    pub cout_livraison: f64,
    pub cout_total: f64,
    pub benefice: Option<f64>,
    pub marge_pourcentage: Option<f64>,
}

/// Produit accompagné de ses chiffres dérivés, tel que renvoyé par l'API
#[derive(Debug, Clone, Serialize)]
pub struct ProduitDetail {
    #[serde(flatten)]
    pub produit: Produit,
    #[serde(flatten)]
    pub finances: ProduitFinances,
}

impl Produit {
    /// Construit un nouveau produit pour un utilisateur
    pub fn new(user_id: Uuid, data: NewProduit) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            parcelle_id: data.parcelle_id,
            nom: data.nom.trim().to_string(),
            prix_achat: data.prix_achat,
            poids_grammes: data.poids_grammes,
            vendu: false,
            prix_vente: None,
            date_vente: None,
            plateforme: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applique une mise à jour partielle
    pub fn apply(&mut self, update: ProduitUpdate) {
        if let Some(nom) = update.nom {
            self.nom = nom.trim().to_string();
        }
        if let Some(prix) = update.prix_achat {
            self.prix_achat = prix;
        }
        if let Some(poids) = update.poids_grammes {
            self.poids_grammes = poids;
        }
        if let Some(parcelle_id) = update.parcelle_id {
            self.parcelle_id = parcelle_id;
        }
        self.updated_at = Utc::now();
    }

    /// Marque le produit comme vendu
    pub fn mark_sold(&mut self, vente: VenteProduit) {
        self.vendu = true;
        self.prix_vente = Some(vente.prix_vente);
        self.date_vente = Some(vente.date_vente.unwrap_or_else(Utc::now));
        self.plateforme = vente.plateforme.map(|p| p.trim().to_string());
        self.updated_at = Utc::now();
    }

    /// Annule la vente du produit
    pub fn mark_unsold(&mut self) {
        self.vendu = false;
        self.prix_vente = None;
        self.date_vente = None;
        self.plateforme = None;
        self.updated_at = Utc::now();
    }

    /// Calcule les coûts et la rentabilité, `prix_par_gramme` étant celui de la
    /// parcelle d'origine (0 sans parcelle)
    pub fn finances(&self, prix_par_gramme: f64) -> ProduitFinances {
        let cout_livraison = round2(self.poids_grammes * prix_par_gramme);
        let cout_total = round2(self.prix_achat + cout_livraison);

        let benefice = match (self.vendu, self.prix_vente) {
            (true, Some(prix_vente)) => Some(round2(prix_vente - cout_total)),
            _ => None,
        };
        let marge_pourcentage = benefice.map(|b| {
            if cout_total > 0.0 {
                round2(b / cout_total * 100.0)
            } else {
                0.0
            }
        });

        ProduitFinances {
            cout_livraison,
            cout_total,
            benefice,
            marge_pourcentage,
        }
    }

    pub fn into_detail(self, prix_par_gramme: f64) -> ProduitDetail {
        let finances = self.finances(prix_par_gramme);
        ProduitDetail {
            produit: self,
            finances,
        }
    }
}

/// Arrondi monétaire à deux décimales
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
