use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Article renvoyé par le catalogue Vinted, après normalisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketItem {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub condition: Option<String>,
    pub seller_login: String,
    /// Article déjà vendu (sinon encore disponible)
    pub sold: bool,
}

/// Paramètres d'une recherche dans le catalogue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketQuery {
    pub search_text: String,
    #[serde(default)]
    pub brand_ids: Vec<i64>,
    #[serde(default)]
    pub catalog_ids: Vec<i64>,
    #[serde(default)]
    pub status_ids: Vec<i64>,
    /// Restreint la recherche aux articles déjà vendus
    #[serde(default)]
    pub sold_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DemandLevel {
    Low,
    Medium,
    High,
}

impl Trend {
    /// Au-delà de ±2 % la tendance est considérée comme marquée
    pub fn from_percentage(pct: f64) -> Self {
        if pct > 2.0 {
            Trend::Up
        } else if pct < -2.0 {
            Trend::Down
        } else {
            Trend::Stable
        }
    }
}

impl DemandLevel {
    pub fn from_volume(items: usize) -> Self {
        match items {
            n if n >= 50 => DemandLevel::High,
            n if n >= 15 => DemandLevel::Medium,
            _ => DemandLevel::Low,
        }
    }
}

/// Vendeur concurrent observé pendant l'analyse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub login: String,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceMetrics {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub median: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub items_found: usize,
    pub distinct_sellers: usize,
    pub sold_count: usize,
    pub available_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketKpis {
    pub recommended_price: f64,
    pub sell_through_rate: f64,
    pub competitiveness_score: f64,
    pub trend_30d: f64,
}

/// Résultat complet d'une analyse de marché, avant persistance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAnalysis {
    pub product_name: String,
    pub metrics: PriceMetrics,
    pub summary: MarketSummary,
    pub kpis: MarketKpis,
    pub trend: Trend,
    pub demand_level: DemandLevel,
    pub competitors: Vec<Competitor>,
    pub brand_distribution: BTreeMap<String, u32>,
    pub condition_distribution: BTreeMap<String, u32>,
    pub size_distribution: BTreeMap<String, u32>,
}

/// Analyse persistée, une par couple (utilisateur, produit)
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_name: String,
    pub current_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
    pub median_price: f64,
    pub sales_volume: i64,
    pub competitor_count: i64,
    pub trend: Trend,
    pub trend_percentage: f64,
    pub recommended_price: f64,
    pub demand_level: DemandLevel,
    pub competitors: Json<Vec<Competitor>>,
    pub brand_distribution: Json<BTreeMap<String, u32>>,
    pub condition_distribution: Json<BTreeMap<String, u32>>,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MarketAnalysis {
    /// Projette un résultat d'analyse vers sa forme persistée
    pub fn from_analysis(user_id: Uuid, analysis: &PriceAnalysis) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            product_name: analysis.product_name.clone(),
            current_price: analysis.metrics.average,
            min_price: analysis.metrics.min,
            max_price: analysis.metrics.max,
            avg_price: analysis.metrics.average,
            median_price: analysis.metrics.median,
            sales_volume: analysis.summary.sold_count as i64,
            competitor_count: analysis.summary.distinct_sellers as i64,
            trend: analysis.trend,
            trend_percentage: analysis.kpis.trend_30d,
            recommended_price: analysis.kpis.recommended_price,
            demand_level: analysis.demand_level,
            competitors: Json(analysis.competitors.clone()),
            brand_distribution: Json(analysis.brand_distribution.clone()),
            condition_distribution: Json(analysis.condition_distribution.clone()),
            last_updated: now,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Point d'historique de prix pour un produit
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPrice {
    pub id: Uuid,
    pub product_name: String,
    pub date: DateTime<Utc>,
    pub avg_price: f64,
    pub sales_volume: i64,
}

impl HistoricalPrice {
    pub fn new(product_name: &str, avg_price: f64, sales_volume: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_name: product_name.to_string(),
            date: Utc::now(),
            avg_price,
            sales_volume,
        }
    }
}

/// Demande d'analyse de marché
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[validate(length(min = 1, max = 200, message = "Le texte de recherche est requis"))]
    pub search_text: String,
    /// Jeton Vinted explicite; sinon celui enregistré pour l'utilisateur
    #[serde(default)]
    pub vinted_token: Option<String>,
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default)]
    pub brand_ids: Vec<i64>,
    #[serde(default)]
    pub catalog_ids: Vec<i64>,
    #[serde(default)]
    pub status_ids: Vec<i64>,
}

/// Prix et annonce proposés par le conseiller IA
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct AiSuggestion {
    pub prix_suggere: f64,
    pub description_suggeree: String,
}

/// Réponse d'une analyse: le résultat et l'identifiant sauvegardé s'il existe
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis: PriceAnalysis,
    pub saved_id: Option<Uuid>,
    pub ai_suggestion: Option<AiSuggestion>,
}

/// Analyse accompagnée de l'évolution de son prix moyen
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysisDetail {
    #[serde(flatten)]
    pub analysis: MarketAnalysis,
    pub price_evolution: Vec<HistoricalPrice>,
}
