//! Calculs purs de l'analyse de marché: métriques de prix, distributions et KPIs

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::domain::market::{
    Competitor, DemandLevel, MarketItem, MarketKpis, MarketSummary, PriceAnalysis, PriceMetrics,
    Trend,
};
use crate::domain::produit::round2;

const UNSPECIFIED: &str = "Non spécifié";
const MAX_COMPETITORS: usize = 10;
const RECOMMENDED_PRICE_RATIO: f64 = 0.95;

/// Corrige les fautes de frappe courantes sur les marques
pub fn normalize_brand(word: &str) -> String {
    match word.to_lowercase().as_str() {
        "nik" => "nike".to_string(),
        "addidas" => "adidas".to_string(),
        "pumaa" => "puma".to_string(),
        "zaraa" => "zara".to_string(),
        _ => word.to_string(),
    }
}

pub fn normalize_search_text(search_text: &str) -> String {
    search_text
        .split_whitespace()
        .map(normalize_brand)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn price_metrics(prices: &[f64]) -> PriceMetrics {
    if prices.is_empty() {
        return PriceMetrics::default();
    }
    let mut sorted = prices.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };

    PriceMetrics {
        min: sorted[0],
        max: sorted[n - 1],
        average: round2(mean(&sorted)),
        median,
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Écart-type échantillon (n − 1); 0 en dessous de deux valeurs
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Plus de vendeurs et des prix resserrés donnent un score plus élevé
pub fn competitiveness_score(prices: &[f64], distinct_sellers: usize) -> f64 {
    if distinct_sellers == 0 {
        return 0.0;
    }
    round2((1.0 / (sample_std_dev(prices) + 1.0)) * distinct_sellers as f64)
}

pub fn sell_through_rate(sold: usize, available: usize) -> f64 {
    let total = sold + available;
    if total == 0 {
        return 0.0;
    }
    round2(sold as f64 / total as f64 * 100.0)
}

/// Variation en % du prix moyen par rapport au plus ancien relevé fourni
/// (`history` est trié du plus récent au plus ancien). Il faut au moins deux
/// analyses précédentes pour parler de tendance.
pub fn trend_percentage(current_average: f64, history: &[f64]) -> f64 {
    if history.len() < 2 {
        return 0.0;
    }
    match history.last() {
        Some(&oldest) if oldest > 0.0 => round2((current_average - oldest) / oldest * 100.0),
        _ => 0.0,
    }
}

pub fn recommended_price(average: f64) -> f64 {
    if average > 0.0 {
        round2(average * RECOMMENDED_PRICE_RATIO)
    } else {
        0.0
    }
}

fn distribution<'a>(values: impl Iterator<Item = Option<&'a str>>) -> BTreeMap<String, u32> {
    let mut map = BTreeMap::new();
    for value in values {
        *map.entry(value.unwrap_or(UNSPECIFIED).to_string()).or_insert(0) += 1;
    }
    map
}

/// Vendeurs distincts avec leur prix le plus bas, du moins cher au plus cher
fn competitors(items: &[&MarketItem]) -> Vec<Competitor> {
    let mut best: HashMap<&str, f64> = HashMap::new();
    for item in items {
        best.entry(item.seller_login.as_str())
            .and_modify(|p| *p = p.min(item.price))
            .or_insert(item.price);
    }
    let mut list: Vec<Competitor> = best
        .into_iter()
        .map(|(login, price)| Competitor {
            login: login.to_string(),
            price,
        })
        .collect();
    list.sort_by(|a, b| a.price.total_cmp(&b.price).then_with(|| a.login.cmp(&b.login)));
    list.truncate(MAX_COMPETITORS);
    list
}

/// Analyse les articles récupérés. L'échantillon analysé est celui des articles
/// vendus, ou des articles disponibles quand aucun n'a été vendu.
pub fn analyze(product_name: &str, items: &[MarketItem], history: &[f64]) -> PriceAnalysis {
    let sold: Vec<&MarketItem> = items.iter().filter(|i| i.sold).collect();
    let available: Vec<&MarketItem> = items.iter().filter(|i| !i.sold).collect();
    let sample = if sold.is_empty() { &available } else { &sold };

    if sample.is_empty() {
        return PriceAnalysis {
            product_name: product_name.to_string(),
            metrics: PriceMetrics::default(),
            summary: MarketSummary::default(),
            kpis: MarketKpis::default(),
            trend: Trend::Stable,
            demand_level: DemandLevel::Low,
            competitors: Vec::new(),
            brand_distribution: BTreeMap::new(),
            condition_distribution: BTreeMap::new(),
            size_distribution: BTreeMap::new(),
        };
    }

    let prices: Vec<f64> = sample.iter().map(|i| i.price).collect();
    let metrics = price_metrics(&prices);
    let distinct_sellers = sample
        .iter()
        .map(|i| i.seller_login.as_str())
        .collect::<HashSet<_>>()
        .len();
    let trend_30d = trend_percentage(metrics.average, history);

    PriceAnalysis {
        product_name: product_name.to_string(),
        metrics,
        summary: MarketSummary {
            items_found: sample.len(),
            distinct_sellers,
            sold_count: sold.len(),
            available_count: available.len(),
        },
        kpis: MarketKpis {
            recommended_price: recommended_price(metrics.average),
            sell_through_rate: sell_through_rate(sold.len(), available.len()),
            competitiveness_score: competitiveness_score(&prices, distinct_sellers),
            trend_30d,
        },
        trend: Trend::from_percentage(trend_30d),
        demand_level: DemandLevel::from_volume(sample.len()),
        competitors: competitors(sample),
        brand_distribution: distribution(sample.iter().map(|i| i.brand.as_deref())),
        condition_distribution: distribution(sample.iter().map(|i| i.condition.as_deref())),
        size_distribution: distribution(sample.iter().map(|i| i.size.as_deref())),
    }
}

/// Jeu d'articles figé utilisé en mode test (aucun appel réseau)
pub fn fixture_items(search_text: &str) -> Vec<MarketItem> {
    let rows: [(f64, &str, &str, &str, &str, bool); 8] = [
        (25.0, "Nike", "M", "Très bon état", "marie_vend", true),
        (30.0, "Nike", "L", "Bon état", "lucas.shop", true),
        (28.0, "Nike", "M", "Neuf avec étiquette", "marie_vend", true),
        (35.0, "Nike", "S", "Très bon état", "dressing_julie", true),
        (22.0, "Adidas", "M", "Satisfaisant", "vintage_tom", true),
        (40.0, "Nike", "L", "Neuf sans étiquette", "sneakers_addict", true),
        (32.0, "Nike", "M", "Très bon état", "lucas.shop", false),
        (27.5, "Nike", "XL", "Bon état", "closet_emma", false),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (price, brand, size, condition, seller, sold))| MarketItem {
            id: 1_000 + i as i64,
            title: format!("{} #{}", search_text, i + 1),
            price: *price,
            brand: Some(brand.to_string()),
            size: Some(size.to_string()),
            condition: Some(condition.to_string()),
            seller_login: seller.to_string(),
            sold: *sold,
        })
        .collect()
}
