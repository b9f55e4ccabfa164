use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::market::{HistoricalPrice, MarketAnalysis},
    infrastructure::error::AppResult,
};

const ANALYSIS_COLUMNS: &str = "id, user_id, product_name, current_price, min_price, max_price, \
     avg_price, median_price, sales_volume, competitor_count, trend, trend_percentage, \
     recommended_price, demand_level, competitors, brand_distribution, condition_distribution, \
     last_updated, created_at, updated_at";

/// Repository des analyses de marché et de l'historique des prix
#[derive(Clone)]
pub struct MarketAnalysisRepository {
    pool: SqlitePool,
}

impl MarketAnalysisRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Crée ou remplace l'analyse du couple (utilisateur, produit) et renvoie son id
    pub async fn upsert(&self, a: &MarketAnalysis) -> AppResult<Uuid> {
        let mut conn = self.pool.acquire().await?;
        upsert_analysis(&mut conn, a).await
    }

    pub async fn insert_history(&self, h: &HistoricalPrice) -> AppResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_price(&mut conn, h).await
    }

    /// Enregistre l'analyse et son relevé de prix dans une même transaction
    pub async fn save_with_history(&self, a: &MarketAnalysis, h: &HistoricalPrice) -> AppResult<Uuid> {
        let mut tx = self.pool.begin().await?;
        let id = upsert_analysis(&mut tx, a).await?;
        insert_price(&mut tx, h).await?;
        tx.commit().await?;
        Ok(id)
    }

    /// Prix moyens des `limit` derniers relevés, du plus récent au plus ancien
    pub async fn recent_averages(&self, product_name: &str, limit: i64) -> AppResult<Vec<f64>> {
        let prices: Vec<f64> = sqlx::query_scalar(
            "SELECT avg_price FROM historical_prices WHERE product_name = ? \
             ORDER BY date DESC LIMIT ?",
        )
        .bind(product_name)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(prices)
    }

    /// Historique complet d'un produit, par date croissante
    pub async fn history(&self, product_name: &str) -> AppResult<Vec<HistoricalPrice>> {
        let rows = sqlx::query_as::<_, HistoricalPrice>(
            "SELECT id, product_name, date, avg_price, sales_volume FROM historical_prices \
             WHERE product_name = ? ORDER BY date ASC",
        )
        .bind(product_name)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<MarketAnalysis>> {
        let rows = sqlx::query_as::<_, MarketAnalysis>(&format!(
            "SELECT {} FROM market_analyses WHERE user_id = ? ORDER BY updated_at DESC",
            ANALYSIS_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<MarketAnalysis>> {
        let row = sqlx::query_as::<_, MarketAnalysis>(&format!(
            "SELECT {} FROM market_analyses WHERE id = ? AND user_id = ?",
            ANALYSIS_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM market_analyses WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Purge les relevés plus anciens que `cutoff`; renvoie le nombre de lignes supprimées
    pub async fn delete_history_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM historical_prices WHERE date < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

async fn upsert_analysis(conn: &mut SqliteConnection, a: &MarketAnalysis) -> AppResult<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO market_analyses (
            id, user_id, product_name, current_price, min_price, max_price,
            avg_price, median_price, sales_volume, competitor_count, trend,
            trend_percentage, recommended_price, demand_level, competitors,
            brand_distribution, condition_distribution, last_updated, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (user_id, product_name) DO UPDATE SET
            current_price = excluded.current_price,
            min_price = excluded.min_price,
            max_price = excluded.max_price,
            avg_price = excluded.avg_price,
            median_price = excluded.median_price,
            sales_volume = excluded.sales_volume,
            competitor_count = excluded.competitor_count,
            trend = excluded.trend,
            trend_percentage = excluded.trend_percentage,
            recommended_price = excluded.recommended_price,
            demand_level = excluded.demand_level,
            competitors = excluded.competitors,
            brand_distribution = excluded.brand_distribution,
            condition_distribution = excluded.condition_distribution,
            last_updated = excluded.last_updated,
            updated_at = excluded.updated_at
        RETURNING id
        "#,
    )
    .bind(a.id)
    .bind(a.user_id)
    .bind(&a.product_name)
    .bind(a.current_price)
    .bind(a.min_price)
    .bind(a.max_price)
    .bind(a.avg_price)
    .bind(a.median_price)
    .bind(a.sales_volume)
    .bind(a.competitor_count)
    .bind(a.trend)
    .bind(a.trend_percentage)
    .bind(a.recommended_price)
    .bind(a.demand_level)
    .bind(&a.competitors)
    .bind(&a.brand_distribution)
    .bind(&a.condition_distribution)
    .bind(a.last_updated)
    .bind(a.created_at)
    .bind(a.updated_at)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

async fn insert_price(conn: &mut SqliteConnection, h: &HistoricalPrice) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO historical_prices (id, product_name, date, avg_price, sales_volume) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(h.id)
    .bind(&h.product_name)
    .bind(h.date)
    .bind(h.avg_price)
    .bind(h.sales_volume)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
