//! Accès aux données de marché Vinted
//!
//! - `client.rs`: client HTTP du catalogue Vinted
//! - `fallback.rs`: bascule primaire / secondaire entre deux fournisseurs

pub mod client;
pub mod fallback;

use async_trait::async_trait;

use crate::domain::market::{Brand, Catalog, MarketItem, MarketQuery};
use crate::infrastructure::error::AppResult;

pub use client::VintedHttpClient;
pub use fallback::FallbackProvider;

/// Port vers une source de données de marché
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Nom court utilisé dans les logs
    fn name(&self) -> &str;

    async fn search_items(&self, token: &str, query: &MarketQuery) -> AppResult<Vec<MarketItem>>;

    async fn list_brands(&self, token: &str, search: Option<&str>) -> AppResult<Vec<Brand>>;

    async fn list_catalogs(&self, token: &str) -> AppResult<Vec<Catalog>>;
}
