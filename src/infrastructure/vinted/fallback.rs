use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::MarketDataProvider;
use crate::domain::market::{Brand, Catalog, MarketItem, MarketQuery};
use crate::infrastructure::error::AppResult;

/// Interroge le fournisseur primaire puis, en cas d'échec, le secondaire
pub struct FallbackProvider {
    primary: Arc<dyn MarketDataProvider>,
    secondary: Option<Arc<dyn MarketDataProvider>>,
}

impl FallbackProvider {
    pub fn new(
        primary: Arc<dyn MarketDataProvider>,
        secondary: Option<Arc<dyn MarketDataProvider>>,
    ) -> Self {
        Self { primary, secondary }
    }
}

/// Sans secondaire l'erreur du primaire remonte; si les deux échouent, celle du secondaire
macro_rules! with_fallback {
    ($self:ident, $op:literal, |$p:ident| $call:expr) => {{
        let $p = &$self.primary;
        match $call.await {
            Ok(value) => Ok(value),
            Err(primary_err) => match &$self.secondary {
                None => Err(primary_err),
                Some(secondary) => {
                    warn!(
                        operation = $op,
                        primary = %$self.primary.name(),
                        secondary = %secondary.name(),
                        error = %primary_err,
                        "⚠️ Fournisseur primaire en échec, bascule sur le secondaire"
                    );
                    let $p = secondary;
                    $call.await
                }
            },
        }
    }};
}

#[async_trait]
impl MarketDataProvider for FallbackProvider {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn search_items(&self, token: &str, query: &MarketQuery) -> AppResult<Vec<MarketItem>> {
        with_fallback!(self, "search_items", |p| p.search_items(token, query))
    }

    async fn list_brands(&self, token: &str, search: Option<&str>) -> AppResult<Vec<Brand>> {
        with_fallback!(self, "list_brands", |p| p.list_brands(token, search))
    }

    async fn list_catalogs(&self, token: &str) -> AppResult<Vec<Catalog>> {
        with_fallback!(self, "list_catalogs", |p| p.list_catalogs(token))
    }
}
