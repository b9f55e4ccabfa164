// core/market_service.rs
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::core::credential_service::CredentialService;
use crate::core::market_analysis::{analyze, fixture_items, normalize_search_text};
use crate::domain::integration::Provider;
use crate::domain::market::{
    AiSuggestion, AnalyzeRequest, AnalyzeResponse, Brand, Catalog, HistoricalPrice,
    MarketAnalysis, MarketAnalysisDetail, MarketItem, MarketQuery, PriceAnalysis,
};
use crate::infrastructure::database::Database;
use crate::infrastructure::error::{AppError, AppResult};
use crate::infrastructure::pricing::PricingAdvisor;
use crate::infrastructure::vinted::MarketDataProvider;
use crate::utils::Config;

/// Nombre de relevés historiques considérés pour la tendance
const TREND_HISTORY_DEPTH: i64 = 30;

pub struct MarketService {
    db: Database,
    config: Arc<Config>,
    provider: Arc<dyn MarketDataProvider>,
    advisor: Arc<dyn PricingAdvisor>,
}

impl MarketService {
    pub fn new(
        db: Database,
        config: Arc<Config>,
        provider: Arc<dyn MarketDataProvider>,
        advisor: Arc<dyn PricingAdvisor>,
    ) -> Self {
        Self {
            db,
            config,
            provider,
            advisor,
        }
    }

    /// Jeton Vinted de la requête, sinon celui enregistré par l'utilisateur
    async fn resolve_token(&self, user_id: Uuid, explicit: Option<&str>) -> AppResult<String> {
        if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
            return Ok(token.to_string());
        }
        CredentialService::new(self.db.clone(), self.config.clone())
            .reveal(user_id, Provider::Vinted)
            .await?
            .ok_or_else(|| AppError::Unauthorized("aucun token Vinted configuré".to_string()))
    }

    pub async fn analyze(&self, user_id: Uuid, request: AnalyzeRequest) -> AppResult<AnalyzeResponse> {
        request.validate()?;
        let product_name = request.search_text.trim().to_string();
        let query = MarketQuery {
            search_text: normalize_search_text(&product_name),
            brand_ids: request.brand_ids.clone(),
            catalog_ids: request.catalog_ids.clone(),
            status_ids: request.status_ids.clone(),
            sold_only: true,
        };

        let items = if request.test_mode {
            info!(user_id = %user_id, search = %query.search_text, "🧪 Analyse en mode test");
            fixture_items(&query.search_text)
        } else {
            let token = self.resolve_token(user_id, request.vinted_token.as_deref()).await?;
            self.search(&token, query).await?
        };

        let history = match self
            .db
            .market_analyses()
            .recent_averages(&product_name, TREND_HISTORY_DEPTH)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                warn!(error = %e, "⚠️ Historique des prix indisponible");
                Vec::new()
            }
        };

        let analysis = analyze(&product_name, &items, &history);
        let saved_id = match self.persist(user_id, &analysis).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "⚠️ Analyse non sauvegardée");
                None
            }
        };

        let ai_suggestion = self.advise(&product_name, &items).await;

        info!(
            user_id = %user_id,
            product = %product_name,
            items = analysis.summary.items_found,
            average = analysis.metrics.average,
            ai = ai_suggestion.is_some(),
            "📈 Analyse de marché terminée"
        );
        Ok(AnalyzeResponse {
            analysis,
            saved_id,
            ai_suggestion,
        })
    }

    /// Articles vendus en priorité; les annonces en cours si aucune vente n'est trouvée
    async fn search(&self, token: &str, mut query: MarketQuery) -> AppResult<Vec<MarketItem>> {
        let sold = self.provider.search_items(token, &query).await?;
        if !sold.is_empty() {
            return Ok(sold);
        }
        info!(search = %query.search_text, "🔁 Aucune vente trouvée, recherche des annonces en cours");
        query.sold_only = false;
        self.provider.search_items(token, &query).await
    }

    /// Suggestion du conseiller IA; une erreur n'interrompt pas l'analyse
    async fn advise(&self, product_name: &str, items: &[MarketItem]) -> Option<AiSuggestion> {
        let sold: Vec<MarketItem> = items.iter().filter(|i| i.sold).cloned().collect();
        let context: &[MarketItem] = if sold.is_empty() { items } else { &sold };
        match self.advisor.suggest(product_name, context).await {
            Ok(suggestion) => suggestion,
            Err(e) => {
                warn!(product = %product_name, error = %e, "⚠️ Suggestion IA indisponible");
                None
            }
        }
    }

    async fn persist(&self, user_id: Uuid, analysis: &PriceAnalysis) -> AppResult<Uuid> {
        self.db
            .market_analyses()
            .save_with_history(
                &MarketAnalysis::from_analysis(user_id, analysis),
                &HistoricalPrice::new(
                    &analysis.product_name,
                    analysis.metrics.average,
                    analysis.summary.sold_count as i64,
                ),
            )
            .await
    }

    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<MarketAnalysis>> {
        self.db.market_analyses().list(user_id).await
    }

    /// Analyse avec l'évolution de son prix moyen (ordre chronologique)
    pub async fn get(&self, user_id: Uuid, id: Uuid) -> AppResult<MarketAnalysisDetail> {
        let repo = self.db.market_analyses();
        let analysis = repo
            .find(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Analyse de marché".to_string()))?;
        let price_evolution = repo.history(&analysis.product_name).await?;
        Ok(MarketAnalysisDetail {
            analysis,
            price_evolution,
        })
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        if !self.db.market_analyses().delete(user_id, id).await? {
            return Err(AppError::NotFound("Analyse de marché".to_string()));
        }
        info!(user_id = %user_id, analysis_id = %id, "🗑️ Analyse supprimée");
        Ok(())
    }

    pub async fn brands(&self, user_id: Uuid, search: Option<&str>) -> AppResult<Vec<Brand>> {
        let token = self.resolve_token(user_id, None).await?;
        self.provider.list_brands(&token, search).await
    }

    pub async fn catalogs(&self, user_id: Uuid) -> AppResult<Vec<Catalog>> {
        let token = self.resolve_token(user_id, None).await?;
        self.provider.list_catalogs(&token).await
    }
}
