use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::domain::market::{AiSuggestion, MarketItem};
use crate::infrastructure::error::{AppError, AppResult};
use crate::utils::Config;

/// Nombre d'articles vendus transmis comme contexte au modèle
const CONTEXT_ITEMS: usize = 5;

/// Port vers un conseiller de prix (modèle génératif)
#[async_trait]
pub trait PricingAdvisor: Send + Sync {
    /// `Ok(None)` quand le conseiller est désactivé
    async fn suggest(&self, product_name: &str, items: &[MarketItem]) -> AppResult<Option<AiSuggestion>>;
}

/// Conseiller utilisé sans clé d'API
pub struct DisabledAdvisor;

#[async_trait]
impl PricingAdvisor for DisabledAdvisor {
    async fn suggest(&self, _: &str, _: &[MarketItem]) -> AppResult<Option<AiSuggestion>> {
        Ok(None)
    }
}

/// Client de l'API Gemini `generateContent`
pub struct GeminiClient {
    http_client: HttpClient,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, api_key: &str, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("client HTTP Gemini: {}", e)))?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

/// Gemini si une clé est configurée, sinon un conseiller inactif
pub fn advisor_from_config(config: &Config) -> AppResult<Box<dyn PricingAdvisor>> {
    match config.gemini_api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => Ok(Box::new(GeminiClient::new(
            &config.gemini_api_base_url,
            &config.gemini_model,
            key,
            Duration::from_secs(config.vinted_request_timeout_seconds),
        )?)),
        None => Ok(Box::new(DisabledAdvisor)),
    }
}

fn build_prompt(product_name: &str, items: &[MarketItem]) -> String {
    let mut context = String::from("Exemples d'articles vendus:\n");
    for item in items.iter().take(CONTEXT_ITEMS) {
        context.push_str(&format!(
            "- Titre: {}, État: {}, Prix: {:.2}€\n",
            item.title,
            item.condition.as_deref().unwrap_or("non spécifié"),
            item.price
        ));
    }
    format!(
        "En tant qu'expert de la revente sur Vinted, analyse les données suivantes.\n\
         {}\n\
         Article à évaluer: {}\n\
         Tâche: 1. Détermine un prix de vente. 2. Rédige une description de vente optimisée avec hashtags.\n\
         Réponds uniquement en JSON avec les clés \"prix_suggere\" (nombre) et \"description_suggeree\" (chaîne).",
        context, product_name
    )
}

/// Extrait la suggestion du texte renvoyé, éventuellement entouré d'un bloc ```json
pub(crate) fn parse_suggestion(text: &str) -> AppResult<AiSuggestion> {
    let cleaned = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let suggestion: AiSuggestion = serde_json::from_str(cleaned)?;
    if !suggestion.prix_suggere.is_finite() || suggestion.prix_suggere < 0.0 {
        return Err(AppError::ExternalService("prix suggéré invalide".to_string()));
    }
    Ok(suggestion)
}

#[async_trait]
impl PricingAdvisor for GeminiClient {
    async fn suggest(&self, product_name: &str, items: &[MarketItem]) -> AppResult<Option<AiSuggestion>> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let payload = json!({
            "contents": [{"parts": [{"text": build_prompt(product_name, items)}]}]
        });

        debug!(model = %self.model, context = items.len().min(CONTEXT_ITEMS), "🤖 Requête Gemini");
        let response = self
            .http_client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AppError::Unauthorized("clé Gemini refusée".to_string()))
            }
            status => {
                warn!(%status, "❌ Réponse Gemini inattendue");
                return Err(AppError::ExternalService(format!("Gemini a répondu {}", status)));
            }
        }

        let body: Value = response.json().await?;
        let text = body
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::ExternalService("réponse Gemini sans texte".to_string()))?;

        parse_suggestion(text).map(Some)
    }
}
