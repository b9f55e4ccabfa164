use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::infrastructure::error::{AppError, AppResult};

/// Colis tel que renvoyé par Superbuy
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuperbuyParcel {
    pub package_id: String,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    /// Poids en grammes
    #[serde(default)]
    pub weight: f64,
    /// Frais d'expédition en euros
    #[serde(default)]
    pub shipping_fee: f64,
    #[serde(default)]
    pub status: Option<String>,
}

/// Port vers une source de colis externes
#[async_trait]
pub trait ParcelSource: Send + Sync {
    async fn fetch_parcels(&self, token: &str) -> AppResult<Vec<SuperbuyParcel>>;
}

pub struct SuperbuyHttpClient {
    http_client: HttpClient,
    base_url: String,
}

impl SuperbuyHttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("client HTTP Superbuy: {}", e)))?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ParcelSource for SuperbuyHttpClient {
    async fn fetch_parcels(&self, token: &str) -> AppResult<Vec<SuperbuyParcel>> {
        let response = self
            .http_client
            .get(format!("{}/api/parcels", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AppError::Unauthorized("token Superbuy invalide ou expiré".to_string()))
            }
            status => {
                warn!(%status, "❌ Réponse Superbuy inattendue");
                return Err(AppError::ExternalService(format!("Superbuy a répondu {}", status)));
            }
        }

        // Accepte une liste brute ou une enveloppe {"data": [...]}
        let body: Value = response.json().await?;
        let list = match body {
            Value::Array(_) => body,
            Value::Object(mut map) => map.remove("data").unwrap_or(Value::Array(Vec::new())),
            _ => Value::Array(Vec::new()),
        };
        let parcels: Vec<SuperbuyParcel> = serde_json::from_value(list)?;

        info!(count = parcels.len(), "📦 Colis Superbuy récupérés");
        Ok(parcels)
    }
}
