use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{header, Client as HttpClient, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::MarketDataProvider;
use crate::domain::market::{Brand, Catalog, MarketItem, MarketQuery};
use crate::infrastructure::error::{AppError, AppResult};
use crate::utils::Config;

/// Client HTTP du catalogue Vinted
pub struct VintedHttpClient {
    http_client: HttpClient,
    name: String,
    base_url: String,
    per_page: u32,
    max_pages: u32,
    page_delay: Duration,
}

impl VintedHttpClient {
    pub fn new(
        name: &str,
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
        per_page: u32,
        max_pages: u32,
        page_delay: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("client HTTP Vinted: {}", e)))?;

        Ok(Self {
            http_client,
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            per_page: per_page.max(1),
            max_pages: max_pages.max(1),
            page_delay,
        })
    }

    /// Construit le client à partir de la configuration pour l'URL donnée
    pub fn from_config(name: &str, base_url: &str, config: &Config) -> AppResult<Self> {
        Self::new(
            name,
            base_url,
            &config.vinted_user_agent,
            Duration::from_secs(config.vinted_request_timeout_seconds),
            config.vinted_per_page,
            config.vinted_max_pages,
            Duration::from_millis(config.vinted_page_delay_ms),
        )
    }

    fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.http_client
            .get(format!("{}{}", self.base_url, path))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::ACCEPT, "application/json")
    }

    async fn send_json(&self, request: RequestBuilder) -> AppResult<Value> {
        let response = request.send().await?;
        match response.status() {
            status if status.is_success() => Ok(response.json::<Value>().await?),
            StatusCode::UNAUTHORIZED => {
                Err(AppError::Unauthorized("token Vinted invalide ou expiré".to_string()))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!(provider = %self.name, %status, "❌ Réponse Vinted inattendue");
                Err(AppError::ExternalService(format!(
                    "Vinted a répondu {}: {}",
                    status,
                    body.chars().take(200).collect::<String>()
                )))
            }
        }
    }

    /// Délai entre deux pages, avec une gigue aléatoire du même ordre
    fn jittered_delay(&self) -> Duration {
        let base = self.page_delay.as_millis() as u64;
        if base == 0 {
            return Duration::ZERO;
        }
        let jitter = rand::thread_rng().gen_range(0..=base);
        Duration::from_millis(base + jitter)
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",")
}

/// Lit un prix exprimé en nombre, en chaîne, ou sous la forme `{"amount": ...}`
fn parse_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        Value::Object(map) => map.get("amount").and_then(parse_price),
        _ => None,
    };
    price.filter(|p| p.is_finite() && *p >= 0.0)
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Convertit un article brut; les articles sans prix numérique ou sans vendeur sont ignorés
pub(crate) fn parse_item(raw: &Value) -> Option<MarketItem> {
    let price = raw.get("price").and_then(parse_price)?;
    let seller_login = non_empty_str(raw.get("user").and_then(|u| u.get("login")))?;

    Some(MarketItem {
        id: raw.get("id").and_then(Value::as_i64).unwrap_or_default(),
        title: non_empty_str(raw.get("title")).unwrap_or_default(),
        price,
        brand: non_empty_str(raw.get("brand_title")),
        size: non_empty_str(raw.get("size_title")),
        condition: non_empty_str(raw.get("status")),
        seller_login,
        sold: raw.get("is_sold").and_then(Value::as_bool).unwrap_or(false),
    })
}

#[async_trait]
impl MarketDataProvider for VintedHttpClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search_items(&self, token: &str, query: &MarketQuery) -> AppResult<Vec<MarketItem>> {
        let mut items = Vec::new();
        let mut skipped = 0usize;

        for page in 1..=self.max_pages {
            if page > 1 {
                tokio::time::sleep(self.jittered_delay()).await;
            }

            let mut params: Vec<(&str, String)> = vec![
                ("search_text", query.search_text.clone()),
                ("order", "relevance".to_string()),
                ("per_page", self.per_page.to_string()),
                ("page", page.to_string()),
            ];
            if !query.brand_ids.is_empty() {
                params.push(("brand_ids", join_ids(&query.brand_ids)));
            }
            if !query.catalog_ids.is_empty() {
                params.push(("catalog_ids", join_ids(&query.catalog_ids)));
            }
            if !query.status_ids.is_empty() {
                params.push(("status_ids", join_ids(&query.status_ids)));
            }
            if query.sold_only {
                params.push(("is_for_sale", "0".to_string()));
            }

            debug!(provider = %self.name, page, "🔎 Requête catalogue Vinted");
            let body = self
                .send_json(self.get("/api/v2/catalog/items", token).query(&params))
                .await?;

            let raw_items = body
                .get("items")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            if raw_items.is_empty() {
                break;
            }

            for raw in &raw_items {
                match parse_item(raw) {
                    Some(mut item) => {
                        // Le catalogue filtré ne renvoie pas toujours `is_sold`
                        item.sold |= query.sold_only;
                        items.push(item);
                    }
                    None => skipped += 1,
                }
            }
        }

        info!(
            provider = %self.name,
            search = %query.search_text,
            found = items.len(),
            skipped,
            "📦 Articles Vinted récupérés"
        );
        Ok(items)
    }

    async fn list_brands(&self, token: &str, search: Option<&str>) -> AppResult<Vec<Brand>> {
        let mut request = self.get("/api/v2/brands", token).query(&[("per_page", "1000")]);
        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            request = request.query(&[("search_text", search.trim())]);
        }
        let body = self.send_json(request).await?;
        let brands = body
            .get("brands")
            .cloned()
            .map(serde_json::from_value::<Vec<Brand>>)
            .transpose()?
            .unwrap_or_default();
        Ok(brands)
    }

    async fn list_catalogs(&self, token: &str) -> AppResult<Vec<Catalog>> {
        let body = self.send_json(self.get("/api/v2/catalogs", token)).await?;
        let catalogs = body
            .get("catalogs")
            .cloned()
            .map(serde_json::from_value::<Vec<Catalog>>)
            .transpose()?
            .unwrap_or_default();
        Ok(catalogs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base: &str, max_pages: u32) -> VintedHttpClient {
        VintedHttpClient::new(
            "primary",
            base,
            "test-agent",
            Duration::from_secs(5),
            2,
            max_pages,
            Duration::ZERO,
        )
        .unwrap()
    }

    #[test]
    fn parse_item_accepts_price_shapes() {
        let nested = json!({"id": 1, "price": {"amount": "12.50"}, "user": {"login": "a"}});
        let plain = json!({"id": 2, "price": 8, "user": {"login": "b"}, "is_sold": true});
        assert_eq!(parse_item(&nested).unwrap().price, 12.5);
        let item = parse_item(&plain).unwrap();
        assert_eq!(item.price, 8.0);
        assert!(item.sold);
    }

    #[test]
    fn parse_item_skips_malformed() {
        assert!(parse_item(&json!({"price": "abc", "user": {"login": "a"}})).is_none());
        assert!(parse_item(&json!({"price": "10"})).is_none());
        assert!(parse_item(&json!({"price": "10", "user": {"login": "  "}})).is_none());
    }

    #[tokio::test]
    async fn search_walks_pages_until_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/catalog/items"))
            .and(query_param("page", "1"))
            .and(query_param("search_text", "nike air"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": 1, "title": "Nike Air", "price": {"amount": "30.0"}, "brand_title": "Nike",
                     "status": "Très bon état", "user": {"login": "s1"}, "is_sold": true},
                    {"id": 2, "title": "cassé", "price": null, "user": {"login": "s2"}}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/catalog/items"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        let query = MarketQuery { search_text: "nike air".into(), ..Default::default() };
        let items = client(&server.uri(), 5).search_items("tok", &query).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].brand.as_deref(), Some("Nike"));
        assert_eq!(items[0].seller_login, "s1");
    }

    #[tokio::test]
    async fn sold_search_sends_sale_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/catalog/items"))
            .and(query_param("is_for_sale", "0"))
            .and(query_param("order", "relevance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": 7, "title": "Air Max", "price": "45", "user": {"login": "s1"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = MarketQuery { search_text: "air max".into(), sold_only: true, ..Default::default() };
        let items = client(&server.uri(), 1).search_items("tok", &query).await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].sold);
    }

    #[tokio::test]
    async fn unauthorized_maps_to_app_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/catalog/items"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let query = MarketQuery { search_text: "x".into(), ..Default::default() };
        let err = client(&server.uri(), 1).search_items("bad", &query).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn server_error_is_external_service() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/catalogs"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client(&server.uri(), 1).list_catalogs("tok").await.unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)));
    }

    #[tokio::test]
    async fn brands_are_listed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/brands"))
            .and(query_param("search_text", "nik"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "brands": [{"id": 53, "title": "Nike", "slug": "nike"}]
            })))
            .mount(&server)
            .await;

        let brands = client(&server.uri(), 1).list_brands("tok", Some("nik")).await.unwrap();
        assert_eq!(brands, vec![Brand { id: 53, title: "Nike".into() }]);
    }
}
