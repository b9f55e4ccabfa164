// src/lib.rs
// Modules principaux
pub mod api;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod utils;
pub mod workers;

use std::sync::Arc;
use std::time::Duration;

use crate::core::{
    CaptchaService, CredentialService, MarketService, ParcelleService, ProduitService,
    StatisticsService, SuperbuyService, UserService,
};
use crate::infrastructure::error::AppResult;
use crate::infrastructure::pricing::advisor_from_config;
use crate::infrastructure::{
    CaptchaDataset, Database, FallbackProvider, MarketDataProvider, ParcelSource, PricingAdvisor,
    SuperbuyHttpClient, VintedHttpClient,
};
use crate::utils::Config;

// Version de l'application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "LogistiX";

/// État partagé par tous les handlers (via `web::Data`)
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub market_provider: Arc<dyn MarketDataProvider>,
    pub parcel_source: Arc<dyn ParcelSource>,
    pub pricing_advisor: Arc<dyn PricingAdvisor>,
    pub dataset: CaptchaDataset,
}

impl AppState {
    /// Construit l'état et les clients HTTP externes à partir de la configuration
    pub fn from_config(db: Database, config: Config) -> AppResult<Self> {
        let primary: Arc<dyn MarketDataProvider> = Arc::new(VintedHttpClient::from_config(
            "vinted-primary",
            &config.vinted_primary_base_url,
            &config,
        )?);
        let secondary = match &config.vinted_fallback_base_url {
            Some(url) => Some(Arc::new(VintedHttpClient::from_config("vinted-fallback", url, &config)?)
                as Arc<dyn MarketDataProvider>),
            None => None,
        };

        let parcel_source = Arc::new(SuperbuyHttpClient::new(
            &config.superbuy_api_base_url,
            Duration::from_secs(config.vinted_request_timeout_seconds),
        )?);

        let pricing_advisor: Arc<dyn PricingAdvisor> = Arc::from(advisor_from_config(&config)?);

        Ok(Self {
            db,
            dataset: CaptchaDataset::new(&config.captcha_dataset_dir),
            market_provider: Arc::new(FallbackProvider::new(primary, secondary)),
            parcel_source,
            pricing_advisor,
            config: Arc::new(config),
        })
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.db.clone(), self.config.clone())
    }

    pub fn parcelles(&self) -> ParcelleService {
        ParcelleService::new(self.db.clone())
    }

    pub fn produits(&self) -> ProduitService {
        ProduitService::new(self.db.clone())
    }

    pub fn statistics(&self) -> StatisticsService {
        StatisticsService::new(self.db.clone())
    }

    pub fn market(&self) -> MarketService {
        MarketService::new(
            self.db.clone(),
            self.config.clone(),
            self.market_provider.clone(),
            self.pricing_advisor.clone(),
        )
    }

    pub fn credentials(&self) -> CredentialService {
        CredentialService::new(self.db.clone(), self.config.clone())
    }

    pub fn superbuy(&self) -> SuperbuyService {
        SuperbuyService::new(self.db.clone(), self.config.clone(), self.parcel_source.clone())
    }

    pub fn captcha(&self) -> CaptchaService {
        CaptchaService::new(self.db.clone(), self.dataset.clone())
    }
}
