// core/mod.rs
pub mod captcha_service;
pub mod credential_service;
pub mod market_analysis;
pub mod market_service;
pub mod parcelle_service;
pub mod produit_service;
pub mod statistics_service;
pub mod superbuy_service;
pub mod user_service;

pub use captcha_service::CaptchaService;
pub use credential_service::CredentialService;
pub use market_service::MarketService;
pub use parcelle_service::ParcelleService;
pub use produit_service::ProduitService;
pub use statistics_service::StatisticsService;
pub use superbuy_service::SuperbuyService;
pub use user_service::UserService;
