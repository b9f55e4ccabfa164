pub mod captcha_dataset;
pub mod database;
pub mod error;
pub mod pricing;
pub mod superbuy;
pub mod vinted;

pub use captcha_dataset::CaptchaDataset;
pub use database::Database;
pub use pricing::{DisabledAdvisor, GeminiClient, PricingAdvisor};
pub use superbuy::{ParcelSource, SuperbuyHttpClient};
pub use vinted::{FallbackProvider, MarketDataProvider, VintedHttpClient};
