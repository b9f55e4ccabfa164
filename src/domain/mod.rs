//! # Domain Models Module
//!
//! Entités métier partagées par l'API, les services et les repositories.
//!
//! ## Structure
//! - `user.rs`: utilisateurs authentifiés
//! - `parcelle.rs`: colis suivis (poids, coût, transporteur)
//! - `produit.rs`: articles à revendre et leurs chiffres dérivés
//! - `market.rs`: analyses de marché Vinted et historique des prix
//! - `integration.rs`: jetons tiers chiffrés (Vinted, Superbuy)
//! - `captcha.rs`: tentatives de captcha et jeu de données d'entraînement
//!
//! ## Conventions
//! - Les identifiants utilisent `uuid::Uuid`, les dates `chrono::DateTime<Utc>`
//! - Les champs sensibles sont exclus de la sérialisation JSON
//! - Les DTO d'entrée sont validés avec `validator`

pub mod captcha;
pub mod integration;
pub mod market;
pub mod parcelle;
pub mod produit;
pub mod user;

pub use captcha::{CaptchaAttempt, TrainingSample};
pub use integration::{IntegrationCredential, Provider};
pub use market::{HistoricalPrice, MarketAnalysis, PriceAnalysis};
pub use parcelle::{Parcelle, ParcelleStatut};
pub use produit::Produit;
pub use user::User;
