//! # Workers Module
//!
//! Tâches de fond lancées au démarrage du serveur:
//! - `cleanup_worker.rs`: purge périodique de l'historique des prix et des
//!   anciennes tentatives de captcha

pub mod cleanup_worker;

pub use cleanup_worker::{CleanupConfig, CleanupReport, CleanupWorker};
