// utils/config.rs
use crate::infrastructure::error::{AppError, AppResult};
use dotenv::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    // Environnement et serveur
    pub run_mode: String,
    pub server_host: String,
    pub server_port: u16,
    pub workers: usize,
    pub log_level: String,
    pub logging_format: String,
    pub frontend_url: String,

    // Base de données
    pub database_url: String,
    pub database_max_connections: u32,

    // Sécurité
    pub jwt_secret: String,
    pub jwt_access_token_expiry_hours: i64,
    pub secret_encryption_key: String,
    pub admin_username: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,

    // Vinted
    pub vinted_primary_base_url: String,
    pub vinted_fallback_base_url: Option<String>,
    pub vinted_user_agent: String,
    pub vinted_request_timeout_seconds: u64,
    pub vinted_per_page: u32,
    pub vinted_max_pages: u32,
    pub vinted_page_delay_ms: u64,

    // Superbuy
    pub superbuy_api_base_url: String,

    // Conseiller de prix (Gemini), désactivé sans clé
    pub gemini_api_key: Option<String>,
    pub gemini_api_base_url: String,
    pub gemini_model: String,

    // Captcha
    pub captcha_dataset_dir: String,

    // Maintenance
    pub cleanup_interval_hours: u64,
    pub history_retention_days: i64,
    pub captcha_attempt_retention_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            run_mode: "development".to_string(),
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            workers: 4,
            log_level: "info".to_string(),
            logging_format: "compact".to_string(),
            frontend_url: "http://localhost:3000".to_string(),

            database_url: "sqlite://data/logistix.db".to_string(),
            database_max_connections: 10,

            jwt_secret: "dev-only-secret-change-me-please-0123456789".to_string(),
            jwt_access_token_expiry_hours: 24,
            secret_encryption_key: "dev-only-encryption-key-change-me".to_string(),
            admin_username: None,
            admin_email: None,
            admin_password: None,

            vinted_primary_base_url: "https://www.vinted.fr".to_string(),
            vinted_fallback_base_url: None,
            vinted_user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36".to_string(),
            vinted_request_timeout_seconds: 30,
            vinted_per_page: 96,
            vinted_max_pages: 1,
            vinted_page_delay_ms: 1500,

            superbuy_api_base_url: "https://www.superbuy.com".to_string(),

            gemini_api_key: None,
            gemini_api_base_url: "https://generativelanguage.googleapis.com".to_string(),
            gemini_model: "gemini-2.0-flash".to_string(),

            captcha_dataset_dir: "data/captcha_dataset".to_string(),

            cleanup_interval_hours: 24,
            history_retention_days: 365,
            captcha_attempt_retention_days: 90,
        }
    }
}

impl Config {
    /// Charger la configuration depuis les variables d'environnement
    pub fn from_env() -> AppResult<Self> {
        // Charger le fichier .env si présent
        let _ = dotenv().ok();

        let defaults = Config::default();
        let run_mode = env::var("RUN_MODE").unwrap_or(defaults.run_mode);

        let config = Config {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var("SERVER_PORT", defaults.server_port)?,
            workers: parse_var("WORKERS", defaults.workers)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            logging_format: env::var("LOGGING_FORMAT").unwrap_or(defaults.logging_format),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),

            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            database_max_connections: parse_var(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,

            jwt_secret: required_in_production(&run_mode, "JWT_SECRET", defaults.jwt_secret)?,
            jwt_access_token_expiry_hours: parse_var(
                "JWT_ACCESS_TOKEN_EXPIRY_HOURS",
                defaults.jwt_access_token_expiry_hours,
            )?,
            secret_encryption_key: required_in_production(
                &run_mode,
                "SECRET_ENCRYPTION_KEY",
                defaults.secret_encryption_key,
            )?,
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),

            vinted_primary_base_url: env::var("VINTED_PRIMARY_BASE_URL")
                .unwrap_or(defaults.vinted_primary_base_url),
            vinted_fallback_base_url: env::var("VINTED_FALLBACK_BASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            vinted_user_agent: env::var("VINTED_USER_AGENT").unwrap_or(defaults.vinted_user_agent),
            vinted_request_timeout_seconds: parse_var(
                "VINTED_REQUEST_TIMEOUT_SECONDS",
                defaults.vinted_request_timeout_seconds,
            )?,
            vinted_per_page: parse_var("VINTED_PER_PAGE", defaults.vinted_per_page)?,
            vinted_max_pages: parse_var("VINTED_MAX_PAGES", defaults.vinted_max_pages)?,
            vinted_page_delay_ms: parse_var("VINTED_PAGE_DELAY_MS", defaults.vinted_page_delay_ms)?,

            superbuy_api_base_url: env::var("SUPERBUY_API_BASE_URL")
                .unwrap_or(defaults.superbuy_api_base_url),

            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            gemini_api_base_url: env::var("GEMINI_API_BASE_URL")
                .unwrap_or(defaults.gemini_api_base_url),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),

            captcha_dataset_dir: env::var("CAPTCHA_DATASET_DIR")
                .unwrap_or(defaults.captcha_dataset_dir),

            cleanup_interval_hours: parse_var(
                "CLEANUP_INTERVAL_HOURS",
                defaults.cleanup_interval_hours,
            )?,
            history_retention_days: parse_var(
                "HISTORY_RETENTION_DAYS",
                defaults.history_retention_days,
            )?,
            captcha_attempt_retention_days: parse_var(
                "CAPTCHA_ATTEMPT_RETENTION_DAYS",
                defaults.captcha_attempt_retention_days,
            )?,
            run_mode,
        };

        config.validate()?;
        Ok(config)
    }

    /// Valide les paramètres critiques
    pub fn validate(&self) -> AppResult<()> {
        if self.server_port == 0 {
            return Err(AppError::Configuration("SERVER_PORT invalide: 0".to_string()));
        }
        if self.vinted_per_page == 0 || self.vinted_max_pages == 0 {
            return Err(AppError::Configuration(
                "VINTED_PER_PAGE et VINTED_MAX_PAGES doivent être positifs".to_string(),
            ));
        }
        if self.secret_encryption_key.is_empty() {
            return Err(AppError::Configuration(
                "SECRET_ENCRYPTION_KEY ne peut pas être vide".to_string(),
            ));
        }
        if self.jwt_secret.len() < 32 {
            tracing::warn!("⚠️  JWT_SECRET trop court (< 32 caractères) - risque de sécurité");
        }
        Ok(())
    }

    /// Vérifier si on est en production
    pub fn is_production(&self) -> bool {
        self.run_mode == "production"
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("{} a une valeur invalide: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

fn required_in_production(run_mode: &str, name: &str, default: String) -> AppResult<String> {
    match env::var(name) {
        Ok(value) => Ok(value),
        Err(_) if run_mode == "production" => Err(AppError::Configuration(format!(
            "Variable d'environnement requise manquante: {}",
            name
        ))),
        Err(_) => Ok(default),
    }
}
