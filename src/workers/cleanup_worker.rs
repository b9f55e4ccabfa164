use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::infrastructure::database::Database;
use crate::infrastructure::error::AppResult;
use crate::utils::Config;

/// Configuration du worker de nettoyage
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// Rétention de l'historique des prix (jours)
    pub history_retention_days: i64,
    /// Rétention des tentatives de captcha (jours)
    pub captcha_attempt_retention_days: i64,
    /// Intervalle entre les cycles de nettoyage
    pub interval: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            history_retention_days: 365,
            captcha_attempt_retention_days: 90,
            interval: Duration::from_secs(24 * 3600),
        }
    }
}

impl CleanupConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            history_retention_days: config.history_retention_days,
            captcha_attempt_retention_days: config.captcha_attempt_retention_days,
            interval: Duration::from_secs(config.cleanup_interval_hours.max(1) * 3600),
        }
    }
}

/// Bilan d'un cycle de nettoyage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub historical_prices: u64,
    pub captcha_attempts: u64,
}

/// Worker de nettoyage background
pub struct CleanupWorker {
    config: CleanupConfig,
    db: Database,
}

impl CleanupWorker {
    pub fn new(config: CleanupConfig, db: Database) -> Self {
        Self { config, db }
    }

    /// Lance le worker sur le runtime tokio courant
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.start().await })
    }

    /// Boucle infinie; une erreur de cycle est journalisée sans arrêter le worker
    pub async fn start(self) {
        info!("🔧 Worker de nettoyage démarré avec config: {:?}", self.config);
        let mut ticker = tokio::time::interval(self.config.interval);

        loop {
            ticker.tick().await;
            match self.run_cleanup_cycle().await {
                Ok(report) => info!(
                    historical_prices = report.historical_prices,
                    captcha_attempts = report.captcha_attempts,
                    "✅ Cycle de nettoyage terminé"
                ),
                Err(e) => error!("❌ Erreur lors du cycle de nettoyage: {}", e),
            }
        }
    }

    pub async fn run_cleanup_cycle(&self) -> AppResult<CleanupReport> {
        info!("🔄 Démarrage du cycle de nettoyage...");
        let now = Utc::now();

        let history_cutoff = now - chrono::Duration::days(self.config.history_retention_days);
        let historical_prices = self
            .db
            .market_analyses()
            .delete_history_before(history_cutoff)
            .await?;

        let captcha_cutoff = now - chrono::Duration::days(self.config.captcha_attempt_retention_days);
        let captcha_attempts = self.db.captcha_attempts().delete_before(captcha_cutoff).await?;

        Ok(CleanupReport {
            historical_prices,
            captcha_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::domain::captcha::CaptchaAttempt;
    use crate::domain::market::HistoricalPrice;
    use crate::infrastructure::database::test_support::seed_user;

    fn attempt(user_id: Uuid, age_days: i64) -> CaptchaAttempt {
        CaptchaAttempt {
            id: Uuid::new_v4(),
            user_id,
            image_hash: "abc".into(),
            detected_x: 10.0,
            actual_x: None,
            success: false,
            confidence: 0.3,
            provider: "test".into(),
            created_at: Utc::now() - chrono::Duration::days(age_days),
        }
    }

    #[tokio::test]
    async fn cycle_purges_only_expired_rows() {
        let db = Database::in_memory().await.unwrap();
        let alice = seed_user(&db, "alice").await;

        let mut old = HistoricalPrice::new("jean levis", 20.0, 3);
        old.date = Utc::now() - chrono::Duration::days(400);
        db.market_analyses().insert_history(&old).await.unwrap();
        db.market_analyses()
            .insert_history(&HistoricalPrice::new("jean levis", 22.0, 4))
            .await
            .unwrap();

        db.captcha_attempts().insert(&attempt(alice.id, 120)).await.unwrap();
        db.captcha_attempts().insert(&attempt(alice.id, 1)).await.unwrap();

        let worker = CleanupWorker::new(CleanupConfig::default(), db.clone());
        let report = worker.run_cleanup_cycle().await.unwrap();
        assert_eq!(
            report,
            CleanupReport {
                historical_prices: 1,
                captcha_attempts: 1
            }
        );

        assert_eq!(db.market_analyses().history("jean levis").await.unwrap().len(), 1);
        assert_eq!(db.captcha_attempts().list(alice.id, 10).await.unwrap().len(), 1);

        // Un second passage ne trouve plus rien à supprimer
        assert_eq!(worker.run_cleanup_cycle().await.unwrap(), CleanupReport::default());
    }

    #[test]
    fn interval_follows_configuration() {
        let config = Config {
            cleanup_interval_hours: 6,
            history_retention_days: 30,
            ..Config::default()
        };
        let cleanup = CleanupConfig::from_config(&config);
        assert_eq!(cleanup.interval, Duration::from_secs(6 * 3600));
        assert_eq!(cleanup.history_retention_days, 30);
    }
}
