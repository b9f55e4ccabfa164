pub mod captcha;
pub mod credentials;
pub mod market_analyses;
pub mod parcelles;
pub mod produits;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::infrastructure::error::{AppError, AppResult};

pub use captcha::CaptchaAttemptRepository;
pub use credentials::CredentialRepository;
pub use market_analyses::MarketAnalysisRepository;
pub use parcelles::ParcelleRepository;
pub use produits::ProduitRepository;
pub use users::UserRepository;

/// Gestion de la connexion à la base de données
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Ouvre (et crée si besoin) la base SQLite
    pub async fn new(database_url: &str, max_connections: u32) -> AppResult<Self> {
        info!("🔌 Connexion à la base de données SQLite...");

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::Configuration(format!("DATABASE_URL invalide: {}", e)))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let filename = options.clone().get_filename();
        if let Some(parent) = filename.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        info!("✅ Connexion établie avec succès");
        Ok(Self { pool })
    }

    /// Base en mémoire, migrations appliquées (utilisée par les tests)
    pub async fn in_memory() -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::Configuration(e.to_string()))?
            .foreign_keys(true);

        // Une seule connexion, jamais recyclée: chaque connexion aurait sa propre base
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Applique les migrations du dossier `migrations/`
    pub async fn run_migrations(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Infrastructure(format!("Échec des migrations: {}", e)))?;
        info!("📦 Migrations appliquées");
        Ok(())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn parcelles(&self) -> ParcelleRepository {
        ParcelleRepository::new(self.pool.clone())
    }

    pub fn produits(&self) -> ProduitRepository {
        ProduitRepository::new(self.pool.clone())
    }

    pub fn market_analyses(&self) -> MarketAnalysisRepository {
        MarketAnalysisRepository::new(self.pool.clone())
    }

    pub fn credentials(&self) -> CredentialRepository {
        CredentialRepository::new(self.pool.clone())
    }

    pub fn captcha_attempts(&self) -> CaptchaAttemptRepository {
        CaptchaAttemptRepository::new(self.pool.clone())
    }
}
