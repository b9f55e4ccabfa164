use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpServer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logistix_backend::core::UserService;
use logistix_backend::infrastructure::error::AppError;
use logistix_backend::infrastructure::Database;
use logistix_backend::utils::Config;
use logistix_backend::workers::{CleanupConfig, CleanupWorker};
use logistix_backend::{api, AppState, NAME, VERSION};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Chargement de la configuration
    let config = Config::from_env().map_err(startup_error)?;

    // Initialisation du logging
    setup_tracing(&config);
    info!("🚀 Démarrage de {} Backend v{}", NAME, VERSION);
    info!("🔧 Mode: {}", config.run_mode);

    // Base de données et migrations
    let db = Database::new(&config.database_url, config.database_max_connections)
        .await
        .map_err(startup_error)?;
    db.run_migrations().await.map_err(startup_error)?;
    info!("✅ Base de données prête");

    // Création de l'état de l'application
    let state = AppState::from_config(db.clone(), config.clone()).map_err(startup_error)?;

    if let Some(admin) = UserService::new(db.clone(), state.config.clone())
        .ensure_admin()
        .await
        .map_err(startup_error)?
    {
        info!("🛡️ Compte administrateur initial: {}", admin.username);
    }

    // Démarrage des workers background
    CleanupWorker::new(CleanupConfig::from_config(&config), db).spawn();

    let app_state = web::Data::new(state);
    let frontend_url = config.frontend_url.clone();

    // Configuration du serveur Actix-Web
    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(app_state.clone())
            .configure(api::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.workers)
    .shutdown_timeout(10);

    info!("✅ Backend démarré avec succès!");
    info!("🔗 API disponible sur http://{}:{}/api/v1", config.server_host, config.server_port);

    server.run().await
}

fn startup_error(e: AppError) -> std::io::Error {
    error!("❌ Échec du démarrage: {}", e);
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

/// Configure le tracing pour le logging structuré
fn setup_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        if config.logging_format == "json" {
            Box::new(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(true),
            ) as Box<dyn tracing_subscriber::Layer<_> + Send + Sync>
        } else {
            Box::new(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_line_number(true)
                    .with_file(true),
            ) as Box<dyn tracing_subscriber::Layer<_> + Send + Sync>
        },
    );

    subscriber.init();
}
