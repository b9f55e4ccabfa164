pub mod routes;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};

use crate::infrastructure::error::AppError;
use crate::AppState;

/// Configure toutes les routes de l'API
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error));

    cfg.service(
        web::scope("/api/v1")
            // Authentification
            .service(routes::auth::register)
            .service(routes::auth::login)
            .service(routes::auth::me)
            // Parcelles
            .service(routes::parcelles::list_parcelles)
            .service(routes::parcelles::create_parcelle)
            .service(routes::parcelles::get_parcelle)
            .service(routes::parcelles::update_parcelle)
            .service(routes::parcelles::delete_parcelle)
            // Produits
            .service(routes::produits::list_produits)
            .service(routes::produits::create_produit)
            .service(routes::produits::get_produit)
            .service(routes::produits::update_produit)
            .service(routes::produits::delete_produit)
            .service(routes::produits::mark_sold)
            .service(routes::produits::mark_unsold)
            // Statistiques
            .service(routes::statistics::dashboard)
            // Analyse de marché
            .service(routes::market::analyze)
            .service(routes::market::list_analyses)
            .service(routes::market::get_analysis)
            .service(routes::market::delete_analysis)
            .service(routes::market::list_brands)
            .service(routes::market::list_catalogs)
            // Intégrations externes
            .service(routes::integrations::list_integrations)
            .service(routes::integrations::store_integration)
            .service(routes::integrations::delete_integration)
            .service(routes::superbuy::sync)
            // Captcha
            .service(routes::captcha::attempt_stats)
            .service(routes::captcha::record_attempt)
            .service(routes::captcha::list_attempts)
            .service(routes::captcha::training_stats)
            .service(routes::captcha::add_training_sample),
    );

    // Endpoint de santé
    cfg.service(web::resource("/health").route(web::get().to(health_check)));
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("corps JSON invalide: {}", err)).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("paramètres de requête invalides: {}", err)).into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("paramètre de chemin invalide: {}", err)).into()
}

/// Endpoint de santé pour monitoring
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": crate::VERSION,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": state.config.run_mode,
    }))
}
