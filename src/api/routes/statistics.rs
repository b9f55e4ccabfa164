use actix_web::{get, web, HttpResponse};

use crate::api::routes::AuthenticatedUser;
use crate::infrastructure::error::AppResult;
use crate::AppState;

/// Tableau de bord agrégé de l'utilisateur
#[get("/statistiques/dashboard")]
pub async fn dashboard(user: AuthenticatedUser, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let dashboard = state.statistics().dashboard(user.id).await?;
    Ok(HttpResponse::Ok().json(dashboard))
}
