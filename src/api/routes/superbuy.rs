use actix_web::{post, web, HttpResponse};

use crate::api::routes::AuthenticatedUser;
use crate::infrastructure::error::AppResult;
use crate::AppState;

/// Importe les colis Superbuy de l'utilisateur en parcelles
#[post("/superbuy/sync")]
pub async fn sync(user: AuthenticatedUser, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let report = state.superbuy().sync(user.id).await?;
    Ok(HttpResponse::Ok().json(report))
}
