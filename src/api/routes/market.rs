use actix_web::{delete, get, post, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::routes::AuthenticatedUser;
use crate::domain::market::AnalyzeRequest;
use crate::infrastructure::error::AppResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BrandQuery {
    pub q: Option<String>,
}

/// Lance une analyse de prix sur Vinted (ou sur le jeu de test)
#[post("/market/analyze")]
pub async fn analyze(
    user: AuthenticatedUser,
    request: web::Json<AnalyzeRequest>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let response = state.market().analyze(user.id, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/market/analyses")]
pub async fn list_analyses(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let analyses = state.market().list(user.id).await?;
    Ok(HttpResponse::Ok().json(analyses))
}

#[get("/market/analyses/{id}")]
pub async fn get_analysis(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let detail = state.market().get(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[delete("/market/analyses/{id}")]
pub async fn delete_analysis(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    state.market().delete(user.id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/market/brands")]
pub async fn list_brands(
    user: AuthenticatedUser,
    query: web::Query<BrandQuery>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let brands = state.market().brands(user.id, search).await?;
    Ok(HttpResponse::Ok().json(brands))
}

#[get("/market/catalogs")]
pub async fn list_catalogs(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let catalogs = state.market().catalogs(user.id).await?;
    Ok(HttpResponse::Ok().json(catalogs))
}
