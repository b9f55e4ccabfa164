use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;

use crate::api::routes::AuthenticatedUser;
use crate::domain::captcha::{NewCaptchaAttempt, NewTrainingSample};
use crate::infrastructure::error::AppResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AttemptsQuery {
    pub limit: Option<i64>,
}

#[post("/captcha/attempts")]
pub async fn record_attempt(
    user: AuthenticatedUser,
    data: web::Json<NewCaptchaAttempt>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let attempt = state.captcha().record_attempt(user.id, data.into_inner()).await?;
    Ok(HttpResponse::Created().json(attempt))
}

#[get("/captcha/attempts")]
pub async fn list_attempts(
    user: AuthenticatedUser,
    query: web::Query<AttemptsQuery>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let attempts = state.captcha().list_attempts(user.id, query.limit).await?;
    Ok(HttpResponse::Ok().json(attempts))
}

#[get("/captcha/attempts/stats")]
pub async fn attempt_stats(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let stats = state.captcha().attempt_stats(user.id).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Ajoute un échantillon annoté au jeu d'entraînement
#[post("/captcha/training")]
pub async fn add_training_sample(
    user: AuthenticatedUser,
    data: web::Json<NewTrainingSample>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let sample = state.captcha().add_training_sample(user.id, data.into_inner()).await?;
    Ok(HttpResponse::Created().json(sample))
}

#[get("/captcha/training/stats")]
pub async fn training_stats(
    _user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let stats = state.captcha().dataset_stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}
