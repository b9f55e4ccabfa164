//! # API Middleware
//!
//! Authentification JWT des routes protégées, sous forme d'extracteur actix:
//! un handler qui reçoit un `AuthenticatedUser` n'est exécuté que si l'en-tête
//! `Authorization: Bearer <jwt>` est présent et valide (sinon 401).

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use crate::infrastructure::error::{AppError, AppResult};
use crate::utils::security::verify_access_token;
use crate::AppState;

/// Utilisateur identifié par son jeton d'accès
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
}

fn bearer_token(req: &HttpRequest) -> AppResult<&str> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("en-tête Authorization manquant".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("schéma Bearer attendu".to_string()))
}

fn authenticate(req: &HttpRequest) -> AppResult<AuthenticatedUser> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Configuration("état applicatif non enregistré".to_string()))?;

    let claims = verify_access_token(bearer_token(req)?, &state.config.jwt_secret)?;
    Ok(AuthenticatedUser {
        id: claims.sub,
        username: claims.username,
        is_admin: claims.is_admin,
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
