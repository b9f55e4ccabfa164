// core/user_service.rs
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::user::{NewUser, User, UserLogin};
use crate::infrastructure::database::Database;
use crate::infrastructure::error::{AppError, AppResult};
use crate::utils::security::{generate_access_token, hash_password, verify_password};
use crate::utils::Config;

/// Réponse de connexion
#[derive(Debug, Clone, Serialize)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

pub struct UserService {
    db: Database,
    config: Arc<Config>,
}

impl UserService {
    pub fn new(db: Database, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    /// Inscription d'un nouvel utilisateur
    pub async fn register(&self, new_user: NewUser) -> AppResult<User> {
        new_user.validate()?;
        self.create_user(&new_user, false).await
    }

    async fn create_user(&self, new_user: &NewUser, is_admin: bool) -> AppResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.trim().to_string(),
            email: new_user.email.trim().to_lowercase(),
            password_hash: hash_password(&new_user.password)?,
            is_admin,
            created_at: Utc::now(),
        };

        self.db.users().insert(&user).await.map_err(|e| match e {
            AppError::Conflict(_) => {
                AppError::Conflict("nom d'utilisateur ou email déjà utilisé".to_string())
            }
            other => other,
        })?;

        info!(user_id = %user.id, username = %user.username, "👤 Utilisateur créé");
        Ok(user)
    }

    /// Authentification par nom d'utilisateur ou email
    pub async fn login(&self, credentials: UserLogin) -> AppResult<AuthToken> {
        credentials.validate()?;

        let user = self
            .db
            .users()
            .find_by_login(credentials.login.trim())
            .await?;

        let user = match user {
            Some(user) if verify_password(&credentials.password, &user.password_hash)? => user,
            _ => {
                warn!(login = %credentials.login, "🔒 Échec d'authentification");
                return Err(AppError::Unauthorized("identifiants invalides".to_string()));
            }
        };

        let access_token = generate_access_token(
            user.id,
            &user.username,
            user.is_admin,
            &self.config.jwt_secret,
            self.config.jwt_access_token_expiry_hours,
        )?;

        info!(user_id = %user.id, "🔑 Connexion réussie");
        Ok(AuthToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.jwt_access_token_expiry_hours * 3600,
            user,
        })
    }

    pub async fn get(&self, user_id: Uuid) -> AppResult<User> {
        self.db
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Utilisateur".to_string()))
    }

    /// Crée l'administrateur initial quand la base ne contient aucun utilisateur
    pub async fn ensure_admin(&self) -> AppResult<Option<User>> {
        let (Some(username), Some(email), Some(password)) = (
            self.config.admin_username.clone(),
            self.config.admin_email.clone(),
            self.config.admin_password.clone(),
        ) else {
            return Ok(None);
        };

        if self.db.users().count().await? > 0 {
            return Ok(None);
        }

        let admin = NewUser {
            username,
            email,
            password,
        };
        admin.validate()?;
        let user = self.create_user(&admin, true).await?;
        info!(user_id = %user.id, "🛡️ Administrateur initial créé");
        Ok(Some(user))
    }
}
