use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Représente un utilisateur du système
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Identifiant unique de l'utilisateur (UUID)
    pub id: Uuid,
    /// Nom d'utilisateur (unique)
    pub username: String,
    /// Email de l'utilisateur (unique)
    pub email: String,
    /// Hash Argon2 du mot de passe (jamais exposé dans les APIs)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Droits d'administration
    pub is_admin: bool,
    /// Date de création du compte
    pub created_at: DateTime<Utc>,
}

/// Données requises pour créer un nouvel utilisateur
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 3, max = 64, message = "Le nom d'utilisateur doit contenir entre 3 et 64 caractères"))]
    pub username: String,
    #[validate(email(message = "Format d'email invalide"))]
    pub email: String,
    #[validate(length(min = 8, message = "Le mot de passe doit contenir au moins 8 caractères"))]
    pub password: String,
}

/// Données pour la connexion d'un utilisateur
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserLogin {
    /// Nom d'utilisateur ou email
    #[validate(length(min = 1, message = "L'identifiant est requis"))]
    pub login: String,
    #[validate(length(min = 1, message = "Le mot de passe est requis"))]
    pub password: String,
}
