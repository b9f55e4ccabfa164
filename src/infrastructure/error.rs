use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use validator::ValidationErrors;

/// Type de résultat standard pour l'application
pub type AppResult<T> = Result<T, AppError>;

/// Erreurs principales de l'application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Donnée métier invalide (400 Bad Request)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Erreurs de validation des DTO (422 Unprocessable Entity)
    #[error("Validation failed: {0}")]
    ValidationErrors(#[from] ValidationErrors),

    /// Requête mal formée (400 Bad Request)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Authentification échouée (401 Unauthorized)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Permissions insuffisantes (403 Forbidden)
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Ressource non trouvée (404 Not Found)
    #[error("{0} not found")]
    NotFound(String),

    /// Conflit de ressources (409 Conflict)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Erreur de base de données (500 Internal Server Error)
    #[error("Database error: {0}")]
    Database(SqlxError),

    /// Service tiers en erreur: Vinted, Superbuy (502 Bad Gateway)
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Timeout d'opération (504 Gateway Timeout)
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// Erreur de connexion (502 Bad Gateway)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Erreur de chiffrement/déchiffrement (500 Internal Server Error)
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Erreur de sérialisation (500 Internal Server Error)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Erreur de configuration (500 Internal Server Error)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Erreur d'infrastructure: fichiers, tâches (500 Internal Server Error)
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl AppError {
    /// Convertit l'erreur en code HTTP approprié
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ValidationErrors(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ExternalService(_) | AppError::Connection(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Database(_)
            | AppError::Encryption(_)
            | AppError::Serialization(_)
            | AppError::Configuration(_)
            | AppError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message destiné au client (jamais de détail interne)
    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::BadRequest(msg) => msg.clone(),
            AppError::ValidationErrors(errors) => {
                let mut messages = Vec::new();
                for (field, field_errors) in errors.field_errors() {
                    for error in field_errors {
                        match error.message.as_ref() {
                            Some(msg) => messages.push(format!("{}: {}", field, msg)),
                            None => messages.push(format!("{}: valeur invalide", field)),
                        }
                    }
                }
                messages.sort();
                if messages.is_empty() {
                    "Données invalides. Veuillez vérifier le format des champs.".to_string()
                } else {
                    messages.join("; ")
                }
            }
            AppError::Unauthorized(msg) => format!("Non authentifié: {}", msg),
            AppError::Forbidden(msg) => format!("Accès refusé: {}", msg),
            AppError::NotFound(resource) => format!("{} non trouvé", resource),
            AppError::Conflict(msg) => format!("Conflit: {}", msg),
            AppError::ExternalService(msg) => format!("Service externe indisponible: {}", msg),
            AppError::Connection(_) => "Impossible de joindre le service externe.".to_string(),
            AppError::Timeout(_) => {
                "L'opération a pris trop de temps. Veuillez réessayer plus tard.".to_string()
            }
            AppError::Database(_)
            | AppError::Encryption(_)
            | AppError::Serialization(_)
            | AppError::Configuration(_)
            | AppError::Infrastructure(_) => {
                "Une erreur interne est survenue.".to_string()
            }
        }
    }
}

/// Structure de réponse d'erreur standardisée
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = AppError::status_code(self);
        if status.is_server_error() {
            tracing::error!("❌ Erreur serveur: {}", self);
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.user_friendly_message(),
            code: status.as_u16(),
        })
    }
}

// Implémentations From pour les conversions automatiques

impl From<SqlxError> for AppError {
    fn from(error: SqlxError) -> Self {
        match &error {
            SqlxError::RowNotFound => AppError::NotFound("Ressource".to_string()),
            SqlxError::Database(db_error) if db_error.is_unique_violation() => {
                AppError::Conflict("cette ressource existe déjà".to_string())
            }
            _ => AppError::Database(error),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        AppError::Infrastructure(format!("IO error: {}", error))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> Self {
        AppError::Infrastructure(format!("Task join error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            AppError::Timeout("Request timeout".to_string())
        } else if error.is_connect() {
            AppError::Connection("Connection failed".to_string())
        } else if error.is_decode() {
            AppError::ExternalService(format!("réponse illisible: {}", error))
        } else {
            AppError::ExternalService(format!("HTTP request error: {}", error))
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match error.kind() {
            ErrorKind::ExpiredSignature => AppError::Unauthorized("jeton expiré".to_string()),
            _ => AppError::Unauthorized("jeton invalide".to_string()),
        }
    }
}
