// utils/security.rs
use crate::infrastructure::error::{AppError, AppResult};
use base64::{engine::general_purpose, Engine as _};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Taille du nonce AES-GCM (96 bits)
const NONCE_SIZE: usize = 12;

/// Claims JWT pour les tokens d'accès
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: Uuid,        // User ID
    pub username: String, // Nom d'utilisateur
    pub is_admin: bool,
    pub exp: usize,       // Expiration timestamp
    pub iat: usize,       // Issued at timestamp
    pub jti: String,      // Token ID
}

/// Générer un token d'accès JWT
pub fn generate_access_token(
    user_id: Uuid,
    username: &str,
    is_admin: bool,
    secret: &str,
    expiry_hours: i64,
) -> AppResult<String> {
    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::hours(expiry_hours);

    let claims = AccessTokenClaims {
        sub: user_id,
        username: username.to_string(),
        is_admin,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Encryption(format!("génération du jeton: {}", e)))
}

/// Vérifier un token d'accès
pub fn verify_access_token(token: &str, secret: &str) -> AppResult<AccessTokenClaims> {
    let token_data = decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Générer un hash de mot de passe avec Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
        Argon2,
    };

    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Encryption(e.to_string()))
}

/// Vérifier un mot de passe contre un hash
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    use argon2::{
        password_hash::{PasswordHash, PasswordVerifier},
        Argon2,
    };

    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Encryption(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Dérive une clé AES-256 depuis la clé configurée
fn derive_key(key: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.finalize().into()
}

/// Chiffrer un secret avec AES-256-GCM.
///
/// Le résultat est `base64(nonce ‖ ciphertext)`; un nonce aléatoire est tiré
/// à chaque appel.
pub fn encrypt_secret(plaintext: &str, key: &str) -> AppResult<String> {
    use aes_gcm::{
        aead::{Aead, AeadCore, KeyInit, OsRng},
        Aes256Gcm,
    };

    if key.is_empty() {
        return Err(AppError::Encryption("clé de chiffrement vide".to_string()));
    }

    let cipher = Aes256Gcm::new_from_slice(&derive_key(key))
        .map_err(|e| AppError::Encryption(e.to_string()))?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|e| AppError::Encryption(e.to_string()))?;

    let mut payload = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    payload.extend_from_slice(nonce.as_slice());
    payload.extend_from_slice(&ciphertext);

    Ok(general_purpose::STANDARD.encode(payload))
}

/// Déchiffrer un secret produit par [`encrypt_secret`]
pub fn decrypt_secret(encoded: &str, key: &str) -> AppResult<String> {
    use aes_gcm::{
        aead::{Aead, KeyInit},
        Aes256Gcm, Nonce,
    };

    let payload = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| AppError::Encryption(format!("base64 invalide: {}", e)))?;

    // nonce + tag de 16 octets au minimum
    if payload.len() < NONCE_SIZE + 16 {
        return Err(AppError::Encryption("donnée chiffrée tronquée".to_string()));
    }

    let (nonce, ciphertext) = payload.split_at(NONCE_SIZE);
    let cipher = Aes256Gcm::new_from_slice(&derive_key(key))
        .map_err(|e| AppError::Encryption(e.to_string()))?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| AppError::Encryption("authentification du secret échouée".to_string()))?;

    String::from_utf8(plaintext).map_err(|e| AppError::Encryption(e.to_string()))
}

/// Masque un secret pour l'affichage: `abcd…wxyz`
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "•".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

/// Calculer un hash SHA256
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "une-cle-de-test-suffisamment-longue";

    #[test]
    fn encryption_round_trip() {
        let encrypted = encrypt_secret("vinted-token-123", KEY).unwrap();
        assert_ne!(encrypted, "vinted-token-123");
        assert_eq!(decrypt_secret(&encrypted, KEY).unwrap(), "vinted-token-123");
    }

    #[test]
    fn same_plaintext_yields_distinct_ciphertexts() {
        let a = encrypt_secret("secret", KEY).unwrap();
        let b = encrypt_secret("secret", KEY).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let encrypted = encrypt_secret("secret", KEY).unwrap();
        let result = decrypt_secret(&encrypted, "une-autre-cle");
        assert!(matches!(result, Err(AppError::Encryption(_))));
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let encrypted = encrypt_secret("secret", KEY).unwrap();
        let mut raw = general_purpose::STANDARD.decode(&encrypted).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = general_purpose::STANDARD.encode(raw);
        assert!(decrypt_secret(&tampered, KEY).is_err());
    }

    #[test]
    fn truncated_and_garbage_inputs_are_rejected() {
        assert!(decrypt_secret("pas du base64 !!", KEY).is_err());
        assert!(decrypt_secret(&general_purpose::STANDARD.encode([0u8; 10]), KEY).is_err());
        assert!(encrypt_secret("x", "").is_err());
    }

    #[test]
    fn password_hash_and_verify() {
        let hash = hash_password("MotDePasse123!").unwrap();
        assert!(verify_password("MotDePasse123!", &hash).unwrap());
        assert!(!verify_password("mauvais", &hash).unwrap());
        assert!(verify_password("x", "pas-un-hash").is_err());
    }

    #[test]
    fn access_token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = generate_access_token(user_id, "alice", false, KEY, 1).unwrap();
        let claims = verify_access_token(&token, KEY).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "alice");
        assert!(!claims.is_admin);

        assert!(matches!(
            verify_access_token(&token, "autre-secret"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = generate_access_token(Uuid::new_v4(), "bob", false, KEY, -2).unwrap();
        assert!(matches!(
            verify_access_token(&token, KEY),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn mask_keeps_only_edges() {
        assert_eq!(mask_secret("abcdefghijkl"), "abcd…ijkl");
        assert_eq!(mask_secret("court"), "•••••");
    }

    #[test]
    fn sha256_of_known_input() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
