// utils/mod.rs
pub mod config;
pub mod security;
pub mod validation;

// Ré-exports pour faciliter l'import
pub use config::Config;
pub use security::{
    decrypt_secret, encrypt_secret, generate_access_token, hash_password, mask_secret,
    sha256_hex, verify_access_token, verify_password, AccessTokenClaims,
};
pub use validation::{
    validate_non_empty_string, validate_non_negative_number, validate_unit_interval,
};
