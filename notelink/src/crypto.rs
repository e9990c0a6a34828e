//! Password hashing for private notes
//!
//! Private notes store an Argon2id hash of their unlock password.
//! The note content itself is not encrypted; the hash only gates the
//! UI's unlock flow.

use crate::error::{AppError, Result};
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

/// Hash a password with Argon2id, producing a PHC-format string
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Generic(format!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored PHC-format hash
pub fn verify_password(hash: &str, password: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Generic(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct_password").unwrap();

        assert!(verify_password(&hash, "correct_password").unwrap());
        assert!(!verify_password(&hash, "wrong_password").unwrap());
    }

    #[test]
    fn test_different_salts() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();

        // Different salts should produce different hashes
        assert_ne!(hash1, hash2);

        // But both should verify
        assert!(verify_password(&hash1, "same_password").unwrap());
        assert!(verify_password(&hash2, "same_password").unwrap());
    }

    #[test]
    fn test_garbage_hash_rejected() {
        let result = verify_password("not-a-phc-string", "password");
        assert!(result.is_err());
    }

    #[test]
    fn test_unicode_password() {
        let hash = hash_password("пароль密码🔐").unwrap();
        assert!(verify_password(&hash, "пароль密码🔐").unwrap());
    }
}
