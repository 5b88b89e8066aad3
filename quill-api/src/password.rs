//! Password hashing
//!
//! Argon2id with default parameters, hashes stored as PHC strings.
//! Verification failure and malformed stored hashes are distinguished so
//! a corrupt hash never reads as "wrong password".

use crate::error::{ApiError, ApiResult};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

/// Hash a plaintext password into a PHC string.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal_error(format!("Failed to hash password: {}", e)))
}

/// Verify a plaintext password against a stored PHC hash.
///
/// Returns `Ok(false)` for a wrong password; errors only on a malformed
/// stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| ApiError::internal_error(format!("Stored password hash is invalid: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(ApiError::internal_error(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() -> crate::error::ApiResult<()> {
        let hash = hash_password("hunter2!")?;
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter2!", &hash)?);
        assert!(!verify_password("hunter3!", &hash)?);
        Ok(())
    }

    #[test]
    fn test_hashes_are_salted() -> crate::error::ApiResult<()> {
        let a = hash_password("same password")?;
        let b = hash_password("same password")?;
        assert_ne!(a, b);
        Ok(())
    }

    #[test]
    fn test_malformed_stored_hash_is_an_error() {
        assert!(verify_password("pw", "not-a-phc-string").is_err());
    }
}
