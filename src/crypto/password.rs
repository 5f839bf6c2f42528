//! Password hashing using Argon2id
//!
//! Credentials are stored as PHC strings (`$argon2id$v=19$...`) which carry
//! their own salt and parameters, so verification needs nothing but the
//! stored string.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{TrackerError, TrackerResult};

/// Hash a password with a fresh random salt
///
/// Two calls with the same password produce different strings; both verify.
pub fn hash_password(password: &str) -> TrackerResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| TrackerError::Storage(format!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored credential
///
/// A malformed credential never errors; it simply does not verify.
pub fn verify_password(password: &str, credential: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(credential) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_fresh_salt_per_call() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("same", &first));
        assert!(verify_password("same", &second));
    }

    #[test]
    fn test_malformed_credential_is_false() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", "$argon2id$garbage"));
    }
}
