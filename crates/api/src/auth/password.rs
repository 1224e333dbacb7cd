//! Password hashing with Argon2

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Hash a password using Argon2id with a random salt.
/// CPU-bound: call from `spawn_blocking` inside async code.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Verify a password against a stored PHC hash string
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Length policy for new passwords, counted in characters
pub fn validate_password_length(password: &str) -> Result<(), PasswordValidationError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(PasswordValidationError::TooShort);
    }
    if len > MAX_PASSWORD_LEN {
        return Err(PasswordValidationError::TooLong);
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Invalid password hash: {0}")]
    InvalidHash(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PasswordValidationError {
    #[error("Password must be at least 6 characters")]
    TooShort,
    #[error("Password must be at most 128 characters")]
    TooLong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "robotics-lab";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("robotics-lab!", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("secret1", &a).unwrap());
        assert!(verify_password("secret1", &b).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(matches!(
            verify_password("secret1", "plaintext"),
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_password_length_requirements() {
        assert_eq!(
            validate_password_length("12345"),
            Err(PasswordValidationError::TooShort)
        );
        assert!(validate_password_length("123456").is_ok());
        assert!(validate_password_length(&"a".repeat(128)).is_ok());
        assert_eq!(
            validate_password_length(&"a".repeat(129)),
            Err(PasswordValidationError::TooLong)
        );
        // Characters, not bytes
        assert!(validate_password_length("пароль").is_ok());
    }
}
