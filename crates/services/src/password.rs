use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::AuthError;

fn hashing<E: std::fmt::Display>(e: E) -> AuthError {
    AuthError::Hashing(e.to_string())
}

/// Argon2id password hashing with a random salt per password.
#[derive(Clone, Default)]
pub struct CredentialHasher {
    argon: Argon2<'static>,
}

impl CredentialHasher {
    /// Hasher with explicit cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Hashing` if the parameters are out of range.
    pub fn with_cost(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, parallelism, None).map_err(hashing)?;
        Ok(Self {
            argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Produce a PHC string for storage.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Hashing` if hashing fails.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(hashing)
    }

    /// Check a password against a stored PHC string.
    ///
    /// The stored string carries its own parameters, so hashes written with a
    /// different cost still verify.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Hashing` if the stored hash is malformed.
    pub fn verify(&self, password: &str, stored: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(stored).map_err(hashing)?;
        match self.argon.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(hashing(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> CredentialHasher {
        CredentialHasher::with_cost(8, 1, 1).unwrap()
    }

    #[test]
    fn hash_is_salted_and_verifies() {
        let hasher = cheap();
        let first = hasher.hash("password").unwrap();
        let second = hasher.hash("password").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(!first.contains("password"));

        assert!(hasher.verify("password", &first).unwrap());
        assert!(!hasher.verify("wrong", &first).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            cheap().verify("password", "password"),
            Err(AuthError::Hashing(_))
        ));
    }
}
