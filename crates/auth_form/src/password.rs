//! Salted one-way password hashing.
//!
//! Argon2id with a fresh random salt per call. The `salt_rounds` work factor
//! maps to the Argon2 time-cost parameter; memory and parallelism stay at the
//! crate defaults. Verification reads its parameters back out of the encoded
//! hash string, so hashes produced with any work factor verify.

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use rand::rngs::OsRng;

use crate::error::PasswordHashError;

/// Default work factor when the caller does not configure one.
pub const DEFAULT_SALT_ROUNDS: u32 = 10;

fn hasher(salt_rounds: u32) -> Result<Argon2<'static>, PasswordHashError> {
    let params = Params::new(
        Params::DEFAULT_M_COST,
        salt_rounds,
        Params::DEFAULT_P_COST,
        None,
    )
    .map_err(|_| PasswordHashError::InvalidWorkFactor(salt_rounds))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash `plain` with a random salt and the given work factor, returning the
/// encoded hash string.
pub fn hash_password(plain: &str, salt_rounds: u32) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher(salt_rounds)?
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| PasswordHashError::Hash(e.to_string()))?
        .to_string();
    Ok(hash)
}

/// Check `plain` against an encoded hash string.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, PasswordHashError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordHashError::Parse(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_password_hashes_to_distinct_strings_that_both_verify() {
        let a = hash_password("hunter2!", DEFAULT_SALT_ROUNDS).unwrap();
        let b = hash_password("hunter2!", DEFAULT_SALT_ROUNDS).unwrap();
        assert_ne!(a, b, "salts must differ per call");
        assert!(verify_password("hunter2!", &a).unwrap());
        assert!(verify_password("hunter2!", &b).unwrap());
    }

    #[test]
    fn wrong_password_fails_verification() {
        let hash = hash_password("correct horse", 2).unwrap();
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn zero_work_factor_is_rejected() {
        assert!(matches!(
            hash_password("x", 0),
            Err(PasswordHashError::InvalidWorkFactor(0))
        ));
    }

    #[test]
    fn garbage_hash_fails_to_parse() {
        assert!(matches!(
            verify_password("x", "not-a-phc-string"),
            Err(PasswordHashError::Parse(_))
        ));
    }
}
