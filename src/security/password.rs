//! Password hashing and verification utilities.
//!
//! Operator blocks store hashes, never plaintext. New hashes are Argon2 PHC
//! strings; bcrypt (`$2a$`, `$2b$`, `$2y$`) hashes are still accepted.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand::rngs::OsRng;

/// Hash a password using default Argon2 settings.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    Ok(argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verify `candidate` against a stored Argon2 or bcrypt hash.
///
/// Both libraries compare in constant time. A malformed hash never verifies.
pub fn verify_password(candidate: &str, stored: &str) -> bool {
    if is_bcrypt(stored) {
        return bcrypt::verify(candidate, stored).unwrap_or(false);
    }
    match PasswordHash::new(stored) {
        Ok(hash) => Argon2::default()
            .verify_password(candidate.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}

/// Whether `stored` looks like a hash this module can verify.
pub fn is_password_hash(stored: &str) -> bool {
    if is_bcrypt(stored) {
        return true;
    }
    PasswordHash::new(stored)
        .map(|hash| hash.algorithm.as_str().starts_with("argon2"))
        .unwrap_or(false)
}

fn is_bcrypt(stored: &str) -> bool {
    stored.starts_with("$2") && stored.len() == 60
}
