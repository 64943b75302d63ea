use std::sync::LazyLock;

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash a password into an Argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())?;
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, password_hash::Error> {
    let parsed = PasswordHash::new(stored)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("cabinet-dummy-password").ok());

/// Spend the same hashing work as a real verification when the account does not exist,
/// so response timing does not reveal which usernames are registered.
pub fn burn_verification(password: &str) {
    if let Some(dummy) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, dummy);
    }
}
