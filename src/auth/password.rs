//! bcrypt password hashes.
//!
//! Stored format is the standard modular crypt string, e.g. `$2b$12$<salt+digest>`.

use std::sync::OnceLock;

use bcrypt::{hash, verify, BcryptError};

#[cfg(not(test))]
const COST: u32 = bcrypt::DEFAULT_COST;
// Every TestApp registers a user
#[cfg(test)]
const COST: u32 = 4; // bcrypt::MIN_COST (private in bcrypt 0.15)

pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash(password, COST)
}

/// Returns false for malformed stored hashes rather than erroring.
pub fn verify_password(password: &str, stored: &str) -> bool {
    verify(password, stored).unwrap_or(false)
}

/// Hash checked when the username is unknown, so both failure paths pay for one bcrypt verify
pub fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| {
        hash_password("dummy password for unknown users").unwrap_or_else(|e| {
            tracing::error!("Failed to prepare dummy password hash: {}", e);
            String::new()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_the_original_password() {
        let stored = hash_password("correct horse").unwrap();
        assert!(stored.starts_with("$2"));
        assert!(verify_password("correct horse", &stored));
        assert!(!verify_password("wrong horse", &stored));
    }

    #[test]
    fn salts_differ_between_hashes() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn malformed_hashes_never_verify() {
        assert!(!verify_password("pw", ""));
        assert!(!verify_password("pw", "md5$1$salt$abc"));
        assert!(!verify_password("pw", "sha256$10000$salt$abc"));
    }

    #[test]
    fn dummy_hash_costs_the_same_as_real_hashes() {
        let real = hash_password("pw").unwrap();
        // "$2b$04$" style prefix carries the cost
        assert_eq!(&dummy_hash()[..7], &real[..7]);
        assert!(!verify_password("pw", dummy_hash()));
    }
}
