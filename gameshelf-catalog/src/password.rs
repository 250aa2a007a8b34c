//! Salted, iterated SHA-256 password hashing.
//!
//! The stored form is two hex strings: the digest and the salt it was
//! computed with.

use sha2::{Digest, Sha256};

/// Number of SHA-256 rounds applied to every password.
const ROUNDS: u32 = 10_000;

/// Salt length in bytes before hex encoding.
const SALT_LEN: usize = 16;

/// A password digest and the salt used to produce it, both hex encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash: String,
    pub salt: String,
}

/// Hash `password` with a freshly generated random salt.
pub fn hash_password(password: &str) -> PasswordHash {
    let salt: [u8; SALT_LEN] = rand::random();
    hash_password_with_salt(password, &hex::encode(salt))
}

/// Hash `password` with a known salt.
pub fn hash_password_with_salt(password: &str, salt: &str) -> PasswordHash {
    let mut digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    for _ in 1..ROUNDS {
        digest = Sha256::new()
            .chain_update(salt.as_bytes())
            .chain_update(digest)
            .finalize();
    }
    PasswordHash {
        hash: hex::encode(digest),
        salt: salt.to_string(),
    }
}

/// Check `password` against a stored hash and salt.
///
/// The comparison touches every byte regardless of where the first
/// difference is.
pub fn verify_password(password: &str, hash: &str, salt: &str) -> bool {
    let candidate = hash_password_with_salt(password, salt);
    let (a, b) = (candidate.hash.as_bytes(), hash.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_the_same_password() {
        let stored = hash_password("hunter2");
        assert!(verify_password("hunter2", &stored.hash, &stored.salt));
    }

    #[test]
    fn verify_rejects_a_different_password() {
        let stored = hash_password("hunter2");
        assert!(!verify_password("hunter3", &stored.hash, &stored.salt));
        assert!(!verify_password("", &stored.hash, &stored.salt));
    }

    #[test]
    fn salts_differ_between_calls() {
        let a = hash_password("same");
        let b = hash_password("same");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn fixed_salt_is_deterministic() {
        let a = hash_password_with_salt("pw", "00ff");
        let b = hash_password_with_salt("pw", "00ff");
        assert_eq!(a, b);
        assert_eq!(a.hash.len(), 64);
    }

    #[test]
    fn truncated_hash_never_verifies() {
        let stored = hash_password("pw");
        assert!(!verify_password("pw", &stored.hash[..10], &stored.salt));
    }
}
