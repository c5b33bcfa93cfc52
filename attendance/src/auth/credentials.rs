//! Credential store: password hashing, verification, and strength scoring.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::errors::{AuthError, AuthResult};

/// Characters counting toward the special-character strength criterion.
const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Minimum strength score accepted at registration.
pub const MIN_STRENGTH: u8 = 3;

/// One-way password hashing and verification.
///
/// Hashes are Argon2id with a per-hash random salt plus a server-side
/// pepper, so a leaked database alone is not enough to mount an offline
/// attack.
#[derive(Clone)]
pub struct CredentialStore {
    pepper: String,
}

impl CredentialStore {
    pub fn new(pepper: String) -> Self {
        Self { pepper }
    }

    /// Hash a password with Argon2id + pepper. Never reversible.
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        Ok(argon2
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify a password against a stored hash. The comparison happens
    /// inside the hashing primitive, so timing does not reveal anything.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let peppered = format!("{}{}", password, self.pepper);
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Score a password 0..=5: one point each for length >= 8, an
    /// uppercase letter, a lowercase letter, a digit, and a special
    /// character. Registration requires [`MIN_STRENGTH`].
    pub fn strength(password: &str) -> u8 {
        let mut score = 0;

        if password.len() >= 8 {
            score += 1;
        }
        if password.chars().any(|c| c.is_ascii_uppercase()) {
            score += 1;
        }
        if password.chars().any(|c| c.is_ascii_lowercase()) {
            score += 1;
        }
        if password.chars().any(|c| c.is_ascii_digit()) {
            score += 1;
        }
        if password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
            score += 1;
        }

        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CredentialStore {
        CredentialStore::new("test_pepper_for_testing_only".to_string())
    }

    #[test]
    fn hash_then_verify_succeeds() {
        let store = store();
        let hash = store.hash("SecurePass123!").unwrap();
        assert!(store.verify("SecurePass123!", &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let store = store();
        let hash = store.hash("SecurePass123!").unwrap();
        assert!(!store.verify("SecurePass123?", &hash));
        assert!(!store.verify("", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!store().verify("SecurePass123!", "not-a-phc-string"));
    }

    #[test]
    fn hashes_are_salted() {
        let store = store();
        let a = store.hash("SecurePass123!").unwrap();
        let b = store.hash("SecurePass123!").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn pepper_is_part_of_the_hash_input() {
        let hash = store().hash("SecurePass123!").unwrap();
        let other = CredentialStore::new("a_different_pepper".to_string());
        assert!(!other.verify("SecurePass123!", &hash));
    }

    #[test]
    fn strength_scores_five_criteria_independently() {
        assert_eq!(CredentialStore::strength(""), 0);
        assert_eq!(CredentialStore::strength("password"), 2); // length + lowercase
        assert_eq!(CredentialStore::strength("PASSWORD"), 2); // length + uppercase
        assert_eq!(CredentialStore::strength("Pass1"), 3); // upper + lower + digit
        assert_eq!(CredentialStore::strength("Password1"), 4);
        assert_eq!(CredentialStore::strength("Password1!"), 5);
        assert_eq!(CredentialStore::strength("Ab1!"), 4); // everything but length
    }

    #[test]
    fn signup_threshold_splits_known_examples() {
        assert!(CredentialStore::strength("Password1!") >= MIN_STRENGTH);
        assert!(CredentialStore::strength("password") < MIN_STRENGTH);
    }
}
