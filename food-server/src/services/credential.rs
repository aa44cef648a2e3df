//! 凭证校验
//!
//! Argon2 密码哈希与校验，同样用于保存一次性验证码的哈希。

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::Rng;

use crate::utils::AppError;

/// Verification code length (digits)
pub const VERIFICATION_CODE_LEN: usize = 6;

/// Password hashing / verification
#[derive(Debug, Clone, Default)]
pub struct CredentialVerifier;

impl CredentialVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Hash a secret with a random salt
    pub fn hash(&self, secret: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::internal(format!("Failed to hash credential: {e}")))
    }

    /// Verify a secret against a stored hash; malformed hashes never match
    pub fn verify(&self, secret: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            tracing::warn!("Stored credential hash is malformed");
            return false;
        };
        Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }

    /// Six random digits
    pub fn generate_code(&self) -> String {
        let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
        code.to_string()
    }
}
