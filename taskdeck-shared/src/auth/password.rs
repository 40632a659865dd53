/// Password hashing using Argon2id
///
/// Credentials are stored as salted, one-way Argon2id digests in PHC string
/// format. Hashing is deliberately slow (adaptive work factor) to resist
/// offline brute force; verification runs in constant time.
///
/// # Parameters
///
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash
/// - **Salt**: 16 random bytes from the OS RNG, fresh per call
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let digest = hash_password("secret123")?;
///
/// assert!(verify_password("secret123", &digest));
/// assert!(!verify_password("not-the-password", &digest));
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to produce a digest
    #[error("failed to hash password: {0}")]
    Hash(String),
}

/// Hashes a plaintext password with Argon2id
///
/// Every call generates a fresh random salt, so hashing the same plaintext
/// twice yields different digests.
///
/// # Returns
///
/// PHC string format digest (algorithm, parameters, salt, and hash), e.g.
///
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
/// ```
///
/// # Errors
///
/// Returns `PasswordError::Hash` if digest generation fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(65536) // 64 MB
        .t_cost(3) // 3 iterations
        .p_cost(4) // 4 parallel lanes
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::Hash(format!("invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let digest = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(format!("digest generation failed: {}", e)))?;

    Ok(digest.to_string())
}

/// Verifies a plaintext password against a stored digest
///
/// Returns `false` for a wrong password AND for a malformed digest; callers
/// never have to handle an error for bad input, only a failed match. The
/// comparison itself is constant-time.
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::password::verify_password;
///
/// // Garbage digests fail closed instead of erroring.
/// assert!(!verify_password("password", "not-a-phc-string"));
/// ```
pub fn verify_password(password: &str, digest: &str) -> bool {
    let parsed = match PasswordHash::new(digest) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };

    // Parameters are embedded in the digest itself.
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_format() {
        let digest = hash_password("test_password_123").expect("hash should succeed");

        assert!(digest.starts_with("$argon2id$"));
        assert!(digest.contains("v=19"));
        assert!(digest.contains("m=65536"));
        assert!(digest.contains("t=3"));
        assert!(digest.contains("p=4"));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let password = "same_password";

        let first = hash_password(password).expect("hash should succeed");
        let second = hash_password(password).expect("hash should succeed");

        // Fresh salt per call.
        assert_ne!(first, second);
        assert!(verify_password(password, &first));
        assert!(verify_password(password, &second));
    }

    #[test]
    fn test_verify_correct_password() {
        let digest = hash_password("correct_password").expect("hash should succeed");
        assert!(verify_password("correct_password", &digest));
    }

    #[test]
    fn test_verify_wrong_password() {
        let digest = hash_password("correct_password").expect("hash should succeed");
        assert!(!verify_password("wrong_password", &digest));
    }

    #[test]
    fn test_verify_empty_password() {
        let digest = hash_password("password").expect("hash should succeed");
        assert!(!verify_password("", &digest));
    }

    #[test]
    fn test_verify_malformed_digest_is_false_not_error() {
        assert!(!verify_password("password", "invalid_digest"));
        assert!(!verify_password("password", "$argon2id$truncated"));
        assert!(!verify_password("password", ""));
    }

    #[test]
    fn test_hash_verify_roundtrip() {
        let passwords = vec![
            "simple",
            "with spaces",
            "with-special-chars!@#$%",
            "unicode-密码-パスワード",
            "very_long_password_that_is_longer_than_usual_passwords_123456789",
        ];

        for password in passwords {
            let digest = hash_password(password).expect("hash should succeed");
            assert!(
                verify_password(password, &digest),
                "password '{}' should verify",
                password
            );
        }
    }
}
