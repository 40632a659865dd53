/// Token issuance and validation
///
/// Access and refresh tokens are JWTs signed with a server-held secret under
/// a configured HMAC algorithm (HS256 by default). The claim set is exactly
/// `{sub: email, user_id: id, exp: instant, type: "refresh"?}` — the `type`
/// claim is present only on refresh tokens, and a payload without it decodes
/// as an access token.
///
/// # Token Kinds
///
/// - **Access**: short-lived (configurable, 30 minutes by default), presented
///   as the bearer credential on every authenticated request
/// - **Refresh**: fixed 7-day window, exchanged for a fresh token pair
///
/// [`validate_token`] checks signature, algorithm, and expiry but is
/// deliberately kind-agnostic; callers that care which kind they are holding
/// go through [`validate_access_token`] or [`validate_refresh_token`].
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::jwt::{create_token, validate_token, Claims, TokenKind};
/// use jsonwebtoken::Algorithm;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "secret-key-that-is-at-least-32-bytes";
/// let claims = Claims::new("alice@example.com".to_string(), Uuid::new_v4(), TokenKind::Access);
///
/// let token = create_token(&claims, secret, Algorithm::HS256)?;
/// let validated = validate_token(&token, secret, Algorithm::HS256)?;
/// assert_eq!(validated.sub, "alice@example.com");
/// # Ok(())
/// # }
/// ```

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create a token
    #[error("failed to create token: {0}")]
    Create(String),

    /// Signature mismatch, algorithm mismatch, or malformed structure
    #[error("token validation failed: {0}")]
    Validation(String),

    /// Token expiry instant is in the past
    #[error("token has expired")]
    Expired,

    /// Token is valid but of the wrong kind for this call site
    #[error("expected {expected} token, got {actual}")]
    WrongKind {
        expected: TokenKind,
        actual: TokenKind,
    },
}

/// Token kind identifier
///
/// Serialized on the wire as the optional `type` claim: absent for access
/// tokens, `"refresh"` for refresh tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Access token (short-lived, bearer credential)
    #[default]
    Access,

    /// Refresh token (7 days, exchanged for new token pairs)
    Refresh,
}

impl TokenKind {
    /// Default expiration window for this kind
    ///
    /// Access tokens default to 30 minutes but are usually issued with the
    /// configured TTL via [`Claims::with_expiration`]; the refresh window is
    /// fixed.
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenKind::Access => Duration::minutes(30),
            TokenKind::Refresh => Duration::days(7),
        }
    }

    /// Kind as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }

    /// True for [`TokenKind::Access`]; used to elide the `type` claim
    pub fn is_access(&self) -> bool {
        matches!(self, TokenKind::Access)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded token payload
///
/// The subject is the principal's email; `user_id` carries the stable
/// identity so handlers never have to resolve email → id themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal's email address
    pub sub: String,

    /// The principal's id
    pub user_id: Uuid,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,

    /// Token kind; absent on the wire for access tokens
    #[serde(rename = "type", default, skip_serializing_if = "TokenKind::is_access")]
    pub kind: TokenKind,
}

impl Claims {
    /// Creates claims expiring after the kind's default window
    pub fn new(email: String, user_id: Uuid, kind: TokenKind) -> Self {
        Self::with_expiration(email, user_id, kind, kind.default_expiration())
    }

    /// Creates claims with an explicit time-to-live
    ///
    /// # Example
    ///
    /// ```
    /// use taskdeck_shared::auth::jwt::{Claims, TokenKind};
    /// use chrono::Duration;
    /// use uuid::Uuid;
    ///
    /// let claims = Claims::with_expiration(
    ///     "alice@example.com".to_string(),
    ///     Uuid::new_v4(),
    ///     TokenKind::Access,
    ///     Duration::minutes(5),
    /// );
    /// assert!(!claims.is_expired());
    /// ```
    pub fn with_expiration(email: String, user_id: Uuid, kind: TokenKind, ttl: Duration) -> Self {
        let expiration = Utc::now() + ttl;

        Self {
            sub: email,
            user_id,
            exp: expiration.timestamp(),
            kind,
        }
    }

    /// Checks whether the expiry instant has passed
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs a claim set into a token string
///
/// # Errors
///
/// Returns `JwtError::Create` if encoding fails.
pub fn create_token(claims: &Claims, secret: &str, algorithm: Algorithm) -> Result<String, JwtError> {
    let header = Header::new(algorithm);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key).map_err(|e| JwtError::Create(format!("token encoding failed: {}", e)))
}

/// Validates a token and extracts its claims
///
/// A token is valid only if its signature matches `secret`, its algorithm
/// matches `algorithm`, and the current instant is strictly before `exp`
/// (zero leeway). The kind is decoded but NOT checked — an access token and
/// a refresh token both pass; use the kind-checking wrappers where the
/// distinction matters.
///
/// # Errors
///
/// - `JwtError::Expired` when the expiry instant has passed
/// - `JwtError::Validation` for malformed structure, signature mismatch, or
///   an algorithm other than the configured one
pub fn validate_token(token: &str, secret: &str, algorithm: Algorithm) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(algorithm);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Validation(format!("token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Validates a token and requires it to be an access token
///
/// # Errors
///
/// Everything [`validate_token`] returns, plus `JwtError::WrongKind` when a
/// refresh token is presented on the access path.
pub fn validate_access_token(
    token: &str,
    secret: &str,
    algorithm: Algorithm,
) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret, algorithm)?;

    if claims.kind != TokenKind::Access {
        return Err(JwtError::WrongKind {
            expected: TokenKind::Access,
            actual: claims.kind,
        });
    }

    Ok(claims)
}

/// Validates a token and requires it to be a refresh token
///
/// # Errors
///
/// Everything [`validate_token`] returns, plus `JwtError::WrongKind` when an
/// access token is presented on the refresh path.
pub fn validate_refresh_token(
    token: &str,
    secret: &str,
    algorithm: Algorithm,
) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret, algorithm)?;

    if claims.kind != TokenKind::Refresh {
        return Err(JwtError::WrongKind {
            expected: TokenKind::Refresh,
            actual: claims.kind,
        });
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn sample_claims(kind: TokenKind) -> Claims {
        Claims::new("user@example.com".to_string(), Uuid::new_v4(), kind)
    }

    #[test]
    fn test_default_expirations() {
        assert_eq!(TokenKind::Access.default_expiration(), Duration::minutes(30));
        assert_eq!(TokenKind::Refresh.default_expiration(), Duration::days(7));
    }

    #[test]
    fn test_create_and_validate_roundtrip() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new("alice@example.com".to_string(), user_id, TokenKind::Access);

        let token = create_token(&claims, SECRET, Algorithm::HS256).expect("should create token");
        let validated = validate_token(&token, SECRET, Algorithm::HS256).expect("should validate");

        assert_eq!(validated.sub, "alice@example.com");
        assert_eq!(validated.user_id, user_id);
        assert_eq!(validated.kind, TokenKind::Access);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let claims = sample_claims(TokenKind::Access);
        let token = create_token(&claims, SECRET, Algorithm::HS256).unwrap();

        let result = validate_token(&token, "a-completely-different-secret-value", Algorithm::HS256);
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_algorithm_is_rejected() {
        let claims = sample_claims(TokenKind::Access);
        let token = create_token(&claims, SECRET, Algorithm::HS256).unwrap();

        // Same secret, but the verifier is configured for a different
        // algorithm: must not verify.
        let result = validate_token(&token, SECRET, Algorithm::HS384);
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let claims = Claims::with_expiration(
            "user@example.com".to_string(),
            Uuid::new_v4(),
            TokenKind::Access,
            Duration::hours(-2),
        );
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET, Algorithm::HS256).unwrap();
        let result = validate_token(&token, SECRET, Algorithm::HS256);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        assert!(validate_token("not-a-jwt", SECRET, Algorithm::HS256).is_err());
        assert!(validate_token("", SECRET, Algorithm::HS256).is_err());
        assert!(validate_token("a.b.c", SECRET, Algorithm::HS256).is_err());
    }

    #[test]
    fn test_validate_token_is_kind_agnostic() {
        // Both kinds pass the plain validation path.
        for kind in [TokenKind::Access, TokenKind::Refresh] {
            let token = create_token(&sample_claims(kind), SECRET, Algorithm::HS256).unwrap();
            let validated = validate_token(&token, SECRET, Algorithm::HS256).unwrap();
            assert_eq!(validated.kind, kind);
        }
    }

    #[test]
    fn test_access_wrapper_rejects_refresh() {
        let refresh = create_token(&sample_claims(TokenKind::Refresh), SECRET, Algorithm::HS256).unwrap();
        let result = validate_access_token(&refresh, SECRET, Algorithm::HS256);
        assert!(matches!(result, Err(JwtError::WrongKind { .. })));

        let access = create_token(&sample_claims(TokenKind::Access), SECRET, Algorithm::HS256).unwrap();
        assert!(validate_access_token(&access, SECRET, Algorithm::HS256).is_ok());
    }

    #[test]
    fn test_refresh_wrapper_rejects_access() {
        let access = create_token(&sample_claims(TokenKind::Access), SECRET, Algorithm::HS256).unwrap();
        let result = validate_refresh_token(&access, SECRET, Algorithm::HS256);
        assert!(matches!(result, Err(JwtError::WrongKind { .. })));

        let refresh = create_token(&sample_claims(TokenKind::Refresh), SECRET, Algorithm::HS256).unwrap();
        assert!(validate_refresh_token(&refresh, SECRET, Algorithm::HS256).is_ok());
    }

    #[test]
    fn test_wire_format_type_claim() {
        let access = sample_claims(TokenKind::Access);
        let refresh = sample_claims(TokenKind::Refresh);

        let access_json = serde_json::to_value(&access).unwrap();
        let refresh_json = serde_json::to_value(&refresh).unwrap();

        // The `type` claim only appears on refresh tokens.
        assert!(access_json.get("type").is_none());
        assert_eq!(refresh_json["type"], "refresh");
    }

    #[test]
    fn test_missing_type_claim_decodes_as_access() {
        let json = serde_json::json!({
            "sub": "user@example.com",
            "user_id": Uuid::new_v4(),
            "exp": (Utc::now() + Duration::minutes(5)).timestamp(),
        });

        let claims: Claims = serde_json::from_value(json).unwrap();
        assert_eq!(claims.kind, TokenKind::Access);
    }
}
