/// Bearer-token authentication for Axum
///
/// Resolves an `Authorization: Bearer <token>` header into an authenticated,
/// active [`User`] and attaches it to the request extensions as
/// [`CurrentUser`]. The gate walks a fixed sequence of states per request:
///
/// 1. no header, or a scheme other than `Bearer` → missing credentials (401)
/// 2. token present → signature/algorithm/expiry/kind validation; any
///    failure → invalid token (401)
/// 3. token valid → principal lookup by the subject email; unknown → 401
/// 4. principal found → active check; inactive → 400 (deliberately distinct
///    from the unauthenticated class)
/// 5. authenticated → the downstream handler reads `Extension<CurrentUser>`
///
/// # Example
///
/// ```no_run
/// use axum::{Extension, Json, Router, routing::get};
/// use taskdeck_shared::auth::middleware::CurrentUser;
/// use taskdeck_shared::models::user::PublicUser;
///
/// async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<PublicUser> {
///     Json(user.to_public())
/// }
///
/// let app: Router = Router::new().route("/me", get(me));
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::Algorithm;
use sqlx::PgPool;

use super::jwt::{validate_access_token, JwtError};
use crate::models::user::User;

/// Authenticated principal attached to request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Error type for the authentication gate
///
/// Every non-success terminal is caller-visible and distinguishes
/// "unauthenticated" from "account state forbids access".
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header, or a non-Bearer scheme
    #[error("missing credentials")]
    MissingCredentials,

    /// Malformed, tampered, expired, or wrong-kind token
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token verified but no account matches its subject
    #[error("could not validate credentials")]
    UnknownUser,

    /// Account exists but is deactivated
    #[error("inactive user account")]
    InactiveAccount,

    /// Principal lookup failed; fatal for this request
    #[error("database error: {0}")]
    Database(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::UnknownUser => {
                (StatusCode::UNAUTHORIZED, "Could not validate credentials").into_response()
            }
            AuthError::InactiveAccount => {
                (StatusCode::BAD_REQUEST, "Inactive user account").into_response()
            }
            AuthError::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Extracts the bearer token from a header map
///
/// Absence and a malformed scheme are treated identically: `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Bearer authentication middleware
///
/// Wire it with `axum::middleware::from_fn_with_state`, closing over the
/// pool and token configuration from application state.
///
/// # Errors
///
/// - 401 for a missing/invalid/expired token or an unknown subject
/// - 400 for a deactivated account
/// - 500 when the principal lookup itself fails
pub async fn bearer_auth_middleware(
    pool: PgPool,
    secret: String,
    algorithm: Algorithm,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers()).ok_or(AuthError::MissingCredentials)?;

    // Kind-checked: a refresh token is not a bearer credential here.
    let claims = validate_access_token(token, &secret, algorithm).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        other => AuthError::InvalidToken(other.to_string()),
    })?;

    let user = User::find_by_email(&pool, &claims.sub)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?
        .ok_or(AuthError::UnknownUser)?;

    if !user.is_active {
        return Err(AuthError::InactiveAccount);
    }

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_authorization(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_missing_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        // A malformed scheme reads the same as no credential at all.
        let headers = headers_with_authorization("Basic dXNlcjpwYXNz");
        assert_eq!(bearer_token(&headers), None);

        let headers = headers_with_authorization("bearer lowercase-scheme");
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_bearer_token_extracts_value() {
        let headers = headers_with_authorization("Bearer some.jwt.token");
        assert_eq!(bearer_token(&headers), Some("some.jwt.token"));
    }

    #[test]
    fn test_bearer_token_empty_value() {
        // An empty bearer is extracted as an empty token and fails
        // validation downstream.
        let headers = headers_with_authorization("Bearer ");
        assert_eq!(bearer_token(&headers), Some(""));
    }

    #[test]
    fn test_error_status_classes() {
        assert_eq!(
            AuthError::MissingCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidToken("bad".to_string()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::UnknownUser.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        // Inactive is a distinct, non-401 class on purpose.
        assert_eq!(
            AuthError::InactiveAccount.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::Database("down".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
