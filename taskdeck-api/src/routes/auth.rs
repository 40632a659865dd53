/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/v1/auth/register` — register a new user, returns tokens
/// - `POST /api/v1/auth/login` — verify credentials, returns tokens
/// - `POST /api/v1/auth/refresh` — exchange a refresh token for a new pair
///
/// All three return the same shape: an access token (configured TTL), a
/// refresh token (7 days), and the public user.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{
        jwt::{self, Claims, TokenKind},
        password,
    },
    models::user::{CreateUser, PublicUser, User},
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Display name
    #[validate(length(min = 2, max = 100, message = "Full name must be 2-100 characters"))]
    pub full_name: String,

    /// Password
    #[validate(length(min = 6, max = 100, message = "Password must be 6-100 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token issued by register/login/refresh
    pub refresh_token: String,
}

/// Token pair response
#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    /// Access token (configured TTL, 30 minutes by default)
    pub access_token: String,

    /// Refresh token (7 days)
    pub refresh_token: String,

    /// Always "bearer"
    pub token_type: String,

    /// The authenticated user, public shape
    pub user: PublicUser,
}

fn issue_token_pair(state: &AppState, user: &User) -> Result<TokenPairResponse, ApiError> {
    let access_claims = Claims::with_expiration(
        user.email.clone(),
        user.id,
        TokenKind::Access,
        state.access_token_ttl(),
    );
    let refresh_claims = Claims::new(user.email.clone(), user.id, TokenKind::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret(), state.jwt_algorithm())?;
    let refresh_token =
        jwt::create_token(&refresh_claims, state.jwt_secret(), state.jwt_algorithm())?;

    Ok(TokenPairResponse {
        access_token,
        refresh_token,
        token_type: "bearer".to_string(),
        user: user.to_public(),
    })
}

/// Register a new user
///
/// # Errors
///
/// - `409 Conflict`: email already registered
/// - `422 Unprocessable Entity`: validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<TokenPairResponse>)> {
    req.validate()?;

    let hashed_password = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            full_name: req.full_name,
            hashed_password,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "registered new user");

    let response = issue_token_pair(&state, &user)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with email and password
///
/// Unknown email and wrong password answer with the same 401 — the response
/// does not reveal which half failed.
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or wrong password
/// - `400 Bad Request`: account is deactivated
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Incorrect email or password".to_string()))?;

    if !password::verify_password(&req.password, &user.hashed_password) {
        return Err(ApiError::Unauthorized(
            "Incorrect email or password".to_string(),
        ));
    }

    if !user.is_active {
        return Err(ApiError::BadRequest("Inactive user account".to_string()));
    }

    Ok(Json(issue_token_pair(&state, &user)?))
}

/// Exchange a refresh token for a new token pair
///
/// The token must be of the refresh kind; an access token on this path is
/// rejected. Both tokens are rotated on success.
///
/// # Errors
///
/// - `401 Unauthorized`: invalid/expired/wrong-kind token, or the subject
///   no longer exists or is inactive
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    let claims = jwt::validate_refresh_token(
        &req.refresh_token,
        state.jwt_secret(),
        state.jwt_algorithm(),
    )
    .map_err(|_| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

    let user = User::find_by_email(&state.db, &claims.sub)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| ApiError::Unauthorized("User not found or inactive".to_string()))?;

    Ok(Json(issue_token_pair(&state, &user)?))
}
