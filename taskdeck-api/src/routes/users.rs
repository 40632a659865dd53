/// User management endpoints
///
/// All routes here sit behind the bearer gate; handlers receive the
/// authenticated principal via `Extension<CurrentUser>` and only ever return
/// the public user shape.
///
/// # Endpoints
///
/// - `GET /api/v1/users/me` — current profile
/// - `PUT /api/v1/users/me` — update profile
/// - `POST /api/v1/users/me/password` — change password
/// - `DELETE /api/v1/users/me` — delete account
/// - `GET /api/v1/users` — paginated listing
/// - `GET /api/v1/users/:user_id` — profile by id

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::pagination,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskdeck_shared::{
    auth::{middleware::CurrentUser, password},
    models::user::{PublicUser, UpdateUser, User},
};
use uuid::Uuid;
use validator::Validate;

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeRequest {
    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New display name
    #[validate(length(min = 2, max = 100, message = "Full name must be 2-100 characters"))]
    pub full_name: Option<String>,

    /// Activate/deactivate the account
    pub is_active: Option<bool>,
}

/// Password change request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password, verified before anything is written
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub current_password: String,

    /// Replacement password
    #[validate(length(min = 6, max = 100, message = "Password must be 6-100 characters"))]
    pub new_password: String,
}

/// Listing query parameters
#[derive(Debug, Deserialize)]
pub struct ListUsersParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Current user's profile
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<PublicUser> {
    Json(user.to_public())
}

/// Update the current user's profile
///
/// # Errors
///
/// - `409 Conflict`: new email already registered
pub async fn update_me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<UpdateMeRequest>,
) -> ApiResult<Json<PublicUser>> {
    req.validate()?;

    let updated = User::update(
        &state.db,
        user.id,
        UpdateUser {
            email: req.email,
            full_name: req.full_name,
            is_active: req.is_active,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(updated.to_public()))
}

/// Change the current user's password
///
/// Verifies the current password before writing the new digest. Outstanding
/// tokens stay valid until their natural expiry.
///
/// # Errors
///
/// - `400 Bad Request`: current password is incorrect
pub async fn change_password(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    if !password::verify_password(&req.current_password, &user.hashed_password) {
        return Err(ApiError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = password::hash_password(&req.new_password)?;

    if !User::change_password(&state.db, user.id, &new_hash).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Delete the current user's account
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<StatusCode> {
    if !User::delete(&state.db, user.id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %user.id, "deleted user account");

    Ok(StatusCode::NO_CONTENT)
}

/// List users, newest first
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListUsersParams>,
) -> ApiResult<Json<Vec<PublicUser>>> {
    let (skip, limit) = pagination(params.skip, params.limit)?;

    let users = User::list(&state.db, limit, skip).await?;

    Ok(Json(users.iter().map(User::to_public).collect()))
}

/// Get a user by id
///
/// # Errors
///
/// - `404 Not Found`: no such user
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.to_public()))
}
