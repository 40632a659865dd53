/// Task management endpoints
///
/// Every handler takes the authenticated principal from the bearer gate and
/// passes its id into the store, so each query is ownership-scoped before it
/// runs. A task belonging to someone else surfaces as `404 Not Found`, never
/// as a forbidden class.
///
/// # Endpoints
///
/// - `POST /api/v1/tasks` — create
/// - `GET /api/v1/tasks?status=&skip=&limit=` — list, newest first
/// - `GET /api/v1/tasks/stats` — grouped statistics
/// - `GET /api/v1/tasks/:task_id` — fetch one
/// - `PUT /api/v1/tasks/:task_id` — partial update
/// - `PATCH /api/v1/tasks/:task_id/status?new_status=` — status only
/// - `GET /api/v1/tasks/status/:status` — listing shorthand
/// - `DELETE /api/v1/tasks/:task_id` — delete

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
use chrono::{DateTime, Utc};
use serde::Deserialize;
use taskdeck_shared::{
    auth::middleware::CurrentUser,
    models::task::{CreateTask, Task, TaskPriority, TaskStats, TaskStatus, UpdateTask},
};
use uuid::Uuid;
use validator::Validate;

/// Task creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Optional description
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    /// Initial status (defaults to `todo`)
    pub status: Option<TaskStatus>,

    /// Priority (defaults to `medium`)
    pub priority: Option<TaskPriority>,

    /// Optional due instant
    pub due_date: Option<DateTime<Utc>>,
}

/// Task update request; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    pub due_date: Option<DateTime<Utc>>,
}

/// Listing query parameters
#[derive(Debug, Deserialize)]
pub struct ListTasksParams {
    /// Optional status filter
    pub status: Option<TaskStatus>,

    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Pagination-only query parameters
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Status-change query parameter for the PATCH shorthand
#[derive(Debug, Deserialize)]
pub struct StatusChangeParams {
    pub new_status: TaskStatus,
}

/// Create a task owned by the current user
pub async fn create_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    let task = Task::create(
        &state.db,
        user.id,
        CreateTask {
            title: req.title,
            description: req.description,
            status: req.status.unwrap_or(TaskStatus::Todo),
            priority: req.priority.unwrap_or(TaskPriority::Medium),
            due_date: req.due_date,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// List the current user's tasks
///
/// Optional status filter, newest first, paginated with skip/limit.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<ListTasksParams>,
) -> ApiResult<Json<Vec<Task>>> {
    let (skip, limit) = pagination(params.skip, params.limit)?;

    let tasks = Task::list(&state.db, user.id, params.status, limit, skip).await?;

    Ok(Json(tasks))
}

/// Grouped statistics over the current user's tasks
pub async fn task_stats(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<TaskStats>> {
    let stats = Task::stats(&state.db, user.id).await?;

    Ok(Json(stats))
}

/// Fetch one task
///
/// # Errors
///
/// - `404 Not Found`: missing, or owned by someone else
pub async fn get_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id(&state.db, task_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Update a task
///
/// A status change drives the `completed_at` transition: set on moving to
/// `completed`, cleared on moving back to `todo` or `in_progress`.
///
/// # Errors
///
/// - `404 Not Found`: missing, or owned by someone else
pub async fn update_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = Task::update(
        &state.db,
        task_id,
        user.id,
        UpdateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date: req.due_date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Status-only update shorthand
///
/// # Errors
///
/// - `404 Not Found`: missing, or owned by someone else
pub async fn update_task_status(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
    Query(params): Query<StatusChangeParams>,
) -> ApiResult<Json<Task>> {
    let task = Task::update(
        &state.db,
        task_id,
        user.id,
        UpdateTask {
            status: Some(params.new_status),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// List tasks in a fixed status
pub async fn tasks_by_status(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(status): Path<TaskStatus>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Vec<Task>>> {
    let (skip, limit) = pagination(params.skip, params.limit)?;

    let tasks = Task::list(&state.db, user.id, Some(status), limit, skip).await?;

    Ok(Json(tasks))
}

/// Delete a task
///
/// # Errors
///
/// - `404 Not Found`: missing, or owned by someone else
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !Task::delete(&state.db, task_id, user.id).await? {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
