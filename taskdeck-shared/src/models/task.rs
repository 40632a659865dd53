/// Task model and database operations
///
/// Tasks belong to exactly one user and every query here is ownership
/// scoped: point lookups bind `(id, user_id)`, listings and aggregations
/// bind `user_id`. A task owned by someone else therefore comes back as
/// `None`/empty — indistinguishable from a task that does not exist.
///
/// # Status / completed_at invariant
///
/// `completed_at` is set when an update transitions `status` to
/// `completed`, and cleared when an update transitions it back to `todo` or
/// `in_progress`. Creation never sets it.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'completed');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(200) NOT NULL,
///     description VARCHAR(1000),
///     status task_status NOT NULL DEFAULT 'todo',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     completed_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Done; the only status that carries a `completed_at` instant
    Completed,
}

impl TaskStatus {
    /// Status as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Priority as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Task row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task id
    pub id: Uuid,

    /// Owning user; immutable after creation
    pub user_id: Uuid,

    /// Title, 1–200 characters
    pub title: String,

    /// Optional free-form description, up to 1000 characters
    pub description: Option<String>,

    /// Workflow status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Optional due instant
    pub due_date: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,

    /// Set while status is `completed`, otherwise NULL
    pub completed_at: Option<DateTime<Utc>>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
}

/// Input for updating a task
///
/// Only non-None fields are written; a status change drives the
/// `completed_at` transition.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
}

impl UpdateTask {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

/// Per-user task statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStats {
    /// Total number of tasks
    pub total: i64,

    /// Tasks still to do
    pub todo: i64,

    /// Tasks in progress
    pub in_progress: i64,

    /// Completed tasks
    pub completed: i64,

    /// Counts per priority
    pub by_priority: PriorityBreakdown,

    /// completed / total as a percentage, rounded to 2 decimals
    pub completion_rate: f64,
}

/// Task counts grouped by priority
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
}

/// Raw grouped counts as the aggregation query returns them
#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    total: i64,
    todo: i64,
    in_progress: i64,
    completed: i64,
    low: i64,
    medium: i64,
    high: i64,
}

impl From<StatsRow> for TaskStats {
    fn from(row: StatsRow) -> Self {
        let completion_rate = if row.total > 0 {
            (row.completed as f64 / row.total as f64 * 100.0 * 100.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            total: row.total,
            todo: row.todo,
            in_progress: row.in_progress,
            completed: row.completed,
            by_priority: PriorityBreakdown {
                low: row.low,
                medium: row.medium,
                high: row.high,
            },
            completion_rate,
        }
    }
}

const TASK_COLUMNS: &str =
    "id, user_id, title, description, status, priority, due_date, created_at, updated_at, completed_at";

impl Task {
    /// Creates a task owned by `owner_id`
    ///
    /// `completed_at` starts NULL regardless of the initial status; only an
    /// update transition sets it.
    pub async fn create(
        pool: &PgPool,
        owner_id: Uuid,
        data: CreateTask,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (user_id, title, description, status, priority, due_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(owner_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date)
        .fetch_one(pool)
        .await
    }

    /// Finds a task by id, scoped to its owner
    ///
    /// Returns `None` when the task does not exist OR belongs to someone
    /// else; the two cases are indistinguishable to the caller.
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2",
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
    }

    /// Lists an owner's tasks, newest first, optionally filtered by status
    pub async fn list(
        pool: &PgPool,
        owner_id: Uuid,
        status: Option<TaskStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_as::<_, Task>(&format!(
                    r#"
                    SELECT {TASK_COLUMNS}
                    FROM tasks
                    WHERE user_id = $1 AND status = $2
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    "#,
                ))
                .bind(owner_id)
                .bind(status)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Task>(&format!(
                    r#"
                    SELECT {TASK_COLUMNS}
                    FROM tasks
                    WHERE user_id = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                ))
                .bind(owner_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await
            }
        }
    }

    /// Updates a task, scoped to its owner
    ///
    /// Only non-None fields are written. A status change also writes
    /// `completed_at`: NOW() when moving to `completed`, NULL when moving to
    /// `todo` or `in_progress`.
    ///
    /// # Returns
    ///
    /// The updated task, or `None` for a missing or foreign task.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(pool, id, owner_id).await;
        }

        // Build the SET list from whichever fields are present; $1/$2 are
        // reserved for the ownership scope.
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if let Some(status) = data.status {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));

            if status == TaskStatus::Completed {
                query.push_str(", completed_at = NOW()");
            } else {
                query.push_str(", completed_at = NULL");
            }
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND user_id = $2 RETURNING {TASK_COLUMNS}",
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(owner_id);

        // Binds must follow the same order the placeholders were numbered.
        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a task, scoped to its owner
    ///
    /// # Returns
    ///
    /// True when a row was removed; false for missing or foreign tasks.
    pub async fn delete(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts an owner's tasks, optionally filtered by status
    pub async fn count(
        pool: &PgPool,
        owner_id: Uuid,
        status: Option<TaskStatus>,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = match status {
            Some(status) => {
                sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = $1 AND status = $2")
                    .bind(owner_id)
                    .bind(status)
                    .fetch_one(pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
                    .bind(owner_id)
                    .fetch_one(pool)
                    .await?
            }
        };

        Ok(count)
    }

    /// Grouped statistics over an owner's tasks
    ///
    /// One round-trip: status and priority counts come from the same scan,
    /// the completion rate is derived afterwards.
    pub async fn stats(pool: &PgPool, owner_id: Uuid) -> Result<TaskStats, sqlx::Error> {
        let row: StatsRow = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'todo') AS todo,
                COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                COUNT(*) FILTER (WHERE priority = 'low') AS low,
                COUNT(*) FILTER (WHERE priority = 'medium') AS medium,
                COUNT(*) FILTER (WHERE priority = 'high') AS high
            FROM tasks
            WHERE user_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        Ok(TaskStats::from(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_value(TaskStatus::Todo).unwrap(), "todo");
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            "in_progress"
        );
        assert_eq!(
            serde_json::to_value(TaskStatus::Completed).unwrap(),
            "completed"
        );

        let status: TaskStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, TaskStatus::InProgress);
    }

    #[test]
    fn test_priority_wire_names() {
        assert_eq!(serde_json::to_value(TaskPriority::Low).unwrap(), "low");
        assert_eq!(serde_json::to_value(TaskPriority::Medium).unwrap(), "medium");
        assert_eq!(serde_json::to_value(TaskPriority::High).unwrap(), "high");
    }

    #[test]
    fn test_update_task_is_empty() {
        assert!(UpdateTask::default().is_empty());
        assert!(!UpdateTask {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn test_stats_completion_rate() {
        // 3 todo + 2 in_progress + 5 completed => 50%.
        let stats = TaskStats::from(StatsRow {
            total: 10,
            todo: 3,
            in_progress: 2,
            completed: 5,
            low: 4,
            medium: 4,
            high: 2,
        });

        assert_eq!(stats.total, 10);
        assert_eq!(stats.todo, 3);
        assert_eq!(stats.in_progress, 2);
        assert_eq!(stats.completed, 5);
        assert_eq!(stats.completion_rate, 50.0);
        assert_eq!(stats.by_priority.low, 4);
    }

    #[test]
    fn test_stats_completion_rate_rounds_to_two_decimals() {
        let stats = TaskStats::from(StatsRow {
            total: 3,
            todo: 2,
            in_progress: 0,
            completed: 1,
            low: 0,
            medium: 3,
            high: 0,
        });

        assert_eq!(stats.completion_rate, 33.33);
    }

    #[test]
    fn test_stats_empty_set_has_zero_rate() {
        let stats = TaskStats::from(StatsRow {
            total: 0,
            todo: 0,
            in_progress: 0,
            completed: 0,
            low: 0,
            medium: 0,
            high: 0,
        });

        assert_eq!(stats.total, 0);
        assert_eq!(stats.completion_rate, 0.0);
    }
}
