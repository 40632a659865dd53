/// API route handlers
///
/// Organized by resource:
///
/// - `health`: service banner and health check
/// - `auth`: registration, login, token refresh
/// - `users`: profile management
/// - `tasks`: owner-scoped task CRUD and statistics

pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use crate::error::ApiError;

/// Normalizes skip/limit query parameters
///
/// Defaults: skip 0, limit 100. Skip must be non-negative; limit must be
/// between 1 and 100.
pub(crate) fn pagination(skip: Option<i64>, limit: Option<i64>) -> Result<(i64, i64), ApiError> {
    let skip = skip.unwrap_or(0);
    let limit = limit.unwrap_or(100);

    if skip < 0 {
        return Err(ApiError::BadRequest("skip must be non-negative".to_string()));
    }
    if !(1..=100).contains(&limit) {
        return Err(ApiError::BadRequest(
            "limit must be between 1 and 100".to_string(),
        ));
    }

    Ok((skip, limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        assert_eq!(pagination(None, None).unwrap(), (0, 100));
    }

    #[test]
    fn test_pagination_explicit_values() {
        assert_eq!(pagination(Some(20), Some(10)).unwrap(), (20, 10));
    }

    #[test]
    fn test_pagination_rejects_negative_skip() {
        assert!(pagination(Some(-1), None).is_err());
    }

    #[test]
    fn test_pagination_rejects_out_of_range_limit() {
        assert!(pagination(None, Some(0)).is_err());
        assert!(pagination(None, Some(101)).is_err());
        assert!(pagination(None, Some(100)).is_ok());
        assert!(pagination(None, Some(1)).is_ok());
    }
}
