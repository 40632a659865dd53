/// Database models for Taskdeck
///
/// Records are fixed structs validated once at the store boundary; every
/// query lives next to the struct it returns.
///
/// # Models
///
/// - `user`: principal accounts and credential storage
/// - `task`: per-user task records, filtering, and statistics

pub mod task;
pub mod user;
