/// Authentication primitives for Taskdeck
///
/// This module provides everything between an inbound `Authorization`
/// header and an authenticated principal:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: signed, time-limited access and refresh tokens
/// - [`middleware`]: bearer-token authentication for Axum routers
///
/// # Security Properties
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Tokens**: HMAC-signed (HS256/384/512), expiry checked with zero leeway
/// - **Bearer capability**: possession of a valid token is authorization;
///   there is no server-side revocation list, so rotating the signing secret
///   is the only way to invalidate outstanding tokens early

pub mod jwt;
pub mod middleware;
pub mod password;
