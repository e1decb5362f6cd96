//! Authenticated user session.

use serde::{Deserialize, Serialize};

use ciclo_core::{Email, UserId};

/// The authenticated user record returned by the login and register
/// endpoints and persisted to durable client storage.
///
/// A session is never mutated in place: login and profile updates replace
/// it wholesale, logout removes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    /// Backend-assigned user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
    /// Bearer token for authenticated backend calls (30-day expiry).
    pub token: String,
    /// Whether the user has administrative privileges.
    pub is_admin: bool,
}
