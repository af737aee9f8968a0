use crate::domain::id::UserId;
use serde::{Deserialize, Serialize};

/// Payload returned by a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    #[serde(default)]
    pub token: Option<String>,
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl LoginData {
    /// Splits the payload into the session token and the user snapshot
    pub fn into_parts(self) -> (Option<String>, SessionUser) {
        let user = SessionUser {
            user_id: self.user_id,
            username: self.username,
            email: self.email,
        };
        (self.token, user)
    }
}

/// The user snapshot kept alongside the token for the lifetime of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: UserId,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// An authenticated session. Token and user only ever exist together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}
