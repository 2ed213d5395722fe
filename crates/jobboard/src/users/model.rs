use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Roles controlling what the auth layer lets an account do. Spelling of
/// `employeer` matches the stored data and the public API contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "employeer")]
    Employer,
    #[serde(rename = "admin")]
    Admin,
}

/// A stored account. Credentials live with the auth service; this record
/// only carries what the directory endpoints expose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}
