use serde::{Deserialize, Serialize};

/// Administrator account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Argon2 PHC string, never serialized out.
    #[serde(skip_serializing, default)]
    pub password: String,
    pub access_level: i64,
    pub created_at: String,
    pub updated_at: String,
}
