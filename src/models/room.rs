use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub room_name: String, // ⇔ rooms.room_name
    pub created_at: String,
    pub updated_at: String,
}

impl Room {
    pub fn new(id: i64, room_name: impl Into<String>) -> Self {
        let now = chrono::Local::now().to_rfc3339();
        Self {
            id,
            room_name: room_name.into(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
