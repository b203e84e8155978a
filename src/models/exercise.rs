use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

/// A named movement that sets refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    /// The unique identifier for the exercise.
    pub id: Uuid,
    /// The display name, already trimmed.
    pub name: String,
    /// An optional free-text description.
    pub description: Option<String>,
}

impl From<&Row> for Exercise {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
        }
    }
}
