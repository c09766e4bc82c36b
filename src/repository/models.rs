//! Persisted entities.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// A product row in the `product` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Product {
    /// New product with a generated id and both timestamps set to now.
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_micros();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = now_micros();
    }
}

// PostgreSQL keeps microseconds; truncate so stored and in-memory values compare equal.
fn now_micros() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now - time::Duration::nanoseconds(i64::from(now.nanosecond() % 1_000))
}
