use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

use super::{parse_timestamp, require_text};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Activity {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub title: String,
    pub occurs_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityPayload {
    pub title: String,
    pub occurs_at: String,
}

impl ActivityPayload {
    pub fn into_activity(self, trip_id: Uuid) -> Result<Activity, AppError> {
        Ok(Activity {
            id: Uuid::new_v4(),
            trip_id,
            title: require_text("title", &self.title)?,
            occurs_at: parse_timestamp("occurs_at", &self.occurs_at)?,
        })
    }
}
