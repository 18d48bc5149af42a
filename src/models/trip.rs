use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

use super::{parse_timestamp, require_text};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Trip {
    pub id: Uuid,
    pub destination: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub is_confirmed: bool,
}

impl Trip {
    pub fn new(details: TripDetails) -> Self {
        Self {
            id: Uuid::new_v4(),
            destination: details.destination,
            starts_at: details.starts_at,
            ends_at: details.ends_at,
            is_confirmed: false,
        }
    }

    pub fn apply(&mut self, details: TripDetails) {
        self.destination = details.destination;
        self.starts_at = details.starts_at;
        self.ends_at = details.ends_at;
    }
}

/// Body of `POST /trips` and `PUT /trips/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TripPayload {
    pub destination: String,
    pub starts_at: String,
    pub ends_at: String,
    #[serde(default)]
    pub emails_to_invite: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripCreated {
    pub id: Uuid,
}

/// Validated mutable fields of a trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripDetails {
    pub destination: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
}

impl TryFrom<&TripPayload> for TripDetails {
    type Error = AppError;

    fn try_from(payload: &TripPayload) -> Result<Self, Self::Error> {
        let destination = require_text("destination", &payload.destination)?;
        let starts_at = parse_timestamp("starts_at", &payload.starts_at)?;
        let ends_at = parse_timestamp("ends_at", &payload.ends_at)?;
        if starts_at > ends_at {
            return Err(AppError::bad_request("starts_at must not be after ends_at"));
        }
        Ok(Self {
            destination,
            starts_at,
            ends_at,
        })
    }
}
