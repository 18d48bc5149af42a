//! Persistence ports used by the trip services.
//!
//! Each trait covers one aggregate's find/save/list needs. The SQLite adapter
//! lives in [`crate::services::storage`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{activity::Activity, link::Link, participant::Participant, trip::Trip},
};

#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn find_trip(&self, id: Uuid) -> Result<Option<Trip>, AppError>;

    /// Inserts the trip or overwrites an existing row with the same id.
    async fn save_trip(&self, trip: &Trip) -> Result<(), AppError>;

    /// Persists a new trip together with its invitees as one unit of work.
    async fn create_trip_with_participants(
        &self,
        trip: &Trip,
        participants: &[Participant],
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    async fn find_participant(&self, id: Uuid) -> Result<Option<Participant>, AppError>;

    async fn save_participant(&self, participant: &Participant) -> Result<(), AppError>;

    /// Participants of a trip in insertion order.
    async fn list_participants(&self, trip_id: Uuid) -> Result<Vec<Participant>, AppError>;
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn save_activity(&self, activity: &Activity) -> Result<(), AppError>;

    async fn list_activities(&self, trip_id: Uuid) -> Result<Vec<Activity>, AppError>;
}

#[async_trait]
pub trait LinkRepository: Send + Sync {
    async fn save_link(&self, link: &Link) -> Result<(), AppError>;

    async fn list_links(&self, trip_id: Uuid) -> Result<Vec<Link>, AppError>;
}
