use async_trait::async_trait;
use sqlx::{Sqlite, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{activity::Activity, link::Link, participant::Participant, trip::Trip},
    repository::{ActivityRepository, LinkRepository, ParticipantRepository, TripRepository},
};

/// SQLite-backed implementation of every repository port.
#[derive(Clone)]
pub struct StorageService {
    db: DbPool,
}

impl StorageService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

async fn insert_participant(
    tx: &mut Transaction<'_, Sqlite>,
    participant: &Participant,
) -> Result<(), AppError> {
    sqlx::query(
        r#"INSERT INTO participants (id, trip_id, name, email, is_confirmed)
           VALUES (?, ?, ?, ?, ?)
           ON CONFLICT(id) DO UPDATE SET
               name = excluded.name,
               email = excluded.email,
               is_confirmed = excluded.is_confirmed"#,
    )
    .bind(participant.id)
    .bind(participant.trip_id)
    .bind(&participant.name)
    .bind(&participant.email)
    .bind(participant.is_confirmed)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl TripRepository for StorageService {
    async fn find_trip(&self, id: Uuid) -> Result<Option<Trip>, AppError> {
        let trip = sqlx::query_as::<_, Trip>(
            "SELECT id, destination, starts_at, ends_at, is_confirmed FROM trips WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(trip)
    }

    async fn save_trip(&self, trip: &Trip) -> Result<(), AppError> {
        sqlx::query(
            r#"INSERT INTO trips (id, destination, starts_at, ends_at, is_confirmed)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   destination = excluded.destination,
                   starts_at = excluded.starts_at,
                   ends_at = excluded.ends_at,
                   is_confirmed = excluded.is_confirmed"#,
        )
        .bind(trip.id)
        .bind(&trip.destination)
        .bind(trip.starts_at)
        .bind(trip.ends_at)
        .bind(trip.is_confirmed)
        .execute(&self.db)
        .await?;
        debug!(trip_id = %trip.id, "trip saved");
        Ok(())
    }

    async fn create_trip_with_participants(
        &self,
        trip: &Trip,
        participants: &[Participant],
    ) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        sqlx::query(
            r#"INSERT INTO trips (id, destination, starts_at, ends_at, is_confirmed)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(trip.id)
        .bind(&trip.destination)
        .bind(trip.starts_at)
        .bind(trip.ends_at)
        .bind(trip.is_confirmed)
        .execute(&mut *tx)
        .await?;
        for participant in participants {
            insert_participant(&mut tx, participant).await?;
        }
        tx.commit().await?;
        debug!(
            trip_id = %trip.id,
            participants = participants.len(),
            "trip created with invitees"
        );
        Ok(())
    }
}

#[async_trait]
impl ParticipantRepository for StorageService {
    async fn find_participant(&self, id: Uuid) -> Result<Option<Participant>, AppError> {
        let participant = sqlx::query_as::<_, Participant>(
            "SELECT id, trip_id, name, email, is_confirmed FROM participants WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(participant)
    }

    async fn save_participant(&self, participant: &Participant) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        insert_participant(&mut tx, participant).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_participants(&self, trip_id: Uuid) -> Result<Vec<Participant>, AppError> {
        let items = sqlx::query_as::<_, Participant>(
            r#"SELECT id, trip_id, name, email, is_confirmed
               FROM participants WHERE trip_id = ? ORDER BY rowid"#,
        )
        .bind(trip_id)
        .fetch_all(&self.db)
        .await?;
        Ok(items)
    }
}

#[async_trait]
impl ActivityRepository for StorageService {
    async fn save_activity(&self, activity: &Activity) -> Result<(), AppError> {
        sqlx::query("INSERT INTO activities (id, trip_id, title, occurs_at) VALUES (?, ?, ?, ?)")
            .bind(activity.id)
            .bind(activity.trip_id)
            .bind(&activity.title)
            .bind(activity.occurs_at)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn list_activities(&self, trip_id: Uuid) -> Result<Vec<Activity>, AppError> {
        let items = sqlx::query_as::<_, Activity>(
            r#"SELECT id, trip_id, title, occurs_at
               FROM activities WHERE trip_id = ? ORDER BY rowid"#,
        )
        .bind(trip_id)
        .fetch_all(&self.db)
        .await?;
        Ok(items)
    }
}

#[async_trait]
impl LinkRepository for StorageService {
    async fn save_link(&self, link: &Link) -> Result<(), AppError> {
        sqlx::query("INSERT INTO links (id, trip_id, title, url) VALUES (?, ?, ?, ?)")
            .bind(link.id)
            .bind(link.trip_id)
            .bind(&link.title)
            .bind(&link.url)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn list_links(&self, trip_id: Uuid) -> Result<Vec<Link>, AppError> {
        let items = sqlx::query_as::<_, Link>(
            "SELECT id, trip_id, title, url FROM links WHERE trip_id = ? ORDER BY rowid",
        )
        .bind(trip_id)
        .fetch_all(&self.db)
        .await?;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{init_pool, run_migrations},
        models::trip::{TripDetails, TripPayload},
    };
    use tempfile::TempDir;

    async fn storage() -> (StorageService, TempDir) {
        let root = TempDir::new().expect("temp dir");
        let url = format!("sqlite://{}", root.path().join("test.sqlite").to_string_lossy());
        let pool = init_pool(&url).await.expect("pool");
        run_migrations(&pool).await.expect("migrations");
        (StorageService::new(pool), root)
    }

    fn trip() -> Trip {
        Trip::new(
            TripDetails::try_from(&TripPayload {
                destination: "Paris".into(),
                starts_at: "2024-06-01T00:00:00".into(),
                ends_at: "2024-06-10T00:00:00".into(),
                emails_to_invite: Vec::new(),
            })
            .expect("details"),
        )
    }

    #[tokio::test]
    async fn trip_round_trips_through_sqlite() {
        let (store, _root) = storage().await;
        let trip = trip();
        store.save_trip(&trip).await.unwrap();
        assert_eq!(store.find_trip(trip.id).await.unwrap(), Some(trip.clone()));
        assert_eq!(store.find_trip(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_trip_overwrites_existing_row() {
        let (store, _root) = storage().await;
        let mut trip = trip();
        store.save_trip(&trip).await.unwrap();
        trip.is_confirmed = true;
        trip.destination = "Rome".into();
        store.save_trip(&trip).await.unwrap();
        let stored = store.find_trip(trip.id).await.unwrap().unwrap();
        assert!(stored.is_confirmed);
        assert_eq!(stored.destination, "Rome");
    }

    #[tokio::test]
    async fn creation_rolls_back_when_a_participant_fails() {
        let (store, _root) = storage().await;
        let trip = trip();
        let ok = Participant::invited(trip.id, "a@x.com".into());
        let mut dangling = Participant::invited(trip.id, "b@x.com".into());
        dangling.trip_id = Uuid::new_v4();

        let result = store
            .create_trip_with_participants(&trip, &[ok, dangling])
            .await;
        assert!(result.is_err());
        assert_eq!(store.find_trip(trip.id).await.unwrap(), None);
        assert!(store.list_participants(trip.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn children_are_listed_in_insertion_order() {
        let (store, _root) = storage().await;
        let trip = trip();
        store.save_trip(&trip).await.unwrap();
        let emails = ["z@x.com", "a@x.com", "m@x.com"];
        for email in emails {
            store
                .save_participant(&Participant::invited(trip.id, email.into()))
                .await
                .unwrap();
        }
        let listed: Vec<String> = store
            .list_participants(trip.id)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.email)
            .collect();
        assert_eq!(listed, emails);
    }
}
