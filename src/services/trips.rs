use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        activity::{Activity, ActivityPayload},
        link::{Link, LinkPayload},
        participant::{normalize_email, normalize_invites, Participant},
        trip::{Trip, TripDetails, TripPayload},
    },
    repository::{ActivityRepository, LinkRepository, ParticipantRepository, TripRepository},
    services::mail::Notifier,
};

/// Trip lifecycle orchestration: creation with invitees, confirmation with
/// notification fan-out, and the trip-scoped child records.
#[derive(Clone)]
pub struct TripService {
    trips: Arc<dyn TripRepository>,
    participants: Arc<dyn ParticipantRepository>,
    activities: Arc<dyn ActivityRepository>,
    links: Arc<dyn LinkRepository>,
    notifier: Arc<dyn Notifier>,
}

impl TripService {
    pub fn new<S>(store: Arc<S>, notifier: Arc<dyn Notifier>) -> Self
    where
        S: TripRepository + ParticipantRepository + ActivityRepository + LinkRepository + 'static,
    {
        Self {
            trips: store.clone(),
            participants: store.clone(),
            activities: store.clone(),
            links: store,
            notifier,
        }
    }

    async fn require_trip(&self, id: Uuid) -> Result<Trip, AppError> {
        self.trips.find_trip(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn create_trip(&self, payload: TripPayload) -> Result<Uuid, AppError> {
        let details = TripDetails::try_from(&payload)?;
        let emails = normalize_invites(&payload.emails_to_invite)?;

        let trip = Trip::new(details);
        let invitees: Vec<Participant> = emails
            .into_iter()
            .map(|email| Participant::invited(trip.id, email))
            .collect();

        self.trips
            .create_trip_with_participants(&trip, &invitees)
            .await?;
        info!(
            trip_id = %trip.id,
            destination = %trip.destination,
            invited = invitees.len(),
            "trip created"
        );
        Ok(trip.id)
    }

    pub async fn get_trip(&self, id: Uuid) -> Result<Trip, AppError> {
        self.require_trip(id).await
    }

    pub async fn update_trip(&self, id: Uuid, payload: TripPayload) -> Result<Trip, AppError> {
        let mut trip = self.require_trip(id).await?;
        trip.apply(TripDetails::try_from(&payload)?);
        self.trips.save_trip(&trip).await?;
        info!(trip_id = %trip.id, "trip updated");
        Ok(trip)
    }

    /// Marks the trip confirmed and mails every participant. Repeated calls
    /// repeat the fan-out.
    pub async fn confirm_trip(&self, id: Uuid) -> Result<Trip, AppError> {
        let mut trip = self.require_trip(id).await?;
        trip.is_confirmed = true;
        self.trips.save_trip(&trip).await?;
        info!(trip_id = %trip.id, "trip confirmed");

        let participants = self.participants.list_participants(trip.id).await?;
        self.notifier
            .send_trip_confirmation(&trip, &participants)
            .await?;
        Ok(trip)
    }

    pub async fn invite_participant(&self, id: Uuid, email: &str) -> Result<Participant, AppError> {
        let trip = self.require_trip(id).await?;
        let participant = Participant::invited(trip.id, normalize_email(email)?);
        self.participants.save_participant(&participant).await?;
        info!(trip_id = %trip.id, participant_id = %participant.id, "participant invited");

        if trip.is_confirmed {
            self.notifier
                .send_trip_confirmation(&trip, std::slice::from_ref(&participant))
                .await?;
        }
        Ok(participant)
    }

    pub async fn confirm_participant(
        &self,
        participant_id: Uuid,
        name: String,
    ) -> Result<Participant, AppError> {
        let mut participant = self
            .participants
            .find_participant(participant_id)
            .await?
            .ok_or(AppError::NotFound)?;
        participant.confirm(name);
        self.participants.save_participant(&participant).await?;
        info!(participant_id = %participant.id, "participant confirmed");
        Ok(participant)
    }

    pub async fn list_participants(&self, id: Uuid) -> Result<Vec<Participant>, AppError> {
        let trip = self.require_trip(id).await?;
        self.participants.list_participants(trip.id).await
    }

    pub async fn register_activity(
        &self,
        id: Uuid,
        payload: ActivityPayload,
    ) -> Result<Activity, AppError> {
        let trip = self.require_trip(id).await?;
        let activity = payload.into_activity(trip.id)?;
        self.activities.save_activity(&activity).await?;
        Ok(activity)
    }

    pub async fn list_activities(&self, id: Uuid) -> Result<Vec<Activity>, AppError> {
        let trip = self.require_trip(id).await?;
        self.activities.list_activities(trip.id).await
    }

    pub async fn register_link(&self, id: Uuid, payload: LinkPayload) -> Result<Link, AppError> {
        let trip = self.require_trip(id).await?;
        let link = payload.into_link(trip.id)?;
        self.links.save_link(&link).await?;
        Ok(link)
    }

    pub async fn list_links(&self, id: Uuid) -> Result<Vec<Link>, AppError> {
        let trip = self.require_trip(id).await?;
        self.links.list_links(trip.id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        db::{init_pool, run_migrations},
        services::storage::StorageService,
    };

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_trip_confirmation(
            &self,
            _trip: &Trip,
            participants: &[Participant],
        ) -> Result<Vec<String>, AppError> {
            let emails: Vec<String> = participants.iter().map(|p| p.email.clone()).collect();
            self.sent.lock().unwrap().extend(emails.iter().cloned());
            Ok(emails)
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send_trip_confirmation(
            &self,
            _trip: &Trip,
            _participants: &[Participant],
        ) -> Result<Vec<String>, AppError> {
            Err(AppError::Notification("mail relay unreachable".into()))
        }
    }

    async fn service_with(notifier: Arc<dyn Notifier>) -> (TripService, TempDir) {
        let root = TempDir::new().expect("temp dir");
        let url = format!("sqlite://{}", root.path().join("trips.sqlite").to_string_lossy());
        let pool = init_pool(&url).await.expect("pool");
        run_migrations(&pool).await.expect("migrations");
        let store = Arc::new(StorageService::new(pool));
        (TripService::new(store, notifier), root)
    }

    fn paris(emails: &[&str]) -> TripPayload {
        TripPayload {
            destination: "Paris".into(),
            starts_at: "2024-06-01T00:00:00".into(),
            ends_at: "2024-06-10T00:00:00".into(),
            emails_to_invite: emails.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn create_trip_registers_invitees() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (service, _root) = service_with(notifier.clone()).await;

        let id = service
            .create_trip(paris(&["a@x.com", "b@x.com"]))
            .await
            .unwrap();

        let trip = service.get_trip(id).await.unwrap();
        assert_eq!(trip.destination, "Paris");
        assert!(!trip.is_confirmed);

        let participants = service.list_participants(id).await.unwrap();
        let emails: Vec<&str> = participants.iter().map(|p| p.email.as_str()).collect();
        assert_eq!(emails, ["a@x.com", "b@x.com"]);
        assert!(participants.iter().all(|p| !p.is_confirmed));
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn invalid_invite_aborts_creation() {
        let (service, _root) = service_with(Arc::new(RecordingNotifier::default())).await;
        let err = service
            .create_trip(paris(&["a@x.com", "not-an-email"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn update_keeps_confirmation_and_participants() {
        let (service, _root) = service_with(Arc::new(RecordingNotifier::default())).await;
        let id = service.create_trip(paris(&["a@x.com"])).await.unwrap();
        service.confirm_trip(id).await.unwrap();

        let mut update = paris(&[]);
        update.destination = "Lyon".into();
        let trip = service.update_trip(id, update).await.unwrap();
        assert_eq!(trip.destination, "Lyon");
        assert!(trip.is_confirmed);
        assert_eq!(service.list_participants(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn confirming_twice_notifies_twice() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (service, _root) = service_with(notifier.clone()).await;
        let id = service
            .create_trip(paris(&["a@x.com", "b@x.com"]))
            .await
            .unwrap();

        assert!(service.confirm_trip(id).await.unwrap().is_confirmed);
        assert!(service.confirm_trip(id).await.unwrap().is_confirmed);
        assert_eq!(notifier.sent().len(), 4);
    }

    #[tokio::test]
    async fn invite_notifies_only_when_confirmed() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (service, _root) = service_with(notifier.clone()).await;
        let id = service.create_trip(paris(&["a@x.com"])).await.unwrap();

        service.invite_participant(id, "early@x.com").await.unwrap();
        assert!(notifier.sent().is_empty());

        service.confirm_trip(id).await.unwrap();
        let before = notifier.sent().len();
        let late = service.invite_participant(id, "late@x.com").await.unwrap();
        assert!(!late.is_confirmed);
        assert_eq!(notifier.sent()[before..], ["late@x.com".to_string()]);
    }

    #[tokio::test]
    async fn missing_trip_is_not_found_everywhere() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (service, _root) = service_with(notifier.clone()).await;
        let existing = service.create_trip(paris(&[])).await.unwrap();
        let id = Uuid::new_v4();
        assert!(matches!(service.get_trip(id).await, Err(AppError::NotFound)));
        assert!(matches!(service.confirm_trip(id).await, Err(AppError::NotFound)));
        assert!(matches!(
            service.invite_participant(id, "a@x.com").await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(service.list_links(id).await, Err(AppError::NotFound)));
        assert!(matches!(
            service.list_activities(id).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            service.update_trip(id, paris(&[])).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            service.list_participants(id).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            service
                .register_activity(
                    id,
                    ActivityPayload {
                        title: "Louvre".into(),
                        occurs_at: "2024-06-02T10:00:00".into(),
                    },
                )
                .await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            service
                .register_link(
                    id,
                    LinkPayload {
                        title: "Hotel".into(),
                        url: "https://hotel.example.com".into(),
                    },
                )
                .await,
            Err(AppError::NotFound)
        ));

        let untouched = service.get_trip(existing).await.unwrap();
        assert!(!untouched.is_confirmed);
        assert!(service.list_participants(existing).await.unwrap().is_empty());
        assert!(service.list_activities(existing).await.unwrap().is_empty());
        assert!(service.list_links(existing).await.unwrap().is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn notification_failure_fails_confirm_after_persisting() {
        let (service, _root) = service_with(Arc::new(FailingNotifier)).await;
        let id = service.create_trip(paris(&["a@x.com"])).await.unwrap();

        let err = service.confirm_trip(id).await.unwrap_err();
        assert!(matches!(err, AppError::Notification(_)));
        assert!(service.get_trip(id).await.unwrap().is_confirmed);
    }

    #[tokio::test]
    async fn activities_and_links_are_scoped_to_trip() {
        let (service, _root) = service_with(Arc::new(RecordingNotifier::default())).await;
        let id = service.create_trip(paris(&[])).await.unwrap();
        let other = service.create_trip(paris(&[])).await.unwrap();

        service
            .register_activity(
                id,
                ActivityPayload {
                    title: "Louvre".into(),
                    occurs_at: "2024-06-02T10:00:00".into(),
                },
            )
            .await
            .unwrap();
        service
            .register_link(
                id,
                LinkPayload {
                    title: "Hotel".into(),
                    url: "https://hotel.example.com/booking".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(service.list_activities(id).await.unwrap().len(), 1);
        assert_eq!(service.list_links(id).await.unwrap().len(), 1);
        assert!(service.list_activities(other).await.unwrap().is_empty());
        assert!(service.list_links(other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn confirm_participant_sets_name() {
        let (service, _root) = service_with(Arc::new(RecordingNotifier::default())).await;
        let id = service.create_trip(paris(&[])).await.unwrap();
        let invited = service.invite_participant(id, "ana@x.com").await.unwrap();

        let confirmed = service
            .confirm_participant(invited.id, "Ana Souza".into())
            .await
            .unwrap();
        assert!(confirmed.is_confirmed);
        assert_eq!(confirmed.name, "Ana Souza");
        assert!(matches!(
            service.confirm_participant(Uuid::new_v4(), "x".into()).await,
            Err(AppError::NotFound)
        ));
    }
}
