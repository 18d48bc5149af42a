use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    config::{AppConfig, MailConfig},
    error::AppError,
    models::{participant::Participant, trip::Trip},
};

/// Outbound channel for trip confirmation messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one confirmation message per participant and returns the
    /// addresses that were handed to the transport.
    async fn send_trip_confirmation(
        &self,
        trip: &Trip,
        participants: &[Participant],
    ) -> Result<Vec<String>, AppError>;
}

#[derive(Debug, Clone)]
pub struct MailTemplates {
    pub confirmation_subject: String,
    pub confirmation_body: String,
}

impl Default for MailTemplates {
    fn default() -> Self {
        Self {
            confirmation_subject: "Your trip to {destination} is confirmed".into(),
            confirmation_body: "Hi {name}, the trip to {destination} from {starts_at} to {ends_at} has been confirmed. Confirm your spot at {confirm_url}".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Renders confirmation mails and hands them to the log-backed transport.
#[derive(Clone)]
pub struct MailService {
    config: MailConfig,
    base_url: String,
    templates: MailTemplates,
}

impl MailService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.mail.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            templates: MailTemplates::default(),
        }
    }

    pub fn compose(&self, trip: &Trip, participant: &Participant) -> MailMessage {
        MailMessage {
            from: self.config.from.clone(),
            to: participant.email.clone(),
            subject: self.render_template(&self.templates.confirmation_subject, trip, participant),
            body: self.render_template(&self.templates.confirmation_body, trip, participant),
        }
    }

    fn render_template(&self, template: &str, trip: &Trip, participant: &Participant) -> String {
        let confirm_url = format!("{}/participants/{}/confirm", self.base_url, participant.id);
        template
            .replace("{name}", &participant.name)
            .replace("{destination}", &trip.destination)
            .replace(
                "{starts_at}",
                &trip.starts_at.format("%d/%m/%Y %H:%M").to_string(),
            )
            .replace("{ends_at}", &trip.ends_at.format("%d/%m/%Y %H:%M").to_string())
            .replace("{confirm_url}", &confirm_url)
    }

    fn deliver(&self, message: &MailMessage) -> Result<(), AppError> {
        if message.to.trim().is_empty() {
            return Err(AppError::Notification("participant has no address".into()));
        }
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "confirmation mail sent"
        );
        Ok(())
    }
}

#[async_trait]
impl Notifier for MailService {
    async fn send_trip_confirmation(
        &self,
        trip: &Trip,
        participants: &[Participant],
    ) -> Result<Vec<String>, AppError> {
        if !self.config.enabled {
            warn!(trip_id = %trip.id, "mail disabled, skipping confirmation mails");
            return Ok(Vec::new());
        }
        if participants.is_empty() {
            warn!(trip_id = %trip.id, "no participants to notify");
            return Ok(Vec::new());
        }

        let mut notified = Vec::with_capacity(participants.len());
        for participant in participants {
            let message = self.compose(trip, participant);
            self.deliver(&message)?;
            notified.push(message.to);
        }
        info!(trip_id = %trip.id, targets = ?notified, "trip confirmation fan-out done");
        Ok(notified)
    }
}
