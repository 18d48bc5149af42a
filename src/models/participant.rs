use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

use super::require_text;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub name: String,
    pub email: String,
    pub is_confirmed: bool,
}

impl Participant {
    /// An unconfirmed invitee whose name defaults to the email's local part.
    pub fn invited(trip_id: Uuid, email: String) -> Self {
        let name = email
            .split_once('@')
            .map(|(local, _)| local.to_string())
            .unwrap_or_else(|| email.clone());
        Self {
            id: Uuid::new_v4(),
            trip_id,
            name,
            email,
            is_confirmed: false,
        }
    }

    pub fn confirm(&mut self, name: String) {
        self.name = name;
        self.is_confirmed = true;
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvitePayload {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantConfirmPayload {
    pub name: String,
}

impl ParticipantConfirmPayload {
    pub fn name(&self) -> Result<String, AppError> {
        require_text("name", &self.name)
    }
}

/// Trims and validates an address: non-empty local part, dotted domain, no
/// whitespace.
pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim();
    let invalid = || AppError::bad_request(format!("invalid email address: {email:?}"));
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let dotted = domain.split('.').all(|label| !label.is_empty());
    if !dotted || !domain.contains('.') {
        return Err(invalid());
    }
    Ok(email.to_string())
}

/// Validates a list of invitees, collapsing case-insensitive duplicates while
/// keeping first-seen order.
pub fn normalize_invites(raw: &[String]) -> Result<Vec<String>, AppError> {
    let mut emails: Vec<String> = Vec::with_capacity(raw.len());
    for entry in raw {
        let email = normalize_email(entry)?;
        if !emails.iter().any(|seen| seen.eq_ignore_ascii_case(&email)) {
            emails.push(email);
        }
    }
    Ok(emails)
}
