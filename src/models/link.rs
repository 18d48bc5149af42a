use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use uuid::Uuid;

use crate::error::AppError;

use super::require_text;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Link {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkPayload {
    pub title: String,
    pub url: String,
}

impl LinkPayload {
    pub fn into_link(self, trip_id: Uuid) -> Result<Link, AppError> {
        let title = require_text("title", &self.title)?;
        let raw = self.url.trim();
        let parsed =
            Url::parse(raw).map_err(|err| AppError::bad_request(format!("invalid url: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::bad_request("url must use http or https"));
        }
        Ok(Link {
            id: Uuid::new_v4(),
            trip_id,
            title,
            url: raw.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(url: &str) -> LinkPayload {
        LinkPayload {
            title: "Hotel booking".into(),
            url: url.into(),
        }
    }

    #[test]
    fn accepts_http_links() {
        let link = payload("https://booking.example.com/stay/42")
            .into_link(Uuid::new_v4())
            .unwrap();
        assert_eq!(link.url, "https://booking.example.com/stay/42");
    }

    #[test]
    fn keeps_url_as_submitted() {
        let link = payload(" https://a.example ").into_link(Uuid::new_v4()).unwrap();
        assert_eq!(link.url, "https://a.example");
    }

    #[test]
    fn rejects_relative_and_foreign_schemes() {
        assert!(payload("/stay/42").into_link(Uuid::new_v4()).is_err());
        assert!(payload("ftp://files.example.com").into_link(Uuid::new_v4()).is_err());
    }
}
