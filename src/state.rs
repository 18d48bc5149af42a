use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{
        mail::{MailService, Notifier},
        storage::StorageService,
        trips::TripService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub trips: TripService,
}

impl AppState {
    pub fn new(config: &AppConfig, db: DbPool) -> Self {
        let notifier = Arc::new(MailService::new(config));
        Self::with_notifier(db, notifier)
    }

    /// Wires the services against a caller-provided notification channel.
    pub fn with_notifier(db: DbPool, notifier: Arc<dyn Notifier>) -> Self {
        let storage = Arc::new(StorageService::new(db));
        let trips = TripService::new(storage, notifier);
        Self { trips }
    }
}
