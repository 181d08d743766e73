use std::sync::Arc;

use services::{AppServices, SessionRegistry, StudyService};
use storage::repository::CardStore;

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub study: Arc<StudyService>,
    pub sessions: Arc<SessionRegistry>,
    pub cards: Arc<dyn CardStore>,
}

impl AppState {
    #[must_use]
    pub fn from_services(services: &AppServices) -> Self {
        Self {
            study: services.study(),
            sessions: services.sessions(),
            cards: services.cards(),
        }
    }
}
