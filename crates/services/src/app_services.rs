use std::sync::Arc;

use storage::repository::{CardStore, Storage};
use storage::seed::seed_if_empty;
use vocab_core::model::Track;

use crate::Clock;
use crate::error::AppServicesError;
use crate::pool::{PoolCache, PoolConfig};
use crate::study::{SessionLimits, SessionRegistry, StudyService};

/// Assembles the process-wide services handed to the HTTP layer.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    cards: Arc<dyn CardStore>,
    pools: Arc<PoolCache>,
    study: Arc<StudyService>,
    sessions: Arc<SessionRegistry>,
}

impl AppServices {
    /// Wire services over an already opened storage backend.
    #[must_use]
    pub fn new(storage: Storage, clock: Clock, config: PoolConfig) -> Self {
        let cards = Arc::clone(&storage.cards);
        let pools = Arc::new(PoolCache::new(Arc::clone(&cards), clock, config));
        let study = Arc::new(StudyService::new(Arc::clone(&cards), Arc::clone(&pools)));

        Self {
            clock,
            cards,
            pools,
            study,
            sessions: Arc::new(SessionRegistry::new(clock, SessionLimits::default())),
        }
    }

    /// Replace the session registry with one using `limits`.
    #[must_use]
    pub fn with_session_limits(mut self, limits: SessionLimits) -> Self {
        self.sessions = Arc::new(SessionRegistry::new(self.clock, limits));
        self
    }

    /// Build services backed by `SQLite` storage, seeding empty tracks.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or seeding fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: PoolConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let services = Self::new(storage, clock, config);
        services.seed_empty_tracks().await?;
        Ok(services)
    }

    /// Insert the starter vocabulary into every track that has no cards.
    /// Returns the number of cards added.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Storage` if a track cannot be counted or written.
    pub async fn seed_empty_tracks(&self) -> Result<usize, AppServicesError> {
        let now = self.clock.now();
        let mut added = 0;
        for track in Track::ALL {
            added += seed_if_empty(self.cards.as_ref(), track, now).await?;
        }
        Ok(added)
    }

    #[must_use]
    pub fn cards(&self) -> Arc<dyn CardStore> {
        Arc::clone(&self.cards)
    }

    #[must_use]
    pub fn pools(&self) -> Arc<PoolCache> {
        Arc::clone(&self.pools)
    }

    #[must_use]
    pub fn study(&self) -> Arc<StudyService> {
        Arc::clone(&self.study)
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.sessions)
    }
}
