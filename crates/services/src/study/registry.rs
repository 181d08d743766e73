use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex as AsyncMutex;
use vocab_core::Clock;
use vocab_core::model::{SessionKey, SessionState};

pub type SharedSession = Arc<AsyncMutex<SessionState>>;

pub const DEFAULT_SESSION_IDLE_SECS: i64 = 2 * 60 * 60;
pub const DEFAULT_SESSION_CAPACITY: usize = 10_000;

/// Bounds on the registry: idle sessions expire, and the least recently
/// seen session is evicted once `capacity` is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub idle_ttl: Duration,
    pub capacity: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::seconds(DEFAULT_SESSION_IDLE_SECS),
            capacity: DEFAULT_SESSION_CAPACITY,
        }
    }
}

impl SessionLimits {
    #[must_use]
    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }
}

struct Entry {
    state: SharedSession,
    last_seen: DateTime<Utc>,
}

/// Server-side session storage keyed by the browser's session cookie.
///
/// Each session sits behind its own async lock so duplicate in-flight
/// requests from one browser are applied one after another.
pub struct SessionRegistry {
    clock: Clock,
    limits: SessionLimits,
    sessions: Mutex<HashMap<SessionKey, Entry>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(clock: Clock, limits: SessionLimits) -> Self {
        Self {
            clock,
            limits,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Look up `key`, or start a new session when it is missing, unknown or
    /// idle past the limit. The flag is true when a new session was created.
    pub fn get_or_create(&self, key: Option<SessionKey>) -> (SessionKey, SharedSession, bool) {
        self.get_or_create_at(key, self.clock.now())
    }

    fn get_or_create_at(
        &self,
        key: Option<SessionKey>,
        now: DateTime<Utc>,
    ) -> (SessionKey, SharedSession, bool) {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(key) = key {
            if let Some(entry) = sessions.get_mut(&key) {
                if now - entry.last_seen <= self.limits.idle_ttl {
                    entry.last_seen = now;
                    return (key, Arc::clone(&entry.state), false);
                }
            }
        }

        self.make_room(&mut sessions, now);
        let key = SessionKey::generate();
        let state = Arc::new(AsyncMutex::new(SessionState::new()));
        sessions.insert(
            key,
            Entry {
                state: Arc::clone(&state),
                last_seen: now,
            },
        );
        (key, state, true)
    }

    /// Drop idle sessions, then the least recently seen ones until a new
    /// session fits.
    fn make_room(&self, sessions: &mut HashMap<SessionKey, Entry>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, entry| now - entry.last_seen <= self.limits.idle_ttl);

        while sessions.len() >= self.limits.capacity {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(key, _)| *key);
            match oldest {
                Some(key) => {
                    sessions.remove(&key);
                }
                None => break,
            }
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            log::debug!("evicted {evicted} sessions, {} remain", sessions.len());
        }
    }

    pub fn remove(&self, key: &SessionKey) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
