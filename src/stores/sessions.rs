use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::{models::User, stores::cart::CartStore};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn(User),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::LoggedOut => None,
            SessionState::LoggedIn(user) => Some(user),
        }
    }
}

#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub cart: CartStore,
    pub started_at: DateTime<Utc>,
}

impl Session {
    fn is_expired(&self, ttl: TimeDelta, now: DateTime<Utc>) -> bool {
        now - self.started_at >= ttl
    }
}

pub const DEFAULT_SESSION_TTL: TimeDelta = TimeDelta::hours(12);

/// Live sessions keyed by session id. Each session owns the shopper's cart.
///
/// A session older than the registry's ttl reads as logged out and is
/// dropped, cart included, on the next `open` or `prune_expired`.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: HashMap<Uuid, Session>,
    ttl: TimeDelta,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: TimeDelta) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    pub fn open(&mut self, user: User) -> Uuid {
        let now = Utc::now();
        self.prune_expired(now);

        let id = Uuid::new_v4();
        self.sessions.insert(
            id,
            Session {
                user,
                cart: CartStore::new(),
                started_at: now,
            },
        );
        id
    }

    /// Logs the session out. Closing an unknown id is a no-op.
    pub fn close(&mut self, id: Uuid) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn state(&self, id: Uuid) -> SessionState {
        match self.live(id, Utc::now()) {
            Some(session) => SessionState::LoggedIn(session.user.clone()),
            None => SessionState::LoggedOut,
        }
    }

    /// The cart owned by an open session.
    pub fn cart_mut(&mut self, id: Uuid) -> Option<&mut CartStore> {
        let (ttl, now) = (self.ttl, Utc::now());
        self.sessions
            .get_mut(&id)
            .filter(|session| !session.is_expired(ttl, now))
            .map(|session| &mut session.cart)
    }

    pub fn active_count(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .values()
            .filter(|session| !session.is_expired(self.ttl, now))
            .count()
    }

    /// Drops every session that has outlived the ttl at `now` and returns how
    /// many went.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        let ttl = self.ttl;
        self.sessions.retain(|_, session| !session.is_expired(ttl, now));
        let pruned = before - self.sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, "expired sessions dropped");
        }
        pruned
    }

    pub(crate) fn live(&self, id: Uuid, now: DateTime<Utc>) -> Option<&Session> {
        self.sessions
            .get(&id)
            .filter(|session| !session.is_expired(self.ttl, now))
    }
}
