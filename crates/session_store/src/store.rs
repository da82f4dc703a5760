use std::collections::BTreeMap;
use std::fmt;

use adk_session::{CreateSessionRequest, Event, NormalizedDelta, SessionIdentity, SessionSnapshot};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::SessionStoreError;
use crate::record::{SessionKey, StoredSession};

type Clock = Box<dyn Fn() -> OffsetDateTime + Send + Sync>;

pub struct SessionStore {
    pub(crate) sessions: BTreeMap<SessionKey, StoredSession>,
    pub(crate) clock: Clock,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(OffsetDateTime::now_utc)
    }

    /// Store whose update timestamps come from `clock`.
    #[must_use]
    pub fn with_clock(clock: impl Fn() -> OffsetDateTime + Send + Sync + 'static) -> Self {
        Self {
            sessions: BTreeMap::new(),
            clock: Box::new(clock),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Creates a session, allocating a UUID when `identity` carries no session id.
    pub fn create(
        &mut self,
        identity: &SessionIdentity,
        request: CreateSessionRequest,
    ) -> Result<SessionSnapshot, SessionStoreError> {
        let key = SessionKey::from_identity(identity).unwrap_or_else(|| {
            SessionKey::new(
                identity.app_name(),
                identity.user_id(),
                Uuid::new_v4().to_string(),
            )
        });
        if self.sessions.contains_key(&key) {
            return Err(SessionStoreError::already_exists(
                &key.app_name,
                &key.user_id,
                &key.session_id,
            ));
        }

        let session = StoredSession::new(key.clone(), request.state, request.events, self.now());
        let snapshot = snapshot_of(&session)?;
        tracing::debug!(
            app_name = %key.app_name,
            user_id = %key.user_id,
            session_id = %key.session_id,
            "created session"
        );
        self.sessions.insert(key, session);

        Ok(snapshot)
    }

    pub fn get(&self, identity: &SessionIdentity) -> Result<SessionSnapshot, SessionStoreError> {
        let key = require_key(identity, "get a session")?;
        snapshot_of(self.lookup(&key)?)
    }

    /// Snapshots of every session owned by `app_name`/`user_id`, ordered by session id.
    pub fn list(
        &self,
        app_name: &str,
        user_id: &str,
    ) -> Result<Vec<SessionSnapshot>, SessionStoreError> {
        self.sessions
            .values()
            .filter(|session| session.key.app_name == app_name && session.key.user_id == user_id)
            .map(snapshot_of)
            .collect()
    }

    /// Applies a normalized delta: `Set` replaces a key, `Delete` removes it, and keys
    /// absent from the delta are left alone.
    pub fn apply_delta(
        &mut self,
        identity: &SessionIdentity,
        delta: NormalizedDelta,
    ) -> Result<SessionSnapshot, SessionStoreError> {
        let key = require_key(identity, "patch session state")?;
        let now = self.now();
        let mut staged = self.lookup(&key)?.clone();

        let keys = delta.len();
        let deletions = delta.deletions();
        for (state_key, change) in delta {
            staged.apply_change(state_key, change);
        }
        staged.last_update_time = now;

        let snapshot = self.commit(key, staged)?;
        tracing::debug!(
            session_id = %snapshot.id,
            keys,
            deletions,
            "applied state delta"
        );
        Ok(snapshot)
    }

    pub fn append_event(
        &mut self,
        identity: &SessionIdentity,
        event: Event,
    ) -> Result<SessionSnapshot, SessionStoreError> {
        let key = require_key(identity, "append an event")?;
        let now = self.now();
        let mut staged = self.lookup(&key)?.clone();

        staged.events.push(event);
        staged.last_update_time = now;

        self.commit(key, staged)
    }

    pub fn delete(&mut self, identity: &SessionIdentity) -> Result<(), SessionStoreError> {
        let key = require_key(identity, "delete a session")?;
        if self.sessions.remove(&key).is_none() {
            return Err(not_found(&key));
        }

        tracing::debug!(session_id = %key.session_id, "deleted session");
        Ok(())
    }

    fn now(&self) -> OffsetDateTime {
        (self.clock)()
    }

    fn lookup(&self, key: &SessionKey) -> Result<&StoredSession, SessionStoreError> {
        self.sessions.get(key).ok_or_else(|| not_found(key))
    }

    /// Replaces the stored session with `staged` once it snapshots cleanly.
    fn commit(
        &mut self,
        key: SessionKey,
        staged: StoredSession,
    ) -> Result<SessionSnapshot, SessionStoreError> {
        let snapshot = snapshot_of(&staged)?;
        self.sessions.insert(key, staged);
        Ok(snapshot)
    }
}

fn require_key(
    identity: &SessionIdentity,
    operation: &'static str,
) -> Result<SessionKey, SessionStoreError> {
    SessionKey::from_identity(identity).ok_or(SessionStoreError::MissingSessionId { operation })
}

fn not_found(key: &SessionKey) -> SessionStoreError {
    SessionStoreError::not_found(&key.app_name, &key.user_id, &key.session_id)
}

fn snapshot_of(session: &StoredSession) -> Result<SessionSnapshot, SessionStoreError> {
    Ok(SessionSnapshot::from_session(session, Event::clone)?)
}
