use adk_session::{Event, SessionIdentity, SessionView, StateChange, StateMap};
use serde_json::Value;
use time::OffsetDateTime;

/// Lookup key of one stored session.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    #[must_use]
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }

    /// Key for `identity`, or `None` when it carries no session id.
    #[must_use]
    pub fn from_identity(identity: &SessionIdentity) -> Option<Self> {
        identity
            .session_id()
            .map(|session_id| Self::new(identity.app_name(), identity.user_id(), session_id))
    }
}

/// Live session owned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub(crate) key: SessionKey,
    pub(crate) state: StateMap,
    pub(crate) events: Vec<Event>,
    pub(crate) last_update_time: OffsetDateTime,
}

impl StoredSession {
    pub(crate) fn new(
        key: SessionKey,
        state: StateMap,
        events: Vec<Event>,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            key,
            state,
            events,
            last_update_time: now,
        }
    }

    #[must_use]
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Sets or removes one state key. Removing an absent key is a no-op.
    pub(crate) fn apply_change(&mut self, key: String, change: StateChange) {
        match change {
            StateChange::Set(value) => {
                self.state.insert(key, value);
            }
            StateChange::Delete => {
                self.state.remove(&key);
            }
        }
    }
}

impl SessionView for StoredSession {
    type Event = Event;

    fn id(&self) -> &str {
        &self.key.session_id
    }

    fn app_name(&self) -> &str {
        &self.key.app_name
    }

    fn user_id(&self) -> &str {
        &self.key.user_id
    }

    fn last_update_time(&self) -> OffsetDateTime {
        self.last_update_time
    }

    fn state(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.state.iter().map(|(key, value)| (key.as_str(), value))
    }

    fn events(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter()
    }
}
