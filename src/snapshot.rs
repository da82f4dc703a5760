//! Read-side projection of a live session.
//!
//! A [`SessionSnapshot`] is only handed out by [`SessionSnapshot::from_session`] after
//! [`SessionSnapshot::validate`] has accepted it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::error::ValidationError;
use crate::event::Event;

/// Session state as carried on the wire.
pub type StateMap = Map<String, Value>;

/// Accessors a session store exposes so a snapshot can be taken from it.
pub trait SessionView {
    /// Store-specific event type, converted by the caller's event mapping.
    type Event;

    fn id(&self) -> &str;
    fn app_name(&self) -> &str;
    fn user_id(&self) -> &str;
    fn last_update_time(&self) -> OffsetDateTime;
    fn state(&self) -> impl Iterator<Item = (&str, &Value)> + '_;
    fn events(&self) -> impl Iterator<Item = &Self::Event> + '_;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: String,
    #[serde(rename = "appName")]
    pub app_name: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "lastUpdateTime")]
    pub updated_at: i64,
    #[serde(default)]
    pub events: Option<Vec<Event>>,
    #[serde(default)]
    pub state: Option<StateMap>,
}

impl SessionSnapshot {
    /// Copies `session` into a fresh snapshot and validates it.
    ///
    /// State entries and events are copied, never aliased; each event goes through
    /// `map_event`. Nothing is returned unless every check in [`Self::validate`] passes.
    pub fn from_session<S, F>(session: &S, mut map_event: F) -> Result<Self, ValidationError>
    where
        S: SessionView,
        F: FnMut(&S::Event) -> Event,
    {
        let state = session
            .state()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect::<StateMap>();
        let events = session.events().map(&mut map_event).collect::<Vec<_>>();

        let snapshot = Self {
            id: session.id().to_string(),
            app_name: session.app_name().to_string(),
            user_id: session.user_id().to_string(),
            updated_at: session.last_update_time().unix_timestamp(),
            events: Some(events),
            state: Some(state),
        };
        snapshot.validate()?;

        tracing::trace!(
            session_id = %snapshot.id,
            events = snapshot.event_count(),
            "built session snapshot"
        );
        Ok(snapshot)
    }

    /// Checks required fields, reporting the first failure in a fixed order:
    /// app name, user id, session id, update time, state, events.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.app_name.is_empty() {
            return Err(ValidationError::EmptyAppName);
        }
        if self.user_id.is_empty() {
            return Err(ValidationError::EmptyUserId);
        }
        if self.id.is_empty() {
            return Err(ValidationError::EmptySessionId);
        }
        if self.updated_at == 0 {
            return Err(ValidationError::ZeroUpdatedAt);
        }
        if self.state.is_none() {
            return Err(ValidationError::MissingState);
        }
        if self.events.is_none() {
            return Err(ValidationError::MissingEvents);
        }

        Ok(())
    }

    #[must_use]
    pub fn state(&self) -> Option<&StateMap> {
        self.state.as_ref()
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        self.events.as_deref().unwrap_or_default()
    }

    fn event_count(&self) -> usize {
        self.events().len()
    }
}
