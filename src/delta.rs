//! State-delta directives and their normalization.
//!
//! A state delta maps keys to either a literal replacement value or a directive object
//! such as `{"$adk_state_update": "delete"}`. Directives are only recognized at the top
//! level of each delta value; a directive nested deeper is an ordinary literal map.
//!
//! The marker key is a reserved namespace. Under [`DirectivePolicy::Compat`] any map that
//! contains it is interpreted as a directive, even when the caller meant a literal map, and
//! sibling keys next to the marker are ignored. [`DirectivePolicy::Strict`] rejects directive
//! objects that carry anything besides the marker.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::DeltaError;

/// Reserved key marking a state update directive.
pub const STATE_UPDATE_KEY: &str = "$adk_state_update";

/// Caller-supplied partial update of a session's state.
pub type StateDelta = Map<String, Value>;

/// Operations a directive object can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateUpdateOp {
    Delete,
}

impl StateUpdateOp {
    pub const ALL: [StateUpdateOp; 1] = [StateUpdateOp::Delete];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for StateUpdateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strictly directive objects are recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DirectivePolicy {
    /// Any map containing [`STATE_UPDATE_KEY`] is a directive.
    #[default]
    Compat,
    /// A directive map must contain [`STATE_UPDATE_KEY`] and nothing else.
    Strict,
}

/// One parsed delta value.
#[derive(Debug, Clone, PartialEq)]
pub enum DeltaValue {
    Literal(Value),
    Directive(StateUpdateOp),
}

impl DeltaValue {
    /// Classifies `value` found under `key`, validating any directive it carries.
    pub fn parse(key: &str, value: Value, policy: DirectivePolicy) -> Result<Self, DeltaError> {
        let map = match value {
            Value::Object(map) if map.contains_key(STATE_UPDATE_KEY) => map,
            other => return Ok(Self::Literal(other)),
        };
        let marker = &map[STATE_UPDATE_KEY];

        let Value::String(name) = marker else {
            return Err(DeltaError::DirectiveType {
                key: key.to_string(),
                found: json_type_name(marker),
            });
        };
        let op = StateUpdateOp::from_name(name).ok_or_else(|| DeltaError::UnknownDirective {
            key: key.to_string(),
            op: name.clone(),
        })?;

        if policy == DirectivePolicy::Strict && map.len() > 1 {
            let extra_keys = map
                .keys()
                .filter(|name| name.as_str() != STATE_UPDATE_KEY)
                .cloned()
                .collect();
            return Err(DeltaError::DirectiveShape {
                key: key.to_string(),
                extra_keys,
            });
        }

        Ok(Self::Directive(op))
    }
}

/// Canonical effect of one delta key.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    /// Replace the key's value. The value may itself be JSON `null`.
    Set(Value),
    /// Remove the key from state.
    Delete,
}

impl From<DeltaValue> for StateChange {
    fn from(value: DeltaValue) -> Self {
        match value {
            DeltaValue::Literal(value) => Self::Set(value),
            DeltaValue::Directive(StateUpdateOp::Delete) => Self::Delete,
        }
    }
}

/// Fully normalized state delta, keyed like its input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedDelta {
    changes: BTreeMap<String, StateChange>,
}

impl NormalizedDelta {
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&StateChange> {
        self.changes.get(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, StateChange> {
        self.changes.iter()
    }

    /// Number of keys scheduled for removal.
    #[must_use]
    pub fn deletions(&self) -> usize {
        self.changes
            .values()
            .filter(|change| matches!(change, StateChange::Delete))
            .count()
    }

    /// Flattens into the legacy map form where deletions are JSON `null`.
    ///
    /// This is lossy: a literal `null` and a deletion become indistinguishable.
    #[must_use]
    pub fn into_json_map(self) -> Map<String, Value> {
        self.changes
            .into_iter()
            .map(|(key, change)| {
                let value = match change {
                    StateChange::Set(value) => value,
                    StateChange::Delete => Value::Null,
                };
                (key, value)
            })
            .collect()
    }
}

impl IntoIterator for NormalizedDelta {
    type Item = (String, StateChange);
    type IntoIter = btree_map::IntoIter<String, StateChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a> IntoIterator for &'a NormalizedDelta {
    type Item = (&'a String, &'a StateChange);
    type IntoIter = btree_map::Iter<'a, String, StateChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

/// Rewrites directive values of a [`StateDelta`] into their [`StateChange`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateDeltaNormalizer {
    policy: DirectivePolicy,
}

impl StateDeltaNormalizer {
    #[must_use]
    pub fn new(policy: DirectivePolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> DirectivePolicy {
        self.policy
    }

    /// Normalizes every key of `delta`, failing on the first invalid directive.
    ///
    /// Keys are visited in sorted order so the reported error does not depend on input
    /// order. On failure no partial result escapes.
    pub fn normalize(&self, delta: StateDelta) -> Result<NormalizedDelta, DeltaError> {
        let mut entries = delta.into_iter().collect::<Vec<_>>();
        entries.sort_by(|(left, _), (right, _)| left.cmp(right));

        let mut changes = BTreeMap::new();
        for (key, value) in entries {
            let parsed = DeltaValue::parse(&key, value, self.policy)?;
            changes.insert(key, StateChange::from(parsed));
        }

        let normalized = NormalizedDelta { changes };
        tracing::trace!(
            keys = normalized.len(),
            deletions = normalized.deletions(),
            "normalized state delta"
        );
        Ok(normalized)
    }
}

/// Normalizes `delta` under [`DirectivePolicy::Compat`].
pub fn normalize_state_delta(delta: StateDelta) -> Result<NormalizedDelta, DeltaError> {
    StateDeltaNormalizer::default().normalize(delta)
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
