use thiserror::Error;

/// A required snapshot field is empty, zero or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("app_name is empty in received session")]
    EmptyAppName,

    #[error("user_id is empty in received session")]
    EmptyUserId,

    #[error("session_id is empty in received session")]
    EmptySessionId,

    #[error("updated_at is empty")]
    ZeroUpdatedAt,

    #[error("state is nil")]
    MissingState,

    #[error("events is nil")]
    MissingEvents,
}

impl ValidationError {
    /// Wire name of the offending snapshot field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyAppName => "appName",
            Self::EmptyUserId => "userId",
            Self::EmptySessionId => "id",
            Self::ZeroUpdatedAt => "lastUpdateTime",
            Self::MissingState => "state",
            Self::MissingEvents => "events",
        }
    }
}

/// A state delta could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeltaError {
    #[error("invalid directive value type for key '{key}': expected string, got {found}")]
    DirectiveType { key: String, found: &'static str },

    #[error("unknown state update directive '{op}' for key '{key}'")]
    UnknownDirective { key: String, op: String },

    #[error("directive for key '{key}' carries unexpected keys: {}", .extra_keys.join(", "))]
    DirectiveShape { key: String, extra_keys: Vec<String> },
}

impl DeltaError {
    /// Delta key the error refers to.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::DirectiveType { key, .. }
            | Self::UnknownDirective { key, .. }
            | Self::DirectiveShape { key, .. } => key,
        }
    }
}

/// Identity parameters could not be decoded or a required one is missing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("{field} parameter is required")]
    MissingParameter { field: &'static str },

    #[error("{field} parameter must be a scalar, got {found}")]
    InvalidType {
        field: &'static str,
        found: &'static str,
    },
}

impl IdentityError {
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingParameter { field } | Self::InvalidType { field, .. } => field,
        }
    }
}
