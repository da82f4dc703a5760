use adk_session::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session_id is required to {operation}")]
    MissingSessionId { operation: &'static str },

    #[error("session '{session_id}' not found for app '{app_name}' and user '{user_id}'")]
    NotFound {
        app_name: String,
        user_id: String,
        session_id: String,
    },

    #[error("session '{session_id}' already exists for app '{app_name}' and user '{user_id}'")]
    AlreadyExists {
        app_name: String,
        user_id: String,
        session_id: String,
    },

    #[error("stored session failed validation: {0}")]
    Snapshot(#[from] ValidationError),
}

impl SessionStoreError {
    #[must_use]
    pub fn not_found(app_name: &str, user_id: &str, session_id: &str) -> Self {
        Self::NotFound {
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
        }
    }

    #[must_use]
    pub fn already_exists(app_name: &str, user_id: &str, session_id: &str) -> Self {
        Self::AlreadyExists {
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
        }
    }
}
