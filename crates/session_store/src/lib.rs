//! In-memory session store that applies normalized state deltas.
//!
//! Sessions are keyed by app, user and session id. Reads go through
//! [`adk_session::SessionSnapshot::from_session`], so every snapshot handed out is validated.

mod error;
mod record;
mod store;

pub use error::SessionStoreError;
pub use record::{SessionKey, StoredSession};
pub use store::SessionStore;
