//! Wire models for agent sessions.
//!
//! Invariant: a [`SessionSnapshot`] produced by [`SessionSnapshot::from_session`] has passed
//! validation; failed builds return only the error.
//!
//! # Public API Overview
//! - Take snapshots of any store's sessions through the [`SessionView`] trait.
//! - Normalize `stateDelta` payloads into [`NormalizedDelta`] with [`normalize_state_delta`]
//!   or a configured [`StateDeltaNormalizer`].
//! - Decode [`SessionIdentity`] from transport parameters.
//! - Read [`EnvConfig`] and install logging via [`logging::init`].

pub mod config;
pub mod logging;

pub mod delta;
pub mod error;
pub mod event;
pub mod identity;
pub mod requests;
pub mod snapshot;

/// Environment configuration.
pub use crate::config::EnvConfig;

/// State delta directives and normalization.
pub use crate::delta::{
    normalize_state_delta, DeltaValue, DirectivePolicy, NormalizedDelta, StateChange,
    StateDelta, StateDeltaNormalizer, StateUpdateOp, STATE_UPDATE_KEY,
};

/// Error types for each component.
pub use crate::error::{DeltaError, IdentityError, ValidationError};

/// Opaque event records.
pub use crate::event::Event;

/// Identity extraction.
pub use crate::identity::{IdentityField, SessionIdentity, IDENTITY_SCHEMA};

/// Request bodies.
pub use crate::requests::{CreateSessionRequest, PatchSessionStateDeltaRequest};

/// Snapshot projection.
pub use crate::snapshot::{SessionSnapshot, SessionView, StateMap};
