//! Environment configuration.

use std::env;

use crate::delta::{DirectivePolicy, StateDeltaNormalizer};

pub const STRICT_DIRECTIVES_ENV: &str = "ADK_SESSION_STRICT_DIRECTIVES";
pub const LOG_ENV: &str = "ADK_SESSION_LOG";

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub strict_directives: bool,
    pub log_filter: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, which returns the raw value of a variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let strict_directives = lookup(STRICT_DIRECTIVES_ENV).is_some_and(|value| value == "1");
        let log_filter = lookup(LOG_ENV).filter(|value| !value.trim().is_empty());

        Self {
            strict_directives,
            log_filter,
        }
    }

    #[must_use]
    pub fn directive_policy(&self) -> DirectivePolicy {
        if self.strict_directives {
            DirectivePolicy::Strict
        } else {
            DirectivePolicy::Compat
        }
    }

    #[must_use]
    pub fn normalizer(&self) -> StateDeltaNormalizer {
        StateDeltaNormalizer::new(self.directive_policy())
    }
}
