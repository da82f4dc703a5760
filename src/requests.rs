use serde::{Deserialize, Serialize};

use crate::delta::{NormalizedDelta, StateDelta, StateDeltaNormalizer};
use crate::error::DeltaError;
use crate::event::Event;
use crate::snapshot::StateMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub state: StateMap,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchSessionStateDeltaRequest {
    #[serde(rename = "stateDelta", default)]
    pub state_delta: StateDelta,
}

impl PatchSessionStateDeltaRequest {
    /// Consumes the request and normalizes its delta.
    pub fn normalize(
        self,
        normalizer: &StateDeltaNormalizer,
    ) -> Result<NormalizedDelta, DeltaError> {
        normalizer.normalize(self.state_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_defaults_missing_fields() {
        let request: CreateSessionRequest = serde_json::from_value(json!({})).expect("decode");
        assert!(request.state.is_empty());
        assert!(request.events.is_empty());
    }

    #[test]
    fn patch_request_reads_camel_case_field() {
        let request: PatchSessionStateDeltaRequest = serde_json::from_value(json!({
            "stateDelta": {"a": 1}
        }))
        .expect("decode");
        assert_eq!(request.state_delta.get("a"), Some(&json!(1)));
    }
}
