use serde::Serialize;

pub mod env;
pub mod instance;
pub mod record;

pub use instance::InstanceState;
pub use record::{StateRecord, STATE_KEY};

pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Payload returned from each invocation of the function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionResult {
    pub message: String,
    pub state: InstanceState,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use crate::{DecisionResult, InstanceState};

    #[test]
    fn decision_result_serialises_state_label() {
        let result: DecisionResult = DecisionResult {
            message: "RDS instance db-1 has been started".to_string(),
            state: InstanceState::Available,
            timestamp: "2024-03-01T12:00:00Z".to_string(),
        };

        let json: serde_json::Value = serde_json::to_value(&result).unwrap();

        assert_eq!("available", json["state"]);
        assert_eq!("2024-03-01T12:00:00Z", json["timestamp"]);
    }
}
