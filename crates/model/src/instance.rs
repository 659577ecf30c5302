use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Lifecycle status of the managed instance, as persisted and as reported by RDS.
///
/// Labels are matched case-insensitively and always written back in lowercase.
/// `started` is accepted as an alias of `available`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceState {
    Available,
    Stopped,
    Starting,
    Stopping,
    // Any other status RDS reports, e.g. `backing-up` or `modifying`
    Other(String),
    // The live status could not be determined
    Unknown,
}

impl InstanceState {
    pub fn label(&self) -> &str {
        match self {
            InstanceState::Available => "available",
            InstanceState::Stopped => "stopped",
            InstanceState::Starting => "starting",
            InstanceState::Stopping => "stopping",
            InstanceState::Other(label) => label.as_str(),
            InstanceState::Unknown => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, InstanceState::Unknown)
    }
}

impl From<&str> for InstanceState {
    fn from(value: &str) -> Self {
        let label: String = value.trim().to_ascii_lowercase();

        match label.as_str() {
            "available" | "started" => InstanceState::Available,
            "stopped" => InstanceState::Stopped,
            "starting" => InstanceState::Starting,
            "stopping" => InstanceState::Stopping,
            "unknown" | "" => InstanceState::Unknown,
            _ => InstanceState::Other(label),
        }
    }
}

impl From<String> for InstanceState {
    fn from(value: String) -> Self {
        InstanceState::from(value.as_str())
    }
}

impl From<InstanceState> for String {
    fn from(value: InstanceState) -> Self {
        value.label().to_string()
    }
}

impl Display for InstanceState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
