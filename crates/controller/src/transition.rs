use crate::config::ControllerConfig;
use chrono::Duration;
use model::InstanceState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Stop,
    NoAction,
}

/// Choose the action for the current state given the time since it was recorded.
/// Both thresholds are inclusive.
pub fn next_action(state: &InstanceState, elapsed: Duration, config: &ControllerConfig) -> Action {
    match state {
        InstanceState::Stopped if elapsed >= config.start_after() => Action::Start,
        InstanceState::Available if elapsed >= config.stop_after() => Action::Stop,
        _ => Action::NoAction,
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ControllerConfig;
    use crate::transition::{next_action, Action};
    use chrono::Duration;
    use model::InstanceState;

    fn config() -> ControllerConfig {
        ControllerConfig {
            instance_id: "db-1".to_string(),
            table_name: "state".to_string(),
            topic_arn: None,
            stop_after_minutes: 30,
            start_after_days: 6,
            max_rows: 10,
        }
    }

    #[test]
    fn stopped_instance_starts_once_threshold_reached() {
        let stopped: InstanceState = InstanceState::Stopped;
        let just_short: Duration = Duration::days(6) - Duration::seconds(1);

        assert_eq!(Action::NoAction, next_action(&stopped, just_short, &config()));
        assert_eq!(Action::Start, next_action(&stopped, Duration::days(6), &config()));
        assert_eq!(Action::Start, next_action(&stopped, Duration::days(7), &config()));
    }

    #[test]
    fn available_instance_stops_once_threshold_reached() {
        let available: InstanceState = InstanceState::Available;

        assert_eq!(Action::NoAction, next_action(&available, Duration::minutes(10), &config()));
        assert_eq!(Action::Stop, next_action(&available, Duration::minutes(30), &config()));
    }

    #[test]
    fn other_states_never_act() {
        for state in [
            InstanceState::Starting,
            InstanceState::Stopping,
            InstanceState::Unknown,
            InstanceState::Other("modifying".to_string()),
        ] {
            assert_eq!(Action::NoAction, next_action(&state, Duration::days(365), &config()));
        }
    }
}
