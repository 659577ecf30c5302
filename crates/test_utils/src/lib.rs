use async_trait::async_trait;
use chrono::NaiveDateTime;
use model::record::parse_timestamp;
use model::{InstanceState, StateRecord};
use service::ServiceOperation::{DescribeInstance, Publish, PutRule, StartInstance, StopInstance};
use service::{InstanceControl, Notification, Notifier, RuleScheduler, ServiceError};
use state::StateErrorReason::BackendFailure;
use state::StateOperation::{DeleteOldest, GetLatest, Put, QueryCount};
use state::{StateError, StateStore};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Test values
pub const TEST_INSTANCE_ID: &str = "db-test";
pub const TEST_TABLE: &str = "rds-state";
pub const TEST_TOPIC_ARN: &str = "arn:aws:sns:eu-west-1:123456789012:rds-scheduler";
pub const TEST_FUNCTION_ARN: &str = "arn:aws:lambda:eu-west-1:123456789012:function:rds-scheduler";

/// Parse a timestamp in the record format, panicking on bad input
pub fn at(value: &str) -> NaiveDateTime {
    parse_timestamp(value).unwrap_or_else(|err| panic!("Bad test timestamp {value}: {err}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceCommand {
    Start,
    Stop,
}

/// Instance double recording commands.
///
/// Reports either a status which follows each command, or a scripted
/// sequence where each `describe` consumes one entry and the last one
/// repeats. With no statuses at all, `describe` fails.
#[derive(Clone)]
pub struct RecordingInstance {
    statuses: Arc<Mutex<VecDeque<InstanceState>>>,
    follow_commands: bool,
    commands: Arc<Mutex<Vec<InstanceCommand>>>,
    fail_commands: bool,
}

impl RecordingInstance {
    pub fn reporting(status: InstanceState) -> Self {
        Self::with_statuses(VecDeque::from([status]), true)
    }

    /// Statuses reported in order, regardless of any commands issued.
    pub fn scripted(statuses: impl IntoIterator<Item = InstanceState>) -> Self {
        Self::with_statuses(statuses.into_iter().collect(), false)
    }

    pub fn unreachable() -> Self {
        Self::with_statuses(VecDeque::new(), false)
    }

    fn with_statuses(statuses: VecDeque<InstanceState>, follow_commands: bool) -> Self {
        RecordingInstance {
            statuses: Arc::new(Mutex::new(statuses)),
            follow_commands,
            commands: Arc::default(),
            fail_commands: false,
        }
    }

    pub fn failing_commands(mut self) -> Self {
        self.fail_commands = true;
        self
    }

    pub fn commands(&self) -> Vec<InstanceCommand> {
        self.commands.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn command(&self, command: InstanceCommand) -> Result<(), ServiceError> {
        let operation = match command {
            InstanceCommand::Start => StartInstance,
            InstanceCommand::Stop => StopInstance,
        };

        if self.fail_commands {
            return Err(ServiceError::new("RecordingInstance", operation, "command rejected"));
        }

        let status: InstanceState = match command {
            InstanceCommand::Start => InstanceState::Available,
            InstanceCommand::Stop => InstanceState::Stopped,
        };

        if self.follow_commands {
            if let Ok(mut statuses) = self.statuses.lock() {
                *statuses = VecDeque::from([status]);
            }
        }
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command);
        }

        Ok(())
    }

    fn next_status(&self) -> Option<InstanceState> {
        let mut statuses = self.statuses.lock().ok()?;

        let status: Option<InstanceState> = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().cloned()
        };

        status
    }
}

#[async_trait]
impl InstanceControl for RecordingInstance {
    async fn describe(&self) -> Result<InstanceState, ServiceError> {
        self.next_status()
            .ok_or_else(|| ServiceError::new("RecordingInstance", DescribeInstance, "unreachable"))
    }

    async fn start(&self) -> Result<(), ServiceError> {
        self.command(InstanceCommand::Start)
    }

    async fn stop(&self) -> Result<(), ServiceError> {
        self.command(InstanceCommand::Stop)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledRule {
    pub name: String,
    pub cron_expression: String,
    pub target_arn: String,
}

/// Scheduler double recording every rule, optionally failing each call.
#[derive(Clone, Default)]
pub struct RecordingScheduler {
    rules: Arc<Mutex<Vec<ScheduledRule>>>,
    fail: bool,
}

impl RecordingScheduler {
    pub fn failing() -> Self {
        RecordingScheduler {
            fail: true,
            ..Default::default()
        }
    }

    pub fn rules(&self) -> Vec<ScheduledRule> {
        self.rules.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RuleScheduler for RecordingScheduler {
    async fn upsert_one_shot_rule(
        &self,
        name: &str,
        cron_expression: &str,
        target_arn: &str,
    ) -> Result<(), ServiceError> {
        if self.fail {
            return Err(ServiceError::new("RecordingScheduler", PutRule, "throttled"));
        }

        if let Ok(mut rules) = self.rules.lock() {
            rules.push(ScheduledRule {
                name: name.to_string(),
                cron_expression: cron_expression.to_string(),
                target_arn: target_arn.to_string(),
            });
        }

        Ok(())
    }
}

/// Notifier double recording every notification, optionally failing each call.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        RecordingNotifier {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, notification: &Notification) -> Result<(), ServiceError> {
        if self.fail {
            return Err(ServiceError::new("RecordingNotifier", Publish, "topic not found"));
        }

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification.clone());
        }

        Ok(())
    }
}

/// A `StateStore` whose backend is always down.
pub struct FailingStateStore;

#[async_trait]
impl StateStore for FailingStateStore {
    async fn get_latest(&self, state_key: &str) -> Result<Option<StateRecord>, StateError> {
        Err(StateError::new(state_key, GetLatest, BackendFailure("table offline".into())))
    }

    async fn put(&self, record: &StateRecord) -> Result<(), StateError> {
        Err(StateError::new(&record.state_key, Put, BackendFailure("table offline".into())))
    }

    async fn query_count(&self, state_key: &str) -> Result<usize, StateError> {
        Err(StateError::new(state_key, QueryCount, BackendFailure("table offline".into())))
    }

    async fn delete_oldest(&self, state_key: &str) -> Result<(), StateError> {
        Err(StateError::new(state_key, DeleteOldest, BackendFailure("table offline".into())))
    }
}
