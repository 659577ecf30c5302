use async_trait::async_trait;
use model::{Error, InstanceState};
use std::fmt::{Display, Formatter};

/// Control plane of the single managed database instance.
/// The instance identifier is bound when the implementation is built.
#[async_trait]
pub trait InstanceControl: Send + Sync {
    async fn describe(&self) -> Result<InstanceState, ServiceError>;
    async fn start(&self) -> Result<(), ServiceError>;
    async fn stop(&self) -> Result<(), ServiceError>;
}

/// Creates or replaces a named rule which fires once and invokes the target.
#[async_trait]
pub trait RuleScheduler: Send + Sync {
    async fn upsert_one_shot_rule(
        &self,
        name: &str,
        cron_expression: &str,
        target_arn: &str,
    ) -> Result<(), ServiceError>;
}

/// Publishes human readable messages to a topic bound at construction.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, notification: &Notification) -> Result<(), ServiceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub message: String,
}

impl Notification {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Notification {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

/// Errors arising from calling an external service.
#[derive(Debug)]
pub struct ServiceError {
    pub service: &'static str,

    pub operation: ServiceOperation,
    pub reason: Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOperation {
    DescribeInstance,
    StartInstance,
    StopInstance,
    PutRule,
    PutTargets,
    Publish,
}

impl ServiceError {
    pub fn new(
        service: &'static str,
        operation: ServiceOperation,
        reason: impl Into<Error>,
    ) -> Self {
        ServiceError {
            service,
            operation,
            reason: reason.into(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?} failed: {}", self.service, self.operation, self.reason)
    }
}

impl std::error::Error for ServiceError {}
