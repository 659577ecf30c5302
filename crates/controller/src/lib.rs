use crate::engine::DecisionEngine;
use chrono::{NaiveDateTime, Utc};
use lambda_runtime::tracing::{Instrument, Span};
use lambda_runtime::{tracing, LambdaEvent};
use model::{DecisionResult, Error};
use service::ServiceError;
use state::StateError;
use std::fmt::{Display, Formatter};

pub mod config;
pub mod engine;
pub mod policy;
pub mod schedule;
pub mod transition;

/// Any JSON event invokes the function; the payload itself is ignored.
pub type ControllerLambdaEvent = LambdaEvent<serde_json::Value>;

/// Handler for use with `lambda_runtime::run()`.
///
/// The invoked function ARN from the context becomes the target of the
/// next scheduled trigger.
///
/// ```no_compile
/// let engine: DecisionEngine =
///     DecisionEngine::new(config, state_store, instance, scheduler, notifier);
///
/// lambda_runtime::run(service_fn(|event: ControllerLambdaEvent| {
///     controller_fn(&engine, event)
/// }))
/// .await?;
/// ```
pub async fn controller_fn(
    engine: &DecisionEngine,
    event: ControllerLambdaEvent,
) -> Result<DecisionResult, Error> {
    let context = event.context;
    let now: NaiveDateTime = Utc::now().naive_utc();

    let decision_span: Span = tracing::span!(
        tracing::Level::INFO,
        "Decision",
        request_id = %context.request_id,
        instance_id = %engine.config().instance_id
    );

    let result: DecisionResult = engine
        .decide(now, &context.invoked_function_arn)
        .instrument(decision_span)
        .await?;

    tracing::info!("Completed decision {:?}", result);

    Ok(result)
}

/// Failure which aborts a decision pass.
#[derive(Debug)]
pub enum ControlError {
    State(StateError),
    Service(ServiceError),
}

impl From<StateError> for ControlError {
    fn from(value: StateError) -> Self {
        ControlError::State(value)
    }
}

impl From<ServiceError> for ControlError {
    fn from(value: ServiceError) -> Self {
        ControlError::Service(value)
    }
}

impl Display for ControlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlError::State(err) => write!(f, "State store failure: {}", err),
            ControlError::Service(err) => write!(f, "Service failure: {}", err),
        }
    }
}

impl std::error::Error for ControlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ControlError::State(err) => Some(err),
            ControlError::Service(err) => Some(err),
        }
    }
}
