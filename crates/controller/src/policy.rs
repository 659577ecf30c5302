use crate::ControlError;
use lambda_runtime::tracing;
use std::fmt::Display;

/// External calls made during a decision pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    InstanceStatus,
    InstanceCommand,
    StateRead,
    StateWrite,
    Schedule,
    Notify,
}

/// What a failed call does to the decision pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    // Continue with a safe substitute value
    Degrade,
    // Abort the invocation with the error
    Propagate,
    // Continue as if the call succeeded
    LogOnly,
}

pub const fn failure_policy(capability: Capability) -> FailurePolicy {
    match capability {
        Capability::InstanceStatus => FailurePolicy::Degrade,
        Capability::InstanceCommand => FailurePolicy::Propagate,
        Capability::StateRead => FailurePolicy::Propagate,
        Capability::StateWrite => FailurePolicy::Propagate,
        Capability::Schedule => FailurePolicy::LogOnly,
        Capability::Notify => FailurePolicy::LogOnly,
    }
}

/// Apply the failure policy of `capability` to the outcome of a call.
///
/// `Ok(None)` means the call failed and the pass carries on without its value.
pub(crate) fn settle<T, E>(
    capability: Capability,
    result: Result<T, E>,
) -> Result<Option<T>, ControlError>
where
    E: Into<ControlError> + Display,
{
    let err: E = match result {
        Ok(value) => return Ok(Some(value)),
        Err(err) => err,
    };

    match failure_policy(capability) {
        FailurePolicy::Propagate => {
            tracing::error!(?capability, "Aborting invocation: {err}");
            Err(err.into())
        }
        FailurePolicy::Degrade => {
            tracing::warn!(?capability, "Continuing with a degraded value: {err}");
            Ok(None)
        }
        FailurePolicy::LogOnly => {
            tracing::error!(?capability, "Ignoring failure: {err}");
            Ok(None)
        }
    }
}
