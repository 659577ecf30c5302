use async_trait::async_trait;
use aws_sdk_eventbridge::types::{RuleState, Target};
use service::ServiceOperation::{PutRule, PutTargets};
use service::{RuleScheduler, ServiceError};

const SERVICE: &str = "EventBridge";
// A rule only ever has the one target
const TARGET_ID: &str = "1";

pub struct EventBridgeScheduler {
    events: aws_sdk_eventbridge::Client,
}

impl EventBridgeScheduler {
    pub fn new(events: aws_sdk_eventbridge::Client) -> Self {
        EventBridgeScheduler { events }
    }
}

#[async_trait]
impl RuleScheduler for EventBridgeScheduler {
    async fn upsert_one_shot_rule(
        &self,
        name: &str,
        cron_expression: &str,
        target_arn: &str,
    ) -> Result<(), ServiceError> {
        self.events
            .put_rule()
            .name(name)
            .schedule_expression(cron_expression)
            .state(RuleState::Enabled)
            .send()
            .await
            .map_err(|err| ServiceError::new(SERVICE, PutRule, err))?;

        let target: Target = Target::builder()
            .id(TARGET_ID)
            .arn(target_arn)
            .build()
            .map_err(|err| ServiceError::new(SERVICE, PutTargets, err))?;

        self.events
            .put_targets()
            .rule(name)
            .targets(target)
            .send()
            .await
            .map_err(|err| ServiceError::new(SERVICE, PutTargets, err))?;

        Ok(())
    }
}
