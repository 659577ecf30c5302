use aws_config::{BehaviorVersion, SdkConfig};
use controller::config::ControllerConfig;
use controller::engine::DecisionEngine;
use controller::{controller_fn, ControllerLambdaEvent};
use lambda_runtime::{service_fn, tracing};
use model::Error;
use service_aws::{EventBridgeScheduler, RdsInstance, SnsNotifier};
use state_dynamodb::DynamoDbStateStore;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    // Fail the cold start rather than every invocation
    let config: ControllerConfig = ControllerConfig::from_env()?;
    let sdk_config: SdkConfig = aws_config::load_defaults(BehaviorVersion::latest()).await;

    let state_store: DynamoDbStateStore = DynamoDbStateStore::new(
        aws_sdk_dynamodb::Client::new(&sdk_config),
        config.table_name.clone(),
    );
    let instance: RdsInstance =
        RdsInstance::new(aws_sdk_rds::Client::new(&sdk_config), config.instance_id.clone());
    let scheduler: EventBridgeScheduler =
        EventBridgeScheduler::new(aws_sdk_eventbridge::Client::new(&sdk_config));
    let notifier: SnsNotifier =
        SnsNotifier::new(aws_sdk_sns::Client::new(&sdk_config), config.topic_arn.clone());

    tracing::info!(
        instance_id = %config.instance_id,
        table = %config.table_name,
        "Starting RDS scheduler"
    );

    let engine: DecisionEngine = DecisionEngine::new(
        config,
        Arc::new(state_store),
        Arc::new(instance),
        Arc::new(scheduler),
        Arc::new(notifier),
    );
    let engine: &DecisionEngine = &engine;

    lambda_runtime::run(service_fn(move |event: ControllerLambdaEvent| async move {
        controller_fn(engine, event).await
    }))
    .await
}
