use async_trait::async_trait;
use model::InstanceState;
use service::ServiceOperation::{DescribeInstance, StartInstance, StopInstance};
use service::{InstanceControl, ServiceError};

const SERVICE: &str = "RDS";

pub struct RdsInstance {
    rds: aws_sdk_rds::Client,
    instance_id: String,
}

impl RdsInstance {
    pub fn new(rds: aws_sdk_rds::Client, instance_id: String) -> Self {
        RdsInstance { rds, instance_id }
    }
}

#[async_trait]
impl InstanceControl for RdsInstance {
    async fn describe(&self) -> Result<InstanceState, ServiceError> {
        let output = self
            .rds
            .describe_db_instances()
            .db_instance_identifier(&self.instance_id)
            .send()
            .await
            .map_err(|err| ServiceError::new(SERVICE, DescribeInstance, err))?;

        output
            .db_instances()
            .first()
            .and_then(|instance| instance.db_instance_status())
            .map(InstanceState::from)
            .ok_or_else(|| {
                ServiceError::new(
                    SERVICE,
                    DescribeInstance,
                    format!("No status reported for instance {}", self.instance_id),
                )
            })
    }

    async fn start(&self) -> Result<(), ServiceError> {
        self.rds
            .start_db_instance()
            .db_instance_identifier(&self.instance_id)
            .send()
            .await
            .map_err(|err| ServiceError::new(SERVICE, StartInstance, err))?;

        Ok(())
    }

    async fn stop(&self) -> Result<(), ServiceError> {
        self.rds
            .stop_db_instance()
            .db_instance_identifier(&self.instance_id)
            .send()
            .await
            .map_err(|err| ServiceError::new(SERVICE, StopInstance, err))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::RdsInstance;
    use aws_sdk_rds::operation::describe_db_instances::DescribeDbInstancesOutput;
    use aws_sdk_rds::operation::start_db_instance::StartDbInstanceOutput;
    use aws_sdk_rds::operation::stop_db_instance::StopDbInstanceOutput;
    use aws_sdk_rds::types::DbInstance;
    use aws_smithy_mocks::{mock, mock_client, Rule};
    use model::InstanceState;
    use service::{InstanceControl, ServiceOperation};

    const INSTANCE: &str = "db-test";

    fn describe_rule(status: &'static str) -> Rule {
        mock!(aws_sdk_rds::Client::describe_db_instances)
            .match_requests(|req| req.db_instance_identifier() == Some(INSTANCE))
            .then_output(move || {
                DescribeDbInstancesOutput::builder()
                    .db_instances(
                        DbInstance::builder()
                            .db_instance_identifier(INSTANCE)
                            .db_instance_status(status)
                            .build(),
                    )
                    .build()
            })
    }

    #[tokio::test]
    async fn describe_maps_reported_status() {
        let rule: Rule = describe_rule("available");
        let instance: RdsInstance =
            RdsInstance::new(mock_client!(aws_sdk_rds, [&rule]), INSTANCE.to_string());

        assert_eq!(InstanceState::Available, instance.describe().await.unwrap());
    }

    #[tokio::test]
    async fn describe_keeps_transitional_status() {
        let rule: Rule = describe_rule("backing-up");
        let instance: RdsInstance =
            RdsInstance::new(mock_client!(aws_sdk_rds, [&rule]), INSTANCE.to_string());

        assert_eq!(
            InstanceState::Other("backing-up".to_string()),
            instance.describe().await.unwrap()
        );
    }

    #[tokio::test]
    async fn describe_without_instances_is_an_error() {
        let rule: Rule = mock!(aws_sdk_rds::Client::describe_db_instances)
            .then_output(|| DescribeDbInstancesOutput::builder().build());
        let instance: RdsInstance =
            RdsInstance::new(mock_client!(aws_sdk_rds, [&rule]), INSTANCE.to_string());

        let err = instance.describe().await.unwrap_err();

        assert_eq!(ServiceOperation::DescribeInstance, err.operation);
    }

    #[tokio::test]
    async fn start_and_stop_target_the_instance() {
        let start_rule: Rule = mock!(aws_sdk_rds::Client::start_db_instance)
            .match_requests(|req| req.db_instance_identifier() == Some(INSTANCE))
            .then_output(|| StartDbInstanceOutput::builder().build());
        let stop_rule: Rule = mock!(aws_sdk_rds::Client::stop_db_instance)
            .match_requests(|req| req.db_instance_identifier() == Some(INSTANCE))
            .then_output(|| StopDbInstanceOutput::builder().build());

        let instance: RdsInstance = RdsInstance::new(
            mock_client!(aws_sdk_rds, [&start_rule, &stop_rule]),
            INSTANCE.to_string(),
        );

        instance.start().await.expect("Start should succeed");
        instance.stop().await.expect("Stop should succeed");

        assert_eq!(1, start_rule.num_calls());
        assert_eq!(1, stop_rule.num_calls());
    }
}
