use async_trait::async_trait;
use service::ServiceOperation::Publish;
use service::{Notification, Notifier, ServiceError};

const SERVICE: &str = "SNS";

pub struct SnsNotifier {
    sns: aws_sdk_sns::Client,
    topic_arn: Option<String>,
}

impl SnsNotifier {
    /// Without a topic every publish fails, which callers only log.
    pub fn new(sns: aws_sdk_sns::Client, topic_arn: Option<String>) -> Self {
        SnsNotifier { sns, topic_arn }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish(&self, notification: &Notification) -> Result<(), ServiceError> {
        let topic_arn: &str = self
            .topic_arn
            .as_deref()
            .ok_or_else(|| ServiceError::new(SERVICE, Publish, "No topic configured"))?;

        self.sns
            .publish()
            .topic_arn(topic_arn)
            .subject(&notification.subject)
            .message(&notification.message)
            .send()
            .await
            .map_err(|err| ServiceError::new(SERVICE, Publish, err))?;

        Ok(())
    }
}
