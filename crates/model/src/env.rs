/// Identifier of the managed RDS instance
pub const RDS_INSTANCE_ID: &str = "RDS_INSTANCE_ID";
/// DynamoDB table holding the state history
pub const DYNAMODB_TABLE: &str = "DYNAMODB_TABLE";
/// SNS topic receiving notifications
pub const SNS_TOPIC_ARN: &str = "SNS_TOPIC_ARN";
/// Minutes the instance stays running before it is stopped
pub const STOP_AFTER_MINUTES: &str = "STOP_AFTER_MINUTES";
/// Days the instance stays stopped before it is started
pub const START_AFTER_DAYS: &str = "START_AFTER_DAYS";
/// Number of history rows retained per state key
pub const MAX_ROWS: &str = "MAX_ROWS";
