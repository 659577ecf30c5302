use async_trait::async_trait;
use aws_sdk_dynamodb::config::http::HttpResponse;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::query::{QueryError, QueryOutput};
use aws_sdk_dynamodb::types::{AttributeValue, Select};
use model::StateRecord;
use state::StateErrorReason::{BackendFailure, BadState, MissingEntry};
use state::StateOperation::{DeleteOldest, GetLatest, Put, QueryCount};
use state::{StateError, StateOperation, StateStore};
use std::collections::HashMap;

const STATE_KEY: &str = "StateKey";
const TIMESTAMP: &str = "Timestamp";

/// `StateStore` over a DynamoDB table with
/// `StateKey` as partition key and `Timestamp` as sort key.
pub struct DynamoDbStateStore {
    table_name: String,
    dynamodb_client: aws_sdk_dynamodb::Client,
    consistent_read: bool,
}

impl DynamoDbStateStore {
    pub fn new(dynamodb_client: aws_sdk_dynamodb::Client, table_name: String) -> Self {
        DynamoDbStateStore {
            table_name,
            dynamodb_client,
            consistent_read: true,
        }
    }

    pub fn with_consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = consistent_read;
        self
    }
}

#[async_trait]
impl StateStore for DynamoDbStateStore {
    async fn get_latest(&self, state_key: &str) -> Result<Option<StateRecord>, StateError> {
        let output: QueryOutput = self
            .query_edge(state_key, false)
            .await
            .map_err(|err| StateError::new(state_key, GetLatest, BackendFailure(err.into())))?;

        output
            .items()
            .first()
            .map(|item| from_item(state_key, GetLatest, item))
            .transpose()
    }

    async fn put(&self, record: &StateRecord) -> Result<(), StateError> {
        let item: HashMap<String, AttributeValue> = serde_dynamo::to_item(record)
            .map_err(|err| StateError::new(&record.state_key, Put, BadState(err.to_string())))?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|err| StateError::new(&record.state_key, Put, BackendFailure(err.into())))?;

        Ok(())
    }

    async fn query_count(&self, state_key: &str) -> Result<usize, StateError> {
        let output: QueryOutput = self
            .partition_query(state_key)
            .select(Select::Count)
            .send()
            .await
            .map_err(|err| StateError::new(state_key, QueryCount, BackendFailure(err.into())))?;

        Ok(output.count().max(0) as usize)
    }

    async fn delete_oldest(&self, state_key: &str) -> Result<(), StateError> {
        let output: QueryOutput = self
            .query_edge(state_key, true)
            .await
            .map_err(|err| StateError::new(state_key, DeleteOldest, BackendFailure(err.into())))?;

        let oldest: StateRecord = output
            .items()
            .first()
            .map(|item| from_item(state_key, DeleteOldest, item))
            .transpose()?
            .ok_or_else(|| StateError::new(state_key, DeleteOldest, MissingEntry))?;

        self.dynamodb_client
            .delete_item()
            .table_name(&self.table_name)
            .key(STATE_KEY, AttributeValue::S(oldest.state_key.clone()))
            .key(TIMESTAMP, AttributeValue::S(oldest.sort_key()))
            .send()
            .await
            .map_err(|err| StateError::new(state_key, DeleteOldest, BackendFailure(err.into())))?;

        Ok(())
    }
}

impl DynamoDbStateStore {
    fn partition_query(
        &self,
        state_key: &str,
    ) -> aws_sdk_dynamodb::operation::query::builders::QueryFluentBuilder {
        self.dynamodb_client
            .query()
            .table_name(&self.table_name)
            .consistent_read(self.consistent_read)
            .key_condition_expression("#key = :key")
            .expression_attribute_names("#key", STATE_KEY)
            .expression_attribute_values(":key", AttributeValue::S(state_key.to_string()))
    }

    // First record of the partition in either sort direction
    async fn query_edge(
        &self,
        state_key: &str,
        ascending: bool,
    ) -> Result<QueryOutput, SdkError<QueryError, HttpResponse>> {
        self.partition_query(state_key)
            .scan_index_forward(ascending)
            .limit(1)
            .send()
            .await
    }
}

fn from_item(
    state_key: &str,
    operation: StateOperation,
    item: &HashMap<String, AttributeValue>,
) -> Result<StateRecord, StateError> {
    serde_dynamo::from_item(item.clone())
        .map_err(|err| StateError::new(state_key, operation, BadState(err.to_string())))
}
