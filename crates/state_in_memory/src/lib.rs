use async_trait::async_trait;
use model::StateRecord;
use state::StateErrorReason::{BackendFailure, MissingEntry};
use state::StateOperation::{DeleteOldest, GetLatest, Put, QueryCount};
use state::{StateError, StateOperation, StateStore};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

// Records keyed by partition then by formatted timestamp, as in the table
type Partitions = HashMap<String, BTreeMap<String, StateRecord>>;

/// A `StateStore` held in process memory.
/// Keys and ordering behave like the DynamoDB table.
#[derive(Clone, Default)]
pub struct InMemoryStateStore {
    partitions: Arc<Mutex<Partitions>>,
    deletes: Arc<AtomicUsize>,
}

impl InMemoryStateStore {
    /// All records for the key, oldest first.
    pub fn history(&self, state_key: &str) -> Vec<StateRecord> {
        self.partitions
            .lock()
            .map(|partitions| {
                partitions
                    .get(state_key)
                    .map(|records| records.values().cloned().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Number of records removed by `delete_oldest` so far.
    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn lock(
        &self,
        state_key: &str,
        operation: StateOperation,
    ) -> Result<MutexGuard<'_, Partitions>, StateError> {
        self.partitions.lock().map_err(|err| {
            StateError::new(state_key, operation, BackendFailure(err.to_string().into()))
        })
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get_latest(&self, state_key: &str) -> Result<Option<StateRecord>, StateError> {
        let partitions = self.lock(state_key, GetLatest)?;

        Ok(partitions
            .get(state_key)
            .and_then(|records| records.values().next_back())
            .cloned())
    }

    async fn put(&self, record: &StateRecord) -> Result<(), StateError> {
        let mut partitions = self.lock(&record.state_key, Put)?;

        partitions
            .entry(record.state_key.clone())
            .or_default()
            .insert(record.sort_key(), record.clone());

        Ok(())
    }

    async fn query_count(&self, state_key: &str) -> Result<usize, StateError> {
        let partitions = self.lock(state_key, QueryCount)?;

        Ok(partitions.get(state_key).map(BTreeMap::len).unwrap_or(0))
    }

    async fn delete_oldest(&self, state_key: &str) -> Result<(), StateError> {
        let mut partitions = self.lock(state_key, DeleteOldest)?;

        partitions
            .get_mut(state_key)
            .and_then(|records| records.pop_first())
            .ok_or_else(|| StateError::new(state_key, DeleteOldest, MissingEntry))?;

        self.deletes.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::InMemoryStateStore;
    use chrono::{Duration, NaiveDateTime};
    use model::record::parse_timestamp;
    use model::{InstanceState, StateRecord, STATE_KEY};
    use state::StateStore;

    fn at(value: &str) -> NaiveDateTime {
        parse_timestamp(value).unwrap()
    }

    #[tokio::test]
    async fn latest_is_the_greatest_timestamp() {
        let store: InMemoryStateStore = InMemoryStateStore::default();
        let base: NaiveDateTime = at("2024-03-01T12:00:00Z");

        // Written out of order on purpose
        for (offset, state) in [
            (2, InstanceState::Stopped),
            (0, InstanceState::Available),
            (1, InstanceState::Stopping),
        ] {
            store
                .put(&StateRecord::new(STATE_KEY, base + Duration::minutes(offset), state))
                .await
                .unwrap();
        }

        let latest: StateRecord = store.get_latest(STATE_KEY).await.unwrap().unwrap();

        assert_eq!(InstanceState::Stopped, latest.state);
        assert_eq!(at("2024-03-01T12:02:00Z"), latest.timestamp);
    }

    #[tokio::test]
    async fn latest_round_trips_state_and_timestamp() {
        let store: InMemoryStateStore = InMemoryStateStore::default();
        let record: StateRecord =
            StateRecord::new(STATE_KEY, at("2024-03-01T12:00:00Z"), InstanceState::Available);

        store.put(&record).await.unwrap();

        assert_eq!(Some(record), store.get_latest(STATE_KEY).await.unwrap());
    }

    #[tokio::test]
    async fn put_with_same_timestamp_replaces() {
        let store: InMemoryStateStore = InMemoryStateStore::default();
        let timestamp: NaiveDateTime = at("2024-03-01T12:00:00Z");

        store.put(&StateRecord::new(STATE_KEY, timestamp, InstanceState::Stopped)).await.unwrap();
        store.put(&StateRecord::new(STATE_KEY, timestamp, InstanceState::Available)).await.unwrap();

        assert_eq!(1, store.query_count(STATE_KEY).await.unwrap());
        assert_eq!(
            InstanceState::Available,
            store.get_latest(STATE_KEY).await.unwrap().unwrap().state
        );
    }

    #[tokio::test]
    async fn delete_oldest_removes_first_record() {
        let store: InMemoryStateStore = InMemoryStateStore::default();

        let newer: StateRecord =
            StateRecord::new(STATE_KEY, at("2024-03-02T00:00:00Z"), InstanceState::Available);
        let older: StateRecord =
            StateRecord::new(STATE_KEY, at("2024-03-01T00:00:00Z"), InstanceState::Stopped);

        store.put(&newer).await.unwrap();
        store.put(&older).await.unwrap();

        store.delete_oldest(STATE_KEY).await.unwrap();

        let history: Vec<StateRecord> = store.history(STATE_KEY);
        assert_eq!(1, history.len());
        assert_eq!(InstanceState::Available, history[0].state);
        assert_eq!(1, store.deletes());
    }

    #[tokio::test]
    async fn delete_oldest_fails_on_empty_partition() {
        let store: InMemoryStateStore = InMemoryStateStore::default();

        assert!(store.delete_oldest(STATE_KEY).await.is_err());
        assert_eq!(None, store.get_latest(STATE_KEY).await.unwrap());
    }
}
