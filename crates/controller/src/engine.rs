use crate::config::ControllerConfig;
use crate::policy::{settle, Capability};
use crate::schedule::{NextTrigger, TriggerAction};
use crate::transition::{next_action, Action};
use crate::ControlError;
use chrono::{Duration, NaiveDateTime};
use lambda_runtime::tracing;
use model::record::{format_timestamp, truncate_to_seconds};
use model::{DecisionResult, InstanceState, StateRecord, STATE_KEY};
use service::{InstanceControl, Notification, Notifier, RuleScheduler};
use state::StateStore;
use std::sync::Arc;

const STARTED_SUBJECT: &str = "RDS Manager - Instance Started";
const STOPPED_SUBJECT: &str = "RDS Manager - Instance Stopped";
const NO_ACTION_SUBJECT: &str = "RDS Manager - No Action Taken";

/// Decides whether the managed instance should be started, stopped or left alone.
///
/// Holds no state between invocations; every pass re-reads the latest record,
/// so duplicate or overlapping triggers fall through to a no-op.
pub struct DecisionEngine {
    config: ControllerConfig,
    state_store: Arc<dyn StateStore>,
    instance: Arc<dyn InstanceControl>,
    scheduler: Arc<dyn RuleScheduler>,
    notifier: Arc<dyn Notifier>,
}

impl DecisionEngine {
    pub fn new(
        config: ControllerConfig,
        state_store: Arc<dyn StateStore>,
        instance: Arc<dyn InstanceControl>,
        scheduler: Arc<dyn RuleScheduler>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        DecisionEngine {
            config,
            state_store,
            instance,
            scheduler,
            notifier,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Run one decision pass at `now` (naive UTC).
    /// `function_arn` is the target of the next self-trigger.
    pub async fn decide(
        &self,
        now: NaiveDateTime,
        function_arn: &str,
    ) -> Result<DecisionResult, ControlError> {
        let now: NaiveDateTime = truncate_to_seconds(now);

        let last: StateRecord = self.latest_state(now).await?;
        tracing::info!(state = %last.state, since = %last.sort_key(), "Recorded state");

        let live: InstanceState =
            settle(Capability::InstanceStatus, self.instance.describe().await)?
                .unwrap_or(InstanceState::Unknown);
        tracing::info!(status = %live, "Live instance status");

        let (state, since): (InstanceState, NaiveDateTime) =
            self.reconcile(last, live, now).await?;
        let elapsed: Duration = now - since;

        let (state, notification): (InstanceState, Notification) =
            match next_action(&state, elapsed, &self.config) {
                Action::Start => (InstanceState::Available, self.start(now, function_arn).await?),
                Action::Stop => (InstanceState::Stopped, self.stop(now, function_arn).await?),
                Action::NoAction => {
                    tracing::info!("No action needed, currently in state {}", state);

                    let notification: Notification = Notification::new(
                        NO_ACTION_SUBJECT,
                        format!(
                            "No action taken for RDS instance {}, currently in state {}.",
                            self.config.instance_id, state
                        ),
                    );
                    (state, notification)
                }
            };

        settle(Capability::Notify, self.notifier.publish(&notification).await)?;

        Ok(DecisionResult {
            message: notification.message,
            state,
            timestamp: format_timestamp(&now),
        })
    }

    // The latest record, or a stopped record old enough to force a start
    async fn latest_state(&self, now: NaiveDateTime) -> Result<StateRecord, ControlError> {
        let latest: Option<StateRecord> =
            settle(Capability::StateRead, self.state_store.get_latest(STATE_KEY).await)?.flatten();

        if let Some(record) = latest {
            return Ok(record);
        }

        let bootstrap: StateRecord = StateRecord::new(
            STATE_KEY,
            now - self.config.start_after() - Duration::days(1),
            InstanceState::Stopped,
        );
        tracing::info!("No recorded state, bootstrapping as stopped at {}", bootstrap.sort_key());

        settle(Capability::StateWrite, self.state_store.put(&bootstrap).await)?;

        Ok(bootstrap)
    }

    /// Adopt the live status when it disagrees with the record.
    /// The correction is written at `now` but elapsed time still counts from
    /// the recorded action. An unknown status is used for this pass only and
    /// never written.
    async fn reconcile(
        &self,
        last: StateRecord,
        live: InstanceState,
        now: NaiveDateTime,
    ) -> Result<(InstanceState, NaiveDateTime), ControlError> {
        if live.is_unknown() {
            tracing::warn!("Instance status unknown, keeping recorded state {}", last.state);
            return Ok((live, last.timestamp));
        }

        if live == last.state {
            return Ok((last.state, last.timestamp));
        }

        tracing::info!(recorded = %last.state, live = %live, "Correcting state drift");
        self.record_state(live.clone(), now).await?;

        Ok((live, last.timestamp))
    }

    async fn start(
        &self,
        now: NaiveDateTime,
        function_arn: &str,
    ) -> Result<Notification, ControlError> {
        settle(Capability::InstanceCommand, self.instance.start().await)?;
        self.record_state(InstanceState::Available, now).await?;

        let trigger: NextTrigger =
            NextTrigger::after(TriggerAction::StopInstance, now, self.config.stop_after());
        self.arm(&trigger, function_arn).await;

        tracing::info!(
            "RDS instance {} started, stopping after {} minutes",
            self.config.instance_id,
            self.config.stop_after_minutes
        );

        Ok(Notification::new(
            STARTED_SUBJECT,
            format!(
                "RDS instance {} has been started at {} and will be stopped after {} minutes.",
                self.config.instance_id,
                format_timestamp(&now),
                self.config.stop_after_minutes
            ),
        ))
    }

    async fn stop(
        &self,
        now: NaiveDateTime,
        function_arn: &str,
    ) -> Result<Notification, ControlError> {
        settle(Capability::InstanceCommand, self.instance.stop().await)?;
        self.record_state(InstanceState::Stopped, now).await?;

        let trigger: NextTrigger =
            NextTrigger::after(TriggerAction::StartInstance, now, self.config.start_after());
        self.arm(&trigger, function_arn).await;

        tracing::info!(
            "RDS instance {} stopped, starting in {} days",
            self.config.instance_id,
            self.config.start_after_days
        );

        Ok(Notification::new(
            STOPPED_SUBJECT,
            format!(
                "RDS instance {} has been stopped at {} and will be started again in {} days.",
                self.config.instance_id,
                format_timestamp(&now),
                self.config.start_after_days
            ),
        ))
    }

    // Scheduling failures are only logged, so arming never aborts the pass
    async fn arm(&self, trigger: &NextTrigger, function_arn: &str) {
        let cron_expression: String = trigger.cron_expression();

        let result = self
            .scheduler
            .upsert_one_shot_rule(trigger.rule_name(), &cron_expression, function_arn)
            .await;

        if let Ok(Some(())) = settle(Capability::Schedule, result) {
            tracing::info!(
                rule = trigger.rule_name(),
                "Scheduled next trigger {}",
                cron_expression
            );
        }
    }

    /// Append a record, then drop the oldest one if the history is over its bound.
    async fn record_state(
        &self,
        state: InstanceState,
        timestamp: NaiveDateTime,
    ) -> Result<(), ControlError> {
        let record: StateRecord = StateRecord::new(STATE_KEY, timestamp, state);

        settle(Capability::StateWrite, self.state_store.put(&record).await)?;

        let count: usize =
            settle(Capability::StateWrite, self.state_store.query_count(STATE_KEY).await)?
                .unwrap_or_default();

        if count > self.config.max_rows as usize {
            tracing::debug!("History holds {} rows, removing the oldest", count);
            let deleted = self.state_store.delete_oldest(STATE_KEY).await;
            settle(Capability::StateWrite, deleted)?;
        }

        Ok(())
    }
}
