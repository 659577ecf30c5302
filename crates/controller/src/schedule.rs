use chrono::{Duration, NaiveDateTime};

/// The self-invocation armed after a start or stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextTrigger {
    pub action: TriggerAction,
    pub fire_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    StartInstance,
    StopInstance,
}

impl NextTrigger {
    pub fn after(action: TriggerAction, now: NaiveDateTime, delay: Duration) -> Self {
        NextTrigger {
            action,
            fire_at: now + delay,
        }
    }

    /// One rule per action, so re-arming replaces any stale schedule.
    pub fn rule_name(&self) -> &'static str {
        match self.action {
            TriggerAction::StartInstance => "start-instance-lambda-trigger",
            TriggerAction::StopInstance => "stop-instance-lambda-trigger",
        }
    }

    /// Minute precision, pinned to a single year so the rule fires once.
    pub fn cron_expression(&self) -> String {
        self.fire_at.format("cron(%M %H %d %m ? %Y)").to_string()
    }
}
