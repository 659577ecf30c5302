use chrono::Duration;
use model::env::{
    DYNAMODB_TABLE, MAX_ROWS, RDS_INSTANCE_ID, SNS_TOPIC_ARN, START_AFTER_DAYS, STOP_AFTER_MINUTES,
};
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

const DEFAULT_STOP_AFTER_MINUTES: u32 = 30;
const DEFAULT_START_AFTER_DAYS: u32 = 6;
const DEFAULT_MAX_ROWS: u32 = 10;

// Keeps every computed timestamp and cron year well inside the representable range
const STOP_AFTER_MINUTES_RANGE: RangeInclusive<u32> = 0..=525_600;
const START_AFTER_DAYS_RANGE: RangeInclusive<u32> = 0..=3_650;
const MAX_ROWS_RANGE: RangeInclusive<u32> = 1..=u32::MAX;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub instance_id: String,
    pub table_name: String,
    pub topic_arn: Option<String>,
    /// Minutes the instance stays running before it is stopped
    pub stop_after_minutes: u32,
    /// Days the instance stays stopped before it is started
    pub start_after_days: u32,
    /// History rows retained per state key
    pub max_rows: u32,
}

impl ControllerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        Ok(ControllerConfig {
            instance_id: required(RDS_INSTANCE_ID)?,
            table_name: required(DYNAMODB_TABLE)?,
            topic_arn: lookup(SNS_TOPIC_ARN).filter(|value| !value.trim().is_empty()),
            stop_after_minutes: parse_within(
                &lookup,
                STOP_AFTER_MINUTES,
                DEFAULT_STOP_AFTER_MINUTES,
                STOP_AFTER_MINUTES_RANGE,
            )?,
            start_after_days: parse_within(
                &lookup,
                START_AFTER_DAYS,
                DEFAULT_START_AFTER_DAYS,
                START_AFTER_DAYS_RANGE,
            )?,
            max_rows: parse_within(&lookup, MAX_ROWS, DEFAULT_MAX_ROWS, MAX_ROWS_RANGE)?,
        })
    }

    pub fn stop_after(&self) -> Duration {
        Duration::minutes(i64::from(self.stop_after_minutes))
    }

    pub fn start_after(&self) -> Duration {
        Duration::days(i64::from(self.start_after_days))
    }
}

fn parse_within(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u32,
    range: RangeInclusive<u32>,
) -> Result<u32, ConfigError> {
    let Some(value) = lookup(name) else {
        return Ok(default);
    };

    match value.trim().parse::<u32>() {
        Ok(parsed) if range.contains(&parsed) => Ok(parsed),
        _ => Err(ConfigError::Invalid { name, value }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    // A required environment variable is unset or empty
    Missing(&'static str),
    Invalid { name: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "Missing {} environment variable", name),
            ConfigError::Invalid { name, value } => {
                write!(f, "Invalid value {:?} for {} environment variable", value, name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigError, ControllerConfig};
    use chrono::Duration;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_values_are_unset() {
        let config: ControllerConfig = ControllerConfig::from_lookup(lookup(&[
            ("RDS_INSTANCE_ID", "db-1"),
            ("DYNAMODB_TABLE", "state"),
        ]))
        .unwrap();

        assert_eq!("db-1", config.instance_id);
        assert_eq!(None, config.topic_arn);
        assert_eq!(30, config.stop_after_minutes);
        assert_eq!(6, config.start_after_days);
        assert_eq!(10, config.max_rows);
    }

    #[test]
    fn overrides_are_parsed() {
        let config: ControllerConfig = ControllerConfig::from_lookup(lookup(&[
            ("RDS_INSTANCE_ID", "db-1"),
            ("DYNAMODB_TABLE", "state"),
            ("SNS_TOPIC_ARN", "arn:aws:sns:eu-west-1:1:topic"),
            ("STOP_AFTER_MINUTES", "45"),
            ("START_AFTER_DAYS", " 2 "),
            ("MAX_ROWS", "3"),
        ]))
        .unwrap();

        assert_eq!(Some("arn:aws:sns:eu-west-1:1:topic".to_string()), config.topic_arn);
        assert_eq!(45, config.stop_after().num_minutes());
        assert_eq!(2, config.start_after().num_days());
        assert_eq!(3, config.max_rows);
    }

    #[test]
    fn missing_instance_id_is_reported() {
        let result = ControllerConfig::from_lookup(lookup(&[("DYNAMODB_TABLE", "state")]));

        assert_eq!(Err(ConfigError::Missing("RDS_INSTANCE_ID")), result);
    }

    #[test]
    fn non_numeric_duration_is_invalid() {
        let result = ControllerConfig::from_lookup(lookup(&[
            ("RDS_INSTANCE_ID", "db-1"),
            ("DYNAMODB_TABLE", "state"),
            ("STOP_AFTER_MINUTES", "half an hour"),
        ]));

        assert_eq!(
            Err(ConfigError::Invalid {
                name: "STOP_AFTER_MINUTES",
                value: "half an hour".to_string()
            }),
            result
        );
    }

    #[test]
    fn zero_retained_rows_is_invalid() {
        let result = ControllerConfig::from_lookup(lookup(&[
            ("RDS_INSTANCE_ID", "db-1"),
            ("DYNAMODB_TABLE", "state"),
            ("MAX_ROWS", "0"),
        ]));

        assert!(matches!(result, Err(ConfigError::Invalid { name: "MAX_ROWS", .. })));
    }

    #[test]
    fn oversized_durations_are_invalid() {
        let days = ControllerConfig::from_lookup(lookup(&[
            ("RDS_INSTANCE_ID", "db-1"),
            ("DYNAMODB_TABLE", "state"),
            ("START_AFTER_DAYS", "4000000000"),
        ]));
        let minutes = ControllerConfig::from_lookup(lookup(&[
            ("RDS_INSTANCE_ID", "db-1"),
            ("DYNAMODB_TABLE", "state"),
            ("STOP_AFTER_MINUTES", "525601"),
        ]));

        assert!(matches!(days, Err(ConfigError::Invalid { name: "START_AFTER_DAYS", .. })));
        assert!(matches!(minutes, Err(ConfigError::Invalid { name: "STOP_AFTER_MINUTES", .. })));
    }

    #[test]
    fn largest_accepted_durations_still_schedule() {
        let config: ControllerConfig = ControllerConfig::from_lookup(lookup(&[
            ("RDS_INSTANCE_ID", "db-1"),
            ("DYNAMODB_TABLE", "state"),
            ("START_AFTER_DAYS", "3650"),
            ("STOP_AFTER_MINUTES", "525600"),
        ]))
        .unwrap();

        let now = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .unwrap();

        assert!(now.checked_sub_signed(config.start_after() + Duration::days(1)).is_some());
        assert!(now.checked_add_signed(config.stop_after()).is_some());
    }
}
