//! Cadence for optimization cycles

use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
enum Cadence {
    /// Aligned to wall-clock boundaries
    Cron(Schedule),
    /// Plain interval measured from the previous cycle
    Fixed,
}

/// Cycle cadence derived from a plain interval.
///
/// An interval that divides its unit evenly (seconds or minutes of an hour,
/// hours of a day, or exactly one day) becomes a cron schedule aligned to
/// wall-clock boundaries. Anything else would make a cron step restart at
/// the unit boundary and fire early, so it runs as a fixed delay instead.
#[derive(Debug, Clone)]
pub struct CycleSchedule {
    cadence: Cadence,
    expression: String,
    interval_seconds: u64,
}

/// Cron expression for intervals that tile their unit exactly
fn aligned_expression(interval_seconds: u64) -> Option<String> {
    // Cron format: second minute hour day month weekday
    match interval_seconds {
        86_400 => Some("0 0 0 * * *".to_string()),
        s if s % 3_600 == 0 && 24 % (s / 3_600) == 0 => {
            Some(format!("0 0 */{} * * *", s / 3_600))
        }
        s if s % 60 == 0 && s < 3_600 && 60 % (s / 60) == 0 => {
            Some(format!("0 */{} * * * *", s / 60))
        }
        s if s < 60 && 60 % s == 0 => Some(format!("*/{} * * * * *", s)),
        _ => None,
    }
}

impl CycleSchedule {
    pub fn from_interval(interval_seconds: u64) -> Result<Self, ConfigError> {
        if interval_seconds == 0 {
            return Err(ConfigError::Invalid {
                key: "OPTIMIZATION_INTERVAL_SECONDS",
                reason: "interval must be greater than zero".to_string(),
            });
        }

        let (cadence, expression) = match aligned_expression(interval_seconds) {
            Some(expression) => {
                let schedule =
                    Schedule::from_str(&expression).map_err(|e| ConfigError::Invalid {
                        key: "OPTIMIZATION_INTERVAL_SECONDS",
                        reason: format!("invalid cron expression '{}': {}", expression, e),
                    })?;
                (Cadence::Cron(schedule), expression)
            }
            None => (Cadence::Fixed, format!("every {}s", interval_seconds)),
        };

        info!(
            interval = interval_seconds,
            schedule = %expression,
            "Optimization schedule created"
        );

        Ok(Self {
            cadence,
            expression,
            interval_seconds,
        })
    }

    /// The cron expression, or `every <n>s` for a fixed delay
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn is_aligned(&self) -> bool {
        matches!(self.cadence, Cadence::Cron(_))
    }

    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match &self.cadence {
            Cadence::Cron(schedule) => schedule.after(&now).next(),
            Cadence::Fixed => chrono::Duration::try_seconds(self.interval_seconds as i64)
                .and_then(|step| now.checked_add_signed(step)),
        }
    }

    /// Time to wait from `now` until the next slot; the raw interval if the schedule is exhausted.
    pub fn delay_from(&self, now: DateTime<Utc>) -> Duration {
        match &self.cadence {
            Cadence::Fixed => Duration::from_secs(self.interval_seconds),
            Cadence::Cron(_) => match self.next_after(now) {
                Some(next) => (next - now).to_std().unwrap_or_default(),
                None => Duration::from_secs(self.interval_seconds),
            },
        }
    }
}
