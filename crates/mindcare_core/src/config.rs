//! Core configuration values.
//!
//! # Responsibility
//! - Hold the recurrence horizon and group-scope policy.
//! - Allow process-level overrides through environment variables.
//!
//! # Invariants
//! - Horizons are always >= 1 after normalization.
//! - Invalid overrides fall back to the current value and never panic.

use log::warn;

/// Default number of occurrences generated per selected weekday.
pub const DEFAULT_WEEKLY_OCCURRENCES: u32 = 6;
/// Default number of months scanned for monthly rules.
pub const DEFAULT_MONTHLY_MONTHS: u32 = 6;
/// Upper bound accepted from overrides; keeps expansions UI-presentable.
pub const MAX_HORIZON: u32 = 104;

pub const ENV_WEEKLY_OCCURRENCES: &str = "MINDCARE_WEEKLY_OCCURRENCES";
pub const ENV_MONTHLY_MONTHS: &str = "MINDCARE_MONTHLY_MONTHS";
pub const ENV_WEEKLY_GROUP_SCOPE: &str = "MINDCARE_WEEKLY_GROUP_SCOPE";

/// How weekly expansions assign group ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeeklyGroupScope {
    /// One group per selected weekday; each weekday series can be cancelled
    /// on its own.
    #[default]
    PerWeekday,
    /// One group for the whole rule, matching monthly expansion.
    PerRule,
}

impl WeeklyGroupScope {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "per_weekday" | "weekday" => Some(Self::PerWeekday),
            "per_rule" | "rule" => Some(Self::PerRule),
            _ => None,
        }
    }
}

/// Recurrence expansion policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceConfig {
    /// Occurrences generated per selected weekday.
    pub weekly_occurrences: u32,
    /// Months scanned for monthly rules, starting at the first target month.
    pub monthly_months: u32,
    pub weekly_group_scope: WeeklyGroupScope,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            weekly_occurrences: DEFAULT_WEEKLY_OCCURRENCES,
            monthly_months: DEFAULT_MONTHLY_MONTHS,
            weekly_group_scope: WeeklyGroupScope::PerWeekday,
        }
    }
}

impl RecurrenceConfig {
    pub fn with_weekly_occurrences(mut self, count: u32) -> Self {
        self.weekly_occurrences = clamp_horizon(count);
        self
    }

    pub fn with_monthly_months(mut self, count: u32) -> Self {
        self.monthly_months = clamp_horizon(count);
        self
    }

    pub fn with_weekly_group_scope(mut self, scope: WeeklyGroupScope) -> Self {
        self.weekly_group_scope = scope;
        self
    }

    /// Applies `MINDCARE_*` environment overrides on top of `self`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(ENV_WEEKLY_OCCURRENCES) {
            match raw.trim().parse::<u32>() {
                Ok(value) => self = self.with_weekly_occurrences(value),
                Err(_) => warn!(
                    "event=config_override module=config status=ignored key={ENV_WEEKLY_OCCURRENCES}"
                ),
            }
        }
        if let Some(raw) = lookup(ENV_MONTHLY_MONTHS) {
            match raw.trim().parse::<u32>() {
                Ok(value) => self = self.with_monthly_months(value),
                Err(_) => warn!(
                    "event=config_override module=config status=ignored key={ENV_MONTHLY_MONTHS}"
                ),
            }
        }
        if let Some(raw) = lookup(ENV_WEEKLY_GROUP_SCOPE) {
            match WeeklyGroupScope::parse(&raw) {
                Some(scope) => self.weekly_group_scope = scope,
                None => warn!(
                    "event=config_override module=config status=ignored key={ENV_WEEKLY_GROUP_SCOPE}"
                ),
            }
        }
        self
    }
}

fn clamp_horizon(count: u32) -> u32 {
    count.clamp(1, MAX_HORIZON)
}
