//! Repeat rule model and validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Highest weekday index (Saturday); 0 is Sunday.
pub const MAX_WEEKDAY: u8 = 6;
/// Highest day-of-month a monthly rule may select.
pub const MAX_MONTHLY_DATE: u8 = 31;

/// Repetition family of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatKind {
    /// Single appointment, nothing to expand.
    #[default]
    None,
    Weekly,
    Monthly,
}

/// How a base appointment recurs.
///
/// The base date is the template's `date`; it is not duplicated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatRule {
    pub kind: RepeatKind,
    /// Every Nth week or month; must be >= 1.
    pub interval: u32,
    /// Weekday indices, 0 = Sunday .. 6 = Saturday. Weekly rules only.
    #[serde(default)]
    pub weekdays: BTreeSet<u8>,
    /// Days of month, 1..=31. Monthly rules only.
    #[serde(default)]
    pub monthly_dates: BTreeSet<u8>,
}

impl Default for RepeatRule {
    fn default() -> Self {
        Self::none()
    }
}

impl RepeatRule {
    pub fn none() -> Self {
        Self {
            kind: RepeatKind::None,
            interval: 1,
            weekdays: BTreeSet::new(),
            monthly_dates: BTreeSet::new(),
        }
    }

    pub fn weekly(interval: u32, weekdays: impl IntoIterator<Item = u8>) -> Self {
        Self {
            kind: RepeatKind::Weekly,
            interval,
            weekdays: weekdays.into_iter().collect(),
            monthly_dates: BTreeSet::new(),
        }
    }

    pub fn monthly(interval: u32, monthly_dates: impl IntoIterator<Item = u8>) -> Self {
        Self {
            kind: RepeatKind::Monthly,
            interval,
            weekdays: BTreeSet::new(),
            monthly_dates: monthly_dates.into_iter().collect(),
        }
    }

    /// Checks the fields relevant to `kind`.
    ///
    /// `RepeatKind::None` is always valid; fields for the other kind are
    /// ignored.
    pub fn validate(&self) -> Result<(), RuleError> {
        match self.kind {
            RepeatKind::None => Ok(()),
            RepeatKind::Weekly => {
                if self.interval == 0 {
                    return Err(RuleError::ZeroInterval);
                }
                if self.weekdays.is_empty() {
                    return Err(RuleError::EmptyWeekdays);
                }
                match self.weekdays.iter().find(|day| **day > MAX_WEEKDAY) {
                    Some(day) => Err(RuleError::WeekdayOutOfRange(*day)),
                    None => Ok(()),
                }
            }
            RepeatKind::Monthly => {
                if self.interval == 0 {
                    return Err(RuleError::ZeroInterval);
                }
                if self.monthly_dates.is_empty() {
                    return Err(RuleError::EmptyMonthlyDates);
                }
                match self
                    .monthly_dates
                    .iter()
                    .find(|day| **day == 0 || **day > MAX_MONTHLY_DATE)
                {
                    Some(day) => Err(RuleError::MonthlyDateOutOfRange(*day)),
                    None => Ok(()),
                }
            }
        }
    }
}

/// Malformed repeat rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleError {
    ZeroInterval,
    EmptyWeekdays,
    EmptyMonthlyDates,
    WeekdayOutOfRange(u8),
    MonthlyDateOutOfRange(u8),
}

impl RuleError {
    /// Stable short code for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ZeroInterval => "zero_interval",
            Self::EmptyWeekdays => "empty_weekdays",
            Self::EmptyMonthlyDates => "empty_monthly_dates",
            Self::WeekdayOutOfRange(_) => "weekday_out_of_range",
            Self::MonthlyDateOutOfRange(_) => "monthly_date_out_of_range",
        }
    }
}

impl Display for RuleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroInterval => write!(f, "repeat interval must be >= 1"),
            Self::EmptyWeekdays => write!(f, "weekly rule must select at least one weekday"),
            Self::EmptyMonthlyDates => {
                write!(f, "monthly rule must select at least one day of month")
            }
            Self::WeekdayOutOfRange(day) => {
                write!(f, "weekday index {day} is out of range 0..=6")
            }
            Self::MonthlyDateOutOfRange(day) => {
                write!(f, "day of month {day} is out of range 1..=31")
            }
        }
    }
}

impl Error for RuleError {}
