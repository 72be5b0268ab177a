//! Monthly expansion.

use crate::config::RecurrenceConfig;
use crate::model::appointment::{AppointmentTemplate, GroupId};
use crate::recurrence::rule::RepeatRule;
use crate::recurrence::GeneratedAppointment;
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;

/// Expands a monthly rule into the additional instances after `template.date`.
///
/// The scan starts in the base month when any selected day is still ahead
/// of the base day-of-month, otherwise in the following month, and covers
/// `config.monthly_months` target months spaced `interval` months apart.
/// Days that do not exist in a target month are dropped for that month only.
///
/// Expects a validated monthly rule. The result is sorted by date, holds no
/// duplicate dates and only dates strictly after the base date.
pub fn expand_monthly(
    template: &AppointmentTemplate,
    rule: &RepeatRule,
    config: &RecurrenceConfig,
) -> Vec<GeneratedAppointment> {
    let base = template.date;
    let start_offset = if rule
        .monthly_dates
        .iter()
        .any(|day| u32::from(*day) > base.day())
    {
        0
    } else {
        1
    };
    let base_month = i64::from(base.year()) * 12 + i64::from(base.month0());
    let group_id = GroupId::monthly(base, &template.title);
    let mut seen = HashSet::new();
    let mut instances = Vec::new();

    for month_index in 0..config.monthly_months {
        let target_month =
            base_month + i64::from(rule.interval) * i64::from(month_index) + start_offset;
        let Some((year, month)) = split_month(target_month) else {
            break;
        };

        for &day in &rule.monthly_dates {
            // e.g. the 30th in February: skipped, never clamped.
            let Some(date) = NaiveDate::from_ymd_opt(year, month, u32::from(day)) else {
                continue;
            };
            if date <= base || !seen.insert(date) {
                continue;
            }
            instances.push(GeneratedAppointment::new(
                template.on_date(date),
                group_id.clone(),
            ));
        }
    }

    instances.sort_by_key(GeneratedAppointment::date);
    instances
}

/// Splits a month count since year 0 into `(year, 1-based month)`.
fn split_month(total_months: i64) -> Option<(i32, u32)> {
    let year = i32::try_from(total_months.div_euclid(12)).ok()?;
    let month = u32::try_from(total_months.rem_euclid(12)).ok()? + 1;
    Some((year, month))
}

#[cfg(test)]
mod tests {
    use super::{expand_monthly, split_month};
    use crate::config::RecurrenceConfig;
    use crate::model::appointment::{AppointmentKind, AppointmentTemplate};
    use crate::recurrence::rule::RepeatRule;
    use chrono::NaiveDate;

    #[test]
    fn split_month_rolls_over_years() {
        assert_eq!(split_month(2024 * 12), Some((2024, 1)));
        assert_eq!(split_month(2024 * 12 + 11), Some((2024, 12)));
        assert_eq!(split_month(2024 * 12 + 12), Some((2025, 1)));
    }

    #[test]
    fn interval_skips_months_and_crosses_year_end() {
        let base = NaiveDate::from_ymd_opt(2024, 11, 20).unwrap();
        let template =
            AppointmentTemplate::new("user-1", "review", AppointmentKind::Counseling, base);
        let rule = RepeatRule::monthly(3, [10]);
        let config = RecurrenceConfig::default().with_monthly_months(3);

        let dates: Vec<_> = expand_monthly(&template, &rule, &config)
            .iter()
            .map(|instance| instance.date())
            .collect();

        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 12, 10).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            ]
        );
    }

    #[test]
    fn same_month_start_drops_days_already_passed() {
        // Base on the 10th with days 5 and 25: 5th of the base month is gone.
        let base = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let template =
            AppointmentTemplate::new("user-1", "review", AppointmentKind::Counseling, base);
        let rule = RepeatRule::monthly(1, [5, 25]);
        let config = RecurrenceConfig::default().with_monthly_months(2);

        let dates: Vec<_> = expand_monthly(&template, &rule, &config)
            .iter()
            .map(|instance| instance.date())
            .collect();

        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 5, 25).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 25).unwrap(),
            ]
        );
    }
}
