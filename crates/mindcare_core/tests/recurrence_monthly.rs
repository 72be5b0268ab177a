use chrono::{Datelike, Days, NaiveDate};
use mindcare_core::{
    generate_repeat_appointments, try_generate_repeat_appointments, AppointmentKind,
    AppointmentTemplate, GroupId, RecurrenceConfig, RepeatRule, RuleError,
};
use std::collections::HashSet;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn template_on(base: NaiveDate) -> AppointmentTemplate {
    AppointmentTemplate::new("user-1", "check-in", AppointmentKind::Medical, base)
}

#[test]
fn day_31_is_skipped_in_short_months() {
    let expansion = generate_repeat_appointments(
        &template_on(date(2024, 1, 31)),
        &RepeatRule::monthly(1, [31]),
        &RecurrenceConfig::default(),
    );

    // Scan covers Feb..Jul 2024; only the 31-day months produce a date.
    assert_eq!(
        expansion.dates(),
        vec![date(2024, 3, 31), date(2024, 5, 31), date(2024, 7, 31)]
    );
    assert!(expansion
        .dates()
        .iter()
        .all(|d| ![2, 4, 6, 9, 11].contains(&d.month())));
}

#[test]
fn day_31_over_a_full_year_hits_every_long_month() {
    let config = RecurrenceConfig::default().with_monthly_months(12);
    let expansion = generate_repeat_appointments(
        &template_on(date(2024, 1, 31)),
        &RepeatRule::monthly(1, [31]),
        &config,
    );

    let months: Vec<_> = expansion
        .dates()
        .iter()
        .map(|d| (d.year(), d.month()))
        .collect();
    assert_eq!(
        months,
        vec![
            (2024, 3),
            (2024, 5),
            (2024, 7),
            (2024, 8),
            (2024, 10),
            (2024, 12),
            (2025, 1),
        ]
    );
}

#[test]
fn february_29_only_in_leap_years() {
    let config = RecurrenceConfig::default().with_monthly_months(12);
    let expansion = generate_repeat_appointments(
        &template_on(date(2023, 12, 30)),
        &RepeatRule::monthly(12, [29]),
        &config.with_monthly_months(2),
    );
    // Offset 1: Jan 2024, then Jan 2025.
    assert_eq!(expansion.dates(), vec![date(2024, 1, 29), date(2025, 1, 29)]);

    let feb_rule = RepeatRule::monthly(1, [29]);
    let leap = generate_repeat_appointments(&template_on(date(2024, 1, 30)), &feb_rule, &config);
    assert_eq!(leap.dates()[0], date(2024, 2, 29));

    let common = generate_repeat_appointments(&template_on(date(2023, 1, 30)), &feb_rule, &config);
    assert_eq!(common.dates()[0], date(2023, 3, 29));
}

#[test]
fn later_day_starts_in_base_month() {
    let expansion = generate_repeat_appointments(
        &template_on(date(2024, 4, 10)),
        &RepeatRule::monthly(1, [25]),
        &RecurrenceConfig::default(),
    );
    assert_eq!(expansion.dates()[0], date(2024, 4, 25));
    assert_eq!(expansion.len(), 6);
}

#[test]
fn earlier_day_starts_in_following_month() {
    let expansion = generate_repeat_appointments(
        &template_on(date(2024, 4, 10)),
        &RepeatRule::monthly(1, [5]),
        &RecurrenceConfig::default(),
    );
    assert_eq!(expansion.dates()[0], date(2024, 5, 5));
    assert_eq!(expansion.len(), 6);
}

#[test]
fn same_day_as_base_starts_in_following_month() {
    let expansion = generate_repeat_appointments(
        &template_on(date(2024, 4, 10)),
        &RepeatRule::monthly(1, [10]),
        &RecurrenceConfig::default(),
    );
    assert_eq!(expansion.dates()[0], date(2024, 5, 10));
    assert!(!expansion.dates().contains(&date(2024, 4, 10)));
}

#[test]
fn whole_rule_shares_one_group_id() {
    let base = date(2024, 4, 10);
    let expansion = generate_repeat_appointments(
        &template_on(base),
        &RepeatRule::monthly(1, [1, 15, 28]),
        &RecurrenceConfig::default(),
    );

    let expected = GroupId::new("monthly_date_2024-04-10_check-in");
    assert!(!expansion.is_empty());
    assert!(expansion
        .instances
        .iter()
        .all(|instance| instance.group_id == expected));
    assert_eq!(expansion.base_group_id, Some(expected));
}

#[test]
fn never_repeats_base_date_or_goes_backwards() {
    let config = RecurrenceConfig::default();
    let selected = [1, 10, 15, 28, 29, 30, 31];
    let mut base = date(2024, 1, 1);

    for _ in 0..60 {
        for interval in 1..=2 {
            let expansion = generate_repeat_appointments(
                &template_on(base),
                &RepeatRule::monthly(interval, selected),
                &config,
            );
            let dates = expansion.dates();
            let unique: HashSet<_> = dates.iter().copied().collect();
            assert_eq!(unique.len(), dates.len(), "duplicate dates for base {base}");
            assert!(dates.iter().all(|d| *d > base), "date not after base {base}");
            assert!(dates.len() <= config.monthly_months as usize * selected.len());
        }
        base = base + Days::new(6);
    }
}

#[test]
fn malformed_monthly_rules_expand_to_nothing() {
    let template = template_on(date(2024, 4, 10));
    let config = RecurrenceConfig::default();

    assert!(generate_repeat_appointments(&template, &RepeatRule::monthly(1, []), &config).is_empty());
    assert!(generate_repeat_appointments(&template, &RepeatRule::monthly(0, [5]), &config).is_empty());
    assert_eq!(
        try_generate_repeat_appointments(&template, &RepeatRule::monthly(1, [32]), &config),
        Err(RuleError::MonthlyDateOutOfRange(32))
    );
}
