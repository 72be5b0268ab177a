//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `mindcare_core` linkage without the Flutter/FFI runtime.
//! - Preview a repeat rule expansion from the command line.
//!
//! Usage: `mindcare_cli [<YYYY-MM-DD> <weekly|monthly> <interval> <d1,d2,...>]`

use mindcare_core::{
    format_date, parse_date, try_generate_repeat_appointments, AppointmentKind,
    AppointmentTemplate, RecurrenceConfig, RepeatRule,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("mindcare_core ping={}", mindcare_core::ping());
    println!("mindcare_core version={}", mindcare_core::core_version());

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        return ExitCode::SUCCESS;
    }

    match preview(&args) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn preview(args: &[String]) -> Result<Vec<String>, String> {
    let [date, kind, interval, days] = args else {
        return Err("expected <YYYY-MM-DD> <weekly|monthly> <interval> <d1,d2,...>".to_string());
    };

    let base = parse_date(date).ok_or_else(|| format!("invalid date `{date}`"))?;
    let interval = interval
        .parse::<u32>()
        .map_err(|_| format!("invalid interval `{interval}`"))?;
    let days = days
        .split(',')
        .map(|day| day.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| format!("invalid day list `{days}`"))?;

    let rule = match kind.as_str() {
        "weekly" => RepeatRule::weekly(interval, days),
        "monthly" => RepeatRule::monthly(interval, days),
        other => return Err(format!("unknown repeat kind `{other}`")),
    };
    let template = AppointmentTemplate::new("cli", "preview", AppointmentKind::Other, base);
    let config = RecurrenceConfig::default().with_env_overrides();
    let expansion =
        try_generate_repeat_appointments(&template, &rule, &config).map_err(|err| err.to_string())?;

    Ok(expansion
        .instances
        .iter()
        .map(|instance| format!("{} {}", format_date(instance.date()), instance.group_id))
        .collect())
}
