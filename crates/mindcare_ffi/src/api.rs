//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose appointment create/preview/delete flows to Dart via FRB.
//! - Translate ISO date strings and policy names at the boundary.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported in response envelopes, never thrown.

use chrono::NaiveTime;
use log::warn;
use mindcare_core::db::open_db;
use mindcare_core::{
    core_version as core_version_inner, format_date, generate_repeat_appointments,
    init_logging as init_logging_inner, parse_date, ping as ping_inner, AppointmentKind,
    AppointmentService, AppointmentTemplate, CreatedSeries, GroupDeleteRequest, LoggingConfig,
    RecurrenceConfig, RepeatKind, RepeatRule, SqliteAppointmentStore,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const ENTRY_DB_FILE_NAME: &str = "mindcare_entry.sqlite3";
static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static RECURRENCE_CONFIG: OnceLock<RecurrenceConfig> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(&LoggingConfig::new(level, log_dir)) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Appointment input from the create form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppointmentDraft {
    pub user_id: String,
    pub title: String,
    /// `counseling|self_care|medical|other`.
    pub kind: String,
    /// Base date, `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM` or `HH:MM:SS`.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub reminder_minutes: Option<u32>,
    pub memo: Option<String>,
    /// `none|weekly|monthly`.
    pub repeat_kind: String,
    pub repeat_interval: u32,
    /// 0 = Sunday .. 6 = Saturday.
    pub weekdays: Vec<u8>,
    /// 1..=31.
    pub monthly_dates: Vec<u8>,
}

/// Response envelope for appointment creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentCreateResponse {
    pub ok: bool,
    pub appointment_id: Option<String>,
    /// Group of the base appointment.
    pub group_id: Option<String>,
    /// Every group the stored series belongs to, one per weekday for
    /// multi-weekday weekly rules.
    pub group_ids: Vec<String>,
    /// Number of recurring instances stored besides the base appointment.
    pub created_instances: u32,
    /// Generated instances the store rejected.
    pub failed_instances: u32,
    pub message: String,
}

impl AppointmentCreateResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            appointment_id: None,
            group_id: None,
            group_ids: Vec::new(),
            created_instances: 0,
            failed_instances: 0,
            message: message.into(),
        }
    }

    fn from_series(series: &CreatedSeries) -> Self {
        let created_instances = u32::try_from(series.instances.len()).unwrap_or(u32::MAX);
        let failed_instances = u32::try_from(series.failed_count).unwrap_or(u32::MAX);
        let message = match (created_instances, failed_instances) {
            (0, 0) => "Appointment created.".to_string(),
            (created, 0) => format!("Appointment created with {created} repeat(s)."),
            (created, failed) => format!(
                "Appointment created with {created} repeat(s); {failed} could not be saved."
            ),
        };
        Self {
            ok: true,
            appointment_id: Some(series.base.id.to_string()),
            group_id: series.group_id().map(ToString::to_string),
            group_ids: series.group_ids().iter().map(ToString::to_string).collect(),
            created_instances,
            failed_instances,
            message,
        }
    }
}

/// Response envelope for group deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDeleteResponse {
    pub ok: bool,
    pub deleted_count: u32,
    pub message: String,
}

/// Creates an appointment and its recurring instances.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - A malformed repeat rule still creates the base appointment.
#[flutter_rust_bridge::frb(sync)]
pub fn appointment_create(draft: AppointmentDraft) -> AppointmentCreateResponse {
    let (template, rule) = match parse_draft(&draft) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error fn=appointment_create stage=parse");
            return AppointmentCreateResponse::failure(format!("appointment_create failed: {err}"));
        }
    };

    let result = with_service(|service| {
        service
            .create_with_repeat(&template, &rule)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(series) => {
            if series.failed_count > 0 {
                warn!(
                    "event=ffi_call module=ffi status=partial fn=appointment_create failed={}",
                    series.failed_count
                );
            }
            AppointmentCreateResponse::from_series(&series)
        }
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error fn=appointment_create stage=store");
            AppointmentCreateResponse::failure(format!("appointment_create failed: {err}"))
        }
    }
}

/// Returns the ISO dates a draft would generate besides its base date.
///
/// Pure computation; invalid drafts yield an empty list.
#[flutter_rust_bridge::frb(sync)]
pub fn appointment_preview(draft: AppointmentDraft) -> Vec<String> {
    match parse_draft(&draft) {
        Ok((template, rule)) => generate_repeat_appointments(&template, &rule, recurrence_config())
            .dates()
            .into_iter()
            .map(format_date)
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Deletes group members using `policy = single|future|all`.
///
/// # FFI contract
/// - `future` requires `from_date`; `single` requires `appointment_id`.
/// - Deleting an already deleted group reports `deleted_count = 0`.
#[flutter_rust_bridge::frb(sync)]
pub fn appointment_delete_group(
    user_id: String,
    group_id: String,
    policy: String,
    from_date: Option<String>,
    appointment_id: Option<String>,
) -> GroupDeleteResponse {
    let request = GroupDeleteRequest {
        group_id,
        policy,
        from_date,
        appointment_id,
    };
    let result = with_service(|service| {
        service
            .delete_group_request(user_id.trim(), &request)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(outcome) => GroupDeleteResponse {
            ok: true,
            deleted_count: u32::try_from(outcome.deleted_count).unwrap_or(u32::MAX),
            message: outcome.message(),
        },
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error fn=appointment_delete_group");
            GroupDeleteResponse {
                ok: false,
                deleted_count: 0,
                message: format!("appointment_delete_group failed: {err}"),
            }
        }
    }
}

fn parse_draft(draft: &AppointmentDraft) -> Result<(AppointmentTemplate, RepeatRule), String> {
    let kind = parse_kind(&draft.kind)?;
    let date = parse_date(&draft.date)
        .ok_or_else(|| format!("date `{}` is not a YYYY-MM-DD date", draft.date))?;

    let mut template = AppointmentTemplate::new(
        draft.user_id.trim(),
        draft.title.trim(),
        kind,
        date,
    );
    template.start_time = parse_optional_time(draft.start_time.as_deref())?;
    template.end_time = parse_optional_time(draft.end_time.as_deref())?;
    template.reminder_minutes = draft.reminder_minutes;
    template.memo = draft
        .memo
        .as_deref()
        .map(str::trim)
        .filter(|memo| !memo.is_empty())
        .map(str::to_string);

    let rule = RepeatRule {
        kind: parse_repeat_kind(&draft.repeat_kind)?,
        interval: draft.repeat_interval,
        weekdays: draft.weekdays.iter().copied().collect(),
        monthly_dates: draft.monthly_dates.iter().copied().collect(),
    };
    Ok((template, rule))
}

fn parse_kind(value: &str) -> Result<AppointmentKind, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "counseling" => Ok(AppointmentKind::Counseling),
        "self_care" => Ok(AppointmentKind::SelfCare),
        "medical" => Ok(AppointmentKind::Medical),
        "other" => Ok(AppointmentKind::Other),
        "" => Err("appointment type must not be blank".to_string()),
        other => Err(format!("unknown appointment type `{other}`")),
    }
}

fn parse_repeat_kind(value: &str) -> Result<RepeatKind, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "none" | "" => Ok(RepeatKind::None),
        "weekly" => Ok(RepeatKind::Weekly),
        "monthly" => Ok(RepeatKind::Monthly),
        other => Err(format!("unknown repeat kind `{other}`")),
    }
}

fn parse_optional_time(value: Option<&str>) -> Result<Option<NaiveTime>, String> {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map(Some)
        .map_err(|_| format!("time `{raw}` is not HH:MM"))
}

fn recurrence_config() -> &'static RecurrenceConfig {
    RECURRENCE_CONFIG.get_or_init(|| RecurrenceConfig::default().with_env_overrides())
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("MINDCARE_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
        })
        .clone()
}

fn with_service<T>(
    f: impl FnOnce(&AppointmentService<SqliteAppointmentStore<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let db_path = resolve_entry_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("entry DB open failed: {err}"))?;
    let service =
        AppointmentService::with_config(SqliteAppointmentStore::new(&conn), *recurrence_config());
    f(&service)
}
