use chrono::NaiveDate;
use uuid::Uuid;

use crate::dates::{month_bounds, parse_iso};
use crate::models::*;
use crate::prediction::{self, analyze_cycles, resolve_parameters};
use crate::storage::{CycleStore, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid month {month} of {year}")]
    InvalidMonth { year: i32, month: u32 },
    #[error("cannot log {0}: it is in the future")]
    FutureDate(NaiveDate),
    #[error("no log with id {0}")]
    UnknownLog(Uuid),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("refusing to wipe without --yes")]
    WipeNotConfirmed,
}

pub type CommandResult<T> = Result<T, CommandError>;

fn parse_date(value: &str) -> CommandResult<NaiveDate> {
    parse_iso(value).map_err(|_| CommandError::InvalidDate(value.to_string()))
}

/// What the user entered for one day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayEntry {
    pub bleeding_intensity: Option<BleedingIntensity>,
    pub mood: Option<Mood>,
    pub symptoms: Vec<Symptom>,
    pub notes: Option<String>,
    pub water_intake: Option<u32>,
}

/// Partial update of the configured cycle settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    pub cycle_length: Option<i64>,
    pub period_length: Option<i64>,
    pub last_period_start: Option<String>,
    pub clear_last_period_start: bool,
    pub derive_from_logs: Option<bool>,
    pub show_fertility: Option<bool>,
}

/// Parameters the predictions run on: configured values, overridden by what
/// the logs show when the user allows it.
fn resolved(data: &AppData) -> CycleParameters {
    let analysis = analyze_cycles(&data.logs);
    resolve_parameters(&data.parameters, &analysis, data.settings.derive_from_logs)
}

/// Create or replace the log for `date`.
pub fn log_day<S: CycleStore>(
    store: &mut S,
    date: &str,
    entry: DayEntry,
    today: NaiveDate,
) -> CommandResult<DailyLog> {
    let date = parse_date(date)?;
    if date > today {
        return Err(CommandError::FutureDate(date));
    }

    let notes = entry
        .notes
        .map(|n| n.trim().chars().take(MAX_NOTES_LEN).collect::<String>())
        .filter(|n| !n.is_empty());

    let mut log = DailyLog::new(date);
    log.bleeding_intensity = entry.bleeding_intensity;
    log.mood = entry.mood;
    log.symptoms = entry.symptoms;
    log.notes = notes;
    log.water_intake = entry.water_intake.filter(|glasses| *glasses > 0);

    let stored = store.upsert_log(log)?;
    tracing::info!(date = %stored.date, bleeding = stored.is_bleeding(), "logged day");
    Ok(stored)
}

/// Update only the water count for a day, creating the log if needed.
pub fn set_water_intake<S: CycleStore>(
    store: &mut S,
    date: &str,
    glasses: u32,
    today: NaiveDate,
) -> CommandResult<DailyLog> {
    let day = parse_date(date)?;
    if day > today {
        return Err(CommandError::FutureDate(day));
    }
    let mut log = store
        .load_logs()?
        .into_iter()
        .find(|l| l.date == day)
        .unwrap_or_else(|| DailyLog::new(day));
    log.water_intake = Some(glasses).filter(|g| *g > 0);
    Ok(store.upsert_log(log)?)
}

pub fn delete_log<S: CycleStore>(store: &mut S, id: Uuid) -> CommandResult<()> {
    if !store.delete_log(id)? {
        return Err(CommandError::UnknownLog(id));
    }
    tracing::info!(%id, "deleted log");
    Ok(())
}

/// Mark `today` as the first day of a new period.
pub fn start_period<S: CycleStore>(store: &mut S, today: NaiveDate) -> CommandResult<CycleParameters> {
    let mut parameters = store.load_parameters()?;
    parameters.last_period_start = Some(today);
    store.save_parameters(parameters)?;
    tracing::info!(%today, "period started");
    Ok(parameters)
}

/// The "today" dashboard.
pub fn overview<S: CycleStore>(store: &S, today: NaiveDate) -> CommandResult<CycleOverview> {
    let data = store.load()?;
    let params = resolved(&data);
    let projected = prediction::project(&params);
    let anchor = params.last_period_start;

    let cycle_day = prediction::cycle_day_for_date(today, anchor, params.cycle_length);
    let phase = prediction::cycle_phase_key(today, anchor, params.cycle_length, params.period_length);
    let phase_label =
        prediction::cycle_phase_label(today, anchor, params.cycle_length, params.period_length);
    let show_fertility = data.settings.show_fertility;

    tracing::debug!(
        cycle_day,
        %phase,
        label = %phase_label,
        new_user = projected.is_new_user,
        "computed overview"
    );

    Ok(CycleOverview {
        cycle_day,
        cycle_length: params.cycle_length,
        phase,
        phase_label,
        insight: phase.insight(),
        days_until_next_period: params.cycle_length - cycle_day + 1,
        next_period_start: projected.next_period_start,
        predicted_ovulation: projected.predicted_ovulation.filter(|_| show_fertility),
        fertile_window_start: projected.fertile_window_start.filter(|_| show_fertility),
        fertile_window_end: projected.fertile_window_end.filter(|_| show_fertility),
        avg_cycle_length: params.cycle_length,
        avg_period_length: params.period_length,
        is_new_user: projected.is_new_user,
    })
}

/// Calendar data for one month (1-based).
pub fn month<S: CycleStore>(
    store: &S,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> CommandResult<MonthData> {
    let (first_day, last_day) =
        month_bounds(year, month).ok_or(CommandError::InvalidMonth { year, month })?;

    let data = store.load()?;
    let params = resolved(&data);

    let mut logs: Vec<DailyLog> = data
        .logs
        .iter()
        .filter(|l| l.date >= first_day && l.date <= last_day)
        .cloned()
        .collect();
    logs.sort_by_key(|l| l.date);

    // Without an anchor the calendar still shows an estimate starting today.
    let (projected, period_length) = if params.is_new_user() {
        (
            prediction::calculate_cycle_data(Some(today), DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH),
            DEFAULT_PERIOD_LENGTH,
        )
    } else {
        (prediction::project(&params), params.period_length)
    };

    let period_days = prediction::period_days_for_month(
        month,
        year,
        params.last_period_start,
        params.period_length,
        params.cycle_length,
        today,
    );
    let predicted_period_days = prediction::predicted_period_days_for_month(
        month,
        year,
        projected.next_period_start,
        period_length,
    );

    let (fertile_days, ovulation_day) = if data.settings.show_fertility {
        (
            prediction::fertile_days_for_month(
                month,
                year,
                projected.fertile_window_start,
                projected.fertile_window_end,
            ),
            prediction::ovulation_day_for_month(month, year, projected.predicted_ovulation),
        )
    } else {
        (Vec::new(), None)
    };

    Ok(MonthData {
        year,
        month,
        logs,
        period_days,
        predicted_period_days,
        fertile_days,
        ovulation_day,
    })
}

/// Statistics over all logs, averaged with the same parameters the overview uses.
pub fn stats<S: CycleStore>(store: &S, today: NaiveDate) -> CommandResult<CycleStats> {
    let data = store.load()?;
    let params = resolved(&data);
    Ok(prediction::cycle_stats(&data.logs, &params, today))
}

pub fn settings<S: CycleStore>(store: &S) -> CommandResult<SettingsView> {
    let data = store.load()?;
    Ok(SettingsView {
        configured: data.parameters,
        resolved: resolved(&data),
        settings: data.settings,
    })
}

pub fn update_settings<S: CycleStore>(
    store: &mut S,
    update: SettingsUpdate,
) -> CommandResult<SettingsView> {
    // parse first so a bad date leaves everything untouched
    let anchor = match update.last_period_start.as_deref() {
        Some(date) if !update.clear_last_period_start => Some(parse_date(date)?),
        _ => None,
    };

    let mut parameters = store.load_parameters()?;
    if let Some(days) = update.cycle_length {
        parameters.cycle_length = days;
    }
    if let Some(days) = update.period_length {
        parameters.period_length = days;
    }
    if update.clear_last_period_start {
        parameters.last_period_start = None;
    } else if anchor.is_some() {
        parameters.last_period_start = anchor;
    }
    let parameters = parameters.clamped();
    store.save_parameters(parameters)?;

    let mut app_settings = store.load_settings()?;
    if let Some(derive) = update.derive_from_logs {
        app_settings.derive_from_logs = derive;
    }
    if let Some(show) = update.show_fertility {
        app_settings.show_fertility = show;
    }
    store.save_settings(app_settings)?;

    tracing::info!(
        cycle_length = parameters.cycle_length,
        period_length = parameters.period_length,
        "updated settings"
    );
    settings(store)
}

pub fn export_data<S: CycleStore>(store: &S) -> CommandResult<String> {
    let data = store.load()?;
    Ok(serde_json::to_string_pretty(&data)?)
}

pub fn wipe_all_data<S: CycleStore>(store: &mut S) -> CommandResult<()> {
    store.wipe()?;
    tracing::info!("wiped all data");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::add_days;
    use crate::storage::MemoryStore;

    fn d(s: &str) -> NaiveDate {
        parse_iso(s).unwrap()
    }

    fn bleeding_entry() -> DayEntry {
        DayEntry {
            bleeding_intensity: Some(BleedingIntensity::Medium),
            ..DayEntry::default()
        }
    }

    fn log_period(store: &mut MemoryStore, start: &str, days: i64) {
        for i in 0..days {
            let date = add_days(d(start), i).unwrap().format("%Y-%m-%d").to_string();
            log_day(store, &date, bleeding_entry(), d("2030-01-01")).unwrap();
        }
    }

    #[test]
    fn new_user_overview() {
        let store = MemoryStore::default();
        let view = overview(&store, d("2024-05-10")).unwrap();
        assert!(view.is_new_user);
        assert_eq!(view.cycle_day, 1);
        assert_eq!(view.phase, CyclePhase::Menstrual);
        assert_eq!(view.phase_label, PhaseLabel::Menstrual);
        assert_eq!(view.days_until_next_period, 28);
        assert_eq!(view.next_period_start, None);
        assert_eq!((view.avg_cycle_length, view.avg_period_length), (28, 5));
    }

    #[test]
    fn overview_from_configured_anchor() {
        let mut store = MemoryStore::default();
        update_settings(
            &mut store,
            SettingsUpdate {
                last_period_start: Some("2024-01-01".into()),
                ..SettingsUpdate::default()
            },
        )
        .unwrap();

        let view = overview(&store, d("2024-01-14")).unwrap();
        assert!(!view.is_new_user);
        assert_eq!(view.cycle_day, 14);
        assert_eq!(view.phase, CyclePhase::Ovulation);
        assert_eq!(view.phase_label, PhaseLabel::Fertile);
        assert_eq!(view.days_until_next_period, 15);
        assert_eq!(view.next_period_start, Some(d("2024-01-29")));
        assert_eq!(view.predicted_ovulation, Some(d("2024-01-15")));
        assert_eq!(view.fertile_window_start, Some(d("2024-01-10")));
        assert_eq!(view.insight.title, "Ovulation Phase");
    }

    #[test]
    fn logs_drive_the_prediction() {
        let mut store = MemoryStore::default();
        log_period(&mut store, "2024-01-01", 4);
        log_period(&mut store, "2024-01-31", 4);

        let view = settings(&store).unwrap();
        assert_eq!(view.configured, CycleParameters::default());
        assert_eq!(view.resolved, CycleParameters::new(30, 4, Some(d("2024-01-31"))));

        let today = overview(&store, d("2024-02-02")).unwrap();
        assert_eq!(today.cycle_day, 3);
        assert_eq!(today.next_period_start, Some(d("2024-03-01")));
    }

    #[test]
    fn derivation_can_be_turned_off() {
        let mut store = MemoryStore::default();
        log_period(&mut store, "2024-01-01", 4);
        log_period(&mut store, "2024-01-31", 4);
        let view = update_settings(
            &mut store,
            SettingsUpdate {
                cycle_length: Some(26),
                derive_from_logs: Some(false),
                ..SettingsUpdate::default()
            },
        )
        .unwrap();
        assert_eq!(view.resolved.cycle_length, 26);
        assert_eq!(view.resolved.last_period_start, None);
    }

    #[test]
    fn settings_are_clamped_and_anchor_can_be_cleared() {
        let mut store = MemoryStore::default();
        let view = update_settings(
            &mut store,
            SettingsUpdate {
                cycle_length: Some(90),
                period_length: Some(0),
                last_period_start: Some("2024-02-01".into()),
                ..SettingsUpdate::default()
            },
        )
        .unwrap();
        assert_eq!(view.configured, CycleParameters::new(45, 2, Some(d("2024-02-01"))));

        let cleared = update_settings(
            &mut store,
            SettingsUpdate {
                clear_last_period_start: true,
                ..SettingsUpdate::default()
            },
        )
        .unwrap();
        assert_eq!(cleared.configured.last_period_start, None);
    }

    #[test]
    fn bad_input_is_rejected() {
        let mut store = MemoryStore::default();
        let today = d("2024-03-01");
        assert!(matches!(
            log_day(&mut store, "03/01/2024", DayEntry::default(), today),
            Err(CommandError::InvalidDate(_))
        ));
        assert!(matches!(
            log_day(&mut store, "2024-03-02", DayEntry::default(), today),
            Err(CommandError::FutureDate(_))
        ));
        assert!(matches!(
            month(&store, 2024, 0, today),
            Err(CommandError::InvalidMonth { .. })
        ));
        assert!(matches!(
            delete_log(&mut store, Uuid::new_v4()),
            Err(CommandError::UnknownLog(_))
        ));
    }

    #[test]
    fn log_day_cleans_up_entry() {
        let mut store = MemoryStore::default();
        let long_notes = "x".repeat(500);
        let stored = log_day(
            &mut store,
            "2024-03-01",
            DayEntry {
                notes: Some(long_notes),
                water_intake: Some(0),
                ..DayEntry::default()
            },
            d("2024-03-01"),
        )
        .unwrap();
        assert_eq!(stored.notes.map(|n| n.len()), Some(MAX_NOTES_LEN));
        assert_eq!(stored.water_intake, None);

        let blank = log_day(
            &mut store,
            "2024-03-01",
            DayEntry {
                notes: Some("   ".into()),
                ..DayEntry::default()
            },
            d("2024-03-01"),
        )
        .unwrap();
        assert_eq!(blank.notes, None);
        assert_eq!(blank.id, stored.id);
    }

    #[test]
    fn water_intake_keeps_the_rest_of_the_log() {
        let mut store = MemoryStore::default();
        log_day(&mut store, "2024-03-01", bleeding_entry(), d("2024-03-05")).unwrap();
        let updated = set_water_intake(&mut store, "2024-03-01", 6, d("2024-03-05")).unwrap();
        assert!(updated.is_bleeding());
        assert_eq!(updated.water_intake, Some(6));
        assert_eq!(store.load_logs().unwrap().len(), 1);
    }

    #[test]
    fn month_view_with_anchor() {
        let mut store = MemoryStore::default();
        update_settings(
            &mut store,
            SettingsUpdate {
                last_period_start: Some("2024-01-01".into()),
                derive_from_logs: Some(false),
                ..SettingsUpdate::default()
            },
        )
        .unwrap();
        log_day(&mut store, "2024-01-02", bleeding_entry(), d("2024-01-20")).unwrap();

        let january = month(&store, 2024, 1, d("2024-01-20")).unwrap();
        assert_eq!(january.logs.len(), 1);
        assert_eq!(january.period_days, vec![1, 2, 3, 4, 5]);
        assert_eq!(january.predicted_period_days, vec![29, 30, 31]);
        assert_eq!(january.fertile_days, vec![10, 11, 12, 13, 14, 15]);
        assert_eq!(january.ovulation_day, Some(15));

        let february = month(&store, 2024, 2, d("2024-01-20")).unwrap();
        assert!(february.logs.is_empty());
        assert!(february.period_days.is_empty());
        assert_eq!(february.predicted_period_days, vec![1, 2]);
    }

    #[test]
    fn month_view_estimates_for_new_users() {
        let store = MemoryStore::default();
        let view = month(&store, 2024, 6, d("2024-06-01")).unwrap();
        assert!(view.period_days.is_empty());
        assert_eq!(view.predicted_period_days, vec![29, 30]);
        assert_eq!(view.ovulation_day, Some(15));
    }

    #[test]
    fn hiding_fertility_hides_fertile_days() {
        let mut store = MemoryStore::default();
        update_settings(
            &mut store,
            SettingsUpdate {
                last_period_start: Some("2024-01-01".into()),
                show_fertility: Some(false),
                ..SettingsUpdate::default()
            },
        )
        .unwrap();
        let view = month(&store, 2024, 1, d("2024-01-20")).unwrap();
        assert!(view.fertile_days.is_empty());
        assert_eq!(view.ovulation_day, None);
        let today = overview(&store, d("2024-01-20")).unwrap();
        assert_eq!(today.fertile_window_start, None);
        assert_eq!(today.next_period_start, Some(d("2024-01-29")));
    }

    #[test]
    fn start_period_moves_anchor_to_today() {
        let mut store = MemoryStore::default();
        let params = start_period(&mut store, d("2024-04-03")).unwrap();
        assert_eq!(params.last_period_start, Some(d("2024-04-03")));
        let view = overview(&store, d("2024-04-03")).unwrap();
        assert_eq!(view.cycle_day, 1);
        assert_eq!(view.phase, CyclePhase::Menstrual);
    }

    #[test]
    fn export_and_wipe() {
        let mut store = MemoryStore::default();
        log_day(&mut store, "2024-03-01", bleeding_entry(), d("2024-03-01")).unwrap();
        let exported = export_data(&store).unwrap();
        let parsed: AppData = serde_json::from_str(&exported).unwrap();
        assert_eq!(parsed.logs.len(), 1);

        wipe_all_data(&mut store).unwrap();
        let after = stats(&store, d("2024-03-01")).unwrap();
        assert!(after.periods.is_empty());
        assert_eq!(after.total_logs, 0);
    }

    #[test]
    fn stats_and_overview_report_the_same_averages() {
        let mut store = MemoryStore::default();
        update_settings(
            &mut store,
            SettingsUpdate {
                cycle_length: Some(32),
                period_length: Some(4),
                derive_from_logs: Some(false),
                ..SettingsUpdate::default()
            },
        )
        .unwrap();
        log_period(&mut store, "2024-03-01", 3);

        let today = d("2024-03-10");
        let view = overview(&store, today).unwrap();
        let summary = stats(&store, today).unwrap();
        assert_eq!((view.avg_cycle_length, view.avg_period_length), (32, 4));
        assert_eq!(
            (summary.avg_cycle_length, summary.avg_period_length),
            (view.avg_cycle_length, view.avg_period_length)
        );
        assert_eq!(summary.periods.len(), 1);

        // with derivation on, a single streak only overrides the period length
        update_settings(
            &mut store,
            SettingsUpdate {
                derive_from_logs: Some(true),
                ..SettingsUpdate::default()
            },
        )
        .unwrap();
        let view = overview(&store, today).unwrap();
        let summary = stats(&store, today).unwrap();
        assert_eq!((view.avg_cycle_length, view.avg_period_length), (32, 3));
        assert_eq!(
            (summary.avg_cycle_length, summary.avg_period_length),
            (view.avg_cycle_length, view.avg_period_length)
        );
    }

    #[test]
    fn anchor_at_the_end_of_the_calendar_projects_nothing() {
        let mut store = MemoryStore::default();
        update_settings(
            &mut store,
            SettingsUpdate {
                last_period_start: Some("+262142-12-20".into()),
                ..SettingsUpdate::default()
            },
        )
        .unwrap();

        let today = d("2024-05-01");
        let view = overview(&store, today).unwrap();
        assert!(!view.is_new_user);
        assert_eq!(view.next_period_start, None);
        assert_eq!(view.predicted_ovulation, None);
        assert!((1..=28).contains(&view.cycle_day));

        let may = month(&store, 2024, 5, today).unwrap();
        assert!(may.predicted_period_days.is_empty());
        assert!(may.fertile_days.is_empty());
        assert_eq!(may.ovulation_day, None);
        assert!(stats(&store, today).unwrap().periods.is_empty());
    }

    #[test]
    fn bad_anchor_leaves_settings_untouched() {
        let mut store = MemoryStore::default();
        let result = update_settings(
            &mut store,
            SettingsUpdate {
                cycle_length: Some(35),
                last_period_start: Some("soon".into()),
                show_fertility: Some(false),
                ..SettingsUpdate::default()
            },
        );
        assert!(matches!(result, Err(CommandError::InvalidDate(_))));
        let view = settings(&store).unwrap();
        assert_eq!(view.configured, CycleParameters::default());
        assert!(view.settings.show_fertility);
    }

    #[test]
    fn repeated_calls_agree() {
        let mut store = MemoryStore::default();
        log_period(&mut store, "2024-01-01", 5);
        log_period(&mut store, "2024-01-29", 5);
        let today = d("2024-02-10");
        assert_eq!(overview(&store, today).unwrap(), overview(&store, today).unwrap());
        assert_eq!(month(&store, 2024, 2, today).unwrap(), month(&store, 2024, 2, today).unwrap());
    }
}
