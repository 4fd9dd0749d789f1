use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates::add_days;

pub const DEFAULT_CYCLE_LENGTH: i64 = 28;
pub const DEFAULT_PERIOD_LENGTH: i64 = 5;
pub const MIN_CYCLE_LENGTH: i64 = 18;
pub const MAX_CYCLE_LENGTH: i64 = 45;
pub const MIN_PERIOD_LENGTH: i64 = 2;
pub const MAX_PERIOD_LENGTH: i64 = 8;
pub const MAX_NOTES_LEN: usize = 200;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BleedingIntensity {
    None,
    Light,
    Medium,
    Heavy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Bad,
    Neutral,
    Good,
}

impl Mood {
    /// Numeric value for trend charts: good 3, neutral 2, bad 1.
    pub fn score(self) -> u8 {
        match self {
            Mood::Bad => 1,
            Mood::Neutral => 2,
            Mood::Good => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Symptom {
    Cramps,
    Headache,
    MoodSwings,
    LowEnergy,
    Bloating,
    SleepIssues,
    Custom(String),
}

/// One day of user input. Unique per date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyLog {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub bleeding_intensity: Option<BleedingIntensity>,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub symptoms: Vec<Symptom>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub water_intake: Option<u32>,
}

impl DailyLog {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            bleeding_intensity: None,
            mood: None,
            symptoms: Vec::new(),
            notes: None,
            water_intake: None,
        }
    }

    pub fn is_bleeding(&self) -> bool {
        matches!(
            self.bleeding_intensity,
            Some(BleedingIntensity::Light | BleedingIntensity::Medium | BleedingIntensity::Heavy)
        )
    }
}

/// Cycle settings, either configured by the user or derived from logs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleParameters {
    pub cycle_length: i64,
    pub period_length: i64,
    #[serde(default)]
    pub last_period_start: Option<NaiveDate>,
}

impl CycleParameters {
    /// Build parameters with both lengths clamped to their plausible ranges.
    pub fn new(cycle_length: i64, period_length: i64, last_period_start: Option<NaiveDate>) -> Self {
        Self {
            cycle_length: clamp_cycle_length(cycle_length),
            period_length: clamp_period_length(period_length),
            last_period_start,
        }
    }

    pub fn clamped(self) -> Self {
        Self::new(self.cycle_length, self.period_length, self.last_period_start)
    }

    pub fn is_new_user(&self) -> bool {
        self.last_period_start.is_none()
    }
}

impl Default for CycleParameters {
    fn default() -> Self {
        Self {
            cycle_length: DEFAULT_CYCLE_LENGTH,
            period_length: DEFAULT_PERIOD_LENGTH,
            last_period_start: None,
        }
    }
}

pub fn clamp_cycle_length(days: i64) -> i64 {
    days.clamp(MIN_CYCLE_LENGTH, MAX_CYCLE_LENGTH)
}

pub fn clamp_period_length(days: i64) -> i64 {
    days.clamp(MIN_PERIOD_LENGTH, MAX_PERIOD_LENGTH)
}

/// A maximal run of date-consecutive bleeding days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeriodStreak {
    pub start: NaiveDate,
    pub length: i64,
}

impl PeriodStreak {
    /// Last bleeding day. Streaks are built from logged dates, so the end is
    /// always representable.
    pub fn end(&self) -> NaiveDate {
        add_days(self.start, self.length - 1).unwrap_or(self.start)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleAnalysis {
    pub avg_cycle_length: i64,
    pub avg_period_length: i64,
    /// Number of inter-period gaps that fell inside the plausible cycle range.
    pub cycle_count: usize,
    pub period_count: usize,
    pub latest_period_start: Option<NaiveDate>,
}

impl Default for CycleAnalysis {
    fn default() -> Self {
        Self {
            avg_cycle_length: DEFAULT_CYCLE_LENGTH,
            avg_period_length: DEFAULT_PERIOD_LENGTH,
            cycle_count: 0,
            period_count: 0,
            latest_period_start: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleData {
    pub cycle_length: i64,
    pub period_length: i64,
    pub last_period_start: Option<NaiveDate>,
    pub next_period_start: Option<NaiveDate>,
    pub predicted_ovulation: Option<NaiveDate>,
    pub fertile_window_start: Option<NaiveDate>,
    pub fertile_window_end: Option<NaiveDate>,
    pub is_new_user: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CyclePhase {
    Menstrual,
    Follicular,
    Ovulation,
    Luteal,
}

/// Display labels; the fertile bucket is wider than [`CyclePhase::Ovulation`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PhaseLabel {
    Menstrual,
    Follicular,
    Fertile,
    Luteal,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CyclePhase::Menstrual => "Menstrual",
            CyclePhase::Follicular => "Follicular",
            CyclePhase::Ovulation => "Ovulation",
            CyclePhase::Luteal => "Luteal",
        };
        f.write_str(name)
    }
}

impl fmt::Display for PhaseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseLabel::Menstrual => "Menstrual",
            PhaseLabel::Follicular => "Follicular",
            PhaseLabel::Fertile => "Fertile",
            PhaseLabel::Luteal => "Luteal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhaseInsight {
    pub title: String,
    pub tip: String,
}

/// Everything the "today" view needs, as plain data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleOverview {
    pub cycle_day: i64,
    pub cycle_length: i64,
    pub phase: CyclePhase,
    pub phase_label: PhaseLabel,
    pub insight: PhaseInsight,
    pub days_until_next_period: i64,
    pub next_period_start: Option<NaiveDate>,
    pub predicted_ovulation: Option<NaiveDate>,
    pub fertile_window_start: Option<NaiveDate>,
    pub fertile_window_end: Option<NaiveDate>,
    pub avg_cycle_length: i64,
    pub avg_period_length: i64,
    pub is_new_user: bool,
}

/// Data returned for a calendar month view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthData {
    pub year: i32,
    pub month: u32,
    pub logs: Vec<DailyLog>,
    pub period_days: Vec<u32>,
    pub predicted_period_days: Vec<u32>,
    pub fertile_days: Vec<u32>,
    pub ovulation_day: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymptomCount {
    pub symptom: Symptom,
    pub count: usize,
}

/// One logged mood inside the trend window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoodPoint {
    pub date: NaiveDate,
    pub mood: Mood,
    pub score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleStats {
    pub total_logs: usize,
    pub bleeding_days: usize,
    pub last_log_date: Option<NaiveDate>,
    pub periods: Vec<PeriodStreak>,
    pub last_period_start: Option<NaiveDate>,
    pub last_period_end: Option<NaiveDate>,
    /// The lengths predictions run on, after merging settings and logs.
    pub avg_cycle_length: i64,
    pub avg_period_length: i64,
    pub shortest_cycle: Option<i64>,
    pub longest_cycle: Option<i64>,
    pub most_common_symptom: Option<SymptomCount>,
    /// Up to five symptoms, most frequent first.
    pub symptom_counts: Vec<SymptomCount>,
    /// Moods logged in the last 30 days, oldest first.
    pub mood_trend: Vec<MoodPoint>,
}

/// Configured parameters next to the ones predictions actually use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettingsView {
    pub configured: CycleParameters,
    pub resolved: CycleParameters,
    pub settings: AppSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppData {
    #[serde(default)]
    pub logs: Vec<DailyLog>,
    #[serde(default)]
    pub parameters: CycleParameters,
    #[serde(default)]
    pub settings: AppSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppSettings {
    /// Let averages and the anchor date learned from logs override the
    /// configured parameters.
    #[serde(default = "default_true")]
    pub derive_from_logs: bool,
    #[serde(default = "default_true")]
    pub show_fertility: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            derive_from_logs: true,
            show_fertility: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_intensity_is_not_bleeding() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut log = DailyLog::new(date);
        assert!(!log.is_bleeding());
        log.bleeding_intensity = Some(BleedingIntensity::None);
        assert!(!log.is_bleeding());
        log.bleeding_intensity = Some(BleedingIntensity::Light);
        assert!(log.is_bleeding());
    }

    #[test]
    fn parameters_are_clamped() {
        let params = CycleParameters::new(100, 1, None);
        assert_eq!(params.cycle_length, MAX_CYCLE_LENGTH);
        assert_eq!(params.period_length, MIN_PERIOD_LENGTH);
        assert!(params.is_new_user());
    }

    #[test]
    fn mood_scores_rank_good_highest() {
        assert_eq!(Mood::Good.score(), 3);
        assert_eq!(Mood::Neutral.score(), 2);
        assert_eq!(Mood::Bad.score(), 1);
    }

    #[test]
    fn streak_end_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let streak = PeriodStreak { start, length: 4 };
        assert_eq!(streak.end(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(PeriodStreak { start, length: 1 }.end(), start);
    }

    #[test]
    fn daily_log_reads_sparse_json() {
        let json = r#"{
            "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "date": "2024-03-02",
            "bleeding_intensity": "heavy",
            "symptoms": ["cramps", {"custom": "back pain"}]
        }"#;
        let log: DailyLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert!(log.is_bleeding());
        assert_eq!(log.mood, None);
        assert_eq!(
            log.symptoms,
            vec![Symptom::Cramps, Symptom::Custom("back pain".into())]
        );
        assert_eq!(log.water_intake, None);
    }

    #[test]
    fn app_settings_default_when_missing() {
        let data: AppData = serde_json::from_str("{}").unwrap();
        assert!(data.settings.derive_from_logs);
        assert_eq!(data.parameters, CycleParameters::default());
    }
}
