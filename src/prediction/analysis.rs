use crate::dates::days_between;
use crate::models::{
    clamp_cycle_length, clamp_period_length, CycleAnalysis, DailyLog, PeriodStreak,
    DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH, MAX_CYCLE_LENGTH, MIN_CYCLE_LENGTH,
};

/// Only the most recent periods feed the averages.
pub const RECENT_PERIODS: usize = 6;

/// Derive average cycle and period lengths from historical logs.
/// Falls back to 28/5 when fewer than two bleeding days were logged.
pub fn analyze_cycles(logs: &[DailyLog]) -> CycleAnalysis {
    let streaks = detect_streaks(logs);
    if streaks.is_empty() {
        return CycleAnalysis::default();
    }

    let recent = &streaks[streaks.len().saturating_sub(RECENT_PERIODS)..];

    let period_lengths: Vec<i64> = recent.iter().map(|s| s.length).collect();
    let cycle_lengths = valid_cycle_lengths(recent);

    let avg_cycle = rounded_mean(&cycle_lengths).unwrap_or(DEFAULT_CYCLE_LENGTH);
    let avg_period = rounded_mean(&period_lengths).unwrap_or(DEFAULT_PERIOD_LENGTH);

    CycleAnalysis {
        avg_cycle_length: clamp_cycle_length(avg_cycle),
        avg_period_length: clamp_period_length(avg_period),
        cycle_count: cycle_lengths.len(),
        period_count: recent.len(),
        latest_period_start: recent.last().map(|s| s.start),
    }
}

/// Group bleeding days into runs of consecutive dates, oldest first.
/// Returns nothing when fewer than two bleeding days exist.
pub fn detect_streaks(logs: &[DailyLog]) -> Vec<PeriodStreak> {
    let mut bleeding: Vec<&DailyLog> = logs.iter().filter(|l| l.is_bleeding()).collect();
    if bleeding.len() < 2 {
        return Vec::new();
    }
    bleeding.sort_by_key(|l| l.date);

    let mut streaks = Vec::new();
    let mut current = PeriodStreak {
        start: bleeding[0].date,
        length: 1,
    };

    for pair in bleeding.windows(2) {
        if days_between(pair[0].date, pair[1].date) == 1 {
            current.length += 1;
        } else {
            streaks.push(current);
            current = PeriodStreak {
                start: pair[1].date,
                length: 1,
            };
        }
    }
    streaks.push(current);

    streaks
}

/// Gaps between consecutive period starts that look like real cycles.
/// Anything outside 18..=45 days is treated as missed logging or noise.
pub fn valid_cycle_lengths(streaks: &[PeriodStreak]) -> Vec<i64> {
    streaks
        .windows(2)
        .map(|w| days_between(w[0].start, w[1].start))
        .filter(|gap| (MIN_CYCLE_LENGTH..=MAX_CYCLE_LENGTH).contains(gap))
        .collect()
}

// Half-way values round away from zero: 27.5 -> 28.
fn rounded_mean(values: &[i64]) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<i64>() as f64 / values.len() as f64;
    Some(mean.round() as i64)
}
