use std::collections::HashMap;

use chrono::NaiveDate;

use crate::dates::add_days;
use crate::models::{CycleParameters, CycleStats, DailyLog, MoodPoint, Symptom, SymptomCount};
use crate::prediction::analysis::{detect_streaks, valid_cycle_lengths};

/// How many symptoms the frequency list keeps.
pub const TOP_SYMPTOMS: usize = 5;
/// Length of the mood trend window, ending today.
pub const MOOD_TREND_DAYS: i64 = 30;

/// Compute cycle statistics for the stats view.
///
/// The averages are taken from `params`, the same resolved parameters the
/// overview and calendar predict with.
pub fn cycle_stats(logs: &[DailyLog], params: &CycleParameters, today: NaiveDate) -> CycleStats {
    let mut sorted: Vec<&DailyLog> = logs.iter().collect();
    sorted.sort_by_key(|l| l.date);

    let periods = detect_streaks(logs);
    let cycle_lengths = valid_cycle_lengths(&periods);
    let symptom_counts = symptom_counts(&sorted);

    CycleStats {
        total_logs: logs.len(),
        bleeding_days: logs.iter().filter(|l| l.is_bleeding()).count(),
        last_log_date: sorted.last().map(|l| l.date),
        last_period_start: periods.last().map(|p| p.start),
        last_period_end: periods.last().map(|p| p.end()),
        periods,
        avg_cycle_length: params.cycle_length,
        avg_period_length: params.period_length,
        shortest_cycle: cycle_lengths.iter().copied().min(),
        longest_cycle: cycle_lengths.iter().copied().max(),
        most_common_symptom: symptom_counts.first().cloned(),
        symptom_counts,
        mood_trend: mood_trend(&sorted, today),
    }
}

// Most frequent first; ties go to the symptom logged first.
fn symptom_counts(sorted: &[&DailyLog]) -> Vec<SymptomCount> {
    let mut counts: HashMap<&Symptom, (usize, usize)> = HashMap::new();
    let mut order = 0;
    for symptom in sorted.iter().flat_map(|l| l.symptoms.iter()) {
        let entry = counts.entry(symptom).or_insert((0, order));
        entry.0 += 1;
        order += 1;
    }

    let mut ranked: Vec<(&Symptom, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
        count_b.cmp(count_a).then(first_a.cmp(first_b))
    });
    ranked
        .into_iter()
        .take(TOP_SYMPTOMS)
        .map(|(symptom, (count, _))| SymptomCount {
            symptom: symptom.clone(),
            count,
        })
        .collect()
}

fn mood_trend(sorted: &[&DailyLog], today: NaiveDate) -> Vec<MoodPoint> {
    let since = add_days(today, -MOOD_TREND_DAYS).unwrap_or(NaiveDate::MIN);
    sorted
        .iter()
        .filter(|l| l.date >= since && l.date <= today)
        .filter_map(|l| {
            l.mood.map(|mood| MoodPoint {
                date: l.date,
                mood,
                score: mood.score(),
            })
        })
        .collect()
}
