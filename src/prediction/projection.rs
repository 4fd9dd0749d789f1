use chrono::NaiveDate;

use crate::dates::add_days;
use crate::models::{CycleAnalysis, CycleData, CycleParameters};

/// Days from ovulation to the next period. Fixed, independent of cycle length.
pub const LUTEAL_PHASE_DAYS: i64 = 14;
/// Days before ovulation that count as fertile.
pub const FERTILE_DAYS_BEFORE_OVULATION: i64 = 5;

/// Project the next period, ovulation and fertile window from an anchor date.
///
/// Ovulation is assumed 14 days before the *next* period and the fertile
/// window is the six days ending on ovulation day. An anchor so close to the
/// end of the calendar that the next period cannot be represented keeps the
/// anchor but projects nothing.
pub fn calculate_cycle_data(
    last_period_start: Option<NaiveDate>,
    cycle_length: i64,
    period_length: i64,
) -> CycleData {
    let Some(anchor) = last_period_start else {
        return CycleData {
            cycle_length,
            period_length,
            last_period_start: None,
            next_period_start: None,
            predicted_ovulation: None,
            fertile_window_start: None,
            fertile_window_end: None,
            is_new_user: true,
        };
    };

    let next_period_start = add_days(anchor, cycle_length);
    let predicted_ovulation = next_period_start.and_then(|next| add_days(next, -LUTEAL_PHASE_DAYS));
    let fertile_window_start =
        predicted_ovulation.and_then(|ovulation| add_days(ovulation, -FERTILE_DAYS_BEFORE_OVULATION));

    CycleData {
        cycle_length,
        period_length,
        last_period_start: Some(anchor),
        next_period_start,
        predicted_ovulation,
        fertile_window_start,
        fertile_window_end: predicted_ovulation,
        is_new_user: false,
    }
}

/// Convenience wrapper over [`calculate_cycle_data`].
pub fn project(params: &CycleParameters) -> CycleData {
    calculate_cycle_data(params.last_period_start, params.cycle_length, params.period_length)
}

/// Merge configured parameters with what the logs show.
///
/// Each derived value only replaces the configured one when the logs carry
/// evidence for it. The anchor moves forward to the latest detected period,
/// never backward.
pub fn resolve_parameters(
    configured: &CycleParameters,
    analysis: &CycleAnalysis,
    derive_from_logs: bool,
) -> CycleParameters {
    if !derive_from_logs {
        return configured.clamped();
    }

    let cycle_length = if analysis.cycle_count > 0 {
        analysis.avg_cycle_length
    } else {
        configured.cycle_length
    };
    let period_length = if analysis.period_count > 0 {
        analysis.avg_period_length
    } else {
        configured.period_length
    };
    let last_period_start = match (configured.last_period_start, analysis.latest_period_start) {
        (Some(set), Some(seen)) => Some(set.max(seen)),
        (set, seen) => set.or(seen),
    };

    CycleParameters::new(cycle_length, period_length, last_period_start)
}
