use chrono::NaiveDate;

use crate::dates::days_between;
use crate::models::{CyclePhase, PhaseInsight, PhaseLabel};

/// Earliest cycle day ovulation is ever placed on.
const MIN_OVULATION_DAY: i64 = 12;

/// 1-based day within the cycle that `target` falls on.
///
/// Dates before the anchor wrap backwards into the previous cycle, so the
/// result is always in `1..=cycle_length`.
pub fn cycle_day_for_date(
    target: NaiveDate,
    last_period_start: Option<NaiveDate>,
    cycle_length: i64,
) -> i64 {
    let Some(anchor) = last_period_start else {
        return 1;
    };
    days_between(anchor, target).rem_euclid(cycle_length.max(1)) + 1
}

fn ovulation_day(cycle_length: i64) -> i64 {
    MIN_OVULATION_DAY.max(cycle_length / 2)
}

/// Phase key for a date, with ovulation covering the three days around the
/// estimated ovulation day. Without an anchor this is `Menstrual`.
pub fn cycle_phase_key(
    target: NaiveDate,
    last_period_start: Option<NaiveDate>,
    cycle_length: i64,
    period_length: i64,
) -> CyclePhase {
    if last_period_start.is_none() {
        return CyclePhase::Menstrual;
    }

    let day = cycle_day_for_date(target, last_period_start, cycle_length);
    if day <= period_length {
        return CyclePhase::Menstrual;
    }

    let ovulation = ovulation_day(cycle_length);
    if (ovulation - 1..=ovulation + 1).contains(&day) {
        CyclePhase::Ovulation
    } else if day < ovulation {
        CyclePhase::Follicular
    } else {
        CyclePhase::Luteal
    }
}

/// Display label for a date. The fertile bucket spans the five days before
/// ovulation through ovulation day, wider than the `Ovulation` key.
pub fn cycle_phase_label(
    target: NaiveDate,
    last_period_start: Option<NaiveDate>,
    cycle_length: i64,
    period_length: i64,
) -> PhaseLabel {
    if last_period_start.is_none() {
        return PhaseLabel::Menstrual;
    }

    let day = cycle_day_for_date(target, last_period_start, cycle_length);
    if day <= period_length {
        return PhaseLabel::Menstrual;
    }

    let ovulation = ovulation_day(cycle_length);
    let fertile_start = ovulation - 5;
    if (fertile_start..=ovulation).contains(&day) {
        PhaseLabel::Fertile
    } else if day < fertile_start {
        PhaseLabel::Follicular
    } else {
        PhaseLabel::Luteal
    }
}

impl CyclePhase {
    pub fn insight(&self) -> PhaseInsight {
        let (title, tip) = match self {
            CyclePhase::Menstrual => (
                "Menstrual Phase",
                "Rest and recovery time. Stay hydrated and keep movement gentle, like yoga or walking.",
            ),
            CyclePhase::Follicular => (
                "Follicular Phase",
                "Energy is rising. A good time for workouts, new projects and seeing friends.",
            ),
            CyclePhase::Ovulation => (
                "Ovulation Phase",
                "Confidence and energy peak. Schedule the demanding meetings and hard tasks here.",
            ),
            CyclePhase::Luteal => (
                "Luteal Phase",
                "Slow down and focus inward. Good for planning, reflection and self-care.",
            ),
        };
        PhaseInsight {
            title: title.to_string(),
            tip: tip.to_string(),
        }
    }
}
