//! Cycle prediction engine. Every function here is a pure transform of its
//! inputs: logs in, averages, projected dates and calendar day sets out.

pub mod analysis;
pub mod month;
pub mod phase;
pub mod projection;
pub mod stats;

pub use analysis::{analyze_cycles, detect_streaks};
pub use month::{
    fertile_days_for_month, ovulation_day_for_month, period_days_for_month,
    predicted_period_days_for_month,
};
pub use phase::{cycle_day_for_date, cycle_phase_key, cycle_phase_label};
pub use projection::{calculate_cycle_data, project, resolve_parameters, LUTEAL_PHASE_DAYS};
pub use stats::cycle_stats;
