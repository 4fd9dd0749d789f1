//! Privacy-first, on-device cycle tracking: daily logs in, period, ovulation
//! and fertile-window predictions out.

pub mod commands;
pub mod config;
pub mod dates;
pub mod logging;
pub mod models;
pub mod prediction;
pub mod storage;
