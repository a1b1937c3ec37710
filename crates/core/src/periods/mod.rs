//! Periods module - month keys, rolling windows and display periods.

mod month_key;
mod period_generator;
mod periods_model;


pub use month_key::MonthKey;
pub use period_generator::{current_period_index, generate_month_keys, generate_periods};
pub use periods_model::{Period, PeriodWindow};
