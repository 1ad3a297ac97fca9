pub mod duration;
pub mod time_utils;
pub mod trading_hours;

pub use duration::parse_duration;
pub use time_utils::{Clock, ManualClock, SystemClock};
