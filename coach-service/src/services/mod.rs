pub mod coach;
pub mod metrics;
pub mod prompt;
pub mod providers;
pub mod usage;

pub use coach::{Coach, CoachLimits, CoachRequest, QuestionSource, LISTENING_PLACEHOLDER};
pub use usage::{LimitReached, Reservation, UsageTracker};
