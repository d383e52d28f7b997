pub mod ensure;
pub mod processor;

pub use ensure::{ScheduleOutcome, SchedulingError, SeasonScheduler};
pub use processor::{
    ProcessedFixtureSummary, ProcessingError, RoundReport, SkipReason, SkippedFixture,
    WeekProcessor,
};
