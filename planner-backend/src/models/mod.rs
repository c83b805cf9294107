pub mod activity;
pub mod plan;
pub mod request;
pub mod task;

pub use activity::{
    parse_age_range, ActivitySource, CandidateActivity, Category, PriceTier, ScheduleWindow,
};
pub use plan::{ActivityPlan, DiscoverResponse, PlanStats, SynthesizedPlan, TaskLogEntry};
pub use request::{
    ActivityRequest, BudgetTier, DateRange, DayWindow, TimeWindow, MAX_CHILD_AGE,
};
pub use task::{TaskPayload, TaskResult, TaskStatus};
