//! "This day in history": collection, ranking and reporting
//!
//! - Collector: today's record plus the same calendar day in past years
//! - Engine: ranks today against that history
//! - Report: structured result and its text sections
//! - Job: background execution with polling and cancellation

pub mod collector;
pub mod engine;
pub mod job;
pub mod report;
pub mod sample_set;

pub use collector::{Collection, CollectionRequest, HistoryCollector};
pub use engine::compare;
pub use job::{HistoryJob, HistoryOutcome, JobState};
pub use report::{
    ComparisonReport, PrecipitationComparison, TemperatureComparison, TemperatureHeadline,
    WindComparison, WindHeadline, YearValue,
};
pub use sample_set::{HistoricalSampleSet, OmissionReason, PartialDataWarning};
