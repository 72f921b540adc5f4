//! Runs collection and comparison off the caller's task
//!
//! The caller keeps a [`HistoryJob`] handle and either polls [`HistoryJob::state`]
//! (to drive a loading indicator) or awaits [`HistoryJob::wait`].

use super::collector::{CollectionRequest, HistoryCollector};
use super::engine::compare;
use super::report::ComparisonReport;
use super::sample_set::PartialDataWarning;
use crate::NeboKrugError;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Finished comparison with the years that had to be left out
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryOutcome {
    pub report: ComparisonReport,
    pub warnings: Vec<PartialDataWarning>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Loading,
    Ready(Box<HistoryOutcome>),
    /// User-facing failure message
    Failed(String),
    Cancelled,
}

impl JobState {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !matches!(self, JobState::Loading)
    }
}

pub struct HistoryJob {
    state: watch::Receiver<JobState>,
    cancel: CancellationToken,
}

impl HistoryJob {
    /// Start collecting on a tokio task. Must be called inside a runtime.
    #[must_use]
    pub fn spawn(collector: HistoryCollector, request: CollectionRequest) -> Self {
        let (tx, rx) = watch::channel(JobState::Loading);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            let outcome = async {
                let collection = collector.collect(&request, &token).await?;
                let report = compare(&collection.today, &collection.history)?;
                Ok::<_, NeboKrugError>(HistoryOutcome {
                    report,
                    warnings: collection.history.warnings().to_vec(),
                })
            }
            .await;

            let state = match outcome {
                Ok(outcome) => {
                    info!("History comparison ready");
                    JobState::Ready(Box::new(outcome))
                }
                Err(NeboKrugError::Cancelled) => JobState::Cancelled,
                Err(e) => {
                    error!("History comparison failed: {}", e);
                    JobState::Failed(e.user_message())
                }
            };
            // receivers may be gone already
            let _ = tx.send(state);
        });

        Self { state: rx, cancel }
    }

    /// Snapshot of the current state
    #[must_use]
    pub fn state(&self) -> JobState {
        self.state.borrow().clone()
    }

    /// A receiver notified on every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.state.clone()
    }

    /// Abort outstanding requests; the job settles as `Cancelled`
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait until the job leaves `Loading`
    pub async fn wait(mut self) -> JobState {
        match self.state.wait_for(JobState::is_finished).await {
            Ok(state) => state.clone(),
            Err(_) => JobState::Failed("The background task stopped unexpectedly.".to_string()),
        }
    }
}
