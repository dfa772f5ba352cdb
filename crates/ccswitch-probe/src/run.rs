//! Foreground probe operations
//!
//! Convenience drivers for callers that are happy to await the result on
//! the thread that owns the store.

use ccswitch_core::profile::{ProbeResult, TestStatus};
use ccswitch_core::storage::ProfileStore;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::client::{ProbeClient, DEFAULT_QUESTION};
use crate::error::ProbeError;
use crate::session::{ProbeEvent, ProbeSession};

/// Probe the profile at `index` and record the outcome
///
/// The store is written whatever the outcome, so this is never a pure read.
///
/// # Errors
/// Returns an error if the index is invalid or the store cannot be saved
pub async fn probe<C: ProbeClient + ?Sized>(
    store: &mut ProfileStore,
    index: usize,
    client: &C,
    question: &str,
) -> Result<ProbeResult, ProbeError> {
    let profile = store.get(index).cloned().ok_or(ProbeError::InvalidIndex {
        index,
        len: store.len(),
    })?;
    let result = client.probe(&profile, question).await;
    store.record_probe(&profile.name, &result)?;
    info!(profile = %profile.name, status = %result.status, "probe recorded");
    Ok(result)
}

/// Settings for [`batch_probe`]
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub question: String,
    /// Pause between consecutive requests
    pub delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            question: DEFAULT_QUESTION.to_string(),
            delay: Duration::from_secs(1),
        }
    }
}

/// Tally of a finished or cancelled batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub probed: usize,
    pub passed: usize,
    /// Profiles never probed because the batch was cancelled
    pub skipped: Vec<String>,
    pub cancelled: bool,
}

impl BatchSummary {
    #[must_use]
    pub fn unsuccessful(&self) -> usize {
        self.probed - self.passed
    }
}

/// Probe every profile in list order, one request at a time
///
/// `on_event` sees every [`ProbeEvent`] after it has been recorded,
/// including a `Started` before each probe. Cancel `cancel` to stop before
/// the next profile.
///
/// # Errors
/// Returns an error if a result cannot be saved; the batch is cancelled
/// in that case
pub async fn batch_probe<C, F>(
    store: &mut ProfileStore,
    client: Arc<C>,
    options: BatchOptions,
    cancel: CancellationToken,
    mut on_event: F,
) -> Result<BatchSummary, ProbeError>
where
    C: ProbeClient + 'static,
    F: FnMut(&ProbeEvent),
{
    let mut session = ProbeSession::new(client, options.question);
    session.spawn_batch(store, options.delay, cancel.clone())?;

    let mut summary = BatchSummary::default();
    while let Some(event) = session.next_event().await {
        if let Err(e) = session.apply(store, &event) {
            cancel.cancel();
            return Err(e.into());
        }
        on_event(&event);

        match event {
            ProbeEvent::Started { .. } => {}
            ProbeEvent::Finished { result, .. } => {
                summary.probed += 1;
                if result.status == TestStatus::Passed {
                    summary.passed += 1;
                }
            }
            ProbeEvent::BatchCancelled { skipped } => {
                summary.cancelled = true;
                summary.skipped = skipped;
            }
            ProbeEvent::BatchCompleted { .. } => {}
        }
    }

    info!(
        probed = summary.probed,
        passed = summary.passed,
        cancelled = summary.cancelled,
        "batch probe finished"
    );
    Ok(summary)
}
