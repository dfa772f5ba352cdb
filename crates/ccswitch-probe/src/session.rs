//! Background probing with a message-passing hand-off
//!
//! Workers only do network I/O. They never touch the store: each outcome is
//! sent back as a [`ProbeEvent`] and the owner records it with
//! [`ProbeSession::apply`]. The set of in-flight profile names lives here,
//! on the owner's side, and is what stops a profile being probed twice at
//! once. It is session state only and is never persisted.

use ccswitch_core::profile::{ProbeResult, Profile};
use ccswitch_core::storage::{ProfileStore, StoreError, StoreResult};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::ProbeClient;
use crate::error::ProbeError;

/// Progress and results from probe workers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    /// A batch is about to probe this profile (`position` is 0-based)
    Started {
        name: String,
        position: usize,
        total: usize,
    },
    /// A probe came back
    Finished { name: String, result: ProbeResult },
    /// A batch stopped early; these profiles were never probed
    BatchCancelled { skipped: Vec<String> },
    /// A batch probed every profile
    BatchCompleted { probed: usize },
}

/// Owner-side handle for background probes
///
/// Spawning requires a tokio runtime.
pub struct ProbeSession<C> {
    client: Arc<C>,
    question: String,
    in_flight: HashSet<String>,
    batch: Option<CancellationToken>,
    tx: mpsc::UnboundedSender<ProbeEvent>,
    rx: mpsc::UnboundedReceiver<ProbeEvent>,
}

impl<C: ProbeClient + 'static> ProbeSession<C> {
    #[must_use]
    pub fn new(client: Arc<C>, question: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            question: question.into(),
            in_flight: HashSet::new(),
            batch: None,
            tx,
            rx,
        }
    }

    /// Whether a probe for this profile is still out
    #[must_use]
    pub fn is_testing(&self, name: &str) -> bool {
        self.in_flight.contains(name)
    }

    /// Whether nothing is in flight
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty() && self.batch.is_none()
    }

    /// Probe the profile at `index` in the background
    ///
    /// # Errors
    /// Returns an error if the index is invalid or that profile is already
    /// being tested
    pub fn spawn_probe(&mut self, store: &ProfileStore, index: usize) -> Result<(), ProbeError> {
        let profile = store.get(index).cloned().ok_or(ProbeError::InvalidIndex {
            index,
            len: store.len(),
        })?;
        if !self.in_flight.insert(profile.name.clone()) {
            return Err(ProbeError::AlreadyTesting { name: profile.name });
        }

        let client = Arc::clone(&self.client);
        let question = self.question.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.probe(&profile, &question).await;
            // The receiver lives as long as the session; a send error means
            // the owner is gone and nobody wants the result.
            let _ = tx.send(ProbeEvent::Finished {
                name: profile.name,
                result,
            });
        });
        Ok(())
    }

    /// Probe every profile, one at a time in list order, in the background
    ///
    /// `delay` is waited between consecutive probes to stay under remote
    /// rate limits. Cancelling `cancel` stops the batch before the next
    /// profile starts; a request already sent runs to completion.
    ///
    /// # Errors
    /// Returns `Busy` if any probe is already in flight
    pub fn spawn_batch(
        &mut self,
        store: &ProfileStore,
        delay: Duration,
        cancel: CancellationToken,
    ) -> Result<(), ProbeError> {
        if !self.is_idle() {
            return Err(ProbeError::Busy);
        }

        let targets: Vec<Profile> = store.list().to_vec();
        self.in_flight
            .extend(targets.iter().map(|p| p.name.clone()));
        self.batch = Some(cancel.clone());

        tokio::spawn(run_batch(
            Arc::clone(&self.client),
            targets,
            self.question.clone(),
            delay,
            cancel,
            self.tx.clone(),
        ));
        Ok(())
    }

    /// Ask a running batch to stop before its next profile
    pub fn cancel_batch(&self) {
        if let Some(token) = &self.batch {
            token.cancel();
        }
    }

    /// Wait for the next event; `None` once nothing is in flight
    pub async fn next_event(&mut self) -> Option<ProbeEvent> {
        if self.is_idle() {
            return None;
        }
        self.rx.recv().await
    }

    /// Record an event in the store and update in-flight state
    ///
    /// A result for a profile deleted meanwhile is dropped.
    ///
    /// # Errors
    /// Returns an error if the store cannot be saved
    pub fn apply(&mut self, store: &mut ProfileStore, event: &ProbeEvent) -> StoreResult<()> {
        match event {
            ProbeEvent::Started { .. } => Ok(()),
            ProbeEvent::Finished { name, result } => {
                self.in_flight.remove(name);
                match store.record_probe(name, result) {
                    Err(StoreError::NotFound { .. }) => {
                        warn!(profile = %name, "profile removed while testing, result dropped");
                        Ok(())
                    }
                    other => other,
                }
            }
            ProbeEvent::BatchCancelled { skipped } => {
                for name in skipped {
                    self.in_flight.remove(name);
                }
                self.batch = None;
                Ok(())
            }
            ProbeEvent::BatchCompleted { .. } => {
                self.batch = None;
                Ok(())
            }
        }
    }
}

async fn run_batch<C: ProbeClient + ?Sized>(
    client: Arc<C>,
    targets: Vec<Profile>,
    question: String,
    delay: Duration,
    cancel: CancellationToken,
    tx: mpsc::UnboundedSender<ProbeEvent>,
) {
    let total = targets.len();
    for (position, profile) in targets.iter().enumerate() {
        if position > 0 && !delay.is_zero() {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(delay) => {}
            }
        }
        if cancel.is_cancelled() {
            let skipped = targets[position..].iter().map(|p| p.name.clone()).collect();
            debug!(position, total, "batch probe cancelled");
            let _ = tx.send(ProbeEvent::BatchCancelled { skipped });
            return;
        }

        let _ = tx.send(ProbeEvent::Started {
            name: profile.name.clone(),
            position,
            total,
        });
        let result = client.probe(profile, &question).await;
        let _ = tx.send(ProbeEvent::Finished {
            name: profile.name.clone(),
            result,
        });
    }
    let _ = tx.send(ProbeEvent::BatchCompleted { probed: total });
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ccswitch_core::profile::{ProfileDraft, TestStatus};
    use tempfile::TempDir;

    struct InstantClient;

    #[async_trait]
    impl ProbeClient for InstantClient {
        async fn probe(&self, _profile: &Profile, question: &str) -> ProbeResult {
            ProbeResult::now(TestStatus::Passed, format!("Q:{question} A:3..."), None)
        }
    }

    fn store_with(names: &[&str]) -> (TempDir, ProfileStore) {
        let dir = TempDir::new().unwrap();
        let mut store = ProfileStore::load(&dir.path().join("store.json"));
        for name in names {
            store
                .add(ProfileDraft::new(*name, "https://x", "t", "m"))
                .unwrap();
        }
        (dir, store)
    }

    #[tokio::test]
    async fn test_duplicate_probe_rejected() {
        let (_dir, mut store) = store_with(&["a"]);
        let mut session = ProbeSession::new(Arc::new(InstantClient), "1+2=?");

        session.spawn_probe(&store, 0).unwrap();
        assert!(session.is_testing("a"));
        let err = session.spawn_probe(&store, 0).unwrap_err();
        assert!(matches!(err, ProbeError::AlreadyTesting { .. }));

        let event = session.next_event().await.unwrap();
        session.apply(&mut store, &event).unwrap();
        assert!(session.is_idle());
        assert!(session.next_event().await.is_none());
        assert_eq!(store.get(0).unwrap().test_status, TestStatus::Passed);
    }

    #[tokio::test]
    async fn test_batch_rejected_while_busy() {
        let (_dir, store) = store_with(&["a", "b"]);
        let mut session = ProbeSession::new(Arc::new(InstantClient), "1+2=?");

        session.spawn_probe(&store, 1).unwrap();
        let err = session
            .spawn_batch(&store, Duration::ZERO, CancellationToken::new())
            .unwrap_err();
        assert_eq!(err.code(), "BUSY");
    }

    #[tokio::test]
    async fn test_result_for_deleted_profile_dropped() {
        let (_dir, mut store) = store_with(&["a"]);
        let mut session = ProbeSession::new(Arc::new(InstantClient), "1+2=?");

        session.spawn_probe(&store, 0).unwrap();
        store.delete(0).unwrap();
        let event = session.next_event().await.unwrap();
        session.apply(&mut store, &event).unwrap();
        assert!(session.is_idle());
    }

    #[tokio::test]
    async fn test_invalid_index() {
        let (_dir, store) = store_with(&[]);
        let mut session = ProbeSession::new(Arc::new(InstantClient), "1+2=?");
        let err = session.spawn_probe(&store, 0).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidIndex { index: 0, len: 0 }));
    }
}
