//! Processing-status poller
//!
//! Tracks a set of in-flight file identifiers and polls the backend's
//! status endpoint on one shared cadence. Per identifier the observed
//! lifecycle is: no snapshot yet ("loading") -> uploaded -> processing ->
//! completed | error. Transitions come entirely from server responses;
//! nothing is inferred locally.
//!
//! Failure handling is stale-read tolerant: a fetch failure for one
//! identifier is logged, its previous snapshot is kept, and the
//! other identifiers in the same tick are unaffected. Once a terminal
//! status is observed the identifier stays visible for a grace period
//! before it is dropped from the tracked set.

use crate::api::ProcessingRecord;
use crate::error::Result;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Shared polling cadence across all tracked identifiers
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How long a terminal snapshot stays visible before its identifier is
/// dropped from the tracked set
pub const TERMINAL_GRACE: Duration = Duration::from_secs(2);

/// Anything that can answer a status query for a file identifier.
///
/// `BackendClient` is the production implementation; tests drive the
/// poller with scripted sources.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, file_id: &str) -> Result<ProcessingRecord>;
}

/// A job that reached a terminal status and has been dropped from the
/// tracked set after its grace period
#[derive(Debug, Clone, serde::Serialize)]
pub struct CompletedJob {
    pub file_id: String,
    pub record: ProcessingRecord,
}

/// Poller state over a status source
pub struct StatusPoller<'a> {
    source: &'a dyn StatusSource,
    /// Tracked identifiers in insertion order
    tracked: Vec<String>,
    /// Latest snapshot per identifier; absent means "loading"
    snapshots: HashMap<String, ProcessingRecord>,
    /// Removal deadline per identifier, set when a terminal status is
    /// first observed
    removal_due: HashMap<String, Instant>,
}

impl<'a> StatusPoller<'a> {
    pub fn new(source: &'a dyn StatusSource) -> Self {
        Self {
            source,
            tracked: Vec::new(),
            snapshots: HashMap::new(),
            removal_due: HashMap::new(),
        }
    }

    /// Start tracking an identifier. Duplicates are ignored.
    pub fn track(&mut self, file_id: impl Into<String>) {
        let file_id = file_id.into();
        if !self.tracked.contains(&file_id) {
            debug!("Tracking {}", file_id);
            self.tracked.push(file_id);
        }
    }

    /// Identifiers currently tracked, in insertion order
    pub fn tracked(&self) -> &[String] {
        &self.tracked
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Latest snapshot for an identifier; `None` renders as "loading"
    pub fn snapshot(&self, file_id: &str) -> Option<&ProcessingRecord> {
        self.snapshots.get(file_id)
    }

    /// Run one poll tick: fetch every tracked identifier's status
    /// (independently, concurrently in flight), then drop identifiers
    /// whose terminal grace period has elapsed.
    pub async fn tick(&mut self) -> Vec<CompletedJob> {
        let fetches = self.tracked.iter().map(|file_id| {
            let source = self.source;
            async move { (file_id.clone(), source.fetch_status(file_id).await) }
        });

        let results = join_all(fetches).await;
        for (file_id, result) in results {
            match result {
                Ok(record) => {
                    if record.status.is_terminal() && !self.removal_due.contains_key(&file_id) {
                        debug!("{} reached terminal status {}", file_id, record.status);
                        self.removal_due
                            .insert(file_id.clone(), Instant::now() + TERMINAL_GRACE);
                    }
                    self.snapshots.insert(file_id, record);
                }
                Err(e) => {
                    // Stale read: keep the previous snapshot for this
                    // identifier; the rest of the tick is unaffected.
                    warn!("Failed to fetch status for {}: {}", file_id, e);
                }
            }
        }

        let now = Instant::now();
        let expired: Vec<String> = self
            .removal_due
            .iter()
            .filter(|(_, due)| **due <= now)
            .map(|(id, _)| id.clone())
            .collect();

        let mut completed = Vec::new();
        for file_id in expired {
            self.tracked.retain(|id| *id != file_id);
            self.removal_due.remove(&file_id);
            if let Some(record) = self.snapshots.remove(&file_id) {
                completed.push(CompletedJob { file_id, record });
            }
        }
        completed
    }

    /// Poll on the shared cadence until the tracked set drains, invoking
    /// the callback after every tick with the jobs dropped in that tick.
    /// Returning from this function cancels the timer; nothing survives
    /// the owning command.
    pub async fn run<F>(&mut self, mut on_tick: F) -> Vec<CompletedJob>
    where
        F: FnMut(&Self, &[CompletedJob]),
    {
        let mut all_completed = Vec::new();
        let mut interval = time::interval(POLL_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !self.is_empty() {
            interval.tick().await;
            let completed = self.tick().await;
            on_tick(self, &completed);
            all_completed.extend(completed);
        }
        all_completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ProcessingStatus;
    use crate::error::Error;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn record(status: ProcessingStatus, progress: u8, message: &str) -> ProcessingRecord {
        ProcessingRecord {
            status,
            filename: "report.pdf".to_string(),
            safe_filename: "report_1a2b3c4d.pdf".to_string(),
            progress,
            message: message.to_string(),
            text_file: None,
            embeddings_file: None,
        }
    }

    /// Scripted source: pops one queued response per fetch; an exhausted
    /// queue answers with an error.
    struct ScriptedSource {
        script: Mutex<HashMap<String, VecDeque<Result<ProcessingRecord>>>>,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self {
                script: Mutex::new(HashMap::new()),
            }
        }

        fn push(&self, file_id: &str, response: Result<ProcessingRecord>) {
            self.script
                .lock()
                .unwrap()
                .entry(file_id.to_string())
                .or_default()
                .push_back(response);
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn fetch_status(&self, file_id: &str) -> Result<ProcessingRecord> {
            self.script
                .lock()
                .unwrap()
                .get_mut(file_id)
                .and_then(|queue| queue.pop_front())
                .unwrap_or_else(|| Err(Error::Upstream("script exhausted".to_string())))
        }
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_previous_snapshot() {
        let source = ScriptedSource::new();
        source.push("a", Ok(record(ProcessingStatus::Uploaded, 0, "uploaded")));
        source.push("a", Err(Error::Upstream("connection reset".to_string())));
        source.push("b", Ok(record(ProcessingStatus::Uploaded, 0, "uploaded")));
        source.push("b", Ok(record(ProcessingStatus::Processing, 25, "working")));

        let mut poller = StatusPoller::new(&source);
        poller.track("a");
        poller.track("b");

        poller.tick().await;
        assert_eq!(poller.snapshot("a").unwrap().status, ProcessingStatus::Uploaded);

        // Second tick: a's fetch fails, b's succeeds
        poller.tick().await;
        let a = poller.snapshot("a").unwrap();
        let b = poller.snapshot("b").unwrap();
        assert_eq!(a.status, ProcessingStatus::Uploaded);
        assert_eq!(a.message, "uploaded");
        assert_eq!(b.status, ProcessingStatus::Processing);
        assert_eq!(b.progress, 25);
        assert_eq!(poller.tracked().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_removal_respects_grace_period() {
        let source = ScriptedSource::new();
        source.push("a", Ok(record(ProcessingStatus::Processing, 50, "working")));
        for _ in 0..4 {
            source.push("a", Ok(record(ProcessingStatus::Completed, 100, "done")));
        }

        let mut poller = StatusPoller::new(&source);
        poller.track("a");

        // t=0: still processing
        assert!(poller.tick().await.is_empty());

        // t=1: terminal status observed; grace period starts
        time::advance(Duration::from_secs(1)).await;
        assert!(poller.tick().await.is_empty());
        let observed_at = Instant::now();

        // t=2: one second into the grace period, still visible
        time::advance(Duration::from_secs(1)).await;
        assert!(poller.tick().await.is_empty());
        assert_eq!(
            poller.snapshot("a").unwrap().status,
            ProcessingStatus::Completed
        );

        // t=3: grace period elapsed, dropped on this tick
        time::advance(Duration::from_secs(1)).await;
        let completed = poller.tick().await;
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].file_id, "a");
        assert_eq!(completed[0].record.status, ProcessingStatus::Completed);
        assert!(poller.is_empty());
        assert!(poller.snapshot("a").is_none());

        let elapsed = Instant::now() - observed_at;
        assert!(elapsed >= TERMINAL_GRACE);
        assert!(elapsed < TERMINAL_GRACE + POLL_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_status_is_terminal_too() {
        let source = ScriptedSource::new();
        for _ in 0..4 {
            source.push("a", Ok(record(ProcessingStatus::Error, 0, "failed")));
        }

        let mut poller = StatusPoller::new(&source);
        poller.track("a");

        poller.tick().await;
        time::advance(Duration::from_secs(2)).await;
        let completed = poller.tick().await;
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].record.status, ProcessingStatus::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_drains_and_returns() {
        let source = ScriptedSource::new();
        source.push("a", Ok(record(ProcessingStatus::Uploaded, 0, "uploaded")));
        for _ in 0..5 {
            source.push("a", Ok(record(ProcessingStatus::Completed, 100, "done")));
        }

        let mut poller = StatusPoller::new(&source);
        poller.track("a");

        let mut ticks = 0;
        let completed = poller
            .run(|_, _| {
                ticks += 1;
            })
            .await;

        assert_eq!(completed.len(), 1);
        assert!(poller.is_empty());
        // observation tick + grace ticks, never an orphaned timer beyond
        assert!(ticks >= 3 && ticks <= 5, "unexpected tick count {}", ticks);
    }

    #[tokio::test]
    async fn test_run_with_nothing_tracked_returns_immediately() {
        let source = ScriptedSource::new();
        let mut poller = StatusPoller::new(&source);
        let completed = poller.run(|_, _| {}).await;
        assert!(completed.is_empty());
    }

    #[tokio::test]
    async fn test_track_ignores_duplicates() {
        let source = ScriptedSource::new();
        let mut poller = StatusPoller::new(&source);
        poller.track("a");
        poller.track("a");
        assert_eq!(poller.tracked().len(), 1);
    }
}
