//! Test helpers and builder patterns for controller tests
//!
//! This module provides convenient helper functions and builder patterns
//! to reduce test boilerplate and improve maintainability.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use controller::traits::{MockArtifactStore, MockMapApi};
use controller::{ControllerError, ControllerResult, JobController, MapApi, POLL_INTERVAL};
use shared::{Configuration, GenerationRequest, HistoryEntry, JobStatus};

use super::fixtures::TestFixtures;

pub type TestController = JobController<MockMapApi, MockArtifactStore>;

/// One scripted answer from `/api/status`
#[derive(Debug, Clone)]
pub enum PollReply {
    Status(JobStatus),
    TransportFailure,
}

/// Shared call counters for every mocked endpoint
#[derive(Debug, Clone, Default)]
pub struct CallCounters {
    config: Arc<AtomicUsize>,
    submit: Arc<AtomicUsize>,
    status: Arc<AtomicUsize>,
    history: Arc<AtomicUsize>,
    image: Arc<AtomicUsize>,
    saved: Arc<AtomicUsize>,
}

impl CallCounters {
    pub fn config_loads(&self) -> usize {
        self.config.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> usize {
        self.submit.load(Ordering::SeqCst)
    }

    pub fn status_polls(&self) -> usize {
        self.status.load(Ordering::SeqCst)
    }

    pub fn history_fetches(&self) -> usize {
        self.history.load(Ordering::SeqCst)
    }

    pub fn image_fetches(&self) -> usize {
        self.image.load(Ordering::SeqCst)
    }

    pub fn artifacts_saved(&self) -> usize {
        self.saved.load(Ordering::SeqCst)
    }
}

/// Step through a script, repeating the last item once it is exhausted
fn scripted<T: Clone + Send + 'static>(script: Vec<T>, counter: Arc<AtomicUsize>) -> impl FnMut() -> T + Send + 'static {
    assert!(!script.is_empty(), "script must contain at least one reply");
    move || {
        let index = counter.fetch_add(1, Ordering::SeqCst);
        script[index.min(script.len() - 1)].clone()
    }
}

fn transport_failure(endpoint: &str) -> ControllerError {
    ControllerError::TransportError {
        endpoint: endpoint.to_string(),
        message: "connection refused".to_string(),
    }
}

/// Builder pattern for creating test controllers over mocks
///
/// Each `with_*` call installs the one expectation for its endpoint; an
/// endpoint that is never configured panics if called.
pub struct ControllerBuilder {
    api: MockMapApi,
    store: MockArtifactStore,
    counters: CallCounters,
}

impl ControllerBuilder {
    pub fn new() -> Self {
        Self {
            api: MockMapApi::new(),
            store: MockArtifactStore::new(),
            counters: CallCounters::default(),
        }
    }

    /// `/api/config` answers with the given configuration
    pub fn with_config(self, config: Configuration) -> Self {
        self.with_config_script(vec![Some(config)])
    }

    /// `/api/config` follows a script; `None` is a transport failure
    pub fn with_config_script(mut self, script: Vec<Option<Configuration>>) -> Self {
        let mut next = scripted(script, self.counters.config.clone());
        self.api
            .expect_fetch_config()
            .returning(move || next().ok_or_else(|| transport_failure("/api/config")));
        self
    }

    /// `/api/history` always answers with the given entries
    pub fn with_history(self, entries: Vec<HistoryEntry>) -> Self {
        self.with_history_script(vec![Some(entries)])
    }

    /// `/api/history` follows a script; `None` is a transport failure
    pub fn with_history_script(mut self, script: Vec<Option<Vec<HistoryEntry>>>) -> Self {
        let mut next = scripted(script, self.counters.history.clone());
        self.api
            .expect_fetch_history()
            .returning(move || next().ok_or_else(|| transport_failure("/api/history")));
        self
    }

    /// `/api/generate` acknowledges every request
    pub fn accepting_submissions(mut self) -> Self {
        let counter = self.counters.submit.clone();
        self.api.expect_submit_generation().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        self
    }

    /// `/api/generate` refuses every request with `reason`
    pub fn rejecting_submissions(mut self, reason: &str) -> Self {
        let counter = self.counters.submit.clone();
        let reason = reason.to_string();
        self.api.expect_submit_generation().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(ControllerError::SubmissionRejected { reason: reason.clone() })
        });
        self
    }

    /// `/api/status` follows a script, repeating the last reply
    pub fn with_poll_script(mut self, script: Vec<PollReply>) -> Self {
        let mut next = scripted(script, self.counters.status.clone());
        self.api.expect_fetch_status().returning(move || match next() {
            PollReply::Status(status) => Ok(status),
            PollReply::TransportFailure => Err(transport_failure("/api/status")),
        });
        self
    }

    /// `/api/image/{filename}` returns `bytes`, and the store accepts them
    pub fn with_downloads(mut self, bytes: Vec<u8>) -> Self {
        let image = self.counters.image.clone();
        self.api.expect_fetch_image().returning(move |_| {
            image.fetch_add(1, Ordering::SeqCst);
            Ok(bytes.clone())
        });

        let saved = self.counters.saved.clone();
        self.store.expect_save_artifact().returning(move |filename, _| {
            saved.fetch_add(1, Ordering::SeqCst);
            Ok(PathBuf::from("maps").join(filename))
        });
        self
    }

    /// Configure the API mock directly
    pub fn with_api<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockMapApi),
    {
        setup(&mut self.api);
        self
    }

    /// Configure the artifact store mock directly
    pub fn with_store<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockArtifactStore),
    {
        setup(&mut self.store);
        self
    }

    pub fn build(self) -> (TestController, CallCounters) {
        (JobController::new(self.api, self.store), self.counters)
    }
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Server whose `/api/generate` takes `delay` to acknowledge
///
/// Every other endpoint answers immediately; status polls report a running
/// job and are counted.
pub struct SlowSubmitApi {
    pub delay: Duration,
    pub polls: Arc<AtomicUsize>,
}

impl SlowSubmitApi {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            polls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl MapApi for SlowSubmitApi {
    async fn fetch_config(&self) -> ControllerResult<Configuration> {
        Ok(TestFixtures::configuration())
    }

    async fn save_config(&self, _config: &Configuration) -> ControllerResult<()> {
        Ok(())
    }

    async fn submit_generation(&self, _request: &GenerationRequest) -> ControllerResult<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    async fn fetch_status(&self) -> ControllerResult<JobStatus> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(TestFixtures::rendering())
    }

    async fn fetch_history(&self) -> ControllerResult<Vec<HistoryEntry>> {
        Ok(TestFixtures::history_a())
    }

    async fn fetch_image(&self, _filename: &str) -> ControllerResult<Vec<u8>> {
        Ok(Vec::new())
    }
}

/// Helper functions for common test scenarios
pub struct TestHelpers;

impl TestHelpers {
    /// A server with default config and a single history entry `a.png`
    pub fn standard() -> ControllerBuilder {
        ControllerBuilder::new()
            .with_config(TestFixtures::configuration())
            .accepting_submissions()
    }

    /// Server that renders the Greece map on the second poll
    pub fn greece_job() -> ControllerBuilder {
        Self::standard()
            .with_history_script(vec![
                Some(TestFixtures::history_a()),
                Some(TestFixtures::history_with_greece()),
            ])
            .with_poll_script(vec![
                PollReply::Status(TestFixtures::rendering()),
                PollReply::Status(TestFixtures::complete(TestFixtures::GREECE_FILE)),
            ])
    }

    /// Server whose job never finishes
    pub fn endless_job() -> ControllerBuilder {
        Self::standard()
            .with_history(TestFixtures::history_a())
            .with_poll_script(vec![PollReply::Status(TestFixtures::rendering())])
    }

    /// Advance paused time by `polls` poll intervals plus a small margin
    pub async fn advance_polls(polls: u32) {
        tokio::time::sleep(POLL_INTERVAL * polls + Duration::from_millis(100)).await;
    }

    /// Let freshly spawned tasks run without moving the clock
    pub async fn settle_tasks() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }
}
