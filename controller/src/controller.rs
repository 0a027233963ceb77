//! Job controller
//!
//! Owns the lifecycle, history catalog, selection and bootstrap
//! configuration, and runs the status poll loop as a cancellable task.
//! Polling is switched on and off purely as a function of the lifecycle
//! state after every change, so at most one loop exists at any time.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use shared::{
    component_debug, component_error, component_info, component_warn, logging, Component, Configuration,
    GenerationRequest, HistoryEntry, JobStatus,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::core::{
    error_banner, form_locked, DisplayState, Effect, FormFields, GenerationRequestBuilder,
    HistoryCatalog, JobLifecycle, LifecycleEvent, SelectionState,
};
use crate::error::{ControllerError, ControllerResult};
use crate::traits::{ArtifactStore, MapApi};

/// Fixed delay between two status polls
pub const POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Point-in-time copy of everything the controller tracks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerSnapshot {
    pub status: JobStatus,
    pub history: Vec<HistoryEntry>,
    pub selection: Option<String>,
    pub configuration: Option<Configuration>,
    /// A poll loop is currently scheduled
    pub polling: bool,
    /// A completion-triggered history refresh is in flight
    pub history_syncing: bool,
}

impl ControllerSnapshot {
    pub fn display(&self) -> DisplayState {
        let mut selection = SelectionState::new();
        selection.set(self.selection.clone());
        DisplayState::derive(&self.status, &selection)
    }

    pub fn error_banner(&self) -> Option<&str> {
        error_banner(&self.status)
    }

    pub fn form_locked(&self) -> bool {
        form_locked(&self.status)
    }

    /// No poll loop is running and no follow-up refresh is pending
    pub fn is_settled(&self) -> bool {
        !self.polling && !self.history_syncing
    }
}

struct PollerHandle {
    epoch: u64,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct ControllerState {
    lifecycle: JobLifecycle,
    catalog: HistoryCatalog,
    selection: SelectionState,
    configuration: Option<Configuration>,
    poller: Option<PollerHandle>,
    next_epoch: u64,
    pending_refreshes: usize,
}

impl ControllerState {
    fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            status: self.lifecycle.status().clone(),
            history: self.catalog.entries().to_vec(),
            selection: self.selection.current().map(str::to_string),
            configuration: self.configuration.clone(),
            polling: self.poller.is_some(),
            history_syncing: self.pending_refreshes > 0,
        }
    }
}

struct Inner<A, S> {
    api: A,
    store: S,
    state: Mutex<ControllerState>,
    snapshots: watch::Sender<ControllerSnapshot>,
    shutdown: CancellationToken,
}

/// Client-side controller for server map generation jobs
///
/// Dropping the controller tears it down: the poll loop is cancelled and
/// no further requests are issued.
pub struct JobController<A, S>
where
    A: MapApi + 'static,
    S: ArtifactStore + 'static,
{
    inner: Arc<Inner<A, S>>,
}

impl<A, S> JobController<A, S>
where
    A: MapApi + 'static,
    S: ArtifactStore + 'static,
{
    /// Create a new controller with dependency injection
    pub fn new(api: A, store: S) -> Self {
        let (snapshots, _) = watch::channel(ControllerSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                api,
                store,
                state: Mutex::new(ControllerState::default()),
                snapshots,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Load server defaults and the history catalog
    ///
    /// A failed history load is logged and tolerated; a failed configuration
    /// load is returned so the caller can decide whether to retry.
    pub async fn start(&self) -> ControllerResult<()> {
        logging::log_startup(Component::Controller, "job controller");

        let (config, _) = tokio::join!(self.load_configuration(), self.refresh_history());
        config.map(|_| ())
    }

    /// ConfigBootstrap: fetch the server-held default configuration
    pub async fn load_configuration(&self) -> ControllerResult<Configuration> {
        match self.inner.api.fetch_config().await {
            Ok(config) => {
                component_info!(
                    Component::Bootstrap,
                    "⚙️  Loaded defaults for '{}' ({})",
                    config.location_name,
                    config.location_type
                );
                let mut state = self.inner.lock();
                state.configuration = Some(config.clone());
                self.inner.publish(&state);
                Ok(config)
            }
            Err(e) => {
                logging::log_error(Component::Bootstrap, "Loading configuration", &e);
                Err(e)
            }
        }
    }

    /// Persist a configuration on the server
    ///
    /// The locally loaded configuration is left as it was.
    pub async fn save_configuration(&self, fields: &FormFields) -> ControllerResult<Configuration> {
        let config = fields.to_configuration()?;
        self.inner.api.save_config(&config).await?;
        logging::log_success(Component::Bootstrap, "Configuration saved on server");
        Ok(config)
    }

    /// Form fields seeded from the loaded configuration
    pub fn form_defaults(&self) -> ControllerResult<FormFields> {
        let state = self.inner.lock();
        state
            .configuration
            .as_ref()
            .map(FormFields::from_configuration)
            .ok_or(ControllerError::ConfigNotLoaded)
    }

    /// HistoryCatalogSync: replace the catalog with the server's list
    ///
    /// On failure the previous catalog stays in place.
    pub async fn refresh_history(&self) -> ControllerResult<Vec<HistoryEntry>> {
        self.inner.refresh_history().await
    }

    /// Validate the fields and submit a generation request
    pub async fn submit(&self, fields: &FormFields) -> ControllerResult<()> {
        let request = GenerationRequestBuilder::build(fields)?;
        self.submit_request(request).await
    }

    /// Submit an already built request
    ///
    /// On acceptance the status becomes `preparing` immediately and polling
    /// starts if it is not already running. On failure nothing changes, and
    /// a controller shut down before the server answers returns `ShutDown`.
    pub async fn submit_request(&self, request: GenerationRequest) -> ControllerResult<()> {
        if self.inner.shutdown.is_cancelled() {
            return Err(ControllerError::ShutDown);
        }

        component_info!(
            Component::Controller,
            "🗺️  Submitting '{}' ({})",
            request.location_name,
            request.location_type
        );

        if let Err(e) = self.inner.api.submit_generation(&request).await {
            logging::log_error(Component::Controller, "Submitting generation request", &e);
            return Err(e);
        }

        let mut state = self.inner.lock();
        // Torn down while the request was in flight: nothing would poll this job.
        // Checked under the lock, which teardown takes after cancelling.
        if self.inner.shutdown.is_cancelled() {
            component_warn!(
                Component::Controller,
                "Submission for '{}' accepted after teardown, not tracking it",
                request.location_name
            );
            return Err(ControllerError::ShutDown);
        }
        state.lifecycle.apply(LifecycleEvent::SubmissionAccepted);
        self.inner.sync_polling(&mut state);
        self.inner.publish(&state);
        Ok(())
    }

    /// Point the selection at an artifact, regardless of job status
    pub fn select(&self, filename: impl Into<String>) {
        let filename = filename.into();
        component_debug!(Component::Controller, "Selected {}", filename);
        let mut state = self.inner.lock();
        state.selection.select(filename);
        self.inner.publish(&state);
    }

    /// The selection names an artifact the current catalog does not list
    pub fn is_selection_dangling(&self) -> bool {
        let state = self.inner.lock();
        state.selection.is_dangling(&state.catalog)
    }

    /// Download the selected artifact into the artifact store
    pub async fn download_selected(&self) -> ControllerResult<std::path::PathBuf> {
        let filename = self
            .snapshot()
            .selection
            .ok_or(ControllerError::NothingSelected)?;
        self.download(&filename).await
    }

    /// Download an artifact by filename into the artifact store
    pub async fn download(&self, filename: &str) -> ControllerResult<std::path::PathBuf> {
        let bytes = self.inner.api.fetch_image(filename).await?;
        let size = bytes.len();
        let path = self.inner.store.save_artifact(filename, bytes).await?;
        logging::log_success(
            Component::Controller,
            &format!("Saved {} ({} bytes) to {}", filename, size, path.display()),
        );
        Ok(path)
    }

    /// Whether an artifact has already been saved to the artifact store
    pub async fn is_downloaded(&self, filename: &str) -> bool {
        self.inner.store.artifact_exists(filename).await
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        self.inner.snapshots.borrow().clone()
    }

    /// Receive a new snapshot after every state change
    pub fn subscribe(&self) -> watch::Receiver<ControllerSnapshot> {
        self.inner.snapshots.subscribe()
    }

    pub fn is_polling(&self) -> bool {
        self.inner.lock().poller.is_some()
    }

    /// Wait until the job is no longer polled and follow-up work is done
    ///
    /// Also returns once the controller has been shut down.
    pub async fn wait_until_settled(&self) -> ControllerSnapshot {
        let mut updates = self.subscribe();
        tokio::select! {
            _ = self.inner.shutdown.cancelled() => {}
            _ = updates.wait_for(ControllerSnapshot::is_settled) => {}
        }
        self.snapshot()
    }

    /// Tear down: cancel the poll loop and refuse further submissions
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }
}

impl<A, S> Drop for JobController<A, S>
where
    A: MapApi + 'static,
    S: ArtifactStore + 'static,
{
    fn drop(&mut self) {
        self.inner.shutdown();
    }
}

impl<A, S> Inner<A, S>
where
    A: MapApi + 'static,
    S: ArtifactStore + 'static,
{
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &ControllerState) {
        self.snapshots.send_replace(state.snapshot());
    }

    /// Start or stop the poll loop to match the lifecycle state
    ///
    /// Idempotent: an already running loop is kept, an absent loop is only
    /// started while polling is required and the controller is alive.
    fn sync_polling(self: &Arc<Self>, state: &mut ControllerState) {
        let required = state.lifecycle.polling_required();

        if required && state.poller.is_none() {
            if self.shutdown.is_cancelled() {
                return;
            }
            state.next_epoch += 1;
            let epoch = state.next_epoch;
            let cancel = self.shutdown.child_token();
            let task = tokio::spawn(Arc::clone(self).poll_loop(epoch, cancel.clone()));
            component_debug!(Component::Poller, "▶️  Poll loop {} started", epoch);
            state.poller = Some(PollerHandle { epoch, cancel, task });
        } else if !required {
            if let Some(handle) = state.poller.take() {
                // The loop may be the caller, so it is cancelled rather than aborted
                handle.cancel.cancel();
                component_debug!(Component::Poller, "⏹️  Poll loop {} stopped", handle.epoch);
            }
        }
    }

    async fn poll_loop(self: Arc<Self>, epoch: u64, cancel: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut consecutive_failures: u32 = 0;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = self.api.fetch_status() => result,
            };

            match result {
                Ok(status) => {
                    consecutive_failures = 0;
                    let effects = self.apply_poll_result(epoch, status);
                    if effects.contains(&Effect::RefreshHistory) {
                        let _ = self.refresh_history().await;
                        self.finish_refresh();
                    }
                }
                Err(e) if e.is_transient() => {
                    consecutive_failures += 1;
                    component_warn!(
                        Component::Poller,
                        consecutive_failures,
                        "⚠️  Status poll failed ({} in a row), will retry: {}",
                        consecutive_failures,
                        e
                    );
                }
                Err(e) => {
                    consecutive_failures += 1;
                    component_error!(
                        Component::Poller,
                        consecutive_failures,
                        "❌ Status poll failed unexpectedly, will retry: {}",
                        e
                    );
                }
            }
        }
    }

    /// Apply one poll response if it belongs to the active loop
    fn apply_poll_result(self: &Arc<Self>, epoch: u64, status: JobStatus) -> Vec<Effect> {
        let mut state = self.lock();
        if state.poller.as_ref().map(|p| p.epoch) != Some(epoch) {
            component_debug!(Component::Poller, "Discarding status from stale poll loop {}", epoch);
            return Vec::new();
        }

        let effects = state.lifecycle.apply(LifecycleEvent::StatusReceived(status));
        for effect in &effects {
            match effect {
                Effect::RefreshHistory => state.pending_refreshes += 1,
                Effect::Select(filename) => state.selection.set(filename.clone()),
            }
        }

        if effects.contains(&Effect::RefreshHistory) {
            logging::log_success(Component::Poller, &state.lifecycle.status().message);
        } else if let Some(message) = error_banner(state.lifecycle.status()) {
            component_warn!(Component::Poller, "❌ Job reported error: {}", message);
        }

        self.sync_polling(&mut state);
        self.publish(&state);
        effects
    }

    async fn refresh_history(&self) -> ControllerResult<Vec<HistoryEntry>> {
        match self.api.fetch_history().await {
            Ok(entries) => {
                let mut state = self.lock();
                state.catalog.replace(entries.clone());
                component_debug!(Component::Catalog, "📚 History refreshed with {} entries", state.catalog.len());
                self.publish(&state);
                Ok(entries)
            }
            Err(e) => {
                logging::log_error(Component::Catalog, "Refreshing history", &e);
                Err(e)
            }
        }
    }

    fn finish_refresh(&self) {
        let mut state = self.lock();
        state.pending_refreshes = state.pending_refreshes.saturating_sub(1);
        self.publish(&state);
    }

    fn shutdown(&self) {
        if self.shutdown.is_cancelled() {
            return;
        }
        self.shutdown.cancel();

        let mut state = self.lock();
        if let Some(handle) = state.poller.take() {
            handle.cancel.cancel();
            handle.task.abort();
            component_debug!(Component::Poller, "⏹️  Poll loop {} aborted on teardown", handle.epoch);
        }
        state.pending_refreshes = 0;
        self.publish(&state);
        logging::log_shutdown(Component::Controller, "controller torn down");
    }
}
