//! Per-track processing task.
//!
//! A TrackTask is the explicit "make instrumental" action for one playlist
//! entry: `trigger()` fetches the resolved source, selects a model, runs
//! inference and appends the result to the session collector. Its state
//! can be inspected independently of any UI.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::models::{InferenceInvoker, ModelChoice, ModelSelector};
use crate::types::{ProcessedResult, ResolvedSource, Track};

use super::collector::ResultCollector;
use super::fetch::AudioFetcher;

/// State of a track task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Not yet triggered.
    #[default]
    Idle,
    /// Fetching, separating or appending.
    Processing,
    /// The last run appended a result.
    Done,
    /// The last run failed; the task may be triggered again.
    Failed,
}

impl TaskState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Idle => "idle",
            TaskState::Processing => "processing",
            TaskState::Done => "done",
            TaskState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observable status of a task.
#[derive(Debug, Clone, Default)]
pub struct TaskStatus {
    /// Current state.
    pub state: TaskState,

    /// Number of times the task has been triggered.
    pub runs: u32,

    /// Number of results this task has appended.
    pub results_appended: u32,

    /// Error code of the last failed run.
    pub error_code: Option<String>,

    /// Human-readable error message of the last failed run.
    pub error_message: Option<String>,

    /// When the latest run started.
    pub started_at: Option<SystemTime>,

    /// When the latest run finished.
    pub completed_at: Option<SystemTime>,
}

impl TaskStatus {
    /// Marks the task as processing.
    fn set_processing(&mut self) {
        self.state = TaskState::Processing;
        self.runs += 1;
        self.error_code = None;
        self.error_message = None;
        self.started_at = Some(SystemTime::now());
        self.completed_at = None;
    }

    /// Marks the task as done.
    fn set_done(&mut self) {
        self.state = TaskState::Done;
        self.results_appended += 1;
        self.completed_at = Some(SystemTime::now());
    }

    /// Marks the task as failed with an error.
    fn set_failed(&mut self, error_code: &str, error_message: &str) {
        self.state = TaskState::Failed;
        self.error_code = Some(error_code.to_string());
        self.error_message = Some(error_message.to_string());
        self.completed_at = Some(SystemTime::now());
    }
}

/// Collaborators shared by every task in a session.
pub struct ProcessingContext {
    pub fetcher: Arc<dyn AudioFetcher>,
    pub invoker: Arc<dyn InferenceInvoker>,
    pub selector: ModelSelector,
    pub collector: ResultCollector,
}

/// The processing action for one playlist entry.
pub struct TrackTask {
    index: usize,
    source: ResolvedSource,
    status: Mutex<TaskStatus>,
    context: Arc<ProcessingContext>,
}

impl TrackTask {
    pub fn new(index: usize, source: ResolvedSource, context: Arc<ProcessingContext>) -> Self {
        Self {
            index,
            source,
            status: Mutex::new(TaskStatus::default()),
            context,
        }
    }

    /// Position of the track in the playlist.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn track(&self) -> &Track {
        &self.source.track
    }

    pub fn source(&self) -> &ResolvedSource {
        &self.source
    }

    /// Returns true if the track has a source and may be triggered.
    pub fn is_processable(&self) -> bool {
        self.source.is_resolved()
    }

    pub fn state(&self) -> TaskState {
        self.lock_status().state
    }

    pub fn status(&self) -> TaskStatus {
        self.lock_status().clone()
    }

    /// Runs fetch, model selection, inference and append.
    ///
    /// A failed run leaves the collector untouched and the task in
    /// [`TaskState::Failed`]; triggering again retries. Triggering a task
    /// that already completed processes it again and appends a second result.
    pub async fn trigger(&self, choice: ModelChoice) -> Result<()> {
        let Some(url) = self.source.source_url.as_deref() else {
            return Err(AppError::no_source(self.track().label()));
        };

        self.lock_status().set_processing();
        info!(index = self.index, track = %self.track(), quality = %choice, "Processing track");

        match self.run(url, choice).await {
            Ok(result) => {
                self.context.collector.append(result).await;
                self.lock_status().set_done();
                info!(index = self.index, track = %self.track(), "Instrumental ready");
                Ok(())
            }
            Err(e) => {
                warn!(index = self.index, track = %self.track(), error = %e, "Processing failed");
                self.lock_status().set_failed(e.code.as_str(), &e.message);
                Err(e)
            }
        }
    }

    async fn run(&self, url: &str, choice: ModelChoice) -> Result<ProcessedResult> {
        let audio = self.context.fetcher.fetch(url).await?;
        let model_url = self.context.selector.select(choice);
        let instrumental = self.context.invoker.infer(&audio, model_url).await?;
        let result = ProcessedResult::new(self.track().instrumental_file_name(), instrumental);
        if result.is_empty() {
            return Err(AppError::model_inference_failed("model produced no audio"));
        }
        Ok(result)
    }

    fn lock_status(&self) -> MutexGuard<'_, TaskStatus> {
        // Status updates cannot panic midway, so a poisoned guard is still consistent.
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
