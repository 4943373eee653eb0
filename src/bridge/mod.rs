//! Execution bridge: one run request from source text to rendered outcome.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use ratatui::style::Color;
use tracing::debug;

use crate::error::BridgeError;
use crate::loader::{EntryPoint, LoadState, ModuleLoader};

pub mod render;

pub use render::{ExecutionResult, OutputClass, RenderedOutcome};

/// Whether a run may trigger the module load itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadinessPolicy {
    /// Await `ensure_ready` before running (starts the load if needed).
    #[default]
    EnsureReady,
    /// Refuse to run until the loader is already `Ready`.
    RequireReady,
}

/// Status indicator values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Loading,
    Ready,
    Running,
    LoadFailed(String),
}

impl RunStatus {
    pub fn text(&self) -> String {
        match self {
            Self::Loading => "Loading engine...".to_string(),
            Self::Ready => "Ready".to_string(),
            Self::Running => "Running...".to_string(),
            Self::LoadFailed(msg) => format!("Failed to load engine: {}", msg),
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Loading => Color::Gray,
            Self::Ready => Color::Green,
            Self::Running => Color::Yellow,
            Self::LoadFailed(_) => Color::Red,
        }
    }

    pub fn from_state(state: LoadState, last_error: Option<String>) -> Self {
        match state {
            LoadState::NotStarted | LoadState::Loading => Self::Loading,
            LoadState::Ready => Self::Ready,
            LoadState::Failed => Self::LoadFailed(last_error.unwrap_or_default()),
        }
    }
}

#[derive(Clone)]
pub struct ExecutionBridge {
    loader: Arc<ModuleLoader>,
    policy: ReadinessPolicy,
    defer: Duration,
}

impl ExecutionBridge {
    pub fn new(loader: Arc<ModuleLoader>, policy: ReadinessPolicy, defer: Duration) -> Self {
        Self { loader, policy, defer }
    }

    pub fn loader(&self) -> &Arc<ModuleLoader> {
        &self.loader
    }

    pub fn policy(&self) -> ReadinessPolicy {
        self.policy
    }

    pub async fn run(&self, source: &str) -> Result<RenderedOutcome, BridgeError> {
        self.run_with(source, |_| {}).await
    }

    /// Run `source`, reporting status transitions to `on_status`.
    ///
    /// `Running` is always reported, and the task yields, before the entry
    /// point is invoked, so a listener can show it ahead of the result.
    pub async fn run_with<F>(&self, source: &str, on_status: F) -> Result<RenderedOutcome, BridgeError>
    where
        F: Fn(RunStatus) + Send + Sync,
    {
        if source.trim().is_empty() {
            return Ok(RenderedOutcome::cleared());
        }

        let entry = self.entry_point(&on_status).await?;

        on_status(RunStatus::Running);
        tokio::task::yield_now().await;
        if !self.defer.is_zero() {
            tokio::time::sleep(self.defer).await;
        }

        debug!(bytes = source.len(), "submitting source to engine");
        // Runs on this task, so aborting the caller drops the engine run too.
        let run = AssertUnwindSafe(async { entry.run_meow(source).await }).catch_unwind();
        let outcome = match run.await {
            Ok(raw) => render::render_response(&raw),
            Err(panic) => RenderedOutcome::internal_error(format!("engine crashed: {}", panic_message(&*panic))),
        };

        on_status(RunStatus::Ready);
        Ok(outcome)
    }

    async fn entry_point<F>(&self, on_status: &F) -> Result<Arc<dyn EntryPoint>, BridgeError>
    where
        F: Fn(RunStatus) + Send + Sync,
    {
        match self.policy {
            ReadinessPolicy::RequireReady => self.loader.entry_point().ok_or(BridgeError::NotReady),
            ReadinessPolicy::EnsureReady => {
                if self.loader.state() != LoadState::Ready {
                    on_status(RunStatus::Loading);
                }
                self.loader.ensure_ready().await.map_err(|err| {
                    on_status(RunStatus::LoadFailed(err.to_string()));
                    BridgeError::Load(err)
                })
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic".to_string()
    }
}
