//! Lazy, load-once management of the external execution module.
//!
//! The loader owns the [`LoadState`] machine and a memoized future for the
//! attempt in flight. Every caller of [`ModuleLoader::ensure_ready`] that
//! arrives while an attempt is running awaits that same future, so one
//! attempt performs exactly one fetch and one instantiate regardless of how
//! many callers are waiting on it.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, info, warn};

use crate::error::LoadError;

/// The callable the execution module exposes once it is running.
///
/// `run_meow` takes Meow source text and resolves to a JSON document of the
/// shape `{"output": "...", "error": "..."}`. Engine failures belong in the
/// `error` field. Dropping the returned future abandons the run and must
/// release whatever the engine holds for it.
pub trait EntryPoint: Send + Sync {
    fn run_meow(&self, source: &str) -> BoxFuture<'static, String>;
}

/// A fetched execution module, ready to hand to a [`Bootstrap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleArtifact {
    /// Module already present on the local filesystem.
    Local(PathBuf),
    /// Module downloaded from `origin`.
    Downloaded { origin: String, bytes: Vec<u8> },
}

impl ModuleArtifact {
    pub fn origin(&self) -> String {
        match self {
            Self::Local(path) => path.display().to_string(),
            Self::Downloaded { origin, .. } => origin.clone(),
        }
    }
}

/// Retrieves the module artifact. One call per load attempt.
pub trait ModuleFetcher: Send + Sync {
    fn fetch(&self) -> BoxFuture<'static, Result<ModuleArtifact, LoadError>>;
}

/// Host adapter that instantiates a fetched module and starts it running.
pub trait Bootstrap: Send + Sync {
    fn instantiate(&self, artifact: ModuleArtifact) -> Result<Arc<dyn EntryPoint>, LoadError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotStarted,
    Loading,
    Ready,
    /// The most recent attempt failed. The next `ensure_ready` starts over.
    Failed,
}

type LoadFuture = Shared<BoxFuture<'static, Result<Arc<dyn EntryPoint>, LoadError>>>;

struct Inner {
    state: LoadState,
    attempt: u64,
    inflight: Option<LoadFuture>,
    entry: Option<Arc<dyn EntryPoint>>,
    last_error: Option<LoadError>,
}

pub struct ModuleLoader {
    fetcher: Arc<dyn ModuleFetcher>,
    bootstrap: Option<Arc<dyn Bootstrap>>,
    inner: Mutex<Inner>,
}

impl ModuleLoader {
    /// `bootstrap` may be absent; every load attempt then fails with
    /// [`LoadError::MissingBootstrap`] without fetching anything.
    pub fn new(fetcher: Arc<dyn ModuleFetcher>, bootstrap: Option<Arc<dyn Bootstrap>>) -> Self {
        Self {
            fetcher,
            bootstrap,
            inner: Mutex::new(Inner {
                state: LoadState::NotStarted,
                attempt: 0,
                inflight: None,
                entry: None,
                last_error: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> LoadState {
        self.lock().state
    }

    /// The running entry point, once the loader is `Ready`.
    pub fn entry_point(&self) -> Option<Arc<dyn EntryPoint>> {
        self.lock().entry.clone()
    }

    pub fn last_error(&self) -> Option<LoadError> {
        self.lock().last_error.clone()
    }

    /// Resolve once the module is running.
    ///
    /// Joins the attempt in flight if there is one, returns immediately when
    /// already `Ready`, and starts a fresh attempt from `NotStarted` or
    /// `Failed`.
    pub async fn ensure_ready(&self) -> Result<Arc<dyn EntryPoint>, LoadError> {
        let (attempt, future) = {
            let mut inner = self.lock();
            if let Some(entry) = &inner.entry {
                return Ok(entry.clone());
            }
            match &inner.inflight {
                Some(future) => (inner.attempt, future.clone()),
                None => {
                    inner.attempt += 1;
                    inner.state = LoadState::Loading;
                    let future = self.start_attempt().shared();
                    inner.inflight = Some(future.clone());
                    debug!(attempt = inner.attempt, "engine load started");
                    (inner.attempt, future)
                }
            }
        };

        let result = future.await;
        self.settle(attempt, &result);
        result
    }

    fn start_attempt(&self) -> BoxFuture<'static, Result<Arc<dyn EntryPoint>, LoadError>> {
        let fetcher = self.fetcher.clone();
        let bootstrap = self.bootstrap.clone();
        async move {
            let bootstrap = bootstrap.ok_or(LoadError::MissingBootstrap)?;
            let artifact = fetcher.fetch().await?;
            bootstrap.instantiate(artifact)
        }
        .boxed()
    }

    /// Record the outcome of `attempt`. Waiters of an older attempt are ignored.
    fn settle(&self, attempt: u64, result: &Result<Arc<dyn EntryPoint>, LoadError>) {
        let mut inner = self.lock();
        if inner.attempt != attempt || inner.inflight.is_none() {
            return;
        }
        inner.inflight = None;
        match result {
            Ok(entry) => {
                inner.state = LoadState::Ready;
                inner.entry = Some(entry.clone());
                inner.last_error = None;
                info!(attempt, "engine ready");
            }
            Err(err) => {
                inner.state = LoadState::Failed;
                inner.last_error = Some(err.clone());
                warn!(attempt, error = %err, "engine load failed");
            }
        }
    }
}
